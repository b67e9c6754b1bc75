//! `galaxy create`：从模板创建新的 Galaxy 应用
//! 流程：校验 → 交互收集设置 → 获取模板 → 写配置/类型/环境文件/README → git → 安装依赖。
//! 创建目录之后的任何失败都会尝试删除该目录。

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::theme::choose_theme;
use crate::{
    cli::CreateArgs,
    colors::preview_palette,
    config::{AppType, ConfigSettings, GalaxyConfig},
    env_file::{self, EnvSettings},
    error::{GalaxyError, GalaxyResult},
    external::{self, ExternalStep, StepOutcome, TemplateSource},
    output,
    package_json,
    package_manager::{self, PathLookup, PackageManager},
    prompt::{InputQuestion, Prompter},
    scaffold::{self, ReadmeContext},
    utils::{env_opt_string, flag_or_env, title_case},
    validation::{validate_project_name, validate_url},
};

const CORE_TAGLINE: &str = "Central hub for all your tools";
const FEATURE_TAGLINE: &str = "Specialized tool for your workflow";

/// 交互收集到的结果
struct Answers {
    settings: ConfigSettings,
    theme: String,
}

/// 命令行与环境变量合并后的选项
struct Options {
    template: TemplateSource,
    package_manager: Option<PackageManager>,
    no_install: bool,
    no_git: bool,
}

impl Options {
    fn from_args(args: &CreateArgs) -> Self {
        let template = args
            .template
            .clone()
            .or_else(|| env_opt_string("GALAXY_TEMPLATE"))
            .map(|t| TemplateSource::parse(&t))
            .unwrap_or_else(|| TemplateSource::parse(external::DEFAULT_TEMPLATE));
        let package_manager = args
            .package_manager
            .or_else(|| env_opt_string("GALAXY_PACKAGE_MANAGER").and_then(|s| PackageManager::parse(&s)));
        Options {
            template,
            package_manager,
            no_install: flag_or_env(args.no_install, "GALAXY_NO_INSTALL"),
            no_git: flag_or_env(args.no_git, "GALAXY_NO_GIT"),
        }
    }
}

pub(crate) fn run(args: CreateArgs, cwd: &Path, prompter: &mut dyn Prompter) -> Result<()> {
    let project = args.project_name.as_str();
    validate_project_name(project)
        .map_err(|msg| GalaxyError::InvalidInput(format!("Invalid project name '{}': {}", project, msg)))?;

    let project_dir = cwd.join(project);
    if project_dir.exists() {
        return Err(GalaxyError::PreconditionFailed(format!("Directory {} already exists!", project)).into());
    }
    if let Some(url) = &args.core_url {
        validate_url(url).map_err(|msg| GalaxyError::InvalidInput(format!("Invalid core URL '{}': {}", url, msg)))?;
    }

    let answers = ask(&args, prompter)?;
    let options = Options::from_args(&args);
    debug!(template = %options.template, no_install = options.no_install, no_git = options.no_git, "create options");

    let spinner = output::spinner("Creating your Galaxy app...");
    let result = build_project(&project_dir, project, &answers, &options, |msg| spinner.set_message(msg.to_string()));
    spinner.finish_and_clear();

    let (pm, warnings) = match result {
        Ok(done) => done,
        Err(e) => {
            if project_dir.exists() {
                if let Err(cleanup) = fs::remove_dir_all(&project_dir) {
                    warn!(error = %cleanup, dir = %project_dir.display(), "cleanup failed");
                }
            }
            return Err(e).context("Failed to create project");
        }
    };

    for w in &warnings {
        output::warn(w);
    }
    output::success("Galaxy app created successfully!");
    preview_palette(&answers.settings.color_palette);
    print_next_steps(project, &answers.settings, pm, options.no_install);
    Ok(())
}

fn ask(args: &CreateArgs, prompter: &mut dyn Prompter) -> GalaxyResult<Answers> {
    let project = args.project_name.as_str();
    let app_type = match args.app_type {
        Some(t) => t,
        None => {
            let items = vec!["🌌 Core App (Galaxy Center)".to_string(), "🪐 Feature App (Planet)".to_string()];
            match prompter.select("What type of app are you creating?", &items, 0)? {
                0 => AppType::Core,
                _ => AppType::Feature,
            }
        }
    };

    let name = prompter.input(&InputQuestion::new("What is your app's display name?").default(title_case(project)))?;
    let default_tagline = match app_type {
        AppType::Core => CORE_TAGLINE,
        AppType::Feature => FEATURE_TAGLINE,
    };
    let tagline = prompter.input(&InputQuestion::new("Enter a tagline for your app:").default(default_tagline))?;

    let core_app_url = match (app_type, &args.core_url) {
        (AppType::Feature, Some(url)) => Some(url.trim().to_string()),
        (AppType::Feature, None) => Some(prompter.input(
            &InputQuestion::new("Enter the Core app URL:").validate(validate_url).flag("--core <url>"),
        )?),
        (AppType::Core, _) => None,
    };

    let (color_palette, theme) = choose_theme(prompter)?;
    Ok(Answers {
        settings: ConfigSettings {
            id: project.to_string(),
            app_type,
            name,
            tagline,
            core_app_url,
            color_palette,
        },
        theme,
    })
}

/// 模板已带配置时合并（解析失败则覆盖并给出警告），否则新建
fn write_config(project_dir: &Path, settings: &ConfigSettings, warnings: &mut Vec<String>) -> GalaxyResult<()> {
    let config = if GalaxyConfig::exists(project_dir) {
        match GalaxyConfig::load(project_dir) {
            Ok(mut existing) => {
                debug!("merging into template galaxy config");
                existing.apply(settings);
                existing
            }
            Err(e) => {
                warnings.push(format!("Template galaxy config could not be read ({}); it was replaced", e));
                GalaxyConfig::from_settings(settings)
            }
        }
    } else {
        GalaxyConfig::from_settings(settings)
    };
    config.save(project_dir)?;
    Ok(())
}

fn build_project(
    project_dir: &Path,
    project: &str,
    answers: &Answers,
    options: &Options,
    progress: impl Fn(&str),
) -> Result<(PackageManager, Vec<String>)> {
    let settings = &answers.settings;
    let mut warnings = Vec::new();

    progress("Setting up project structure...");
    external::run_step(ExternalStep::TemplateFetch, || external::fetch_template(&options.template, project_dir))?;

    progress("Configuring galaxy settings...");
    write_config(project_dir, settings, &mut warnings)?;
    scaffold::write_types(project_dir)?;

    progress("Creating environment file...");
    env_file::write_env_files(
        project_dir,
        &EnvSettings {
            app_name: &settings.name,
            app_type: settings.app_type,
            core_app_url: settings.core_app_url.as_deref(),
            with_placeholders: true,
        },
        true,
    )?;

    let pm = package_manager::detect(options.package_manager, project_dir, &PathLookup);

    progress("Creating documentation...");
    scaffold::write_readme(
        project_dir,
        &ReadmeContext {
            project,
            name: &settings.name,
            tagline: &settings.tagline,
            app_type: settings.app_type,
            core_app_url: settings.core_app_url.as_deref(),
            theme: &answers.theme,
            package_manager: pm,
        },
    )?;
    if let Err(e) = package_json::set_name(project_dir, project) {
        warnings.push(format!("Could not update package.json: {}", e));
    }

    if !options.no_git {
        progress("Initializing git repository...");
        if let StepOutcome::Skipped(reason) =
            external::run_step(ExternalStep::GitInit, || external::init_git(project_dir))?
        {
            warnings.push(format!("Warning: Failed to initialize git repository ({})", reason));
        }
    }

    if !options.no_install {
        progress("Installing dependencies...");
        if let StepOutcome::Skipped(reason) =
            external::run_step(ExternalStep::PackageInstall, || external::install_deps(pm, project_dir))?
        {
            warnings.push(format!("Warning: Failed to install dependencies automatically ({})", reason));
            warnings.push(format!("Please run '{}' manually", pm.install_command()));
        }
    }

    Ok((pm, warnings))
}

fn print_next_steps(project: &str, settings: &ConfigSettings, pm: PackageManager, skipped_install: bool) {
    output::header("🚀 Next steps:");
    output::step(&format!("cd {}", project));
    if skipped_install {
        output::step(&pm.install_command());
    }
    output::step("Configure your .env.local file");
    output::step(&pm.dev_command());

    if let (AppType::Feature, Some(url)) = (settings.app_type, settings.core_app_url.as_deref()) {
        output::header("🔗 Feature App Setup:");
        output::hint(&format!("- Core URL: {}", url));
        output::hint("- Make sure your Core app is running");
        output::hint("- Add this feature to your Core app's config");
    }
    println!();
    output::success("Happy building! 🌌");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::ColorPalette;
    use crate::prompt::{
        testing::{Answer, ScriptedPrompter},
        DefaultsPrompter,
    };
    use tempfile::TempDir;

    fn args(name: &str) -> CreateArgs {
        CreateArgs {
            project_name: name.to_string(),
            app_type: None,
            core_url: None,
            no_install: true,
            no_git: true,
            package_manager: Some(PackageManager::Npm),
            template: Some(external::BUILTIN_TEMPLATE.to_string()),
        }
    }

    #[test]
    fn interactive_feature_app() {
        let dir = TempDir::new().unwrap();
        let mut p = ScriptedPrompter::new(vec![
            Answer::Choice(1),
            Answer::Text("Team Chat"),
            Answer::Text("Talk to your team"),
            Answer::Text("https://hub.example.com"),
            Answer::Choice(3),
        ]);
        run(args("team-chat"), dir.path(), &mut p).unwrap();

        let root = dir.path().join("team-chat");
        let config = GalaxyConfig::load(&root).unwrap();
        assert_eq!(config.app_type, AppType::Feature);
        assert_eq!(config.name, "Team Chat");
        assert_eq!(config.core_app_url.as_deref(), Some("https://hub.example.com"));
        assert_eq!(config.color_palette.background.as_str(), "#0F172A");
        assert_eq!(config.features.len(), 1);
        assert_eq!(config.features[0].path, "/");

        let env = fs::read_to_string(root.join(".env.local")).unwrap();
        assert!(env.contains("NEXT_PUBLIC_CORE_APP_URL=https://hub.example.com"));
        let readme = fs::read_to_string(root.join("README.md")).unwrap();
        assert!(readme.contains("**midnight**"));
        let pkg = fs::read_to_string(root.join("package.json")).unwrap();
        assert!(pkg.contains("\"name\": \"team-chat\""));
    }

    #[test]
    fn defaults_make_a_core_app() {
        let dir = TempDir::new().unwrap();
        run(args("hub"), dir.path(), &mut DefaultsPrompter).unwrap();
        let config = GalaxyConfig::load(&dir.path().join("hub")).unwrap();
        assert_eq!(config.app_type, AppType::Core);
        assert_eq!(config.name, "Hub");
        assert_eq!(config.tagline, CORE_TAGLINE);
        assert_eq!(config.color_palette.primary.as_str(), "#0EA5E9");
        assert!(dir.path().join("hub/src/types/galaxy.ts").is_file());
        assert!(dir.path().join("hub/.env.example").is_file());
    }

    #[test]
    fn core_url_flag_is_stored_trimmed() {
        let dir = TempDir::new().unwrap();
        let mut a = args("planet");
        a.app_type = Some(AppType::Feature);
        a.core_url = Some("  https://hub.example.com \n".to_string());
        run(a, dir.path(), &mut DefaultsPrompter).unwrap();

        let root = dir.path().join("planet");
        let config = GalaxyConfig::load(&root).unwrap();
        assert_eq!(config.core_app_url.as_deref(), Some("https://hub.example.com"));
        let env = fs::read_to_string(root.join(".env.local")).unwrap();
        assert!(env.contains("NEXT_PUBLIC_CORE_APP_URL=https://hub.example.com\n"), "{env}");
    }

    #[test]
    fn feature_app_without_core_url_fails_non_interactively() {
        let dir = TempDir::new().unwrap();
        let mut a = args("planet");
        a.app_type = Some(AppType::Feature);
        let err = run(a, dir.path(), &mut DefaultsPrompter).unwrap_err();
        assert!(err.to_string().contains("--core <url>"));
        assert!(!dir.path().join("planet").exists());
    }

    #[test]
    fn rejects_bad_names_and_existing_dirs() {
        let dir = TempDir::new().unwrap();
        let err = run(args("Bad Name"), dir.path(), &mut DefaultsPrompter).unwrap_err();
        assert!(matches!(err.downcast_ref::<GalaxyError>(), Some(GalaxyError::InvalidInput(_))));

        fs::create_dir(dir.path().join("taken")).unwrap();
        let err = run(args("taken"), dir.path(), &mut DefaultsPrompter).unwrap_err();
        assert_eq!(err.to_string(), "Directory taken already exists!");
    }

    #[test]
    fn template_defaults_to_hosted_starter() {
        let mut a = args("x");
        assert_eq!(Options::from_args(&a).template, TemplateSource::Builtin);
        a.template = None;
        if env_opt_string("GALAXY_TEMPLATE").is_none() {
            assert_eq!(Options::from_args(&a).template, TemplateSource::parse(external::DEFAULT_TEMPLATE));
        }
    }

    #[test]
    fn failed_template_fetch_removes_directory() {
        let dir = TempDir::new().unwrap();
        let mut a = args("broken");
        a.template = Some(dir.path().join("no-such-template-repo").display().to_string());
        let err = run(a, dir.path(), &mut DefaultsPrompter).unwrap_err();
        assert!(err.to_string().starts_with("Failed to create project"));
        assert!(!dir.path().join("broken").exists());
    }

    #[test]
    fn merges_into_template_config() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("merged");
        scaffold::write_skeleton(&root).unwrap();
        fs::create_dir_all(root.join("src/config")).unwrap();
        fs::write(
            GalaxyConfig::path(&root),
            "export const galaxyConfig = { id: 'x', type: 'core', coreAppUrl: 'https://old', analytics: { enabled: true } };\n",
        )
        .unwrap();
        let settings = ConfigSettings {
            id: "merged".into(),
            app_type: AppType::Core,
            name: "Merged".into(),
            tagline: CORE_TAGLINE.into(),
            core_app_url: None,
            color_palette: ColorPalette::default(),
        };
        let mut warnings = Vec::new();
        write_config(&root, &settings, &mut warnings).unwrap();
        assert!(warnings.is_empty());
        let text = fs::read_to_string(GalaxyConfig::path(&root)).unwrap();
        assert!(text.contains("id: 'merged'"));
        assert!(text.contains("analytics: {"));
        assert!(!text.contains("coreAppUrl"));
    }
}
