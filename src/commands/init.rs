//! `galaxy init`：将当前目录初始化为 Galaxy 应用

use std::path::Path;

use anyhow::{Context, Result};

use super::theme::choose_theme;
use crate::{
    cli::InitArgs,
    colors::preview_palette,
    config::{AppType, ConfigSettings, GalaxyConfig, CONFIG_PATH},
    env_file::{self, EnvSettings},
    error::GalaxyError,
    output, package_json,
    prompt::{InputQuestion, Prompter},
    scaffold,
    utils::{slugify, title_case},
    validation::validate_url,
};

const DEFAULT_TAGLINE: &str = "A Galaxy-powered application";

/// 默认名称：package.json 的 `name`（去掉 scope），否则目录名
fn default_name(cwd: &Path) -> String {
    package_json::read_name(cwd)
        .map(|n| n.rsplit('/').next().unwrap_or(&n).to_string())
        .or_else(|| cwd.file_name().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "galaxy-app".to_string())
}

pub(crate) fn run(args: InitArgs, cwd: &Path, prompter: &mut dyn Prompter) -> Result<()> {
    if let Some(url) = &args.core_url {
        validate_url(url).map_err(|msg| GalaxyError::InvalidInput(format!("Invalid core URL '{}': {}", url, msg)))?;
    }

    if GalaxyConfig::exists(cwd)
        && !args.force
        && !prompter.confirm("Galaxy config already exists. Overwrite?", false)?
    {
        output::warn("Initialization cancelled.");
        return Ok(());
    }

    let base_name = default_name(cwd);
    let app_type = match args.app_type {
        Some(t) => t,
        None => {
            let items = vec!["🌌 Core App (Galaxy Center)".to_string(), "🪐 Feature App (Planet)".to_string()];
            match prompter.select("What type of app is this?", &items, 0)? {
                0 => AppType::Core,
                _ => AppType::Feature,
            }
        }
    };
    let name = prompter.input(&InputQuestion::new("App display name:").default(title_case(&base_name)))?;
    let tagline = prompter.input(&InputQuestion::new("App tagline:").default(DEFAULT_TAGLINE))?;
    let core_app_url = match (app_type, &args.core_url) {
        (AppType::Feature, Some(url)) => Some(url.trim().to_string()),
        (AppType::Feature, None) => Some(
            prompter.input(&InputQuestion::new("Core app URL:").validate(validate_url).flag("--core <url>"))?,
        ),
        (AppType::Core, _) => None,
    };
    let (color_palette, _theme) = choose_theme(prompter)?;

    let settings = ConfigSettings {
        id: slugify(&base_name),
        app_type,
        name,
        tagline,
        core_app_url,
        color_palette,
    };

    let spinner = output::spinner("Initializing Galaxy configuration...");
    let result = write_files(cwd, &settings);
    spinner.finish_and_clear();
    let metadata_warning = result.context("Failed to initialize Galaxy configuration")?;

    if let Some(w) = metadata_warning {
        output::warn(&w);
    }
    output::success("Galaxy configuration created successfully!");
    preview_palette(&settings.color_palette);
    print_next_steps(&settings);
    Ok(())
}

/// 写出配置、类型与环境文件；package.json 更新失败只返回警告
fn write_files(cwd: &Path, settings: &ConfigSettings) -> Result<Option<String>> {
    GalaxyConfig::from_settings(settings).save(cwd)?;
    scaffold::write_types(cwd)?;
    env_file::write_env_files(
        cwd,
        &EnvSettings {
            app_name: &settings.name,
            app_type: settings.app_type,
            core_app_url: settings.core_app_url.as_deref(),
            with_placeholders: false,
        },
        false,
    )?;
    Ok(match package_json::set_galaxy_metadata(cwd, settings.app_type) {
        Ok(_) => None,
        Err(e) => Some(format!("Could not update package.json: {}", e)),
    })
}

fn print_next_steps(settings: &ConfigSettings) {
    output::header("🚀 Next steps:");
    output::step(&format!("1. Review {}", CONFIG_PATH));
    output::step("2. Import and use the configuration in your app");
    output::step("3. Set up the Galaxy theme provider");

    match settings.app_type {
        AppType::Core => {
            output::header("🌌 Core App Setup:");
            output::hint("- Add feature apps using: galaxy add-feature");
            output::hint("- Configure authentication if needed");
            output::hint("- Set up shared state management");
        }
        AppType::Feature => {
            output::header("🪐 Feature App Setup:");
            output::hint(&format!("- Core URL: {}", settings.core_app_url.as_deref().unwrap_or("")));
            output::hint("- Register this feature in your Core app");
            output::hint("- Implement Galaxy SDK for communication");
        }
    }
    println!();
    output::success("Your app is now Galaxy-powered! 🌌");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{
        testing::{Answer, ScriptedPrompter},
        DefaultsPrompter,
    };
    use std::fs;
    use tempfile::TempDir;

    fn args(app_type: Option<AppType>, core: Option<&str>, force: bool) -> InitArgs {
        InitArgs { app_type, core_url: core.map(str::to_string), force }
    }

    #[test]
    fn init_uses_package_json_name_and_adds_metadata() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "@acme/my-dashboard", "private": true}"#).unwrap();
        run(args(Some(AppType::Core), None, false), dir.path(), &mut DefaultsPrompter).unwrap();

        let config = GalaxyConfig::load(dir.path()).unwrap();
        assert_eq!(config.id, "my-dashboard");
        assert_eq!(config.name, "My Dashboard");
        assert_eq!(config.tagline, DEFAULT_TAGLINE);
        let pkg = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert!(pkg.contains("\"galaxy\": {\n    \"type\": \"core\",\n    \"version\": \"1.0.0\"\n  }"));
        assert!(dir.path().join(".env.local").is_file());
        assert!(dir.path().join(scaffold::TYPES_PATH).is_file());
    }

    #[test]
    fn existing_config_is_kept_when_declined() {
        let dir = TempDir::new().unwrap();
        run(args(Some(AppType::Core), None, false), dir.path(), &mut DefaultsPrompter).unwrap();
        let path = GalaxyConfig::path(dir.path());
        let before = fs::read_to_string(&path).unwrap();

        run(args(Some(AppType::Feature), Some("https://hub.example.com"), false), dir.path(), &mut DefaultsPrompter)
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        run(args(Some(AppType::Feature), Some(" https://hub.example.com\t"), true), dir.path(), &mut DefaultsPrompter)
            .unwrap();
        let config = GalaxyConfig::load(dir.path()).unwrap();
        assert_eq!(config.app_type, AppType::Feature);
        assert_eq!(config.core_app_url.as_deref(), Some("https://hub.example.com"));
    }

    #[test]
    fn env_files_are_not_overwritten() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env.local"), "SECRET=1\n").unwrap();
        let mut p = ScriptedPrompter::new(vec![
            Answer::Choice(1),
            Answer::Text("Planet"),
            Answer::Text("Orbiting"),
            Answer::Text("https://core.example.com"),
            Answer::Choice(1),
        ]);
        run(args(None, None, false), dir.path(), &mut p).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join(".env.local")).unwrap(), "SECRET=1\n");
        let example = fs::read_to_string(dir.path().join(".env.example")).unwrap();
        assert!(example.contains("NEXT_PUBLIC_CORE_APP_URL=\n"));
        let config = GalaxyConfig::load(dir.path()).unwrap();
        assert_eq!(config.color_palette.primary.as_str(), "#10B981");
        assert_eq!(config.features[0].name, "Planet");
    }

    #[test]
    fn malformed_package_json_is_only_a_warning() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{ nope").unwrap();
        run(args(Some(AppType::Core), None, false), dir.path(), &mut DefaultsPrompter).unwrap();
        assert!(GalaxyConfig::exists(dir.path()));
        assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), "{ nope");
    }
}
