//! 核心应用的功能列表管理：add-feature / list-features / remove-feature

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    cli::{AddFeatureArgs, RemoveFeatureArgs},
    config::{AppType, Category, GalaxyConfig, RelatedFeature, DEFAULT_ICON},
    env_file::{self, EnvAppend, ENV_LOCAL},
    error::{GalaxyError, GalaxyResult},
    output,
    prompt::{InputQuestion, Prompter},
    utils::{feature_env_var, title_case},
    validation::{validate_feature_id, validate_url},
};

/// 参数优先，否则提问（空答案视为 None）
fn optional_answer(
    prompter: &mut dyn Prompter,
    given: Option<String>,
    question: InputQuestion,
) -> GalaxyResult<Option<String>> {
    match given {
        Some(v) => Ok(Some(v)),
        None => Ok(Some(prompter.input(&question)?).filter(|s| !s.is_empty())),
    }
}

fn collect_entry(args: AddFeatureArgs, config: &GalaxyConfig, prompter: &mut dyn Prompter) -> GalaxyResult<RelatedFeature> {
    let id = match args.feature_id {
        Some(id) => {
            validate_feature_id(&id).map_err(GalaxyError::InvalidInput)?;
            id
        }
        None => prompter.input(
            &InputQuestion::new("Feature ID (lowercase, hyphenated):")
                .validate(validate_feature_id)
                .flag("<FEATURE_ID>"),
        )?,
    };
    // 先于其余问题检查重复
    if config.related.iter().any(|r| r.id == id) {
        return Err(GalaxyError::DuplicateFeature(id));
    }

    let name = match args.name {
        Some(n) => n,
        None => prompter.input(&InputQuestion::new("Feature display name:").default(title_case(&id)))?,
    };
    let url = match args.url {
        Some(u) => {
            validate_url(&u).map_err(|msg| GalaxyError::InvalidInput(format!("Invalid feature URL '{}': {}", u, msg)))?;
            u
        }
        None => prompter.input(&InputQuestion::new("Feature URL:").validate(validate_url).flag("--url <url>"))?,
    };
    let api_endpoint =
        optional_answer(prompter, args.api, InputQuestion::new("API endpoint (optional):").allow_empty())?;
    let description =
        optional_answer(prompter, args.description, InputQuestion::new("Feature description:").allow_empty())?
            .unwrap_or_default();
    let icon = match args.icon {
        Some(i) => i,
        None => prompter.input(&InputQuestion::new("Feature icon (emoji or name):").default(DEFAULT_ICON))?,
    };
    let category = match args.category {
        Some(c) => c,
        None => {
            let labels: Vec<String> = Category::ALL.iter().map(|c| c.label().to_string()).collect();
            let idx = prompter.select("Feature category:", &labels, 0)?;
            Category::ALL.get(idx).copied().unwrap_or(Category::Other)
        }
    };
    let requires_auth = args.requires_auth || prompter.confirm("Does this feature require authentication?", false)?;

    Ok(RelatedFeature {
        id,
        name,
        url,
        api_endpoint,
        description,
        icon,
        category,
        requires_auth,
        extra: Vec::new(),
    })
}

pub(crate) fn add(args: AddFeatureArgs, cwd: &Path, prompter: &mut dyn Prompter) -> Result<()> {
    let mut config = GalaxyConfig::load(cwd)?;
    if config.app_type != AppType::Core {
        return Err(GalaxyError::WrongAppType {
            expected: AppType::Core.to_string(),
            found: config.app_type.to_string(),
        }
        .into());
    }

    let entry = collect_entry(args, &config, prompter)?;
    let spinner = output::spinner("Adding feature to Core app...");
    let saved = config.add_related(entry.clone()).and_then(|_| config.save(cwd));
    spinner.finish_and_clear();
    saved.context("Failed to add feature")?;

    output::success(&format!("Added {} to your Galaxy!", entry.name));
    output::header("📦 Feature Added:");
    output::rule(40);
    output::kv("ID", &entry.id);
    output::kv("Name", &entry.name);
    output::kv("URL", &entry.url);
    if let Some(api) = &entry.api_endpoint {
        output::kv("API", api);
    }
    output::kv("Category", entry.category.as_str());
    output::kv("Auth Required", if entry.requires_auth { "Yes" } else { "No" });

    output::header("🔧 Integration Steps:");
    output::hint("1. Ensure the feature app is running at the specified URL");
    output::hint("2. Configure CORS if needed for cross-origin requests");
    output::hint("3. Set up authentication if required");
    output::hint("4. Test the integration in your Core app");
    println!();

    if prompter.confirm("Add feature URL to environment variables?", true)? {
        let var = feature_env_var(&entry.id);
        match env_file::append_var(&cwd.join(ENV_LOCAL), &var, &entry.url)? {
            EnvAppend::Created => output::success("Created .env.local with feature URL"),
            EnvAppend::Appended => output::success(&format!("Added {} to .env.local", var)),
            EnvAppend::AlreadyPresent => output::info(&format!("{} is already set in .env.local", var)),
        }
    }
    Ok(())
}

pub(crate) fn list(cwd: &Path) -> Result<()> {
    let config = GalaxyConfig::load(cwd)?;
    let ids = config.feature_ids();
    if ids.is_empty() {
        output::warn("No features found in this Core app");
        output::hint("Use \"galaxy add-feature\" to add features");
        return Ok(());
    }

    output::header("🌌 Features in your Core app:");
    output::rule(40);
    for (i, id) in ids.iter().enumerate() {
        println!("{}", format!("{}. {}", i + 1, id).cyan());
    }
    println!();
    output::hint(&format!("Total: {} feature(s)", ids.len()));
    Ok(())
}

pub(crate) fn remove(args: RemoveFeatureArgs, cwd: &Path, prompter: &mut dyn Prompter) -> Result<()> {
    let mut config = GalaxyConfig::load(cwd)?;
    let id = args.feature_id.as_str();

    if !args.force
        && !prompter.confirm(&format!("Are you sure you want to remove feature \"{}\"?", id), false)?
    {
        output::warn("Removal cancelled");
        return Ok(());
    }

    // 没有匹配项时不重写文件
    if !config.remove_feature(id) {
        output::warn(&format!("Feature \"{}\" not found; nothing changed", id));
        return Ok(());
    }
    config.save(cwd).context("Failed to remove feature")?;
    output::success(&format!("Removed feature \"{}\"", id));
    Ok(())
}
