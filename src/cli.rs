//! CLI 定义模块：仅负责命令行参数结构体与解析
//! 将 clap 的声明与业务逻辑解耦，便于在其它模块中复用参数。

use std::ffi::OsString;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};

use crate::{
    config::{AppType, Category},
    package_manager::PackageManager,
};

/// 顶层 CLI 入口
#[derive(Parser, Debug)]
#[command(name = "galaxy", about = "CLI for creating Galaxy System apps", version)]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub(crate) verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub(crate) quiet: bool,
    /// Never prompt; use flags and defaults (also GALAXY_YES=1)
    #[arg(short = 'y', long, global = true)]
    pub(crate) yes: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// 子命令定义
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create a new Galaxy app
    Create(CreateArgs),
    /// Initialize the current project as a Galaxy app
    Init(InitArgs),
    /// Generate, preview and apply color themes
    Theme(ThemeArgs),
    /// Add a feature to your Core app
    AddFeature(AddFeatureArgs),
    /// List all features in your Core app
    ListFeatures,
    /// Remove a feature from your Core app
    RemoveFeature(RemoveFeatureArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CreateArgs {
    /// Name of your project (lowercase letters, numbers and hyphens)
    #[arg(value_name = "PROJECT_NAME")]
    pub(crate) project_name: String,
    /// Project type
    #[arg(short = 't', long = "type", value_enum)]
    pub(crate) app_type: Option<AppType>,
    /// Core app URL (for feature apps)
    #[arg(long = "core", value_name = "URL")]
    pub(crate) core_url: Option<String>,
    /// Skip dependency installation (also GALAXY_NO_INSTALL=1)
    #[arg(long)]
    pub(crate) no_install: bool,
    /// Skip git initialization (also GALAXY_NO_GIT=1)
    #[arg(long)]
    pub(crate) no_git: bool,
    /// Package manager to use (also GALAXY_PACKAGE_MANAGER)
    #[arg(short = 'p', long, value_enum)]
    pub(crate) package_manager: Option<PackageManager>,
    /// Template repository: URL, github:owner/repo or owner/repo, optional #ref; "builtin" for the
    /// embedded skeleton (also GALAXY_TEMPLATE, default github:khizrmalikk/template-core)
    #[arg(long, value_name = "URL")]
    pub(crate) template: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct InitArgs {
    /// App type
    #[arg(short = 't', long = "type", value_enum)]
    pub(crate) app_type: Option<AppType>,
    /// Core app URL (for feature apps)
    #[arg(long = "core", value_name = "URL")]
    pub(crate) core_url: Option<String>,
    /// Overwrite an existing galaxy config without asking
    #[arg(long)]
    pub(crate) force: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ThemeArgs {
    /// Preview the current project theme
    #[arg(short, long)]
    pub(crate) preview: bool,
    /// Generate a new theme (default)
    #[arg(short, long)]
    pub(crate) generate: bool,
    /// List available preset themes
    #[arg(short, long)]
    pub(crate) list: bool,
    /// Apply a preset theme (built-in or saved)
    #[arg(short, long, value_name = "PRESET")]
    pub(crate) apply: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct AddFeatureArgs {
    /// Feature identifier
    #[arg(value_name = "FEATURE_ID")]
    pub(crate) feature_id: Option<String>,
    /// Feature URL
    #[arg(long)]
    pub(crate) url: Option<String>,
    /// API endpoint
    #[arg(long = "api", value_name = "ENDPOINT")]
    pub(crate) api: Option<String>,
    /// Feature display name
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Feature description
    #[arg(long)]
    pub(crate) description: Option<String>,
    /// Feature icon (emoji or icon name)
    #[arg(long)]
    pub(crate) icon: Option<String>,
    /// Feature category
    #[arg(long, value_enum)]
    pub(crate) category: Option<Category>,
    /// Mark the feature as requiring authentication
    #[arg(long)]
    pub(crate) requires_auth: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RemoveFeatureArgs {
    /// Feature ID to remove
    #[arg(value_name = "FEATURE_ID")]
    pub(crate) feature_id: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub(crate) force: bool,
}

/// 全局开关（可出现在子命令之前）：`--verbose` `--quiet` `--yes` 及 `-v` `-q` `-y` 的组合
fn is_global_flag(arg: &str) -> bool {
    match arg {
        "--verbose" | "--quiet" | "--yes" => true,
        _ => arg
            .strip_prefix('-')
            .is_some_and(|s| !s.is_empty() && s.chars().all(|c| matches!(c, 'v' | 'q' | 'y'))),
    }
}

/// `galaxy my-app` 视为 `galaxy create my-app`：
/// 跳过开头的全局开关后，第一个参数不是子命令、`help` 或选项时插入 `create`
pub(crate) fn preprocess_args(mut args: Vec<OsString>) -> Vec<OsString> {
    let idx = 1 + args
        .iter()
        .skip(1)
        .take_while(|a| a.to_str().is_some_and(is_global_flag))
        .count();
    let Some(first) = args.get(idx).and_then(|a| a.to_str()) else {
        return args;
    };
    if first.starts_with('-') || first == "help" {
        return args;
    }
    let cmd = Cli::command();
    let known = cmd
        .get_subcommands()
        .any(|sc| sc.get_name() == first || sc.get_all_aliases().any(|a| a == first));
    if !known {
        args.insert(idx, OsString::from("create"));
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn bare_project_name_becomes_create() {
        assert_eq!(preprocess_args(os(&["galaxy", "my-app"])), os(&["galaxy", "create", "my-app"]));
        assert_eq!(
            preprocess_args(os(&["galaxy", "my-app", "--type", "core"])),
            os(&["galaxy", "create", "my-app", "--type", "core"])
        );
    }

    #[test]
    fn leading_global_flags_are_skipped() {
        assert_eq!(preprocess_args(os(&["galaxy", "-y", "my-app"])), os(&["galaxy", "-y", "create", "my-app"]));
        assert_eq!(
            preprocess_args(os(&["galaxy", "--yes", "-vy", "my-app", "--no-git"])),
            os(&["galaxy", "--yes", "-vy", "create", "my-app", "--no-git"])
        );
        assert_eq!(preprocess_args(os(&["galaxy", "-y"])), os(&["galaxy", "-y"]));
        assert_eq!(preprocess_args(os(&["galaxy", "-y", "--help"])), os(&["galaxy", "-y", "--help"]));
        assert!(!is_global_flag("-p"));
        assert!(!is_global_flag("-"));
    }

    #[test]
    fn known_commands_flags_and_help_are_untouched() {
        for args in [
            vec!["galaxy"],
            vec!["galaxy", "help"],
            vec!["galaxy", "--version"],
            vec!["galaxy", "-y", "create", "x"],
            vec!["galaxy", "-v", "help"],
            vec!["galaxy", "--quiet", "list-features"],
            vec!["galaxy", "theme", "--list"],
            vec!["galaxy", "add-feature", "billing"],
            vec!["galaxy", "list-features"],
            vec!["galaxy", "remove-feature", "billing"],
        ] {
            assert_eq!(preprocess_args(os(&args)), os(&args));
        }
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["galaxy", "-vv", "create", "hub", "-t", "core", "--no-git", "-p", "pnpm"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.project_name, "hub");
                assert_eq!(args.app_type, Some(AppType::Core));
                assert!(args.no_git);
                assert!(!args.no_install);
                assert_eq!(args.package_manager, Some(PackageManager::Pnpm));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["galaxy", "add-feature", "billing", "--category", "finance", "--requires-auth", "--yes"]);
        assert!(cli.yes);
        match cli.command {
            Command::AddFeature(args) => {
                assert_eq!(args.feature_id.as_deref(), Some("billing"));
                assert_eq!(args.category, Some(Category::Finance));
                assert!(args.requires_auth);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
