//! 项目脚手架文件写出：
//! - 内置应用骨架（`templates/galaxy-app`）
//! - `src/types/galaxy.ts` 类型定义（已存在则跳过）
//! - README.md

use std::{
    fs,
    path::{Path, PathBuf},
};

use include_dir::{include_dir, Dir, DirEntry};
use tera::{Context as TContext, Tera};
use tracing::debug;

use crate::{
    config::AppType,
    error::{GalaxyError, GalaxyResult},
    package_manager::PackageManager,
};

static APP_TEMPLATE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates/galaxy-app");
const TYPES_TEMPLATE: &str = include_str!("assets/galaxy.ts");
const README_TEMPLATE: &str = include_str!("assets/README.md.tera");

pub(crate) const TYPES_PATH: &str = "src/types/galaxy.ts";

/// 骨架中的 `_gitignore` 写出为 `.gitignore`
const GITIGNORE_ALIAS: &str = "_gitignore";

fn write_file(path: &Path, contents: &[u8]) -> GalaxyResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| GalaxyError::io(format!("Failed to create {}", parent.display()), e))?;
    }
    fs::write(path, contents).map_err(|e| GalaxyError::io(format!("Failed to write {}", path.display()), e))
}

/// 将内置应用骨架写出到目标目录
pub(crate) fn write_skeleton(target_dir: &Path) -> GalaxyResult<()> {
    fs::create_dir_all(target_dir)
        .map_err(|e| GalaxyError::io(format!("Failed to create {}", target_dir.display()), e))?;
    write_dir(&APP_TEMPLATE_DIR, target_dir)
}

fn write_dir(dir: &Dir<'_>, target_dir: &Path) -> GalaxyResult<()> {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => write_dir(sub, target_dir)?,
            DirEntry::File(f) => {
                let rel = f.path();
                let out_path = match rel.file_name() {
                    Some(name) if name == GITIGNORE_ALIAS => target_dir.join(rel.with_file_name(".gitignore")),
                    _ => target_dir.join(rel),
                };
                write_file(&out_path, f.contents())?;
                debug!(path = %out_path.display(), "skeleton file written");
            }
        }
    }
    Ok(())
}

/// 写出类型定义；已存在时保持不变并返回 false
pub(crate) fn write_types(project_root: &Path) -> GalaxyResult<bool> {
    let path = project_root.join(TYPES_PATH);
    if path.exists() {
        debug!(path = %path.display(), "types file exists, skipping");
        return Ok(false);
    }
    write_file(&path, TYPES_TEMPLATE.as_bytes())?;
    Ok(true)
}

/// README 模板所需信息
#[derive(Debug)]
pub(crate) struct ReadmeContext<'a> {
    pub(crate) project: &'a str,
    pub(crate) name: &'a str,
    pub(crate) tagline: &'a str,
    pub(crate) app_type: AppType,
    pub(crate) core_app_url: Option<&'a str>,
    pub(crate) theme: &'a str,
    pub(crate) package_manager: PackageManager,
}

pub(crate) fn render_readme(readme: &ReadmeContext<'_>) -> GalaxyResult<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("README.md", README_TEMPLATE).map_err(template_error)?;
    let mut ctx = TContext::new();
    ctx.insert("project", readme.project);
    ctx.insert("name", readme.name);
    ctx.insert("tagline", readme.tagline);
    ctx.insert(
        "app_label",
        match readme.app_type {
            AppType::Core => "Core",
            AppType::Feature => "Feature",
        },
    );
    ctx.insert("core_app_url", &readme.core_app_url);
    ctx.insert("theme", readme.theme);
    ctx.insert("install_command", &readme.package_manager.install_command());
    ctx.insert("dev_command", &readme.package_manager.dev_command());
    ctx.insert("created", &chrono::Local::now().format("%Y-%m-%d").to_string());
    tera.render("README.md", &ctx).map_err(template_error)
}

pub(crate) fn write_readme(project_root: &Path, readme: &ReadmeContext<'_>) -> GalaxyResult<PathBuf> {
    let path = project_root.join("README.md");
    write_file(&path, render_readme(readme)?.as_bytes())?;
    Ok(path)
}

fn template_error(e: tera::Error) -> GalaxyError {
    GalaxyError::PreconditionFailed(format!("Failed to render README.md: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn skeleton_is_written_with_gitignore() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("my-app");
        write_skeleton(&target).unwrap();
        assert!(target.join("package.json").is_file());
        assert!(target.join("src/app/page.tsx").is_file());
        assert!(target.join(".gitignore").is_file());
        assert!(!target.join(GITIGNORE_ALIAS).exists());
    }

    #[test]
    fn types_file_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        assert!(write_types(dir.path()).unwrap());
        let path = dir.path().join(TYPES_PATH);
        assert!(fs::read_to_string(&path).unwrap().contains("export interface GalaxyConfig"));

        fs::write(&path, "// custom").unwrap();
        assert!(!write_types(dir.path()).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "// custom");
    }

    #[test]
    fn readme_mentions_theme_and_commands() {
        let text = render_readme(&ReadmeContext {
            project: "billing",
            name: "Billing",
            tagline: "Invoices and payments",
            app_type: AppType::Feature,
            core_app_url: Some("https://hub.example.com"),
            theme: "ocean",
            package_manager: PackageManager::Pnpm,
        })
        .unwrap();
        assert!(text.starts_with("# Billing\n\nInvoices and payments\n"));
        assert!(text.contains("This is a Galaxy Feature app created with Galaxy CLI on "));
        assert!(text.contains("This app uses the **ocean** theme."));
        assert!(text.contains("pnpm install\n"));
        assert!(text.contains("pnpm run dev\n"));
        assert!(text.contains("https://hub.example.com"));
        assert!(text.contains("billing/\n├── src/"));
    }
}
