//! 外部步骤（模板获取、git 初始化、依赖安装）：
//! - 每个步骤有固定的失败策略：模板获取失败立即终止，其余降级为警告
//! - 子进程统一通过 `run_tool` 执行，输出被捕获

use std::{
    fmt, fs,
    path::Path,
    process::Command,
};

use tracing::{debug, info, warn};

use crate::{
    error::{GalaxyError, GalaxyResult},
    package_manager::PackageManager,
    scaffold,
};

pub(crate) const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from Galaxy CLI";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExternalStep {
    TemplateFetch,
    GitInit,
    PackageInstall,
}

impl fmt::Display for ExternalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExternalStep::TemplateFetch => "Template fetch",
            ExternalStep::GitInit => "Git initialization",
            ExternalStep::PackageInstall => "Dependency installation",
        };
        f.write_str(s)
    }
}

/// 步骤失败时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailurePolicy {
    FailFast,
    WarnAndContinue,
}

pub(crate) fn policy(step: ExternalStep) -> FailurePolicy {
    match step {
        ExternalStep::TemplateFetch => FailurePolicy::FailFast,
        ExternalStep::GitInit | ExternalStep::PackageInstall => FailurePolicy::WarnAndContinue,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    Done,
    /// 失败但按策略继续，附带警告内容
    Skipped(String),
}

/// 执行一个外部步骤并套用其失败策略
pub(crate) fn run_step<F>(step: ExternalStep, f: F) -> GalaxyResult<StepOutcome>
where
    F: FnOnce() -> GalaxyResult<()>,
{
    info!(step = %step, "starting");
    match f() {
        Ok(()) => {
            debug!(step = %step, "finished");
            Ok(StepOutcome::Done)
        }
        Err(e) => match policy(step) {
            FailurePolicy::FailFast => Err(e),
            FailurePolicy::WarnAndContinue => {
                warn!(step = %step, error = %e, "step failed, continuing");
                Ok(StepOutcome::Skipped(e.to_string()))
            }
        },
    }
}

/// 未指定 `--template` / `GALAXY_TEMPLATE` 时克隆的起始模板
pub(crate) const DEFAULT_TEMPLATE: &str = "github:khizrmalikk/template-core";

/// 选择内置骨架（离线）的模板名
pub(crate) const BUILTIN_TEMPLATE: &str = "builtin";

/// 模板来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TemplateSource {
    /// 内置应用骨架
    Builtin,
    /// git 仓库（可选分支/标签）
    Repo { url: String, reference: Option<String> },
}

impl TemplateSource {
    /// 解析 `--template`：支持 `github:owner/repo`、`owner/repo` 简写与 `#ref` 后缀；`builtin` 为内置骨架
    pub(crate) fn parse(input: &str) -> Self {
        let input = input.trim();
        if input == BUILTIN_TEMPLATE {
            return TemplateSource::Builtin;
        }
        let (location, reference) = match input.rsplit_once('#') {
            Some((loc, r)) if !r.is_empty() => (loc, Some(r.to_string())),
            _ => (input, None),
        };
        TemplateSource::Repo { url: expand_template_url(location), reference }
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Builtin => f.write_str("built-in Galaxy template"),
            TemplateSource::Repo { url, reference: Some(r) } => write!(f, "{}#{}", url, r),
            TemplateSource::Repo { url, reference: None } => f.write_str(url),
        }
    }
}

/// `github:owner/repo` / `owner/repo` → `https://github.com/owner/repo.git`
pub(crate) fn expand_template_url(input: &str) -> String {
    let shorthand = input.strip_prefix("github:").unwrap_or(input);
    let is_shorthand = !shorthand.contains(':')
        && !shorthand.starts_with('.')
        && !shorthand.starts_with('/')
        && shorthand.split('/').filter(|s| !s.is_empty()).count() == 2
        && shorthand.matches('/').count() == 1;
    if is_shorthand {
        let repo = shorthand.trim_end_matches(".git");
        format!("https://github.com/{}.git", repo)
    } else {
        input.to_string()
    }
}

/// 运行外部程序；非零退出码转为 `ExternalTool` 错误
fn run_tool(step: ExternalStep, program: &str, args: &[&str], cwd: Option<&Path>) -> GalaxyResult<String> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    debug!(step = %step, program, ?args, "running");
    let output = cmd.output().map_err(|e| GalaxyError::ExternalTool {
        step,
        message: format!("could not run {}: {}", program, e),
    })?;
    if !output.status.success() {
        return Err(GalaxyError::ExternalTool {
            step,
            message: format!(
                "`{} {}` exited with {}: {}",
                program,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// 把模板放到 `dest`（目录应尚不存在）
pub(crate) fn fetch_template(source: &TemplateSource, dest: &Path) -> GalaxyResult<()> {
    match source {
        TemplateSource::Builtin => scaffold::write_skeleton(dest),
        TemplateSource::Repo { url, reference } => {
            let args = clone_args(url, reference.as_deref(), dest);
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            run_tool(ExternalStep::TemplateFetch, "git", &args, None)?;
            let git_dir = dest.join(".git");
            if git_dir.exists() {
                fs::remove_dir_all(&git_dir)
                    .map_err(|e| GalaxyError::io(format!("Failed to remove {}", git_dir.display()), e))?;
            }
            Ok(())
        }
    }
}

/// 浅克隆参数；`--` 之后的仓库地址与目标目录不会被当作 git 选项
fn clone_args(url: &str, reference: Option<&str>, dest: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec!["clone".into(), "--depth".into(), "1".into()];
    if let Some(r) = reference {
        args.push(format!("--branch={}", r));
    }
    args.push("--".into());
    args.push(url.to_string());
    args.push(dest.to_string_lossy().into_owned());
    args
}

/// `git init` + `git add .` + 初始提交
pub(crate) fn init_git(dir: &Path) -> GalaxyResult<()> {
    run_tool(ExternalStep::GitInit, "git", &["init"], Some(dir))?;
    run_tool(ExternalStep::GitInit, "git", &["add", "."], Some(dir))?;
    run_tool(ExternalStep::GitInit, "git", &["commit", "-m", INITIAL_COMMIT_MESSAGE], Some(dir))?;
    Ok(())
}

pub(crate) fn install_deps(pm: PackageManager, dir: &Path) -> GalaxyResult<()> {
    run_tool(ExternalStep::PackageInstall, pm.as_str(), &["install"], Some(dir)).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table() {
        assert_eq!(policy(ExternalStep::TemplateFetch), FailurePolicy::FailFast);
        assert_eq!(policy(ExternalStep::GitInit), FailurePolicy::WarnAndContinue);
        assert_eq!(policy(ExternalStep::PackageInstall), FailurePolicy::WarnAndContinue);
    }

    #[test]
    fn clone_arguments_end_options_before_the_url() {
        let args = clone_args("--upload-pack=touch pwned", Some("v2"), Path::new("/tmp/app"));
        assert_eq!(
            args,
            ["clone", "--depth", "1", "--branch=v2", "--", "--upload-pack=touch pwned", "/tmp/app"]
        );
        let args = clone_args("https://github.com/acme/tpl.git", None, Path::new("app"));
        assert_eq!(args, ["clone", "--depth", "1", "--", "https://github.com/acme/tpl.git", "app"]);
    }

    fn failing(step: ExternalStep) -> GalaxyResult<()> {
        Err(GalaxyError::ExternalTool { step, message: "boom".to_string() })
    }

    #[test]
    fn run_step_applies_policy() {
        assert_eq!(run_step(ExternalStep::GitInit, || Ok(())).unwrap(), StepOutcome::Done);

        let outcome = run_step(ExternalStep::PackageInstall, || failing(ExternalStep::PackageInstall)).unwrap();
        assert_eq!(outcome, StepOutcome::Skipped("Dependency installation failed: boom".to_string()));

        let err = run_step(ExternalStep::TemplateFetch, || failing(ExternalStep::TemplateFetch)).unwrap_err();
        assert!(matches!(err, GalaxyError::ExternalTool { step: ExternalStep::TemplateFetch, .. }));
    }

    #[test]
    fn template_shorthands_expand() {
        assert_eq!(expand_template_url("github:acme/starter"), "https://github.com/acme/starter.git");
        assert_eq!(expand_template_url("acme/starter"), "https://github.com/acme/starter.git");
        assert_eq!(expand_template_url("https://gitlab.com/acme/starter.git"), "https://gitlab.com/acme/starter.git");
        assert_eq!(expand_template_url("./local/template"), "./local/template");
        assert_eq!(expand_template_url("git@github.com:acme/starter.git"), "git@github.com:acme/starter.git");
    }

    #[test]
    fn template_source_reference() {
        assert_eq!(
            TemplateSource::parse("acme/starter#v2"),
            TemplateSource::Repo {
                url: "https://github.com/acme/starter.git".to_string(),
                reference: Some("v2".to_string())
            }
        );
        assert_eq!(TemplateSource::parse("acme/starter").to_string(), "https://github.com/acme/starter.git");
        assert_eq!(TemplateSource::parse(" builtin "), TemplateSource::Builtin);
        assert_eq!(
            TemplateSource::parse(DEFAULT_TEMPLATE).to_string(),
            "https://github.com/khizrmalikk/template-core.git"
        );
    }

    #[test]
    fn missing_program_is_external_failure() {
        let err = run_tool(ExternalStep::PackageInstall, "galaxy-no-such-binary", &["install"], None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ExternalToolFailure);
    }
}
