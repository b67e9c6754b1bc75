//! `.env.local` / `.env.example` 生成与追加

use std::{fs, io::Write, path::Path};

use tracing::debug;

use crate::{
    config::AppType,
    error::{GalaxyError, GalaxyResult},
};

pub(crate) const ENV_LOCAL: &str = ".env.local";
pub(crate) const ENV_EXAMPLE: &str = ".env.example";

/// 生成环境文件所需的信息
#[derive(Debug, Clone)]
pub(crate) struct EnvSettings<'a> {
    pub(crate) app_name: &'a str,
    pub(crate) app_type: AppType,
    pub(crate) core_app_url: Option<&'a str>,
    /// 是否附带认证/数据库/API Key 的注释占位（create 使用）
    pub(crate) with_placeholders: bool,
}

pub(crate) fn render_env(settings: &EnvSettings<'_>) -> String {
    let mut out = String::from("# Galaxy Configuration\n");
    out.push_str(&format!("NEXT_PUBLIC_APP_NAME={}\n", settings.app_name));
    out.push_str(&format!("NEXT_PUBLIC_APP_TYPE={}\n", settings.app_type));
    if settings.app_type == AppType::Feature {
        if let Some(url) = settings.core_app_url {
            out.push_str(&format!("NEXT_PUBLIC_CORE_APP_URL={}\n", url));
        }
    }
    out.push('\n');
    if settings.with_placeholders {
        out.push_str(
            "# Authentication (if needed)\n\
             # NEXTAUTH_URL=http://localhost:3000\n\
             # NEXTAUTH_SECRET=your-secret-here\n\
             \n\
             # Database (if needed)\n\
             # DATABASE_URL=your-database-url\n\
             \n\
             # API Keys (if needed)\n\
             # API_KEY=your-api-key\n",
        );
    } else {
        out.push_str("# Add your environment variables below\n");
    }
    out
}

/// 每行第一个 `=` 之后的内容清空
pub(crate) fn example_from(env: &str) -> String {
    env.split_inclusive('\n')
        .map(|line| match line.find('=') {
            Some(idx) => {
                let newline = if line.ends_with('\n') { "\n" } else { "" };
                format!("{}{}", &line[..=idx], newline)
            }
            None => line.to_string(),
        })
        .collect()
}

/// 追加变量的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnvAppend {
    Created,
    Appended,
    AlreadyPresent,
}

/// 若文件中尚未出现 `key` 则追加 `key=value`；文件不存在时新建
pub(crate) fn append_var(path: &Path, key: &str, value: &str) -> GalaxyResult<EnvAppend> {
    let line = format!("{}={}", key, value);
    if !path.exists() {
        fs::write(path, format!("{}\n", line))
            .map_err(|e| GalaxyError::io(format!("Failed to write {}", path.display()), e))?;
        return Ok(EnvAppend::Created);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| GalaxyError::io(format!("Failed to read {}", path.display()), e))?;
    if content.contains(key) {
        debug!(key, path = %path.display(), "env var already present");
        return Ok(EnvAppend::AlreadyPresent);
    }
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| GalaxyError::io(format!("Failed to open {}", path.display()), e))?;
    write!(file, "\n{}\n", line)
        .map_err(|e| GalaxyError::io(format!("Failed to append to {}", path.display()), e))?;
    Ok(EnvAppend::Appended)
}

/// 写出 `.env.local` 与 `.env.example`；`overwrite` 为 false 时已存在的文件保持不变
pub(crate) fn write_env_files(dir: &Path, settings: &EnvSettings<'_>, overwrite: bool) -> GalaxyResult<()> {
    let content = render_env(settings);
    for (name, text) in [(ENV_LOCAL, content.clone()), (ENV_EXAMPLE, example_from(&content))] {
        let path = dir.join(name);
        if path.exists() && !overwrite {
            debug!(path = %path.display(), "keeping existing env file");
            continue;
        }
        fs::write(&path, text)
            .map_err(|e| GalaxyError::io(format!("Failed to write {}", path.display()), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn feature_settings() -> EnvSettings<'static> {
        EnvSettings {
            app_name: "Billing",
            app_type: AppType::Feature,
            core_app_url: Some("https://example.com"),
            with_placeholders: true,
        }
    }

    #[test]
    fn feature_env_has_core_url() {
        let env = render_env(&feature_settings());
        assert!(env.starts_with("# Galaxy Configuration\nNEXT_PUBLIC_APP_NAME=Billing\n"));
        assert!(env.contains("NEXT_PUBLIC_APP_TYPE=feature\n"));
        assert!(env.contains("NEXT_PUBLIC_CORE_APP_URL=https://example.com\n"));
        assert!(env.contains("# NEXTAUTH_SECRET=your-secret-here"));
    }

    #[test]
    fn core_env_has_no_core_url() {
        let env = render_env(&EnvSettings {
            app_name: "Hub",
            app_type: AppType::Core,
            core_app_url: Some("https://ignored.example"),
            with_placeholders: false,
        });
        assert!(!env.contains("CORE_APP_URL"));
        assert!(env.ends_with("# Add your environment variables below\n"));
    }

    #[test]
    fn example_blanks_values() {
        let example = example_from("# Galaxy Configuration\nA=1\nB=x=y\n# NEXTAUTH_URL=http://localhost:3000\n\n");
        assert_eq!(example, "# Galaxy Configuration\nA=\nB=\n# NEXTAUTH_URL=\n\n");
    }

    #[test]
    fn append_var_outcomes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(ENV_LOCAL);

        assert_eq!(append_var(&path, "NEXT_PUBLIC_FEATURE_A_URL", "https://a.dev").unwrap(), EnvAppend::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "NEXT_PUBLIC_FEATURE_A_URL=https://a.dev\n");

        assert_eq!(append_var(&path, "NEXT_PUBLIC_FEATURE_B_URL", "https://b.dev").unwrap(), EnvAppend::Appended);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "NEXT_PUBLIC_FEATURE_A_URL=https://a.dev\n\nNEXT_PUBLIC_FEATURE_B_URL=https://b.dev\n"
        );

        let before = fs::read_to_string(&path).unwrap();
        assert_eq!(append_var(&path, "NEXT_PUBLIC_FEATURE_A_URL", "https://other").unwrap(), EnvAppend::AlreadyPresent);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn existing_env_files_are_kept_unless_overwriting() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(ENV_LOCAL), "KEEP=1\n").unwrap();
        write_env_files(dir.path(), &feature_settings(), false).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join(ENV_LOCAL)).unwrap(), "KEEP=1\n");
        let example = fs::read_to_string(dir.path().join(ENV_EXAMPLE)).unwrap();
        assert!(example.contains("NEXT_PUBLIC_CORE_APP_URL=\n"));

        write_env_files(dir.path(), &feature_settings(), true).unwrap();
        assert!(fs::read_to_string(dir.path().join(ENV_LOCAL)).unwrap().contains("NEXT_PUBLIC_APP_NAME=Billing"));
    }
}
