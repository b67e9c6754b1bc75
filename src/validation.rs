//! 输入校验：十六进制颜色、URL、项目名、功能 ID
//! 所有校验函数返回 `Result<(), String>`，可直接作为交互提示的校验回调。

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#?([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").unwrap();
    static ref SLUG: Regex = Regex::new(r"^[a-z0-9-]+$").unwrap();
}

/// 十六进制颜色（3 位或 6 位，`#` 可选）；不接受首尾空白
pub(crate) fn validate_hex_color(input: &str) -> Result<(), String> {
    if HEX_COLOR.is_match(input) {
        Ok(())
    } else {
        Err("Please enter a valid hex color".to_string())
    }
}

/// 绝对 URL
pub(crate) fn validate_url(input: &str) -> Result<(), String> {
    match url::Url::parse(input.trim()) {
        Ok(_) => Ok(()),
        Err(_) => Err("Please enter a valid URL".to_string()),
    }
}

/// 项目名：小写字母、数字与连字符，且不能以连字符开头或结尾
pub(crate) fn validate_project_name(name: &str) -> Result<(), String> {
    if !SLUG.is_match(name) {
        return Err(
            "Project name can only contain lowercase letters, numbers, and hyphens".to_string(),
        );
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err("Project name cannot start or end with a hyphen".to_string());
    }
    Ok(())
}

pub(crate) fn validate_feature_id(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Feature ID is required".to_string());
    }
    if !SLUG.is_match(input) {
        return Err(
            "Feature ID can only contain lowercase letters, numbers, and hyphens".to_string(),
        );
    }
    Ok(())
}

/// 自定义主题名（空串表示跳过保存）
pub(crate) fn validate_preset_name(input: &str) -> Result<(), String> {
    if input.is_empty() || SLUG.is_match(input) {
        Ok(())
    } else {
        Err("Preset name can only contain lowercase letters, numbers, and hyphens".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        for ok in ["#FFF", "fff", "#0ea5e9", "0EA5E9", "#AbC"] {
            assert!(validate_hex_color(ok).is_ok(), "{ok}");
        }
        for bad in ["", "#", "#12", "#1234", "12345g", "#0EA5E9F", "blue", " #FFF ", "fff\n", "\t#0ea5e9"] {
            let msg = validate_hex_color(bad).unwrap_err();
            assert!(msg.contains("valid hex color"), "{bad}");
        }
    }

    #[test]
    fn urls() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://localhost:3000/path?q=1").is_ok());
        for bad in ["", "example.com", "/relative/path", "not a url"] {
            assert!(validate_url(bad).unwrap_err().contains("valid URL"), "{bad}");
        }
    }

    #[test]
    fn project_names() {
        assert!(validate_project_name("my-app").is_ok());
        assert!(validate_project_name("app2").is_ok());
        assert!(validate_project_name("Bad Name").is_err());
        assert!(validate_project_name("my_app").is_err());
        assert!(validate_project_name("-bad-name")
            .unwrap_err()
            .contains("cannot start or end"));
        assert!(validate_project_name("bad-name-").is_err());
    }

    #[test]
    fn feature_ids_and_presets() {
        assert_eq!(validate_feature_id("").unwrap_err(), "Feature ID is required");
        assert!(validate_feature_id("billing").is_ok());
        assert!(validate_feature_id("Billing").is_err());
        assert!(validate_preset_name("").is_ok());
        assert!(validate_preset_name("my-theme").is_ok());
        assert!(validate_preset_name("My Theme").is_err());
    }
}
