//! 主题预设：
//! - 内置预设（ocean/forest/sunset/midnight）
//! - 项目内自定义预设 `.galaxy/themes.json` 的读写

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    colors::{ColorPalette, HexColor},
    error::{GalaxyError, GalaxyResult},
};

/// 自定义预设文件（相对项目根）
pub(crate) const CUSTOM_PRESETS_FILE: &str = ".galaxy/themes.json";

/// 内置预设
pub(crate) struct Preset {
    pub(crate) name: &'static str,
    pub(crate) label: &'static str,
    colors: [&'static str; 9],
}

impl Preset {
    pub(crate) fn palette(&self) -> ColorPalette {
        let [primary, secondary, accent, background, foreground, muted, success, warning, error] =
            self.colors.map(HexColor::literal);
        ColorPalette { primary, secondary, accent, background, foreground, muted, success, warning, error }
    }
}

pub(crate) static PRESETS: [Preset; 4] = [
    Preset {
        name: "ocean",
        label: "🌊 Ocean (Blue/Teal)",
        colors: [
            "#0EA5E9", "#6366F1", "#06B6D4", "#F0F9FF", "#0C4A6E", "#64748B", "#10B981", "#F59E0B",
            "#EF4444",
        ],
    },
    Preset {
        name: "forest",
        label: "🌲 Forest (Green/Brown)",
        colors: [
            "#10B981", "#84CC16", "#F59E0B", "#F0FDF4", "#14532D", "#6B7280", "#10B981", "#F59E0B",
            "#EF4444",
        ],
    },
    Preset {
        name: "sunset",
        label: "🌅 Sunset (Orange/Purple)",
        colors: [
            "#F97316", "#EC4899", "#8B5CF6", "#FFF7ED", "#7C2D12", "#9CA3AF", "#10B981", "#F59E0B",
            "#EF4444",
        ],
    },
    Preset {
        name: "midnight",
        label: "🌙 Midnight (Dark/Purple)",
        colors: [
            "#8B5CF6", "#6366F1", "#EC4899", "#0F172A", "#F1F5F9", "#64748B", "#10B981", "#F59E0B",
            "#EF4444",
        ],
    },
];

/// 按名称查找内置预设（不区分大小写）
pub(crate) fn builtin(name: &str) -> Option<ColorPalette> {
    let wanted = name.trim().to_ascii_lowercase();
    PRESETS.iter().find(|p| p.name == wanted).map(Preset::palette)
}

pub(crate) fn preset_names() -> Vec<&'static str> {
    PRESETS.iter().map(|p| p.name).collect()
}

/// 首字母大写的展示名
pub(crate) fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 项目内保存的自定义预设
#[derive(Debug)]
pub(crate) struct CustomPresets {
    path: PathBuf,
    pub(crate) themes: BTreeMap<String, ColorPalette>,
}

impl CustomPresets {
    /// 读取 `.galaxy/themes.json`；文件不存在时返回空集合
    pub(crate) fn load(project_root: &Path) -> GalaxyResult<Self> {
        let path = project_root.join(CUSTOM_PRESETS_FILE);
        if !path.exists() {
            return Ok(Self { path, themes: BTreeMap::new() });
        }
        let text = fs::read_to_string(&path)
            .map_err(|e| GalaxyError::io(format!("Failed to read {}", path.display()), e))?;
        let themes = serde_json::from_str(&text).map_err(|e| {
            GalaxyError::PreconditionFailed(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded custom presets");
        Ok(Self { path, themes })
    }

    pub(crate) fn get(&self, name: &str) -> Option<&ColorPalette> {
        self.themes.get(name)
    }

    /// 保存（同名覆盖）并写回文件
    pub(crate) fn save(&mut self, name: &str, palette: ColorPalette) -> GalaxyResult<()> {
        self.themes.insert(name.to_string(), palette);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GalaxyError::io(format!("Failed to create {}", parent.display()), e))?;
        }
        let text = serde_json::to_string_pretty(&self.themes).map_err(|e| {
            GalaxyError::PreconditionFailed(format!("Failed to serialize themes: {}", e))
        })?;
        fs::write(&self.path, text + "\n")
            .map_err(|e| GalaxyError::io(format!("Failed to write {}", self.path.display()), e))
    }
}

/// 先查内置，再查项目自定义预设
pub(crate) fn resolve(name: &str, custom: &CustomPresets) -> Option<ColorPalette> {
    builtin(name).or_else(|| custom.get(name).cloned())
}
