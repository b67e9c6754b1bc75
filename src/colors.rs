//! 颜色与调色板：
//! - `HexColor`：规范化后的 `#RRGGBB`
//! - `ColorPalette`：9 个具名色槽
//! - 由基色推导互补调色板、手动组合调色板、随机基色
//! - 终端预览与 CSS 变量输出

use std::fmt;

use colored::Colorize;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::{GalaxyError, GalaxyResult},
    validation::validate_hex_color,
};

const LIGHT_BACKGROUND: &str = "#FFFFFF";
const LIGHT_FOREGROUND: &str = "#1F2937";
const DARK_BACKGROUND: &str = "#0F172A";
const DARK_FOREGROUND: &str = "#F1F5F9";
const MUTED: &str = "#9CA3AF";
const SUCCESS: &str = "#10B981";
const WARNING: &str = "#F59E0B";
const ERROR: &str = "#EF4444";

/// 规范化的十六进制颜色（大写，带 `#`，6 位）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct HexColor(String);

impl HexColor {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// (r, g, b) 三通道
    pub(crate) fn rgb(&self) -> (u8, u8, u8) {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }

    pub(crate) fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        HexColor(format!("#{:02X}{:02X}{:02X}", r, g, b))
    }

    /// 仅用于内置常量表，调用方保证格式正确
    pub(crate) fn literal(s: &str) -> Self {
        HexColor(s.to_string())
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = GalaxyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize_hex(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

/// 校验并规范化颜色：接受 3/6 位（`#` 可选），3 位展开为 6 位，统一大写
pub(crate) fn normalize_hex(input: &str) -> GalaxyResult<HexColor> {
    if validate_hex_color(input).is_err() {
        return Err(GalaxyError::InvalidColor(input.to_string()));
    }
    let digits = input.trim_start_matches('#').to_ascii_uppercase();
    let full = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect::<String>()
    } else {
        digits
    };
    Ok(HexColor(format!("#{}", full)))
}

/// 明暗模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Light,
    Dark,
}

impl Mode {
    pub(crate) const ALL: [Mode; 2] = [Mode::Light, Mode::Dark];

    fn background(self) -> HexColor {
        match self {
            Mode::Light => HexColor::literal(LIGHT_BACKGROUND),
            Mode::Dark => HexColor::literal(DARK_BACKGROUND),
        }
    }

    fn foreground(self) -> HexColor {
        match self {
            Mode::Light => HexColor::literal(LIGHT_FOREGROUND),
            Mode::Dark => HexColor::literal(DARK_FOREGROUND),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Light => "light",
            Mode::Dark => "dark",
        })
    }
}

/// 9 色调色板，字段顺序即输出顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ColorPalette {
    pub(crate) primary: HexColor,
    pub(crate) secondary: HexColor,
    pub(crate) accent: HexColor,
    pub(crate) background: HexColor,
    pub(crate) foreground: HexColor,
    pub(crate) muted: HexColor,
    pub(crate) success: HexColor,
    pub(crate) warning: HexColor,
    pub(crate) error: HexColor,
}

impl Default for ColorPalette {
    fn default() -> Self {
        manual_palette(
            HexColor::literal("#3B82F6"),
            HexColor::literal("#8B5CF6"),
            HexColor::literal("#F59E0B"),
            Mode::Light,
        )
    }
}

impl ColorPalette {
    pub(crate) const SLOTS: [&'static str; 9] = [
        "primary",
        "secondary",
        "accent",
        "background",
        "foreground",
        "muted",
        "success",
        "warning",
        "error",
    ];

    /// 按固定顺序列出 (色槽名, 颜色)
    pub(crate) fn entries(&self) -> [(&'static str, &HexColor); 9] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("background", &self.background),
            ("foreground", &self.foreground),
            ("muted", &self.muted),
            ("success", &self.success),
            ("warning", &self.warning),
            ("error", &self.error),
        ]
    }

    /// 按色槽名写入；未知色槽返回 false
    pub(crate) fn set(&mut self, slot: &str, color: HexColor) -> bool {
        let target = match slot {
            "primary" => &mut self.primary,
            "secondary" => &mut self.secondary,
            "accent" => &mut self.accent,
            "background" => &mut self.background,
            "foreground" => &mut self.foreground,
            "muted" => &mut self.muted,
            "success" => &mut self.success,
            "warning" => &mut self.warning,
            "error" => &mut self.error,
            _ => return false,
        };
        *target = color;
        true
    }

    /// 以指定明暗模式覆盖背景/前景
    pub(crate) fn with_mode(mut self, mode: Mode) -> Self {
        self.background = mode.background();
        self.foreground = mode.foreground();
        self
    }
}

/// 由基色推导调色板：互补色、提亮强调色、按亮度选择明暗背景
pub(crate) fn complementary_palette(base: &HexColor) -> ColorPalette {
    let (r, g, b) = base.rgb();
    let lift = |c: u8| c.saturating_add(30);
    let mode = if r as u16 + g as u16 + b as u16 > 382 { Mode::Light } else { Mode::Dark };
    ColorPalette {
        primary: base.clone(),
        secondary: HexColor::from_rgb(255 - r, 255 - g, 255 - b),
        accent: HexColor::from_rgb(lift(r), lift(g), lift(b)),
        background: mode.background(),
        foreground: mode.foreground(),
        muted: HexColor::literal(MUTED),
        success: HexColor::literal(SUCCESS),
        warning: HexColor::literal(WARNING),
        error: HexColor::literal(ERROR),
    }
}

/// 由三种主色与明暗模式组合调色板
pub(crate) fn manual_palette(
    primary: HexColor,
    secondary: HexColor,
    accent: HexColor,
    mode: Mode,
) -> ColorPalette {
    ColorPalette {
        primary,
        secondary,
        accent,
        background: mode.background(),
        foreground: mode.foreground(),
        muted: HexColor::literal(MUTED),
        success: HexColor::literal(SUCCESS),
        warning: HexColor::literal(WARNING),
        error: HexColor::literal(ERROR),
    }
}

pub(crate) fn random_base() -> HexColor {
    let v: u32 = rand::thread_rng().gen_range(0..=0xFF_FFFF);
    HexColor(format!("#{:06X}", v))
}

/// 色块
pub(crate) fn swatch(color: &HexColor, width: usize) -> String {
    let (r, g, b) = color.rgb();
    let block = "█".repeat(width);
    block.as_str().truecolor(r, g, b).to_string()
}

/// 打印调色板预览
pub(crate) fn preview_palette(palette: &ColorPalette) {
    println!("\n{}", "🎨 Your Theme:".bold());
    println!("{}", "━".repeat(40));
    for (name, hex) in palette.entries() {
        println!("{:<12} {} {}", name, swatch(hex, 6), hex);
    }
}

/// 生成 CSS 变量块
pub(crate) fn css_variables(palette: &ColorPalette) -> String {
    let mut out = String::from(":root {\n");
    for (name, hex) in palette.entries() {
        out.push_str(&format!("  --color-{}: {};\n", name, hex));
    }
    out.push('}');
    out
}
