//! `galaxy theme`：列出/应用/预览/生成主题
//! 同时提供 create 与 init 共用的主题选择流程。

use std::{fs, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    cli::ThemeArgs,
    colors::{
        complementary_palette, css_variables, manual_palette, normalize_hex, preview_palette, random_base, swatch,
        ColorPalette, HexColor, Mode,
    },
    config::GalaxyConfig,
    error::{GalaxyError, GalaxyResult},
    output,
    presets::{self, display_name, CustomPresets, CUSTOM_PRESETS_FILE, PRESETS},
    prompt::{InputQuestion, Prompter},
    validation::{validate_hex_color, validate_preset_name},
};

pub(crate) const THEME_EXPORT_FILE: &str = "galaxy-theme.json";

const DEFAULT_PRIMARY: &str = "#3B82F6";
const DEFAULT_SECONDARY: &str = "#8B5CF6";
const DEFAULT_ACCENT: &str = "#F59E0B";

pub(crate) fn run(args: ThemeArgs, cwd: &Path, prompter: &mut dyn Prompter) -> Result<()> {
    if args.list {
        list(cwd)
    } else if let Some(name) = args.apply.as_deref() {
        apply(cwd, name)
    } else if args.preview {
        preview(cwd)
    } else {
        generate(cwd, prompter)
    }
}

fn print_primary_colors(title: &str, palette: &ColorPalette) {
    println!("\n{}", title.bold());
    for (slot, hex) in palette.entries().into_iter().take(3) {
        println!("  {:<10} {} {}", slot, swatch(hex, 4), hex);
    }
}

fn list(cwd: &Path) -> Result<()> {
    output::header("🎨 Available Theme Presets:");
    output::rule(50);
    for preset in &PRESETS {
        print_primary_colors(&format!("{} Theme:", display_name(preset.name)), &preset.palette());
    }

    let custom = CustomPresets::load(cwd)?;
    if !custom.themes.is_empty() {
        output::header(&format!("💾 Saved Themes ({}):", CUSTOM_PRESETS_FILE));
        output::rule(50);
        for (name, palette) in &custom.themes {
            print_primary_colors(&format!("{} Theme:", display_name(name)), palette);
        }
    }

    println!();
    output::hint("Use \"galaxy theme --apply <preset>\" to apply a theme");
    Ok(())
}

fn apply(cwd: &Path, name: &str) -> Result<()> {
    let mut config = GalaxyConfig::load(cwd)?;
    let custom = CustomPresets::load(cwd)?;
    let palette = presets::resolve(name, &custom).ok_or_else(|| {
        let mut available: Vec<&str> = presets::preset_names();
        available.extend(custom.themes.keys().map(String::as_str));
        GalaxyError::InvalidInput(format!(
            "Unknown preset: {}. Available presets: {}",
            name,
            available.join(", ")
        ))
    })?;

    let spinner = output::spinner("Applying theme...");
    config.set_palette(palette.clone());
    let saved = config.save(cwd);
    spinner.finish_and_clear();
    saved.context("Failed to apply theme")?;

    output::success(&format!("Applied {} theme successfully!", name));
    preview_palette(&palette);
    Ok(())
}

fn preview(cwd: &Path) -> Result<()> {
    let config = GalaxyConfig::load(cwd)?;
    preview_palette(&config.color_palette);

    output::header("📝 CSS Variables:");
    output::hint("Add these to your global CSS:");
    output::rule(40);
    println!("{}", css_variables(&config.color_palette).dimmed());
    Ok(())
}

fn generate(cwd: &Path, prompter: &mut dyn Prompter) -> Result<()> {
    let methods: Vec<String> = ["🎨 From preset", "🎯 From base color", "✏️ Manual selection", "🎲 Random theme"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let custom = CustomPresets::load(cwd)?;
    let palette = match prompter.select("How would you like to generate your theme?", &methods, 0)? {
        0 => {
            let mut names: Vec<String> = presets::preset_names().into_iter().map(str::to_string).collect();
            names.extend(custom.themes.keys().cloned());
            let labels: Vec<String> = names.iter().map(|n| display_name(n)).collect();
            let idx = prompter.select("Choose a preset:", &labels, 0)?;
            presets::resolve(&names[idx], &custom)
                .with_context(|| format!("Preset {} disappeared", names[idx]))?
        }
        1 => prompt_base_palette(prompter, true)?,
        2 => prompt_manual_palette(prompter)?,
        _ => {
            let base = random_base();
            output::warn(&format!("Generated from random base: {}", base));
            complementary_palette(&base)
        }
    };

    output::header("Generated Theme:");
    output::rule(40);
    preview_palette(&palette);

    if prompter.confirm("Apply this theme to your project?", true)? {
        apply_generated(cwd, prompter, &palette, custom)?;
    }

    if prompter.confirm("Export theme as JSON?", false)? {
        let path = cwd.join(THEME_EXPORT_FILE);
        let text = serde_json::to_string_pretty(&palette).context("Failed to serialize theme")?;
        fs::write(&path, text + "\n").with_context(|| format!("Failed to write {}", path.display()))?;
        output::success(&format!("Theme exported to {}", path.display()));
    }
    Ok(())
}

fn apply_generated(
    cwd: &Path,
    prompter: &mut dyn Prompter,
    palette: &ColorPalette,
    mut custom: CustomPresets,
) -> Result<()> {
    if !GalaxyConfig::exists(cwd) {
        output::warn("No Galaxy configuration found.");
        output::hint("Run \"galaxy init\" first to initialize your project");
        return Ok(());
    }
    let mut config = GalaxyConfig::load(cwd)?;
    config.set_palette(palette.clone());
    config.save(cwd).context("Failed to apply theme")?;
    output::success("Theme applied successfully!");

    let question = InputQuestion::new("Save this theme as a preset? (leave empty to skip)")
        .allow_empty()
        .validate(validate_preset_name);
    let save_name = prompter.input(&question)?;
    if !save_name.is_empty() {
        custom.save(&save_name, palette.clone())?;
        output::success(&format!("Theme saved as \"{}\"", save_name));
        output::hint(&format!("Use \"galaxy theme --apply {}\" to apply it later", save_name));
    }
    Ok(())
}

/// create/init 的主题选择：内置预设或自定义；返回调色板与主题名
pub(crate) fn choose_theme(prompter: &mut dyn Prompter) -> GalaxyResult<(ColorPalette, String)> {
    let mut items: Vec<String> = PRESETS.iter().map(|p| p.label.to_string()).collect();
    items.push("🎨 Custom".to_string());
    let idx = prompter.select("Choose a color theme:", &items, 0)?;
    if let Some(preset) = PRESETS.get(idx) {
        return Ok((preset.palette(), preset.name.to_string()));
    }

    let methods = vec!["Enter each color manually".to_string(), "Generate from a base color".to_string()];
    let palette = match prompter.select("How would you like to create your custom theme?", &methods, 0)? {
        0 => prompt_manual_palette(prompter)?,
        _ => prompt_base_palette(prompter, false)?,
    };
    Ok((palette, "custom".to_string()))
}

fn ask_color(prompter: &mut dyn Prompter, prompt: &str, default: &str) -> GalaxyResult<HexColor> {
    let answer = prompter.input(&InputQuestion::new(prompt).default(default).validate(validate_hex_color))?;
    normalize_hex(&answer)
}

fn ask_mode(prompter: &mut dyn Prompter) -> GalaxyResult<Mode> {
    let items: Vec<String> = Mode::ALL.iter().map(|m| m.to_string()).collect();
    let idx = prompter.select("Light or dark mode?", &items, 0)?;
    Ok(Mode::ALL.get(idx).copied().unwrap_or(Mode::Light))
}

fn prompt_manual_palette(prompter: &mut dyn Prompter) -> GalaxyResult<ColorPalette> {
    let primary = ask_color(prompter, "Primary color (hex):", DEFAULT_PRIMARY)?;
    let secondary = ask_color(prompter, "Secondary color (hex):", DEFAULT_SECONDARY)?;
    let accent = ask_color(prompter, "Accent color (hex):", DEFAULT_ACCENT)?;
    let mode = ask_mode(prompter)?;
    Ok(manual_palette(primary, secondary, accent, mode))
}

/// 由基色生成；`with_mode` 为 true 时再询问明暗，选择暗色则覆盖背景/前景
fn prompt_base_palette(prompter: &mut dyn Prompter, with_mode: bool) -> GalaxyResult<ColorPalette> {
    let base = ask_color(prompter, "Enter your base color (hex):", DEFAULT_PRIMARY)?;
    let palette = complementary_palette(&base);
    if with_mode && ask_mode(prompter)? == Mode::Dark {
        return Ok(palette.with_mode(Mode::Dark));
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AppType, ConfigSettings},
        prompt::testing::{Answer, ScriptedPrompter},
    };
    use tempfile::TempDir;

    fn core_project(dir: &TempDir) {
        GalaxyConfig::from_settings(&ConfigSettings {
            id: "hub".into(),
            app_type: AppType::Core,
            name: "Hub".into(),
            tagline: "Central hub for all your tools".into(),
            core_app_url: None,
            color_palette: ColorPalette::default(),
        })
        .save(dir.path())
        .unwrap();
    }

    #[test]
    fn choose_theme_preset_and_custom() {
        let mut p = ScriptedPrompter::new(vec![Answer::Choice(2)]);
        let (palette, name) = choose_theme(&mut p).unwrap();
        assert_eq!(name, "sunset");
        assert_eq!(palette.primary.as_str(), "#F97316");

        let mut p = ScriptedPrompter::new(vec![
            Answer::Choice(4),
            Answer::Choice(0),
            Answer::Text("f00"),
            Answer::Text("00ff00"),
            Answer::Text("#00F"),
            Answer::Choice(1),
        ]);
        let (palette, name) = choose_theme(&mut p).unwrap();
        assert_eq!(name, "custom");
        assert_eq!(palette.primary.as_str(), "#FF0000");
        assert_eq!(palette.secondary.as_str(), "#00FF00");
        assert_eq!(palette.accent.as_str(), "#0000FF");
        assert_eq!(palette.background.as_str(), "#0F172A");
    }

    #[test]
    fn custom_theme_from_base_color() {
        let mut p = ScriptedPrompter::new(vec![Answer::Choice(4), Answer::Choice(1), Answer::Text("#000000")]);
        let (palette, _) = choose_theme(&mut p).unwrap();
        assert_eq!(palette.secondary.as_str(), "#FFFFFF");
        assert_eq!(palette.accent.as_str(), "#1E1E1E");
    }

    #[test]
    fn apply_unknown_preset_lists_available() {
        let dir = TempDir::new().unwrap();
        core_project(&dir);
        let err = apply(dir.path(), "lava").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown preset: lava"));
        assert!(msg.contains("ocean, forest, sunset, midnight"));
    }

    #[test]
    fn apply_requires_project() {
        let dir = TempDir::new().unwrap();
        let err = apply(dir.path(), "ocean").unwrap_err();
        assert!(matches!(err.downcast_ref::<GalaxyError>(), Some(GalaxyError::NotAProject(_))));
    }

    #[test]
    fn generate_applies_saves_and_exports() {
        let dir = TempDir::new().unwrap();
        core_project(&dir);
        let mut p = ScriptedPrompter::new(vec![
            Answer::Choice(1),
            Answer::Text("#336699"),
            Answer::Choice(1),
            Answer::Yes(true),
            Answer::Text("brand"),
            Answer::Yes(true),
        ]);
        generate(dir.path(), &mut p).unwrap();

        let config = GalaxyConfig::load(dir.path()).unwrap();
        assert_eq!(config.color_palette.primary.as_str(), "#336699");
        assert_eq!(config.color_palette.background.as_str(), "#0F172A");

        let custom = CustomPresets::load(dir.path()).unwrap();
        assert_eq!(custom.get("brand"), Some(&config.color_palette));

        let exported: ColorPalette =
            serde_json::from_str(&fs::read_to_string(dir.path().join(THEME_EXPORT_FILE)).unwrap()).unwrap();
        assert_eq!(exported, config.color_palette);

        apply(dir.path(), "brand").unwrap();
    }

    #[test]
    fn generate_outside_project_only_previews() {
        let dir = TempDir::new().unwrap();
        let mut p = ScriptedPrompter::new(vec![Answer::Choice(3), Answer::Yes(true), Answer::Yes(false)]);
        generate(dir.path(), &mut p).unwrap();
        assert!(!GalaxyConfig::exists(dir.path()));
        assert!(!dir.path().join(THEME_EXPORT_FILE).exists());
    }
}
