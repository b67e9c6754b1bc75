//! Galaxy 配置模型：
//! - `GalaxyConfig`/`RelatedFeature`/`Feature` 等结构
//! - 从 `src/config/galaxy.config.ts` 解析、修改并整体重写
//! - 未识别的属性原样保留，重写时输出在已知字段之后（展开属性在最前）

mod parser;
mod render;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use tracing::debug;

pub(crate) use parser::Value;

use crate::{
    colors::{normalize_hex, ColorPalette},
    error::{GalaxyError, GalaxyResult},
};

/// 配置文件（相对项目根）
pub(crate) const CONFIG_PATH: &str = "src/config/galaxy.config.ts";

pub(crate) const DEFAULT_ICON: &str = "🚀";

/// 应用类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum AppType {
    Core,
    Feature,
}

impl AppType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            AppType::Core => "core",
            AppType::Feature => "feature",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "core" => Some(AppType::Core),
            "feature" => Some(AppType::Feature),
            _ => None,
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 功能分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Category {
    Productivity,
    Communication,
    Analytics,
    Finance,
    Marketing,
    Development,
    Other,
}

impl Category {
    pub(crate) const ALL: [Category; 7] = [
        Category::Productivity,
        Category::Communication,
        Category::Analytics,
        Category::Finance,
        Category::Marketing,
        Category::Development,
        Category::Other,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Category::Productivity => "productivity",
            Category::Communication => "communication",
            Category::Analytics => "analytics",
            Category::Finance => "finance",
            Category::Marketing => "marketing",
            Category::Development => "development",
            Category::Other => "other",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Category::Productivity => "Productivity",
            Category::Communication => "Communication",
            Category::Analytics => "Analytics",
            Category::Finance => "Finance",
            Category::Marketing => "Marketing",
            Category::Development => "Development",
            Category::Other => "Other",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// 核心应用 `related` 列表中的条目
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RelatedFeature {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) url: String,
    pub(crate) api_endpoint: Option<String>,
    pub(crate) description: String,
    pub(crate) icon: String,
    pub(crate) category: Category,
    pub(crate) requires_auth: bool,
    pub(crate) extra: Vec<(String, Value)>,
}

/// 功能应用自身的 `features` 条目
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Feature {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) icon: String,
    pub(crate) path: String,
    pub(crate) extra: Vec<(String, Value)>,
}

/// create/init 收集到的设置
#[derive(Debug, Clone)]
pub(crate) struct ConfigSettings {
    pub(crate) id: String,
    pub(crate) app_type: AppType,
    pub(crate) name: String,
    pub(crate) tagline: String,
    pub(crate) core_app_url: Option<String>,
    pub(crate) color_palette: ColorPalette,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GalaxyConfig {
    pub(crate) id: String,
    pub(crate) app_type: AppType,
    pub(crate) name: String,
    pub(crate) tagline: String,
    pub(crate) core_app_url: Option<String>,
    pub(crate) color_palette: ColorPalette,
    /// `colorPalette` 中未识别的键，以及值不是字面量的色槽
    pub(crate) palette_extra: Vec<(String, Value)>,
    pub(crate) related: Vec<RelatedFeature>,
    pub(crate) features: Vec<Feature>,
    pub(crate) extra: Vec<(String, Value)>,
}

impl GalaxyConfig {
    /// 由设置生成全新配置；功能应用默认带一个指向自身的功能条目
    pub(crate) fn from_settings(settings: &ConfigSettings) -> Self {
        let features = match settings.app_type {
            AppType::Core => Vec::new(),
            AppType::Feature => vec![Feature {
                id: settings.id.clone(),
                name: settings.name.clone(),
                description: settings.tagline.clone(),
                icon: DEFAULT_ICON.to_string(),
                path: "/".to_string(),
                extra: Vec::new(),
            }],
        };
        GalaxyConfig {
            id: settings.id.clone(),
            app_type: settings.app_type,
            name: settings.name.clone(),
            tagline: settings.tagline.clone(),
            core_app_url: match settings.app_type {
                AppType::Feature => settings.core_app_url.clone(),
                AppType::Core => None,
            },
            color_palette: settings.color_palette.clone(),
            palette_extra: Vec::new(),
            related: Vec::new(),
            features,
            extra: Vec::new(),
        }
    }

    /// 将设置合并进已有配置（保留列表与未识别属性）
    pub(crate) fn apply(&mut self, settings: &ConfigSettings) {
        self.id = settings.id.clone();
        self.app_type = settings.app_type;
        self.name = settings.name.clone();
        self.tagline = settings.tagline.clone();
        match settings.app_type {
            AppType::Core => self.core_app_url = None,
            AppType::Feature if settings.core_app_url.is_some() => {
                self.core_app_url = settings.core_app_url.clone();
            }
            AppType::Feature => {}
        }
        self.set_palette(settings.color_palette.clone());
    }

    /// 替换整套配色；非字面量色槽随之被新值覆盖
    pub(crate) fn set_palette(&mut self, palette: ColorPalette) {
        self.color_palette = palette;
        self.palette_extra.retain(|(key, _)| !ColorPalette::SLOTS.contains(&key.as_str()));
    }

    /// 插入到 `related` 列表最前；重复 ID 直接拒绝
    pub(crate) fn add_related(&mut self, entry: RelatedFeature) -> GalaxyResult<()> {
        if self.app_type != AppType::Core {
            return Err(GalaxyError::WrongAppType {
                expected: AppType::Core.to_string(),
                found: self.app_type.to_string(),
            });
        }
        if self.related.iter().any(|r| r.id == entry.id) {
            return Err(GalaxyError::DuplicateFeature(entry.id));
        }
        self.related.insert(0, entry);
        Ok(())
    }

    /// 移除所有匹配 ID 的条目，返回是否有改动
    pub(crate) fn remove_feature(&mut self, id: &str) -> bool {
        let before = self.related.len() + self.features.len();
        self.related.retain(|r| r.id != id);
        self.features.retain(|f| f.id != id);
        before != self.related.len() + self.features.len()
    }

    /// `related` 中的 ID（文件顺序）
    pub(crate) fn feature_ids(&self) -> Vec<&str> {
        self.related.iter().map(|r| r.id.as_str()).collect()
    }

    pub(crate) fn path(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_PATH)
    }

    pub(crate) fn exists(project_root: &Path) -> bool {
        Self::path(project_root).is_file()
    }

    /// 读取并解析项目配置
    pub(crate) fn load(project_root: &Path) -> GalaxyResult<Self> {
        let path = Self::path(project_root);
        if !path.is_file() {
            return Err(GalaxyError::NotAProject(PathBuf::from(CONFIG_PATH)));
        }
        let text = fs::read_to_string(&path)
            .map_err(|e| GalaxyError::io(format!("Failed to read {}", path.display()), e))?;
        debug!(path = %path.display(), "parsing galaxy config");
        Self::from_source(&text)
    }

    pub(crate) fn from_source(src: &str) -> GalaxyResult<Self> {
        match parser::parse_config_object(src)? {
            Value::Object(fields) => Self::from_fields(Fields(fields)),
            _ => Err(GalaxyError::InvalidConfig("galaxyConfig is not an object".to_string())),
        }
    }

    fn from_fields(mut fields: Fields) -> GalaxyResult<Self> {
        let id = fields.require_str("id", "galaxyConfig")?;
        let type_str = fields.require_str("type", "galaxyConfig")?;
        let app_type = AppType::parse(&type_str)
            .ok_or_else(|| GalaxyError::InvalidConfig(format!("unknown app type '{}'", type_str)))?;
        let name = fields.take_str("name")?.unwrap_or_else(|| id.clone());
        let tagline = fields.take_str("tagline")?.unwrap_or_default();
        let core_app_url = fields.take_str("coreAppUrl")?;
        let (color_palette, palette_extra) = match fields.take("colorPalette") {
            Some(Value::Object(slots)) => palette_from_fields(Fields(slots))?,
            Some(_) => return Err(GalaxyError::InvalidConfig("colorPalette must be an object".to_string())),
            None => (ColorPalette::default(), Vec::new()),
        };
        let related = fields
            .take_list("related")?
            .into_iter()
            .map(|f| related_from_fields(Fields(f)))
            .collect::<GalaxyResult<Vec<_>>>()?;
        let features = fields
            .take_list("features")?
            .into_iter()
            .map(|f| feature_from_fields(Fields(f)))
            .collect::<GalaxyResult<Vec<_>>>()?;
        Ok(GalaxyConfig {
            id,
            app_type,
            name,
            tagline,
            core_app_url,
            color_palette,
            palette_extra,
            related,
            features,
            extra: fields.0,
        })
    }

    /// 整体写回配置文件
    pub(crate) fn save(&self, project_root: &Path) -> GalaxyResult<PathBuf> {
        let path = Self::path(project_root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GalaxyError::io(format!("Failed to create {}", parent.display()), e))?;
        }
        let text = self.render()?;
        fs::write(&path, text)
            .map_err(|e| GalaxyError::io(format!("Failed to write {}", path.display()), e))?;
        debug!(path = %path.display(), "galaxy config written");
        Ok(path)
    }
}

/// `...x` 展开属性
pub(crate) fn is_spread(key: &str, value: &Value) -> bool {
    matches!(value, Value::Verbatim) && key.starts_with("...")
}

/// 按展开属性 / 其余属性拆分，保证展开项写在已知字段之前
fn split_spreads(extra: &[(String, Value)]) -> (Vec<(String, Value)>, Vec<(String, Value)>) {
    extra.iter().cloned().partition(|(k, v)| is_spread(k, v))
}

impl RelatedFeature {
    pub(crate) fn to_value(&self) -> Value {
        let (mut fields, rest) = split_spreads(&self.extra);
        fields.extend([
            ("id".to_string(), Value::Str(self.id.clone())),
            ("name".to_string(), Value::Str(self.name.clone())),
            ("url".to_string(), Value::Str(self.url.clone())),
        ]);
        if let Some(api) = &self.api_endpoint {
            fields.push(("apiEndpoint".to_string(), Value::Str(api.clone())));
        }
        fields.extend([
            ("description".to_string(), Value::Str(self.description.clone())),
            ("icon".to_string(), Value::Str(self.icon.clone())),
            ("category".to_string(), Value::Str(self.category.as_str().to_string())),
            ("requiresAuth".to_string(), Value::Bool(self.requires_auth)),
        ]);
        fields.extend(rest);
        Value::Object(fields)
    }
}

impl Feature {
    pub(crate) fn to_value(&self) -> Value {
        let (mut fields, rest) = split_spreads(&self.extra);
        fields.extend([
            ("id".to_string(), Value::Str(self.id.clone())),
            ("name".to_string(), Value::Str(self.name.clone())),
            ("description".to_string(), Value::Str(self.description.clone())),
            ("icon".to_string(), Value::Str(self.icon.clone())),
            ("path".to_string(), Value::Str(self.path.clone())),
        ]);
        fields.extend(rest);
        Value::Object(fields)
    }
}

/// 对象属性读取器：取出已识别字段，剩余部分即未识别属性
struct Fields(Vec<(String, Value)>);

impl Fields {
    fn take(&mut self, key: &str) -> Option<Value> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    fn take_str(&mut self, key: &str) -> GalaxyResult<Option<String>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Str(s)) | Some(Value::Template { text: s, .. }) => Ok(Some(s)),
            Some(_) => Err(GalaxyError::InvalidConfig(format!("'{}' must be a string literal", key))),
        }
    }

    fn require_str(&mut self, key: &str, owner: &str) -> GalaxyResult<String> {
        self.take_str(key)?
            .ok_or_else(|| GalaxyError::InvalidConfig(format!("{} is missing '{}'", owner, key)))
    }

    fn take_bool(&mut self, key: &str) -> GalaxyResult<Option<bool>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(_) => Err(GalaxyError::InvalidConfig(format!("'{}' must be true or false", key))),
        }
    }

    /// 取出对象数组
    fn take_list(&mut self, key: &str) -> GalaxyResult<Vec<Vec<(String, Value)>>> {
        match self.take(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(fields) => Ok(fields),
                    _ => Err(GalaxyError::InvalidConfig(format!("'{}' entries must be objects", key))),
                })
                .collect(),
            Some(_) => Err(GalaxyError::InvalidConfig(format!("'{}' must be an array", key))),
        }
    }
}

/// 字面量色槽进入 `ColorPalette`；表达式色槽与未识别的键原样保留
fn palette_from_fields(mut fields: Fields) -> GalaxyResult<(ColorPalette, Vec<(String, Value)>)> {
    let mut palette = ColorPalette::default();
    let mut kept = Vec::new();
    for slot in ColorPalette::SLOTS {
        match fields.take(slot) {
            None => {}
            Some(Value::Str(raw)) | Some(Value::Template { text: raw, .. }) => {
                palette.set(slot, normalize_hex(&raw)?);
            }
            Some(other) => {
                debug!(slot, "keeping non-literal colorPalette entry");
                kept.push((slot.to_string(), other));
            }
        }
    }
    kept.extend(fields.0);
    Ok((palette, kept))
}

fn related_from_fields(mut fields: Fields) -> GalaxyResult<RelatedFeature> {
    let id = fields.require_str("id", "related entry")?;
    let category = match fields.take_str("category")? {
        None => Category::Other,
        Some(c) => Category::parse(&c)
            .ok_or_else(|| GalaxyError::InvalidConfig(format!("unknown category '{}' for '{}'", c, id)))?,
    };
    Ok(RelatedFeature {
        name: fields.take_str("name")?.unwrap_or_else(|| id.clone()),
        url: fields.take_str("url")?.unwrap_or_default(),
        api_endpoint: fields.take_str("apiEndpoint")?,
        description: fields.take_str("description")?.unwrap_or_default(),
        icon: fields.take_str("icon")?.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        requires_auth: fields.take_bool("requiresAuth")?.unwrap_or(false),
        category,
        id,
        extra: fields.0,
    })
}

fn feature_from_fields(mut fields: Fields) -> GalaxyResult<Feature> {
    let id = fields.require_str("id", "features entry")?;
    Ok(Feature {
        name: fields.take_str("name")?.unwrap_or_else(|| id.clone()),
        description: fields.take_str("description")?.unwrap_or_default(),
        icon: fields.take_str("icon")?.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        path: fields.take_str("path")?.unwrap_or_else(|| "/".to_string()),
        id,
        extra: fields.0,
    })
}
