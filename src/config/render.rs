//! 配置渲染：通过 Tera 模板输出确定性的 `galaxy.config.ts`

use std::collections::HashMap;

use serde::Serialize;
use tera::{Context as TContext, Tera};

use super::{is_spread, parser, AppType, GalaxyConfig, Value};
use crate::error::{GalaxyError, GalaxyResult};

const CONFIG_TEMPLATE: &str = include_str!("../assets/galaxy.config.ts.tera");

#[derive(Serialize)]
struct Slot<'a> {
    name: &'a str,
    value: &'a str,
}

/// 未识别属性的源码行：展开项写在已知字段之前，其余写在之后
fn property_lines(extra: &[(String, Value)], indent: usize) -> (Vec<String>, Vec<String>) {
    let (spreads, rest): (Vec<_>, Vec<_>) = extra.iter().partition(|(k, v)| is_spread(k, v));
    let lines = |props: Vec<&(String, Value)>| {
        props
            .into_iter()
            .map(|(k, v)| parser::property_source(k, v, indent))
            .collect::<Vec<_>>()
    };
    (lines(spreads), lines(rest))
}

/// Tera 过滤器：输出单引号字符串字面量
pub(crate) fn ts_str(value: &tera::Value, _args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    match value {
        tera::Value::String(s) => Ok(tera::Value::String(parser::quote(s))),
        other => Err(tera::Error::msg(format!("ts_str expects a string, got {}", other))),
    }
}

impl GalaxyConfig {
    /// 渲染完整配置文件文本
    pub(crate) fn render(&self) -> GalaxyResult<String> {
        let mut tera = Tera::default();
        tera.register_filter("ts_str", ts_str);
        tera.add_raw_template("galaxy.config.ts", CONFIG_TEMPLATE)
            .map_err(template_error)?;

        // 以表达式保留的色槽不再输出字面量
        let palette: Vec<Slot> = self
            .color_palette
            .entries()
            .into_iter()
            .filter(|(name, _)| !self.palette_extra.iter().any(|(k, _)| k == name))
            .map(|(name, color)| Slot { name, value: color.as_str() })
            .collect();
        let (palette_spreads, palette_extra) = property_lines(&self.palette_extra, 4);
        // 核心应用始终输出 related，功能应用仅在非空时输出
        let related = if self.app_type == AppType::Core || !self.related.is_empty() {
            Some(Value::Array(self.related.iter().map(|r| r.to_value()).collect()).to_source(2))
        } else {
            None
        };
        let features = Value::Array(self.features.iter().map(|f| f.to_value()).collect()).to_source(2);
        let (spreads, extra) = property_lines(&self.extra, 2);

        let mut ctx = TContext::new();
        ctx.insert("id", &self.id);
        ctx.insert("app_type", self.app_type.as_str());
        ctx.insert("name", &self.name);
        ctx.insert("tagline", &self.tagline);
        ctx.insert("core_app_url", &self.core_app_url);
        ctx.insert("spreads", &spreads);
        ctx.insert("palette_spreads", &palette_spreads);
        ctx.insert("palette", &palette);
        ctx.insert("palette_extra", &palette_extra);
        ctx.insert("related", &related);
        ctx.insert("features", &features);
        ctx.insert("extra", &extra);
        tera.render("galaxy.config.ts", &ctx).map_err(template_error)
    }
}

fn template_error(e: tera::Error) -> GalaxyError {
    GalaxyError::InvalidConfig(format!("Failed to render galaxy.config.ts: {}", e))
}
