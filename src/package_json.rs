//! package.json 的最小改动：保持字段顺序，只改 `name` 或追加 `galaxy` 元数据

use std::{fs, path::Path};

use serde_json::{json, Map, Value};

use crate::{
    config::AppType,
    error::{GalaxyError, GalaxyResult},
};

pub(crate) const PACKAGE_JSON: &str = "package.json";
pub(crate) const GALAXY_METADATA_VERSION: &str = "1.0.0";

fn read_object(path: &Path) -> GalaxyResult<Map<String, Value>> {
    let text = fs::read_to_string(path)
        .map_err(|e| GalaxyError::io(format!("Failed to read {}", path.display()), e))?;
    match serde_json::from_str(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(GalaxyError::PreconditionFailed(format!("{} is not a JSON object", path.display()))),
        Err(e) => Err(GalaxyError::PreconditionFailed(format!("Failed to parse {}: {}", path.display(), e))),
    }
}

fn write_object(path: &Path, map: Map<String, Value>) -> GalaxyResult<()> {
    let text = serde_json::to_string_pretty(&Value::Object(map))
        .map_err(|e| GalaxyError::PreconditionFailed(format!("Failed to serialize package.json: {}", e)))?;
    fs::write(path, text + "\n").map_err(|e| GalaxyError::io(format!("Failed to write {}", path.display()), e))
}

/// `name` 字段（用于 init 推导默认名称）；文件缺失或无法解析时返回 None
pub(crate) fn read_name(dir: &Path) -> Option<String> {
    let path = dir.join(PACKAGE_JSON);
    if !path.is_file() {
        return None;
    }
    read_object(&path).ok()?.get("name")?.as_str().map(str::to_string).filter(|s| !s.is_empty())
}

/// 设置 `name`；文件不存在时不做任何事，返回是否写入
pub(crate) fn set_name(dir: &Path, name: &str) -> GalaxyResult<bool> {
    let path = dir.join(PACKAGE_JSON);
    if !path.is_file() {
        return Ok(false);
    }
    let mut map = read_object(&path)?;
    map.insert("name".to_string(), Value::String(name.to_string()));
    write_object(&path, map)?;
    Ok(true)
}

/// 写入 `galaxy: { type, version }` 元数据
pub(crate) fn set_galaxy_metadata(dir: &Path, app_type: AppType) -> GalaxyResult<bool> {
    let path = dir.join(PACKAGE_JSON);
    if !path.is_file() {
        return Ok(false);
    }
    let mut map = read_object(&path)?;
    map.insert(
        "galaxy".to_string(),
        json!({ "type": app_type.as_str(), "version": GALAXY_METADATA_VERSION }),
    );
    write_object(&path, map)?;
    Ok(true)
}
