//! Configuration loading
//!
//! Config files may be TOML, JSON or YAML; the format is chosen from the
//! file extension. Layers are merged as JSON values, later layers win.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Load configuration from file, detecting the format from its extension
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let extension = path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let content = std::fs::read_to_string(path)?;

    match extension.as_str() {
        "toml" => toml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("TOML parse error in {}: {}", path.display(), e))),
        "json" => serde_json::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("JSON parse error in {}: {}", path.display(), e))),
        "yml" | "yaml" => serde_yaml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("YAML parse error in {}: {}", path.display(), e))),
        _ => Err(crate::UtilError::Config(
            format!("Unsupported config format: {}", extension)
        )),
    }
}

/// Merge two JSON values (second overrides first)
fn merge_json_values(base: &mut serde_json::Value, override_value: serde_json::Value) {
    match (base, override_value) {
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(override_obj)) => {
            for (key, value) in override_obj {
                match base_obj.get_mut(&key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_obj.insert(key, value);
                    }
                }
            }
        }
        // null leaves the base untouched so partial layers can skip fields
        (_, serde_json::Value::Null) => {}
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

fn merge_value<T>(base: &mut T, override_value: serde_json::Value) -> crate::Result<()>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut base_value = serde_json::to_value(&*base)
        .map_err(|e| crate::UtilError::Serialization(format!("Base serialization error: {}", e)))?;

    merge_json_values(&mut base_value, override_value);

    *base = serde_json::from_value(base_value)
        .map_err(|e| crate::UtilError::Serialization(format!("Result deserialization error: {}", e)))?;

    Ok(())
}

/// Configuration builder: defaults, then file layers, then overrides
#[derive(Debug)]
pub struct ConfigBuilder<T> {
    config: T,
}

impl<T> ConfigBuilder<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    /// Create new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: T::default(),
        }
    }

    /// Load a (possibly partial) file layer and merge it
    pub fn load_file(mut self, path: &Path) -> crate::Result<Self> {
        let layer: serde_json::Value = load_config(path)?;
        merge_value(&mut self.config, layer)?;
        Ok(self)
    }

    /// Merge a layer of raw overrides; `null` entries are ignored
    pub fn merge_value(mut self, overrides: serde_json::Value) -> crate::Result<Self> {
        merge_value(&mut self.config, overrides)?;
        Ok(self)
    }

    /// Build final config
    pub fn build(self) -> T {
        self.config
    }
}

impl<T> Default for ConfigBuilder<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    fn default() -> Self {
        Self::new()
    }
}
