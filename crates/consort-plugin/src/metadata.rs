//! Static plugin metadata reported by a loader.

use crate::types::{PluginCategory, PluginHints, PluginType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity and capabilities of a constructed plugin.
///
/// `name` is the plugin's natural name as reported by its format. The host
/// derives the unique display name from it when the plugin is added.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub plugin_type: PluginType,
    pub category: PluginCategory,
    pub hints: PluginHints,

    /// Library the plugin was loaded from
    pub binary: PathBuf,

    /// Human-readable name
    pub name: String,

    /// Format label (LADSPA label, LV2 URI, ...)
    pub label: String,

    pub maker: String,
    pub copyright: String,

    /// Format-specific unique id (0 when the format has none)
    pub unique_id: i64,
}

impl PluginMetadata {
    pub fn new(plugin_type: PluginType, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            plugin_type,
            name: name.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: PluginCategory) -> Self {
        self.category = category;
        self
    }

    pub fn hints(mut self, hints: PluginHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn maker(mut self, maker: impl Into<String>) -> Self {
        self.maker = maker.into();
        self
    }

    pub fn copyright(mut self, copyright: impl Into<String>) -> Self {
        self.copyright = copyright.into();
        self
    }

    pub fn unique_id(mut self, unique_id: i64) -> Self {
        self.unique_id = unique_id;
        self
    }

    pub fn uses_chunks(&self) -> bool {
        self.hints.contains(PluginHints::USES_CHUNKS)
    }
}
