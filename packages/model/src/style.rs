//! Style records: sparse per-block styles, the document body style, and themes.
//!
//! Style keys are camelCase CSS property names (`fontSize`, `backgroundColor`).
//! Maps are ordered so that anything derived from them is deterministic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Sparse map of CSS-like key → value pairs.
pub type Style = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Document-level style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyStyle {
    pub background_color: String,
    pub viewport_background: String,
    pub padding: String,
    pub max_width: u32,
    pub max_width_unit: String,
    pub align: Alignment,
    pub font_family: String,
    pub text_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_css: Option<String>,
    /// Keys this model does not know, kept for the next save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BodyStyle {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            viewport_background: "#f3f4f6".to_string(),
            padding: "24px".to_string(),
            max_width: 600,
            max_width_unit: "px".to_string(),
            align: Alignment::Center,
            font_family: "Arial, sans-serif".to_string(),
            text_color: "#1f2933".to_string(),
            raw_css: None,
            extra: Map::new(),
        }
    }
}

impl BodyStyle {
    /// `max_width` joined with its unit (`"600px"`, `"100%"`).
    pub fn max_width_css(&self) -> String {
        format!("{}{}", self.max_width, self.max_width_unit)
    }

    /// New body style with every field present in `patch` replaced.
    pub fn patched(&self, patch: &BodyStylePatch) -> BodyStyle {
        let mut next = self.clone();
        if let Some(v) = &patch.background_color {
            next.background_color = v.clone();
        }
        if let Some(v) = &patch.viewport_background {
            next.viewport_background = v.clone();
        }
        if let Some(v) = &patch.padding {
            next.padding = v.clone();
        }
        if let Some(v) = patch.max_width {
            next.max_width = v;
        }
        if let Some(v) = &patch.max_width_unit {
            next.max_width_unit = v.clone();
        }
        if let Some(v) = patch.align {
            next.align = v;
        }
        if let Some(v) = &patch.font_family {
            next.font_family = v.clone();
        }
        if let Some(v) = &patch.text_color {
            next.text_color = v.clone();
        }
        if let Some(v) = &patch.raw_css {
            next.raw_css = Some(v.clone());
        }
        next
    }
}

/// Partial body style, as carried by a theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyStylePatch {
    pub background_color: Option<String>,
    pub viewport_background: Option<String>,
    pub padding: Option<String>,
    pub max_width: Option<u32>,
    pub max_width_unit: Option<String>,
    pub align: Option<Alignment>,
    pub font_family: Option<String>,
    pub text_color: Option<String>,
    pub raw_css: Option<String>,
}

/// A theme: a body patch plus per-block-type component styles.
///
/// Themes never rewrite stored block styles; the renderer layers them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub name: String,
    pub body: BodyStylePatch,
    /// Keyed by block type name (`"text"`, `"button"`, ...)
    pub components: BTreeMap<String, Style>,
}

impl Theme {
    pub fn component_style(&self, block_type: &str) -> Option<&Style> {
        self.components.get(block_type)
    }
}
