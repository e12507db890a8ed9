//! Persisted document shape: `{ blocks, bodyStyle, htmlOverride? }`.

use crate::block::BlockTree;
use crate::style::BodyStyle;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub blocks: BlockTree,
    #[serde(default)]
    pub body_style: BodyStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_override: Option<String>,
    /// Top-level keys written by other tools.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(blocks: BlockTree, body_style: BodyStyle) -> Self {
        Self {
            blocks,
            body_style,
            html_override: None,
            extra: Map::new(),
        }
    }

    pub fn from_json(source: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Override HTML, ignoring an empty string.
    pub fn html_override(&self) -> Option<&str> {
        self.html_override.as_deref().filter(|html| !html.trim().is_empty())
    }
}
