//! The block tree.
//!
//! A document is an ordered list of blocks. `structure` and `container` blocks
//! own columns, each holding its own ordered list of blocks. No block or column
//! is ever shared between two parents.

use crate::ids::{BlockId, ColumnId};
use crate::style::Style;
use crate::variant::Variant;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{self, SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

fn default_spacer_height() -> String {
    "24px".to_string()
}

fn default_form_method() -> String {
    "post".to_string()
}

/// Keys every block carries regardless of its type.
const HEADER_FIELDS: [&str; 4] = ["id", "type", "style", "styleUnlocked"];

/// A single content unit.
///
/// Persisted as one flat JSON object. Fields the block's type does not model,
/// and the whole payload of an unrecognized type, are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,

    pub style: Style,

    /// Detaches the block from theme component styles.
    pub style_unlocked: bool,

    pub kind: BlockKind,

    pub extra: Map<String, Value>,
}

/// Type-specific payload, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum BlockKind {
    Text {
        #[serde(default)]
        content: String,
    },
    Image {
        #[serde(default)]
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link: Option<String>,
    },
    Button {
        #[serde(default)]
        label: String,
        #[serde(default)]
        url: String,
    },
    Divider,
    Spacer {
        #[serde(default = "default_spacer_height")]
        height: String,
    },
    Html {
        #[serde(default)]
        html: String,
    },
    Form {
        #[serde(default)]
        action: String,
        #[serde(default = "default_form_method")]
        method: String,
        #[serde(default)]
        fields: Vec<FormField>,
        #[serde(default)]
        submit_label: String,
    },
    Embed {
        #[serde(default)]
        url: String,
        #[serde(default)]
        title: String,
    },
    Social {
        /// Network name → profile URL
        #[serde(default)]
        links: BTreeMap<String, String>,
    },
    Structure {
        #[serde(default)]
        variant: Variant,
        #[serde(default)]
        columns: Vec<Column>,
    },
    Container {
        #[serde(default)]
        columns: Vec<Column>,
    },
    Offer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decision_id: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placement_id: Option<u64>,
        #[serde(default)]
        offer_fallback_html: String,
    },
    Fragment {
        #[serde(default)]
        fragment_id: String,
        #[serde(default)]
        fragment_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fragment_version: Option<u32>,
        /// Cached copy of the fragment's blocks. Not part of the document's id space.
        #[serde(default)]
        fragment_blocks: Vec<Block>,
        /// Cached rendered HTML, preferred over `fragment_blocks` when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fragment_html: Option<String>,
        #[serde(default)]
        fragment_locked: bool,
    },
    /// Unrecognized `type`; renders nothing. Its fields live in `Block::extra`.
    #[serde(skip)]
    Unknown { type_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "FormField::default_input_type")]
    pub input_type: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    fn default_input_type() -> String {
        "text".to_string()
    }
}

/// An ordered list of blocks owned by exactly one structure or container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Column {
    pub fn new(id: ColumnId) -> Self {
        Self {
            id,
            blocks: Vec::new(),
            style: Style::new(),
            extra: Map::new(),
        }
    }
}

/// Block type names as exposed to the palette, themes and drag payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    Image,
    Button,
    Divider,
    Spacer,
    Html,
    Form,
    Embed,
    Social,
    Structure,
    Container,
    Offer,
    Fragment,
}

impl BlockType {
    pub const ALL: [BlockType; 13] = [
        BlockType::Text,
        BlockType::Image,
        BlockType::Button,
        BlockType::Divider,
        BlockType::Spacer,
        BlockType::Html,
        BlockType::Form,
        BlockType::Embed,
        BlockType::Social,
        BlockType::Structure,
        BlockType::Container,
        BlockType::Offer,
        BlockType::Fragment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::Button => "button",
            BlockType::Divider => "divider",
            BlockType::Spacer => "spacer",
            BlockType::Html => "html",
            BlockType::Form => "form",
            BlockType::Embed => "embed",
            BlockType::Social => "social",
            BlockType::Structure => "structure",
            BlockType::Container => "container",
            BlockType::Offer => "offer",
            BlockType::Fragment => "fragment",
        }
    }

    /// Persisted payload keys of this type, besides `type`.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            BlockType::Text => &["content"],
            BlockType::Image => &["src", "alt", "link"],
            BlockType::Button => &["label", "url"],
            BlockType::Divider => &[],
            BlockType::Spacer => &["height"],
            BlockType::Html => &["html"],
            BlockType::Form => &["action", "method", "fields", "submitLabel"],
            BlockType::Embed => &["url", "title"],
            BlockType::Social => &["links"],
            BlockType::Structure => &["variant", "columns"],
            BlockType::Container => &["columns"],
            BlockType::Offer => &["decisionId", "placementId", "offerFallbackHtml"],
            BlockType::Fragment => &[
                "fragmentId",
                "fragmentName",
                "fragmentVersion",
                "fragmentBlocks",
                "fragmentHtml",
                "fragmentLocked",
            ],
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown block type: {s}"))
    }
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            style: Style::new(),
            style_unlocked: false,
            kind,
            extra: Map::new(),
        }
    }

    /// `None` for blocks of an unrecognized type.
    pub fn block_type(&self) -> Option<BlockType> {
        Some(match &self.kind {
            BlockKind::Text { .. } => BlockType::Text,
            BlockKind::Image { .. } => BlockType::Image,
            BlockKind::Button { .. } => BlockType::Button,
            BlockKind::Divider => BlockType::Divider,
            BlockKind::Spacer { .. } => BlockType::Spacer,
            BlockKind::Html { .. } => BlockType::Html,
            BlockKind::Form { .. } => BlockType::Form,
            BlockKind::Embed { .. } => BlockType::Embed,
            BlockKind::Social { .. } => BlockType::Social,
            BlockKind::Structure { .. } => BlockType::Structure,
            BlockKind::Container { .. } => BlockType::Container,
            BlockKind::Offer { .. } => BlockType::Offer,
            BlockKind::Fragment { .. } => BlockType::Fragment,
            BlockKind::Unknown { .. } => return None,
        })
    }

    /// The persisted `type`, including unrecognized ones.
    pub fn type_name(&self) -> &str {
        match &self.kind {
            BlockKind::Unknown { type_name } => type_name,
            _ => self.block_type().map(|t| t.as_str()).unwrap_or_default(),
        }
    }

    /// Whether `field` is one of the keys this block's type stores natively.
    pub fn models_field(&self, field: &str) -> bool {
        HEADER_FIELDS.contains(&field)
            || self
                .block_type()
                .is_some_and(|block_type| block_type.fields().contains(&field))
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.kind, BlockKind::Structure { .. })
    }

    pub fn columns(&self) -> Option<&[Column]> {
        match &self.kind {
            BlockKind::Structure { columns, .. } | BlockKind::Container { columns } => {
                Some(columns)
            }
            _ => None,
        }
    }

    pub fn columns_mut(&mut self) -> Option<&mut Vec<Column>> {
        match &mut self.kind {
            BlockKind::Structure { columns, .. } | BlockKind::Container { columns } => {
                Some(columns)
            }
            _ => None,
        }
    }
}

fn take_field<T, E>(fields: &mut Map<String, Value>, key: &str) -> Result<Option<T>, E>
where
    T: DeserializeOwned,
    E: de::Error,
{
    fields
        .remove(key)
        .map(|value| serde_json::from_value(value).map_err(E::custom))
        .transpose()
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;

        let id = take_field::<BlockId, D::Error>(&mut fields, "id")?
            .ok_or_else(|| de::Error::missing_field("id"))?;
        let style = take_field::<Style, D::Error>(&mut fields, "style")?.unwrap_or_default();
        let style_unlocked =
            take_field::<bool, D::Error>(&mut fields, "styleUnlocked")?.unwrap_or(false);
        let type_name = take_field::<String, D::Error>(&mut fields, "type")?
            .ok_or_else(|| de::Error::missing_field("type"))?;

        let kind = match type_name.parse::<BlockType>() {
            Ok(block_type) => {
                let mut payload = Map::new();
                payload.insert("type".to_string(), Value::String(type_name));
                for name in block_type.fields() {
                    if let Some(value) = fields.remove(*name) {
                        payload.insert(name.to_string(), value);
                    }
                }
                BlockKind::deserialize(Value::Object(payload)).map_err(de::Error::custom)?
            }
            Err(_) => BlockKind::Unknown { type_name },
        };

        Ok(Block {
            id,
            style,
            style_unlocked,
            kind,
            extra: fields,
        })
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload = match &self.kind {
            BlockKind::Unknown { type_name } => {
                let mut payload = Map::new();
                payload.insert("type".to_string(), Value::String(type_name.clone()));
                payload
            }
            kind => match serde_json::to_value(kind).map_err(ser::Error::custom)? {
                Value::Object(payload) => payload,
                _ => return Err(ser::Error::custom("block payload is not an object")),
            },
        };

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        if !self.style.is_empty() {
            map.serialize_entry("style", &self.style)?;
        }
        if self.style_unlocked {
            map.serialize_entry("styleUnlocked", &true)?;
        }
        for (key, value) in &payload {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extra {
            if !HEADER_FIELDS.contains(&key.as_str()) && !payload.contains_key(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// The document root: an ordered sequence of top-level blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockTree {
    pub blocks: Vec<Block>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }
}
