//! Fresh blocks as created from the palette.

use blockmail_model::{
    Block, BlockKind, BlockType, Column, FormField, IdGenerator, Variant,
};
use std::collections::BTreeMap;

pub const DEFAULT_TEXT: &str = "Write your message here.";
pub const DEFAULT_BUTTON_LABEL: &str = "Click here";
pub const DEFAULT_HTML: &str = "<p>Custom HTML</p>";
pub const DEFAULT_SOCIAL_NETWORKS: [&str; 3] = ["facebook", "instagram", "twitter"];

/// A new block of `block_type` with type-appropriate defaults.
///
/// `variant` only matters for structures; numeric variants are clamped to the
/// supported column range when parsed.
pub fn default_block(block_type: BlockType, variant: Option<&Variant>, ids: &mut IdGenerator) -> Block {
    let kind = match block_type {
        BlockType::Text => BlockKind::Text {
            content: DEFAULT_TEXT.to_string(),
        },
        BlockType::Image => BlockKind::Image {
            src: String::new(),
            alt: String::new(),
            link: None,
        },
        BlockType::Button => BlockKind::Button {
            label: DEFAULT_BUTTON_LABEL.to_string(),
            url: String::new(),
        },
        BlockType::Divider => BlockKind::Divider,
        BlockType::Spacer => BlockKind::Spacer {
            height: "24px".to_string(),
        },
        BlockType::Html => BlockKind::Html {
            html: DEFAULT_HTML.to_string(),
        },
        BlockType::Form => BlockKind::Form {
            action: String::new(),
            method: "post".to_string(),
            fields: vec![FormField {
                name: "email".to_string(),
                label: "Email".to_string(),
                input_type: "email".to_string(),
                placeholder: "you@example.com".to_string(),
                required: true,
            }],
            submit_label: "Subscribe".to_string(),
        },
        BlockType::Embed => BlockKind::Embed {
            url: String::new(),
            title: String::new(),
        },
        BlockType::Social => BlockKind::Social {
            links: DEFAULT_SOCIAL_NETWORKS
                .iter()
                .map(|network| (network.to_string(), String::new()))
                .collect::<BTreeMap<_, _>>(),
        },
        BlockType::Structure => {
            let variant = variant.cloned().unwrap_or_default();
            let columns = empty_columns(variant.column_count(), ids);
            BlockKind::Structure { variant, columns }
        }
        BlockType::Container => BlockKind::Container {
            columns: empty_columns(1, ids),
        },
        BlockType::Offer => BlockKind::Offer {
            decision_id: None,
            placement_id: None,
            offer_fallback_html: String::new(),
        },
        BlockType::Fragment => BlockKind::Fragment {
            fragment_id: String::new(),
            fragment_name: String::new(),
            fragment_version: None,
            fragment_blocks: Vec::new(),
            fragment_html: None,
            fragment_locked: false,
        },
    };
    Block::new(ids.block_id(), kind)
}

fn empty_columns(count: usize, ids: &mut IdGenerator) -> Vec<Column> {
    (0..count).map(|_| Column::new(ids.column_id())).collect()
}

/// An image block pointing at an uploaded asset.
pub fn image_block(url: &str, ids: &mut IdGenerator) -> Block {
    Block::new(
        ids.block_id(),
        BlockKind::Image {
            src: url.to_string(),
            alt: String::new(),
            link: None,
        },
    )
}
