//! Style cascade.
//!
//! A block's effective style is resolved from ordered layers, low to high:
//!
//! 1. renderer defaults for the block type
//! 2. body-derived defaults (font family, text colour)
//! 3. theme component style for the block type, unless `styleUnlocked`
//! 4. the block's own style
//!
//! Nothing here writes back into the stored block.

use blockmail_model::{Block, BlockType, BodyStyle, Style, Theme};

/// Ordered style layers, lowest precedence first.
#[derive(Debug, Default)]
pub struct StyleLayers<'a> {
    layers: Vec<std::borrow::Cow<'a, Style>>,
}

impl<'a> StyleLayers<'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push_owned(&mut self, style: Style) -> &mut Self {
        self.layers.push(std::borrow::Cow::Owned(style));
        self
    }

    pub fn push(&mut self, style: &'a Style) -> &mut Self {
        self.layers.push(std::borrow::Cow::Borrowed(style));
        self
    }

    pub fn resolve(&self) -> Style {
        let mut resolved = Style::new();
        for layer in &self.layers {
            for (key, value) in layer.iter() {
                resolved.insert(key.clone(), value.clone());
            }
        }
        resolved
    }
}

fn style_of(pairs: &[(&str, &str)]) -> Style {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Renderer defaults per block type.
pub fn type_defaults(block_type: BlockType) -> Style {
    match block_type {
        BlockType::Text => style_of(&[
            ("color", "#1f2933"),
            ("fontFamily", "Arial, sans-serif"),
            ("fontSize", "14px"),
            ("lineHeight", "1.5"),
            ("margin", "0 0 12px 0"),
            ("textAlign", "left"),
        ]),
        BlockType::Image => style_of(&[
            ("border", "0"),
            ("height", "auto"),
            ("maxWidth", "100%"),
            ("textAlign", "center"),
        ]),
        BlockType::Button => style_of(&[
            ("backgroundColor", "#2563eb"),
            ("borderRadius", "4px"),
            ("color", "#ffffff"),
            ("display", "inline-block"),
            ("fontFamily", "Arial, sans-serif"),
            ("fontSize", "14px"),
            ("fontWeight", "bold"),
            ("padding", "12px 24px"),
            ("textAlign", "center"),
            ("textDecoration", "none"),
        ]),
        BlockType::Divider => style_of(&[
            ("border", "none"),
            ("borderTop", "1px solid #e5e7eb"),
            ("margin", "16px 0"),
        ]),
        BlockType::Social => style_of(&[
            ("fontFamily", "Arial, sans-serif"),
            ("fontSize", "14px"),
            ("textAlign", "center"),
        ]),
        BlockType::Form => style_of(&[("fontFamily", "Arial, sans-serif"), ("fontSize", "14px")]),
        BlockType::Structure => style_of(&[("display", "flex"), ("width", "100%")]),
        BlockType::Container => style_of(&[("padding", "16px")]),
        BlockType::Spacer
        | BlockType::Html
        | BlockType::Embed
        | BlockType::Offer
        | BlockType::Fragment => Style::new(),
    }
}

/// Defaults inherited from the document body.
fn body_defaults(block_type: BlockType, body: &BodyStyle) -> Style {
    let mut style = Style::new();
    match block_type {
        BlockType::Text => {
            style.insert("fontFamily".to_string(), body.font_family.clone());
            style.insert("color".to_string(), body.text_color.clone());
        }
        BlockType::Button | BlockType::Social | BlockType::Form => {
            style.insert("fontFamily".to_string(), body.font_family.clone());
        }
        _ => {}
    }
    style
}

/// Effective style of `block`. Unknown block types resolve to their own style.
pub fn resolve_block_style(block: &Block, body: &BodyStyle, theme: Option<&Theme>) -> Style {
    let Some(block_type) = block.block_type() else {
        return block.style.clone();
    };

    let mut layers = StyleLayers::new();
    layers.push_owned(type_defaults(block_type));
    layers.push_owned(body_defaults(block_type, body));
    if !block.style_unlocked {
        if let Some(component) = theme.and_then(|t| t.component_style(block_type.as_str())) {
            layers.push(component);
        }
    }
    layers.push(&block.style);
    layers.resolve()
}

/// `fontSize` → `font-size`
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Serialize a style map to an inline CSS declaration list. Empty values are skipped.
pub fn to_css(style: &Style) -> String {
    style
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| format!("{}: {};", kebab_case(key), value.trim()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join fixed declarations with a resolved style.
pub fn css_with(prefix: &str, style: &Style) -> String {
    let rest = to_css(style);
    match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest,
        (false, true) => prefix.to_string(),
        (false, false) => format!("{} {}", prefix, rest),
    }
}
