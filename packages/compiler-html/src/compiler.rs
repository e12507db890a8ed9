use crate::blocks::render_block;
use blockmail_model::{Alignment, Block, BlockId, BlockTree, BodyStyle, Document, Theme};
use std::borrow::Cow;
use tracing::{debug, instrument};

/// Options for HTML rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Wrap blocks and columns with editor affordances (ids, selection, drop hints)
    pub editor: bool,
    /// Substitute placeholder text/images/links for empty fields
    pub simulate_content: bool,
    /// Block to mark as selected (editor renders only)
    pub selected: Option<BlockId>,
    /// Theme layered under block styles
    pub theme: Option<Theme>,
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            editor: false,
            simulate_content: false,
            selected: None,
            theme: None,
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

impl RenderOptions {
    /// Sendable output: no affordances, no simulated content.
    pub fn export() -> Self {
        Self::default()
    }

    /// Editable canvas.
    pub fn canvas(selected: Option<BlockId>) -> Self {
        Self {
            editor: true,
            simulate_content: true,
            selected,
            ..Self::default()
        }
    }

    /// Simulated preview pass, the input to personalization and offer resolution.
    pub fn preview() -> Self {
        Self {
            simulate_content: true,
            ..Self::default()
        }
    }

    pub fn with_theme(mut self, theme: Option<Theme>) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_simulated_content(mut self, simulate: bool) -> Self {
        self.simulate_content = simulate;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

pub(crate) struct Context<'a> {
    pub(crate) options: &'a RenderOptions,
    pub(crate) body: &'a BodyStyle,
    depth: usize,
    /// >0 while rendering content that is not addressable (fragment caches)
    detached: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a RenderOptions, body: &'a BodyStyle) -> Self {
        Self {
            options,
            body,
            depth: 0,
            detached: 0,
            buffer: String::new(),
        }
    }

    pub(crate) fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub(crate) fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    /// Editor affordances apply to addressable content only.
    pub(crate) fn affordances(&self) -> bool {
        self.options.editor && self.detached == 0
    }

    pub(crate) fn detach(&mut self) {
        self.detached += 1;
    }

    pub(crate) fn reattach(&mut self) {
        if self.detached > 0 {
            self.detached -= 1;
        }
    }

    pub(crate) fn theme(&self) -> Option<&'a Theme> {
        self.options.theme.as_ref()
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Render a block tree into the document body wrapper.
///
/// Pure: identical inputs always produce identical output, and neither the
/// tree nor the body style is touched.
#[instrument(skip_all, fields(blocks = blocks.len(), editor = options.editor))]
pub fn render(blocks: &BlockTree, body: &BodyStyle, options: &RenderOptions) -> String {
    let body = themed_body(body, options);
    let mut ctx = Context::new(options, &body);
    render_body(blocks, &mut ctx);
    let html = ctx.get_output();
    debug!(bytes = html.len(), "Rendered block tree");
    html
}

/// Render only the blocks, without the body wrapper.
pub fn render_blocks(blocks: &[Block], body: &BodyStyle, options: &RenderOptions) -> String {
    let body = themed_body(body, options);
    let mut ctx = Context::new(options, &body);
    for block in blocks {
        render_block(block, &mut ctx);
    }
    ctx.get_output()
}

/// Render a standalone HTML page.
///
/// In export mode a non-empty `htmlOverride` replaces the generated page.
pub fn render_document(document: &Document, options: &RenderOptions) -> String {
    if !options.editor && !options.simulate_content {
        if let Some(html) = document.html_override() {
            debug!("Using HTML override");
            return html.to_string();
        }
    }

    let body = themed_body(&document.body_style, options);
    let body = body.as_ref();
    let mut ctx = Context::new(options, body);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();

    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    if let Some(css) = body.raw_css.as_deref().filter(|css| !css.trim().is_empty()) {
        ctx.add_line("<style>");
        ctx.add_line(css);
        ctx.add_line("</style>");
    }
    ctx.dedent();
    ctx.add_line("</head>");

    ctx.add_line(&format!(
        "<body style=\"margin: 0; padding: 0; background-color: {};\">",
        escape_html(&body.viewport_background)
    ));
    ctx.indent();
    ctx.add_line(&format!(
        "<div class=\"bm-viewport\" style=\"background-color: {}; padding: {};\">",
        escape_html(&body.viewport_background),
        escape_html(&body.padding)
    ));
    ctx.indent();
    render_body(&document.blocks, &mut ctx);
    ctx.dedent();
    ctx.add_line("</div>");
    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    ctx.get_output()
}

/// The body style with the theme's body patch applied on top.
fn themed_body<'a>(body: &'a BodyStyle, options: &RenderOptions) -> Cow<'a, BodyStyle> {
    match &options.theme {
        Some(theme) => Cow::Owned(body.patched(&theme.body)),
        None => Cow::Borrowed(body),
    }
}

fn render_body(blocks: &BlockTree, ctx: &mut Context) {
    let body = ctx.body;
    let margin = match body.align {
        Alignment::Left => "0 auto 0 0",
        Alignment::Center => "0 auto",
        Alignment::Right => "0 0 0 auto",
    };
    let css = format!(
        "max-width: {}; margin: {}; background-color: {}; font-family: {}; color: {};",
        body.max_width_css(),
        margin,
        body.background_color,
        body.font_family,
        body.text_color
    );
    ctx.add_line(&format!(
        "<div class=\"bm-body\" style=\"{}\">",
        escape_html(&css)
    ));
    ctx.indent();
    for block in &blocks.blocks {
        render_block(block, ctx);
    }
    ctx.dedent();
    ctx.add_line("</div>");
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub(crate) fn is_self_closing(tag: &str) -> bool {
    matches!(tag, "img" | "input" | "br" | "hr" | "meta" | "link")
}
