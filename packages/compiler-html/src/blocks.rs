//! Per-block-type serializers.

use crate::compiler::{escape_html, is_self_closing, Context};
use crate::placeholders;
use crate::styles::{css_with, resolve_block_style, to_css};
use blockmail_model::variant::{equal_shares, format_percent};
use blockmail_model::{offer_marker, Block, BlockKind, Column, FormField, Style, Variant};
use std::collections::BTreeMap;

/// Build an opening tag with escaped attribute values. Empty values are dropped.
fn open_tag(tag: &str, attributes: &[(&str, &str)], css: &str) -> String {
    let mut out = format!("<{}", tag);
    for (name, value) in attributes {
        if value.is_empty() {
            continue;
        }
        out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
    }
    if !css.is_empty() {
        out.push_str(&format!(" style=\"{}\"", escape_html(css)));
    }
    if is_self_closing(tag) {
        out.push_str(" />");
    } else {
        out.push('>');
    }
    out
}

/// Remove and return `key`, leaving the rest for the main element.
fn take(style: &mut Style, key: &str, default: &str) -> String {
    style.remove(key).unwrap_or_else(|| default.to_string())
}

pub(crate) fn render_block(block: &Block, ctx: &mut Context) {
    let wrap = ctx.affordances();
    if wrap {
        let selected = ctx.options.selected.as_ref() == Some(&block.id);
        let mut class = String::from("bm-block");
        if selected {
            class.push_str(" bm-selected");
        }
        if let BlockKind::Fragment {
            fragment_locked: true,
            ..
        } = &block.kind
        {
            class.push_str(" bm-locked");
        }
        ctx.add_line(&open_tag(
            "div",
            &[
                ("class", &class),
                ("data-block-id", block.id.as_str()),
                ("data-block-type", block.type_name()),
            ],
            "",
        ));
        ctx.indent();
    }

    let style = resolve_block_style(block, ctx.body, ctx.theme());

    match &block.kind {
        BlockKind::Text { content } => render_text(content, style, ctx),
        BlockKind::Image { src, alt, link } => render_image(src, alt, link.as_deref(), style, ctx),
        BlockKind::Button { label, url } => render_button(label, url, style, ctx),
        BlockKind::Divider => ctx.add_line(&open_tag("hr", &[], &to_css(&style))),
        BlockKind::Spacer { height } => render_spacer(height, &style, ctx),
        BlockKind::Html { html } => render_raw(html, &style, ctx),
        BlockKind::Form {
            action,
            method,
            fields,
            submit_label,
        } => render_form(action, method, fields, submit_label, &style, ctx),
        BlockKind::Embed { url, title } => render_embed(url, title, &style, ctx),
        BlockKind::Social { links } => render_social(links, style, ctx),
        BlockKind::Structure { variant, columns } => {
            render_structure(variant, columns, &style, ctx)
        }
        BlockKind::Container { columns } => render_container(columns, &style, ctx),
        BlockKind::Offer {
            decision_id,
            placement_id,
            offer_fallback_html,
        } => render_offer(*decision_id, *placement_id, offer_fallback_html, ctx),
        BlockKind::Fragment {
            fragment_id,
            fragment_blocks,
            fragment_html,
            ..
        } => render_fragment(fragment_id, fragment_blocks, fragment_html.as_deref(), ctx),
        BlockKind::Unknown { .. } => {}
    }

    if wrap {
        ctx.dedent();
        ctx.add_line("</div>");
    }
}

fn render_text(content: &str, style: Style, ctx: &mut Context) {
    let content = if content.trim().is_empty() && ctx.options.simulate_content {
        placeholders::PLACEHOLDER_TEXT
    } else {
        content
    };
    let body = escape_html(content).replace("\r\n", "\n").replace('\n', "<br>");
    ctx.add_line(&format!("{}{}</p>", open_tag("p", &[], &to_css(&style)), body));
}

fn render_image(src: &str, alt: &str, link: Option<&str>, mut style: Style, ctx: &mut Context) {
    let src = if !src.trim().is_empty() {
        src.to_string()
    } else if ctx.options.simulate_content {
        placeholders::image_data_uri()
    } else {
        return;
    };

    let align = take(&mut style, "textAlign", "center");
    ctx.add_line(&open_tag("div", &[], &format!("text-align: {};", align)));
    ctx.indent();

    let img = open_tag("img", &[("src", &src), ("alt", alt)], &to_css(&style));
    match link.filter(|l| !l.trim().is_empty()) {
        Some(href) => ctx.add_line(&format!(
            "{}{}</a>",
            open_tag("a", &[("href", href), ("target", "_blank")], ""),
            img
        )),
        None => ctx.add_line(&img),
    }

    ctx.dedent();
    ctx.add_line("</div>");
}

fn render_button(label: &str, url: &str, mut style: Style, ctx: &mut Context) {
    let simulate = ctx.options.simulate_content;
    let label = match (label.trim().is_empty(), simulate) {
        (true, true) => placeholders::PLACEHOLDER_BUTTON_LABEL,
        _ => label,
    };
    let href = match (url.trim().is_empty(), simulate) {
        (false, _) => url,
        (true, true) => placeholders::PLACEHOLDER_LINK,
        (true, false) => "#",
    };

    let align = take(&mut style, "textAlign", "center");
    ctx.add_line(&open_tag("div", &[], &format!("text-align: {};", align)));
    ctx.indent();
    ctx.add_line(&format!(
        "{}{}</a>",
        open_tag("a", &[("href", href), ("target", "_blank")], &to_css(&style)),
        escape_html(label)
    ));
    ctx.dedent();
    ctx.add_line("</div>");
}

fn render_spacer(height: &str, style: &Style, ctx: &mut Context) {
    let height = if height.trim().is_empty() { "24px" } else { height.trim() };
    let css = css_with(
        &format!("height: {h}; line-height: {h}; font-size: 0;", h = height),
        style,
    );
    ctx.add_line(&format!("{}&nbsp;</div>", open_tag("div", &[], &css)));
}

fn render_raw(html: &str, style: &Style, ctx: &mut Context) {
    if style.is_empty() {
        ctx.add_line(html);
    } else {
        ctx.add_line(&open_tag("div", &[], &to_css(style)));
        ctx.add_line(html);
        ctx.add_line("</div>");
    }
}

fn render_form(
    action: &str,
    method: &str,
    fields: &[FormField],
    submit_label: &str,
    style: &Style,
    ctx: &mut Context,
) {
    let method = if method.trim().is_empty() { "post" } else { method };
    ctx.add_line(&open_tag(
        "form",
        &[("action", action), ("method", method)],
        &to_css(style),
    ));
    ctx.indent();

    for field in fields {
        if !field.label.is_empty() {
            ctx.add_line(&format!(
                "{}{}</label>",
                open_tag("label", &[("for", &field.name)], "display: block; margin-bottom: 4px;"),
                escape_html(&field.label)
            ));
        }
        let input_type = if field.input_type.is_empty() { "text" } else { &field.input_type };
        let mut input = open_tag(
            "input",
            &[
                ("type", input_type),
                ("id", &field.name),
                ("name", &field.name),
                ("placeholder", &field.placeholder),
            ],
            "display: block; width: 100%; padding: 8px; margin-bottom: 12px; box-sizing: border-box;",
        );
        if field.required {
            input = input.replacen(" />", " required />", 1);
        }
        ctx.add_line(&input);
    }

    let label = if submit_label.trim().is_empty() { "Submit" } else { submit_label };
    ctx.add_line(&format!(
        "{}{}</button>",
        open_tag(
            "button",
            &[("type", "submit")],
            "padding: 10px 20px; background-color: #2563eb; color: #ffffff; border: 0; border-radius: 4px;"
        ),
        escape_html(label)
    ));

    ctx.dedent();
    ctx.add_line("</form>");
}

fn render_embed(url: &str, title: &str, style: &Style, ctx: &mut Context) {
    if url.trim().is_empty() {
        if ctx.options.simulate_content {
            ctx.add_line(&format!(
                "{}Embedded content</div>",
                open_tag(
                    "div",
                    &[("class", "bm-embed-placeholder")],
                    &css_with(
                        "padding: 48px 16px; text-align: center; background-color: #e5e7eb; color: #6b7280;",
                        style
                    )
                )
            ));
        }
        return;
    }

    ctx.add_line(&open_tag("div", &[], &to_css(style)));
    ctx.indent();
    ctx.add_line(&format!(
        "{}</iframe>",
        open_tag(
            "iframe",
            &[
                ("src", url),
                ("title", title),
                ("width", "100%"),
                ("height", "315"),
                ("frameborder", "0"),
                ("allowfullscreen", "true"),
            ],
            "border: 0;"
        )
    ));
    ctx.dedent();
    ctx.add_line("</div>");
}

fn network_label(network: &str) -> String {
    let mut chars = network.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn render_social(links: &BTreeMap<String, String>, mut style: Style, ctx: &mut Context) {
    let align = take(&mut style, "textAlign", "center");
    let color = style.remove("color");
    let link_css = format!(
        "display: inline-block; margin: 0 6px; text-decoration: none; color: {};",
        color.as_deref().unwrap_or("#2563eb")
    );

    ctx.add_line(&open_tag(
        "div",
        &[("class", "bm-social")],
        &css_with(&format!("text-align: {};", align), &style),
    ));
    ctx.indent();
    for (network, url) in links {
        let href = if !url.trim().is_empty() {
            url.clone()
        } else if ctx.options.simulate_content {
            placeholders::social_url(network)
        } else {
            continue;
        };
        ctx.add_line(&format!(
            "{}{}</a>",
            open_tag(
                "a",
                &[("href", &href), ("target", "_blank"), ("data-network", network)],
                &link_css
            ),
            escape_html(&network_label(network))
        ));
    }
    ctx.dedent();
    ctx.add_line("</div>");
}

fn render_column(column: &Column, width: Option<&str>, ctx: &mut Context) {
    let mut css = String::from("box-sizing: border-box;");
    if let Some(width) = width {
        css = format!("flex: 0 0 {w}; max-width: {w}; {css}", w = width);
    }
    let css = css_with(&css, &column.style);

    let affordances = ctx.affordances();
    let class = if affordances {
        "bm-column bm-drop-zone"
    } else {
        "bm-column"
    };
    let column_id = if affordances { column.id.as_str() } else { "" };
    ctx.add_line(&open_tag(
        "div",
        &[("class", class), ("data-column-id", column_id)],
        &css,
    ));
    ctx.indent();
    if column.blocks.is_empty() && affordances {
        ctx.add_line("<div class=\"bm-drop-hint\">Drop content here</div>");
    }
    for block in &column.blocks {
        render_block(block, ctx);
    }
    ctx.dedent();
    ctx.add_line("</div>");
}

fn render_structure(variant: &Variant, columns: &[Column], style: &Style, ctx: &mut Context) {
    // Persisted columns may disagree with the variant; share evenly then.
    let widths: Vec<String> = if columns.len() == variant.column_count() {
        variant.css_widths()
    } else {
        equal_shares(columns.len())
            .into_iter()
            .map(format_percent)
            .collect()
    };

    ctx.add_line(&open_tag(
        "div",
        &[("class", "bm-structure"), ("data-variant", &variant.to_string())],
        &to_css(style),
    ));
    ctx.indent();
    for (column, width) in columns.iter().zip(widths.iter()) {
        render_column(column, Some(width), ctx);
    }
    ctx.dedent();
    ctx.add_line("</div>");
}

fn render_container(columns: &[Column], style: &Style, ctx: &mut Context) {
    ctx.add_line(&open_tag("div", &[("class", "bm-container")], &to_css(style)));
    ctx.indent();
    for column in columns {
        render_column(column, None, ctx);
    }
    ctx.dedent();
    ctx.add_line("</div>");
}

fn render_offer(
    decision_id: Option<u64>,
    placement_id: Option<u64>,
    fallback_html: &str,
    ctx: &mut Context,
) {
    match (decision_id, placement_id) {
        (Some(decision), Some(placement)) => {
            ctx.add_line(&offer_marker(decision, placement, fallback_html));
        }
        _ if !fallback_html.trim().is_empty() => ctx.add_line(fallback_html),
        _ if ctx.options.simulate_content => ctx.add_line(
            "<div class=\"bm-offer-placeholder\" style=\"padding: 16px; text-align: center; border: 1px dashed #9ca3af; color: #6b7280;\">Offer block: choose a decision and placement to preview offers</div>",
        ),
        _ => {}
    }
}

fn render_fragment(
    fragment_id: &str,
    fragment_blocks: &[Block],
    fragment_html: Option<&str>,
    ctx: &mut Context,
) {
    let affordances = ctx.affordances();
    if affordances {
        ctx.add_line(&open_tag(
            "div",
            &[("class", "bm-fragment"), ("data-fragment-id", fragment_id)],
            "",
        ));
        ctx.indent();
    }

    match fragment_html.filter(|html| !html.trim().is_empty()) {
        Some(html) => ctx.add_line(html),
        None => {
            // Cached blocks are not addressable from the canvas.
            ctx.detach();
            for block in fragment_blocks {
                render_block(block, ctx);
            }
            ctx.reattach();
        }
    }

    if affordances {
        ctx.dedent();
        ctx.add_line("</div>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_tag_escapes_and_drops_empty() {
        assert_eq!(
            open_tag("a", &[("href", "x?a=1&b=\"2\""), ("title", "")], "color: red;"),
            "<a href=\"x?a=1&amp;b=&quot;2&quot;\" style=\"color: red;\">"
        );
        assert_eq!(open_tag("img", &[("src", "s")], ""), "<img src=\"s\" />");
    }

    #[test]
    fn test_network_label() {
        assert_eq!(network_label("instagram"), "Instagram");
        assert_eq!(network_label(""), "");
    }
}
