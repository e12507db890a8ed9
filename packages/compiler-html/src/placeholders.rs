//! Stand-in content for "simulate content" renders.
//!
//! Authoring previews only. Export renders never call into this module.

pub const PLACEHOLDER_TEXT: &str =
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor incididunt ut labore.";

pub const PLACEHOLDER_BUTTON_LABEL: &str = "Shop now";

pub const PLACEHOLDER_LINK: &str = "https://example.com";

const PLACEHOLDER_SVG: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="600" height="300" viewBox="0 0 600 300">"#,
    r##"<rect width="600" height="300" fill="#e5e7eb"/>"##,
    r##"<text x="300" y="150" fill="#6b7280" font-family="Arial, sans-serif" font-size="24" "##,
    r#"text-anchor="middle" dominant-baseline="middle">600 × 300</text>"#,
    "</svg>"
);

/// Data URI of a neutral 600×300 placeholder image.
pub fn image_data_uri() -> String {
    format!(
        "data:image/svg+xml;charset=UTF-8,{}",
        urlencoding::encode(PLACEHOLDER_SVG)
    )
}

/// Placeholder profile URL for a social network.
pub fn social_url(network: &str) -> String {
    let slug: String = network
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    format!("https://www.{}.com/", slug)
}
