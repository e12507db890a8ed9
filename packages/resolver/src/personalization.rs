//! `{{table.field}}` token substitution.
//!
//! One left-to-right pass. Substituted values are never re-scanned, and a
//! token whose field is missing (or when there is no profile at all) stays
//! verbatim so downstream send-time merging can still see it.

use crate::Profile;
use blockmail_compiler_html::escape_html;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

pub const TOKEN_PATTERN: &str = r"\{\{(\w+)\.(\w+)\}\}";

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// Replace tokens with profile values.
///
/// A value is its string form (numbers and booleans as JSON prints them),
/// HTML-escaped, since it lands in markup: a stored `<b>` shows as text.
/// Runs on the rendered document before offers resolve, so tokens inside
/// offer content are left for the send-time merge.
pub fn merge(html: &str, profile: Option<&Profile>) -> String {
    let Some(profile) = profile else {
        return html.to_string();
    };

    let mut replaced = 0usize;
    let merged = token_regex().replace_all(html, |caps: &Captures| match profile.text(&caps[2]) {
        Some(value) => {
            replaced += 1;
            escape_html(&value)
        }
        None => caps[0].to_string(),
    });
    debug!(replaced, "Merged personalization tokens");
    merged.into_owned()
}

/// Distinct `table.field` tokens in `html`, in first-seen order.
pub fn tokens(html: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in token_regex().captures_iter(html) {
        let token = format!("{}.{}", &caps[1], &caps[2]);
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: serde_json::Value) -> Profile {
        Profile::from_value(value).unwrap()
    }

    #[test]
    fn test_merge_known_field() {
        let ana = profile(json!({ "first_name": "Ana" }));
        assert_eq!(merge("Hi {{contacts.first_name}}", Some(&ana)), "Hi Ana");
    }

    #[test]
    fn test_missing_field_or_profile_is_unchanged() {
        let empty = profile(json!({}));
        assert_eq!(
            merge("Hi {{contacts.first_name}}", Some(&empty)),
            "Hi {{contacts.first_name}}"
        );
        assert_eq!(
            merge("Hi {{contacts.first_name}}", None),
            "Hi {{contacts.first_name}}"
        );
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let tricky = profile(json!({ "a": "{{contacts.b}}", "b": "nope" }));
        assert_eq!(merge("{{contacts.a}}", Some(&tricky)), "{{contacts.b}}");
    }

    #[test]
    fn test_values_are_escaped_and_stringified() {
        let p = profile(json!({ "name": "<b>Bo</b>", "points": 12, "vip": true, "city": null }));
        assert_eq!(
            merge("{{c.name}} {{c.points}} {{c.vip}} {{c.city}}", Some(&p)),
            "&lt;b&gt;Bo&lt;/b&gt; 12 true {{c.city}}"
        );
    }

    #[test]
    fn test_malformed_tokens_pass_through() {
        let p = profile(json!({ "x": "1" }));
        assert_eq!(merge("{{x}} {{a.b.x}} {{ a.x }}", Some(&p)), "{{x}} {{a.b.x}} {{ a.x }}");
    }

    #[test]
    fn test_tokens_listing() {
        assert_eq!(
            tokens("{{c.a}} {{c.b}} {{c.a}}"),
            vec!["c.a".to_string(), "c.b".to_string()]
        );
    }
}
