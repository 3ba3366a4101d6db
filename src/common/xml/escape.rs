use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

// Character data only needs the markup-significant characters escaped
static TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">"])
        .expect("Failed to build XML text escaper")
});

// Attribute values are always written double-quoted
static ATTRIBUTE_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "\t", "\n", "\r"])
        .expect("Failed to build XML attribute escaper")
});

// Use LeftmostLongest to ensure longer entities are matched first (e.g., &amp; instead of &lt;)
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("Failed to build XML unescaper")
});

/// Escape character data.
///
/// # Examples
///
/// ```
/// use runweave::common::xml::escape_text;
/// assert_eq!(escape_text("a & b"), "a &amp; b");
/// assert_eq!(escape_text("<tag>\"hello\"</tag>"), "&lt;tag&gt;\"hello\"&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_text(s: &str) -> String {
    TEXT_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"])
}

/// Escape a double-quoted attribute value.
///
/// Whitespace other than the plain space is written as a character
/// reference so that attribute value normalization keeps it intact.
///
/// # Examples
///
/// ```
/// use runweave::common::xml::escape_attribute;
/// assert_eq!(escape_attribute("say \"hi\""), "say &quot;hi&quot;");
/// assert_eq!(escape_attribute("a\tb"), "a&#9;b");
/// ```
#[inline]
pub fn escape_attribute(s: &str) -> String {
    ATTRIBUTE_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&#9;", "&#10;", "&#13;"])
}

/// Unescape XML special characters.
///
/// Replaces the five standard XML entities with their corresponding characters.
/// Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use runweave::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;"); // &amp; is matched first
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;"); // unknown entity
/// ```
#[inline]
pub fn unescape_xml(s: &str) -> String {
    XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"])
}

/// Resolve the body of a general entity or character reference
/// (the part between `&` and `;`).
///
/// Returns `None` for names that are neither predefined entities nor
/// valid character references.
pub fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_escaping_leaves_quotes() {
        assert_eq!(escape_text("it's \"x\" & y"), "it's \"x\" &amp; y");
    }

    #[test]
    fn test_attribute_escaping() {
        assert_eq!(escape_attribute("<a>&\"\n"), "&lt;a&gt;&amp;&quot;&#10;");
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("amp"), Some('&'));
        assert_eq!(resolve_reference("#x41"), Some('A'));
        assert_eq!(resolve_reference("#160"), Some('\u{a0}'));
        assert_eq!(resolve_reference("nbsp"), None);
        assert_eq!(resolve_reference("#xD800"), None);
    }
}
