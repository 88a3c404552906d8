//! Plain-text helpers used by the query builder and projections.
//!
//! All functions are pure and total: malformed markup degrades to
//! best-effort text, never to an error.
//!
//! | Function | Used for |
//! |----------|----------|
//! | [`strip_all_tags`] | `content` fields |
//! | [`strip_shortcodes`] | content filtering before the full projection |
//! | [`trim_words`] | `excerpt` field |
//! | [`sanitize_text_field`] | the `search` query parameter |

use std::sync::LazyLock;

use regex::Regex;

/// Markup removal, applied in order: script/style blocks with their
/// contents, comments, then every remaining tag. A tag left open at the
/// end of the input swallows the rest of it.
static MARKUP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?is)<script[^>]*?>.*?</script\s*>").unwrap(),
        Regex::new(r"(?is)<style[^>]*?>.*?</style\s*>").unwrap(),
        Regex::new(r"(?s)<!--.*?-->").unwrap(),
        // A `<` followed by a space or digit is text, not a tag.
        Regex::new(r"<[A-Za-z/!?][^>]*(?:>|$)").unwrap(),
    ]
});

/// `[name ...]` or `[/name]`. Attributes may not contain brackets.
static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[/?[A-Za-z][A-Za-z0-9_-]*(?:[ /][^\[\]]*)?\]").unwrap());

static PERCENT_OCTET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[0-9A-Fa-f]{2}").unwrap());

static LINE_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\t ]+").unwrap());

/// Removes `<script>`/`<style>` blocks (with their contents), then every
/// remaining tag and comment, and trims surrounding whitespace.
///
/// A `<` that does not open a tag (e.g. `a < b`) is kept.
pub fn strip_all_tags(input: &str) -> String {
    let mut text = input.to_string();
    for pattern in MARKUP_PATTERNS.iter() {
        text = pattern.replace_all(&text, "").into_owned();
    }
    text.trim().to_string()
}

/// Removes shortcode markers such as `[gallery ids="1,2"]` or `[/caption]`,
/// keeping any text they enclose.
pub fn strip_shortcodes(input: &str) -> String {
    SHORTCODE_RE.replace_all(input, "").into_owned()
}

/// Keeps the first `num_words` whitespace-separated words of the tag-stripped
/// text. When words were dropped, `more` is appended.
///
/// ```rust
/// use press_core::text::trim_words;
///
/// assert_eq!(trim_words("<p>one two three</p>", 2, "..."), "one two...");
/// assert_eq!(trim_words("one two", 5, "..."), "one two");
/// ```
pub fn trim_words(text: &str, num_words: usize, more: &str) -> String {
    let stripped = strip_all_tags(text);
    let words: Vec<&str> = stripped.split_whitespace().collect();
    if words.len() > num_words {
        let mut out = words[..num_words].join(" ");
        out.push_str(more);
        out
    } else {
        words.join(" ")
    }
}

/// Cleans a free-text request parameter: strips markup, drops
/// percent-encoded octets, collapses line breaks, tabs and runs of spaces
/// to a single space, and trims.
pub fn sanitize_text_field(input: &str) -> String {
    let stripped = strip_all_tags(input);
    let without_octets = PERCENT_OCTET_RE.replace_all(&stripped, "");
    LINE_SPACE_RE
        .replace_all(&without_octets, " ")
        .trim_matches(' ')
        .to_string()
}
