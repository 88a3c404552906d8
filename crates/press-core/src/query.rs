//! Query builder: loosely-typed request parameters → [`ListingFilter`].
//!
//! Parsing is permissive by contract. Nothing here returns an error;
//! malformed values coerce to "no filter" or to the first page.
//!
//! | Key | Coercion |
//! |-----|----------|
//! | `search` | sanitized text, empty when absent |
//! | `page` | leading integer, clamped to `>= 1` |
//! | `per_page` | leading integer, passed through unclamped |
//! | `categories` | leading integer, `<= 0` means no filter |
//! | `tags` | leading integer, `<= 0` means no filter |

use std::collections::HashMap;

use serde::Serialize;

use crate::text::sanitize_text_field;

/// Raw query-string parameters as received from the transport.
pub type RawParams = HashMap<String, String>;

/// Page size used when the caller does not send `per_page`.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// A validated listing request for [`ContentStore::list_posts`](crate::store::ContentStore::list_posts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingFilter {
    /// Sanitized search text; empty means no text filter.
    pub search: String,
    /// One-based page number, always `>= 1`.
    pub page: i64,
    /// Caller-supplied page size. Zero and negative values reach the store
    /// unchanged; see [`ContentStore`](crate::store::ContentStore) for how
    /// each backend interprets them.
    pub per_page: i64,
    /// Exact category term ID to require.
    pub category: Option<i64>,
    /// Exact tag term ID to require.
    pub tag: Option<i64>,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            category: None,
            tag: None,
        }
    }
}

impl ListingFilter {
    pub fn has_search(&self) -> bool {
        !self.search.is_empty()
    }

    /// Number of matches to skip for the requested page, given an
    /// effective (positive) page size.
    pub fn offset(&self, page_size: i64) -> i64 {
        (self.page - 1).saturating_mul(page_size)
    }
}

/// Builds a filter using [`DEFAULT_PER_PAGE`] when `per_page` is absent.
pub fn build_filter(raw: &RawParams) -> ListingFilter {
    build_filter_with_default(raw, DEFAULT_PER_PAGE)
}

/// Builds a filter, falling back to `default_per_page` when the request
/// carries no `per_page` key.
pub fn build_filter_with_default(raw: &RawParams, default_per_page: i64) -> ListingFilter {
    let search = raw
        .get("search")
        .map(|s| sanitize_text_field(s))
        .unwrap_or_default();

    let page = raw.get("page").map(|p| parse_int(p).max(1)).unwrap_or(1);

    let per_page = raw
        .get("per_page")
        .map(|p| parse_int(p))
        .unwrap_or(default_per_page);

    ListingFilter {
        search,
        page,
        per_page,
        category: raw.get("categories").and_then(|v| term_id(v)),
        tag: raw.get("tags").and_then(|v| term_id(v)),
    }
}

fn term_id(raw: &str) -> Option<i64> {
    let id = parse_int(raw);
    (id > 0).then_some(id)
}

/// Leading-integer coercion: optional whitespace, optional sign, then the
/// longest run of ASCII digits. Anything else is 0. Overflow saturates.
pub fn parse_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(|b| b.is_ascii_digit()) {
        let d = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_params_give_defaults() {
        let f = build_filter(&RawParams::new());
        assert_eq!(f, ListingFilter::default());
        assert!(!f.has_search());
    }

    #[test]
    fn page_is_never_below_one() {
        for raw in ["0", "-4", "abc", "", "  ", "-", "+0"] {
            let f = build_filter(&params(&[("page", raw)]));
            assert_eq!(f.page, 1, "page={:?}", raw);
        }
        assert_eq!(build_filter(&params(&[("page", "3")])).page, 3);
        assert_eq!(build_filter(&params(&[("page", " 7th")])).page, 7);
    }

    #[test]
    fn per_page_passes_through_unvalidated() {
        assert_eq!(build_filter(&params(&[("per_page", "5")])).per_page, 5);
        assert_eq!(build_filter(&params(&[("per_page", "0")])).per_page, 0);
        assert_eq!(build_filter(&params(&[("per_page", "-1")])).per_page, -1);
        assert_eq!(build_filter(&params(&[("per_page", "x")])).per_page, 0);
    }

    #[test]
    fn per_page_default_is_configurable() {
        let f = build_filter_with_default(&RawParams::new(), 25);
        assert_eq!(f.per_page, 25);
    }

    #[test]
    fn non_positive_term_ids_mean_no_filter() {
        for raw in ["0", "-2", "news", ""] {
            let f = build_filter(&params(&[("categories", raw), ("tags", raw)]));
            assert_eq!(f.category, None);
            assert_eq!(f.tag, None);
        }
        let f = build_filter(&params(&[("categories", "3"), ("tags", "12")]));
        assert_eq!(f.category, Some(3));
        assert_eq!(f.tag, Some(12));
    }

    #[test]
    fn search_is_sanitized() {
        let f = build_filter(&params(&[("search", "  <em>recipe</em>\n ")]));
        assert_eq!(f.search, "recipe");
        let f = build_filter(&params(&[("search", "   ")]));
        assert!(!f.has_search());
    }

    #[test]
    fn parse_int_leading_digits() {
        assert_eq!(parse_int("12abc"), 12);
        assert_eq!(parse_int("  -3"), -3);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int("99999999999999999999999"), i64::MAX);
        assert_eq!(parse_int("-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn offset_uses_page() {
        let f = build_filter(&params(&[("page", "3")]));
        assert_eq!(f.offset(5), 10);
    }
}
