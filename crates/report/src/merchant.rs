use regex::Regex;
use std::sync::OnceLock;

use finsight_core::text::normalize;

/// Trailing store numbers and reference codes, e.g. the tail of
/// "STARBUCKS #1234" or "AMZN MKTP US*2A34J".
fn trailing_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\s+\S*\d\S*)+$").expect("trailing-reference regex"))
}

/// Grouping key for merchant-level aggregation: the normalized
/// description with trailing digit-bearing tokens stripped, so
/// different store numbers of one merchant collapse together.
pub fn merchant_key(description: &str) -> String {
    let norm = normalize(description);
    let stripped = trailing_reference().replace(&norm, "");
    if stripped.is_empty() {
        norm
    } else {
        stripped.into_owned()
    }
}
