/// Lowercases, replaces punctuation with spaces, and collapses runs of
/// whitespace. Both the categorizer and the merchant grouping key use
/// this so the same raw description always normalizes identically.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() || c.is_ascii_punctuation() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        for lc in c.to_lowercase() {
            out.push(lc);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases() {
        assert_eq!(normalize("STARBUCKS"), "starbucks");
    }

    #[test]
    fn punctuation_becomes_single_space() {
        assert_eq!(normalize("AMZN*Mktp US"), "amzn mktp us");
        assert_eq!(normalize("UBER   *EATS"), "uber eats");
    }

    #[test]
    fn leading_and_trailing_junk_is_trimmed() {
        assert_eq!(normalize("  **Netflix.com  "), "netflix com");
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("***"), "");
    }
}
