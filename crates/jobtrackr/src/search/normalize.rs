use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text for comparison: lowercase, strip diacritics, and collapse `/`, `-` and
/// whitespace runs into single spaces.
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.to_lowercase().nfd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_whitespace() || ch == '/' || ch == '-' {
            pending_space = true;
            continue;
        }
        if pending_space && !folded.is_empty() {
            folded.push(' ');
        }
        pending_space = false;
        folded.push(ch);
    }

    folded
}
