//! Output text formatting.

/// Replaces every tab with `width` spaces.
#[must_use]
pub fn expand_tabs(text: &str, width: usize) -> String {
    text.replace('\t', &" ".repeat(width))
}
