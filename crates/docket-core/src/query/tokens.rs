//! Search token generation.

/// Every contiguous run of words in `text`, shortest first from each start.
///
/// Stored alongside a document, the tokens let an equality or prefix match
/// find phrases that span spaces.
///
/// ```
/// use docket_core::query::search_tokens;
///
/// assert_eq!(
///     search_tokens("golden  city lights"),
///     ["golden", "golden city", "golden city lights", "city", "city lights", "lights"]
/// );
/// ```
pub fn search_tokens(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut tokens = Vec::with_capacity(words.len() * (words.len() + 1) / 2);

    for start in 0..words.len() {
        for end in start + 1..=words.len() {
            tokens.push(words[start..end].join(" "));
        }
    }

    tokens
}
