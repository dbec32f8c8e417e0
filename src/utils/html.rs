use ammonia;

/// Clean HTML content using the ammonia library.
///
/// This employs a whitelist-based sanitization strategy: it preserves safe tags
/// (like <b>, <p>) while stripping dangerous tags (like <script>, <iframe>)
/// and malicious attributes (like onclick).
///
/// Applied to the free-text fields that reach other users (profile blurbs,
/// review comments) before they are persisted.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
