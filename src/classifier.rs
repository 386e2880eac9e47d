//! Detects turns that ask for current medical news

/// Words that mark a request for live news rather than general advice
pub const NEWS_KEYWORDS: &[&str] = &[
    "news",
    "update",
    "latest",
    "research",
    "breakthrough",
    "recent",
    "headlines",
];

/// Case-insensitive substring match against [`NEWS_KEYWORDS`].
///
/// Matches anywhere in the text, so "updates" and "researchers" count too.
pub fn is_news_query(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lowered = text.to_lowercase();
    NEWS_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}
