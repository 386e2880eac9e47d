//! Choosing which path answers a turn

use crate::classifier::is_news_query;

/// The path a turn takes through the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Grounded on freshly fetched headlines
    News,
    /// Single-shot vision request, no history
    Image,
    /// Plain chat over the session window
    Text,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::News => "news",
            Route::Image => "image",
            Route::Text => "text",
        }
    }
}

/// News needs a keyword and no image; an image always wins over text.
pub fn classify(message: &str, has_image: bool) -> Route {
    if has_image {
        Route::Image
    } else if is_news_query(message) {
        Route::News
    } else {
        Route::Text
    }
}
