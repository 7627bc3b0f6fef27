pub mod http;
pub mod provider;
pub mod types;

pub use http::HttpBookService;
pub use provider::{BookService, FeedbackRequest, ServiceError};
pub use types::{
    Analysis, Book, BookRank, EmotionCount, FeedbackResult, RecommendationResult, SessionStats,
};
