//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::core::input::RequestPayload;
use crate::service::{
    BookRank, BookService, EmotionCount, FeedbackRequest, FeedbackResult, RecommendationResult,
    ServiceError, SessionStats,
};

/// A recommendation shaped like the backend's `smart_recommender` output.
pub fn sample_result() -> RecommendationResult {
    RecommendationResult::from_json(json!({
        "libro": {
            "titulo": "Pedro Páramo",
            "autor": "Juan Rulfo",
            "descripcion": "Un hombre busca a su padre en un pueblo de murmullos.",
            "emoji": "🌵",
            "color": "#C4A484"
        },
        "confianza": 0.8,
        "explicacion": "Basándome en tu estado 'triste', te recomiendo 'Pedro Páramo'.",
        "alternativas": ["Rayuela", "Aura"],
        "analisis": {
            "emotion": "triste",
            "emotion_confidence": 0.8,
            "score": 6.5,
            "special_contexts": []
        }
    }))
    .expect("sample recommendation is valid")
}

pub fn sample_stats() -> SessionStats {
    SessionStats {
        total_interactions: 3,
        session_recommended: 2,
        top_emotions: vec![EmotionCount {
            emotion: "triste".into(),
            count: 2,
        }],
        top_books: vec![BookRank {
            book: "Pedro Páramo".into(),
            score: 2.0,
            positive: Some(2),
            negative: Some(0),
            count: Some(2),
        }],
        worst_books: Vec::new(),
    }
}

/// In-memory service that answers from canned results and records calls.
pub struct FakeService {
    pub recommendation: Result<RecommendationResult, ServiceError>,
    pub feedback: Result<FeedbackResult, ServiceError>,
    pub stats: Result<SessionStats, ServiceError>,
    pub recommend_calls: Mutex<Vec<RequestPayload>>,
    pub feedback_calls: Mutex<Vec<FeedbackRequest>>,
    pub stats_calls: Mutex<usize>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            recommendation: Ok(sample_result()),
            feedback: Ok(FeedbackResult {
                explanation: "He aprendido que te gustó.".into(),
            }),
            stats: Ok(sample_stats()),
            recommend_calls: Mutex::new(Vec::new()),
            feedback_calls: Mutex::new(Vec::new()),
            stats_calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl BookService for FakeService {
    fn name(&self) -> &str {
        "fake"
    }

    async fn recommend(
        &self,
        payload: &RequestPayload,
    ) -> Result<RecommendationResult, ServiceError> {
        self.recommend_calls.lock().unwrap().push(payload.clone());
        self.recommendation.clone()
    }

    async fn submit_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResult, ServiceError> {
        self.feedback_calls.lock().unwrap().push(request.clone());
        self.feedback.clone()
    }

    async fn fetch_stats(&self) -> Result<SessionStats, ServiceError> {
        *self.stats_calls.lock().unwrap() += 1;
        self.stats.clone()
    }
}
