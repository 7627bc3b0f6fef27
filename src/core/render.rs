//! # Recommendation Renderer
//!
//! Turns a [`RecommendationResult`] into the bot message the user sees.
//! Tiers here are presentation buckets only; they pick visual weight and
//! carry no business meaning.
//!
//! | badge       | high    | medium  | low   |
//! |-------------|---------|---------|-------|
//! | confidence  | > 0.7   | > 0.5   | else  |
//! | learning    | > 5     | > 2     | else  |

use std::sync::Arc;

use crate::service::RecommendationResult;

pub const HEADLINE: &str = "🎯 I have the perfect recommendation for you!";
pub const RATIONALE_HEADING: &str = "💡 Why this book?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub fn for_confidence(confidence: f64) -> Tier {
        if confidence > 0.7 {
            Tier::High
        } else if confidence > 0.5 {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    pub fn for_learning_score(score: f64) -> Tier {
        if score > 5.0 {
            Tier::High
        } else if score > 2.0 {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub text: String,
    pub tier: Tier,
}

/// The primary bot message for one recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCard {
    /// The result exactly as received. Feedback is submitted from this.
    pub result: Arc<RecommendationResult>,
    pub headline: &'static str,
    pub confidence: Option<Badge>,
    pub learning: Option<Badge>,
    /// `None` when the backend sent no alternatives.
    pub alternatives: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRecommendation {
    pub card: RecommendationCard,
    /// Follow-up message, delivered after the card is already on screen.
    pub analysis: Option<String>,
}

/// `round(confidence * 100)`, clamped to a displayable percentage.
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence * 100.0).round().clamp(0.0, 100.0) as u32
}

pub fn render(result: Arc<RecommendationResult>) -> RenderedRecommendation {
    let confidence = result.confidence.map(|c| Badge {
        text: format!("{}% match", confidence_percent(c)),
        tier: Tier::for_confidence(c),
    });

    let learning = result.effective_learning_score().map(|s| Badge {
        text: format!("Score {s:.1}"),
        tier: Tier::for_learning_score(s),
    });

    let alternatives = if result.alternatives.is_empty() {
        None
    } else {
        Some(result.alternatives.clone())
    };

    let analysis = result.analysis.as_ref().map(|a| {
        let mut parts = Vec::new();
        if !a.emotion.is_empty() {
            match a.emotion_confidence {
                Some(c) => parts.push(format!(
                    "emotion **{}** ({}%)",
                    a.emotion,
                    confidence_percent(c)
                )),
                None => parts.push(format!("emotion **{}**", a.emotion)),
            }
        }
        if let Some(genre) = a.genre.as_deref().filter(|g| !g.is_empty()) {
            parts.push(format!("genre **{genre}**"));
        }
        if let Some(score) = a.score {
            parts.push(format!("score {score:.1}"));
        }
        if parts.is_empty() {
            "🔍 No details from the analysis this time.".to_string()
        } else {
            format!("🔍 I detected {}.", parts.join(" · "))
        }
    });

    RenderedRecommendation {
        card: RecommendationCard {
            result,
            headline: HEADLINE,
            confidence,
            learning,
            alternatives,
        },
        analysis,
    }
}
