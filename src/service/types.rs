use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The backend leaves fields it could not determine as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Book as described by the backend (`libro`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Book {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor", default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(rename = "descripcion", default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emoji: String,
    /// CSS-ish color token (e.g. `#9B8BC4`). Presentation only.
    #[serde(rename = "color", default, deserialize_with = "null_as_default")]
    pub color_token: String,
}

/// Secondary analysis the backend attaches to a recommendation (`analisis`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Analysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub emotion: String,
    #[serde(default)]
    pub emotion_confidence: Option<f64>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Field layout of a recommendation on the wire.
#[derive(Deserialize)]
struct RecommendationWire {
    #[serde(rename = "libro")]
    book: Book,
    #[serde(rename = "explicacion", default, deserialize_with = "null_as_default")]
    rationale: String,
    #[serde(rename = "confianza", default)]
    confidence: Option<f64>,
    #[serde(default)]
    learning_score: Option<f64>,
    #[serde(rename = "alternativas", default)]
    alternatives: Option<Vec<String>>,
    #[serde(rename = "analisis", default)]
    analysis: Option<Analysis>,
}

/// A recommendation exactly as the backend sent it.
///
/// The typed fields are a read-only view for rendering. The original JSON is
/// kept alongside and is what gets serialized, so a feedback submission
/// carries the same document the user saw, unknown fields included.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub book: Book,
    pub rationale: String,
    pub confidence: Option<f64>,
    pub learning_score: Option<f64>,
    pub alternatives: Vec<String>,
    pub analysis: Option<Analysis>,
    raw: Value,
}

impl RecommendationResult {
    pub fn from_json(raw: Value) -> Result<Self, serde_json::Error> {
        let wire: RecommendationWire = serde_json::from_value(raw.clone())?;
        Ok(Self {
            book: wire.book,
            rationale: wire.rationale,
            confidence: wire.confidence,
            learning_score: wire.learning_score,
            alternatives: wire.alternatives.unwrap_or_default(),
            analysis: wire.analysis,
            raw,
        })
    }

    /// Score used for the learning badge. Older backends only report it
    /// inside `analisis.score`.
    pub fn effective_learning_score(&self) -> Option<f64> {
        self.learning_score
            .or_else(|| self.analysis.as_ref().and_then(|a| a.score))
    }
}

impl<'de> Deserialize<'de> for RecommendationResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        RecommendationResult::from_json(raw).map_err(D::Error::custom)
    }
}

impl Serialize for RecommendationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EmotionCount {
    #[serde(default, deserialize_with = "null_as_default")]
    pub emotion: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BookRank {
    pub book: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub positive: Option<u64>,
    #[serde(default)]
    pub negative: Option<u64>,
    #[serde(default, alias = "total_ratings")]
    pub count: Option<u64>,
}

/// Learning-loop statistics. Always replaced as a whole, never patched.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    #[serde(default, alias = "total_feedback")]
    pub total_interactions: u64,
    #[serde(default)]
    pub session_recommended: u64,
    #[serde(default)]
    pub top_emotions: Vec<EmotionCount>,
    #[serde(default)]
    pub top_books: Vec<BookRank>,
    #[serde(default)]
    pub worst_books: Vec<BookRank>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FeedbackResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
}

// ============================================================================
// Response envelopes (`{success, <payload>?, error?}`)
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct RecommendEnvelope {
    #[serde(default)]
    pub success: bool,
    pub recommendation: Option<RecommendationResult>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct FeedbackEnvelope {
    #[serde(default)]
    pub success: bool,
    pub result: Option<FeedbackResult>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct StatsEnvelope {
    #[serde(default)]
    pub success: bool,
    pub stats: Option<SessionStats>,
    pub error: Option<String>,
}

/// Error-only body the backend returns with 4xx/5xx statuses.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}
