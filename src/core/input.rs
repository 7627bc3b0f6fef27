//! # Input Gate
//!
//! Turns whatever the user typed or picked into the payload the recommend
//! endpoint expects. Pure validation: nothing here touches the message log.
//!
//! ```text
//! RawInput::Text("  algo triste ")        → RequestPayload::Message { message: "algo triste" }
//! RawInput::Selection { mood, genre }     → RequestPayload::Selection { mood, genre }
//! ```

use std::fmt;

use serde::Serialize;

/// What the page hands us on submit.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// Free text typed into the chat box.
    Text(String),
    /// Mood/genre picker. `None` (or blank) means "not selected".
    Selection {
        mood: Option<String>,
        genre: Option<String>,
    },
}

/// The validated body sent to the recommend endpoint.
///
/// Serializes untagged, so the wire shape is either `{"message": ..}` or
/// `{"mood": .., "genre": ..}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RequestPayload {
    Message { message: String },
    Selection { mood: String, genre: String },
}

impl RequestPayload {
    /// Text shown in the user bubble for this payload.
    pub fn display_text(&self) -> String {
        match self {
            RequestPayload::Message { message } => message.clone(),
            RequestPayload::Selection { mood, genre } => {
                format!("Mood: {mood} · Genre: {genre}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Free text was empty after trimming.
    EmptyInput,
    /// Structured mode with mood or genre left unselected.
    MissingSelection,
}

impl ValidationError {
    /// Inline warning shown to the user. No request is made.
    pub fn warning(&self) -> &'static str {
        match self {
            ValidationError::EmptyInput => {
                "⚠️ Please tell me something about what you're looking for."
            }
            ValidationError::MissingSelection => "⚠️ Please pick both a mood and a genre.",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyInput => write!(f, "empty input"),
            ValidationError::MissingSelection => write!(f, "mood or genre not selected"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate and normalize the next outgoing request.
pub fn prepare_request(raw: &RawInput) -> Result<RequestPayload, ValidationError> {
    match raw {
        RawInput::Text(text) => {
            let message = text.trim();
            if message.is_empty() {
                return Err(ValidationError::EmptyInput);
            }
            Ok(RequestPayload::Message {
                message: message.to_string(),
            })
        }
        RawInput::Selection { mood, genre } => {
            match (selected(mood.as_deref()), selected(genre.as_deref())) {
                (Some(mood), Some(genre)) => Ok(RequestPayload::Selection {
                    mood: mood.to_string(),
                    genre: genre.to_string(),
                }),
                _ => Err(ValidationError::MissingSelection),
            }
        }
    }
}

/// A picker value counts as selected only if it has non-blank content.
fn selected(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_trimmed() {
        let payload = prepare_request(&RawInput::Text("  quiero algo triste \n".into())).unwrap();
        assert_eq!(
            payload,
            RequestPayload::Message {
                message: "quiero algo triste".into()
            }
        );
    }

    #[test]
    fn test_blank_text_is_rejected() {
        assert_eq!(
            prepare_request(&RawInput::Text("   \t ".into())),
            Err(ValidationError::EmptyInput)
        );
        assert_eq!(
            prepare_request(&RawInput::Text(String::new())),
            Err(ValidationError::EmptyInput)
        );
    }

    #[test]
    fn test_selection_requires_both_fields() {
        let missing_genre = RawInput::Selection {
            mood: Some("triste".into()),
            genre: None,
        };
        let blank_mood = RawInput::Selection {
            mood: Some("  ".into()),
            genre: Some("romance".into()),
        };
        assert_eq!(prepare_request(&missing_genre), Err(ValidationError::MissingSelection));
        assert_eq!(prepare_request(&blank_mood), Err(ValidationError::MissingSelection));
    }

    #[test]
    fn test_selection_payload_serializes_flat() {
        let payload = prepare_request(&RawInput::Selection {
            mood: Some("pensativo".into()),
            genre: Some("filosofia".into()),
        })
        .unwrap();
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"mood":"pensativo","genre":"filosofia"}"#);
    }

    #[test]
    fn test_message_payload_serializes_flat() {
        let payload = RequestPayload::Message {
            message: "hola".into(),
        };
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"message":"hola"}"#);
    }
}
