//! Full conversation turns: controller + HTTP service against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use bookmate::controller::Controller;
use bookmate::core::WidgetError;
use bookmate::core::feedback::Verdict;
use bookmate::core::input::RawInput;
use bookmate::core::message_log::{Content, LogDelta, Role};
use bookmate::core::request::RequestState;
use bookmate::service::HttpBookService;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn recommendation_json() -> Value {
    json!({
        "libro": {
            "titulo": "Pedro Páramo",
            "autor": "Juan Rulfo",
            "descripcion": "Un hombre busca a su padre en Comala.",
            "emoji": "🌵",
            "color": "#C4A484"
        },
        "confianza": 0.8,
        "explicacion": "Basándome en tu estado **triste**, te recomiendo Pedro Páramo.",
        "alternativas": ["Rayuela", "Aura"],
        "analisis": {
            "emotion": "triste",
            "emotion_confidence": 0.8,
            "score": 6.5,
            "special_contexts": []
        }
    })
}

async fn mount_stats(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/feedback-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "stats": {
                "total_feedback": 1,
                "top_books": [{"book": "Pedro Páramo", "score": 1, "positive": 1, "negative": 0, "total_ratings": 1}],
                "worst_books": []
            }
        })))
        .mount(server)
        .await;
}

async fn mount_recommendation(server: &MockServer, message: &str) {
    Mock::given(method("POST"))
        .and(path("/recomendar"))
        .and(body_json(json!({"message": message})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "recommendation": recommendation_json()
        })))
        .mount(server)
        .await;
}

fn controller(server: &MockServer, analysis_delay: Duration) -> Controller {
    let service = HttpBookService::new(server.uri(), Some(Duration::from_secs(5))).unwrap();
    Controller::new(Arc::new(service), analysis_delay)
}

/// Applies background results until `done` holds. Panics after 5s.
async fn run_until(ctl: &mut Controller, done: impl Fn(&Controller) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(ctl) {
            ctl.process_next().await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}

fn count_requests(requests: &[wiremock::Request], p: &str) -> usize {
    requests.iter().filter(|r| r.url.path() == p).count()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_full_turn_with_feedback() {
    let server = MockServer::start().await;
    mount_recommendation(&server, "quiero algo triste").await;
    mount_stats(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {"explanation": "Anotado: te gustó **Pedro Páramo**."}
        })))
        .mount(&server)
        .await;

    let mut ctl = controller(&server, Duration::from_millis(50));
    ctl.on_submit(RawInput::Text("quiero algo triste".into())).unwrap();
    assert_eq!(ctl.widget().request_state(), RequestState::Pending);
    assert!(!ctl.widget().submit_enabled());
    assert!(ctl.widget().log.has_typing());

    // Card, stats refresh, then the delayed analysis message
    run_until(&mut ctl, |c| {
        c.widget().log.len() == 3 && c.widget().stats.is_some()
    })
    .await;

    let widget = ctl.widget();
    assert!(widget.submit_enabled());
    assert!(!widget.log.has_typing());
    let messages: Vec<_> = widget.log.iter().collect();
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, Content::Text("quiero algo triste".into()));
    let card = match &messages[1].content {
        Content::Recommendation(card) => card,
        other => panic!("expected card, got {:?}", other),
    };
    assert_eq!(card.result.book.title, "Pedro Páramo");
    assert_eq!(card.confidence.as_ref().unwrap().text, "80% match");
    match &messages[2].content {
        Content::Text(text) => assert!(text.starts_with("🔍"), "analysis was {:?}", text),
        other => panic!("expected analysis text, got {:?}", other),
    }
    let card_id = messages[1].id;
    assert_eq!(widget.stats.as_ref().unwrap().total_interactions, 1);

    // The page sees the typing placeholder come and go
    let deltas = ctl.take_delta();
    assert!(matches!(deltas[0], LogDelta::Appended(ref m) if m.role == Role::User));
    assert!(matches!(deltas[1], LogDelta::Appended(ref m) if m.content.is_typing()));
    assert!(matches!(deltas[2], LogDelta::Removed(_)));
    assert!(matches!(deltas[3], LogDelta::Appended(ref m) if m.id == card_id));
    assert_eq!(deltas.len(), 5);

    // Feedback is one-shot
    ctl.on_feedback(card_id, Verdict::Positive).unwrap();
    assert!(!ctl.widget().feedback_enabled(card_id));
    assert_eq!(
        ctl.on_feedback(card_id, Verdict::Negative),
        Err(WidgetError::FeedbackClosed(card_id))
    );

    run_until(&mut ctl, |c| {
        c.widget()
            .log
            .last()
            .is_some_and(|m| matches!(&m.content, Content::Text(t) if t.starts_with("🧠")))
    })
    .await;
    assert_eq!(ctl.widget().status_message, "Thanks for the feedback!");

    // Accepted feedback refreshes the stats once more
    tokio::time::timeout(Duration::from_secs(5), ctl.process_next())
        .await
        .expect("stats refresh after feedback");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(count_requests(&requests, "/api/feedback-stats"), 2);
    let feedback: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/api/feedback")
        .collect();
    assert_eq!(feedback.len(), 1);
    let body: Value = serde_json::from_slice(&feedback[0].body).unwrap();
    assert_eq!(body["recommendation"], recommendation_json());
    assert_eq!(body["feedback_type"], "positive");
}

#[tokio::test]
async fn test_second_submit_while_pending_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recomendar"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "recommendation": recommendation_json()}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    mount_stats(&server).await;

    let mut ctl = controller(&server, Duration::from_secs(60));
    ctl.on_submit(RawInput::Text("uno".into())).unwrap();
    let before = ctl.widget().log.len();
    assert_eq!(
        ctl.on_submit(RawInput::Text("dos".into())),
        Err(WidgetError::Busy)
    );
    assert_eq!(ctl.widget().log.len(), before);

    run_until(&mut ctl, |c| c.widget().submit_enabled()).await;
    let requests = server.received_requests().await.unwrap();
    assert_eq!(count_requests(&requests, "/recomendar"), 1);
}

#[tokio::test]
async fn test_backend_error_is_shown_and_submit_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recomendar"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "El motor de recomendaciones no está disponible"
        })))
        .mount(&server)
        .await;

    let mut ctl = controller(&server, Duration::ZERO);
    ctl.on_submit(RawInput::Text("hola".into())).unwrap();
    run_until(&mut ctl, |c| c.widget().submit_enabled()).await;

    let last = ctl.widget().log.last().unwrap();
    assert_eq!(
        last.content,
        Content::Error("❌ El motor de recomendaciones no está disponible".into())
    );
    assert!(!ctl.widget().log.has_typing());
    assert!(ctl.widget().latest_open_recommendation().is_none());

    // No stats refresh after a failed turn
    let requests = server.received_requests().await.unwrap();
    assert_eq!(count_requests(&requests, "/api/feedback-stats"), 0);
}

#[tokio::test]
async fn test_transport_failure_reads_as_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recomendar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut ctl = controller(&server, Duration::ZERO);
    ctl.on_submit(RawInput::Text("hola".into())).unwrap();
    run_until(&mut ctl, |c| c.widget().submit_enabled()).await;

    match &ctl.widget().log.last().unwrap().content {
        Content::Error(text) => assert!(text.starts_with("❌ Connection error: "), "{text}"),
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_input_never_reaches_backend() {
    let server = MockServer::start().await;
    let mut ctl = controller(&server, Duration::ZERO);

    assert!(ctl.on_submit(RawInput::Text("   ".into())).is_err());
    assert!(
        ctl.on_submit(RawInput::Selection {
            mood: Some("triste".into()),
            genre: None,
        })
        .is_err()
    );

    let warnings = ctl
        .widget()
        .log
        .iter()
        .filter(|m| matches!(m.content, Content::Warning(_)))
        .count();
    assert_eq!(warnings, 2);
    assert_eq!(ctl.widget().request_state(), RequestState::Idle);
    assert!(ctl.widget().submit_enabled());
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_feedback_failure_keeps_buttons_closed() {
    let server = MockServer::start().await;
    mount_recommendation(&server, "algo").await;
    mount_stats(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let mut ctl = controller(&server, Duration::from_secs(60));
    ctl.on_submit(RawInput::Text("algo".into())).unwrap();
    run_until(&mut ctl, |c| c.widget().latest_open_recommendation().is_some()).await;
    let card_id = ctl.widget().latest_open_recommendation().unwrap();

    ctl.on_feedback(card_id, Verdict::Neutral).unwrap();
    run_until(&mut ctl, |c| c.widget().status_message == "Feedback failed").await;

    let last = ctl.widget().log.last().unwrap();
    assert_eq!(
        last.content,
        Content::Error("❌ Error processing your feedback".into())
    );
    assert!(!ctl.widget().feedback_enabled(card_id));
    ctl.shutdown();
}
