//! services/api/tests/http_api.rs
//!
//! Drives the full axum router with in-memory extraction and completion services.

use api_lib::{
    config::Config,
    web::{self, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use study_assistant_core::{
    CompletionService, ConversationTurn, ExtractedText, MediaType, PortError, PortResult,
    PromptBuilder, StudyAssistant, TextExtractionService, UploadedDocument,
};
use tower::ServiceExt;

const BOUNDARY: &str = "study-assistant-test-boundary";

//=========================================================================================
// Fakes
//=========================================================================================

/// PDFs read as fixed notes, images as blank scans, `corrupt` bytes fail.
#[derive(Default)]
struct FakeExtractor {
    calls: AtomicUsize,
}

#[async_trait]
impl TextExtractionService for FakeExtractor {
    async fn extract(&self, document: &UploadedDocument) -> PortResult<ExtractedText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if document.bytes == b"corrupt" {
            return Err(PortError::Extraction("unreadable file".to_string()));
        }
        match document.media_type {
            MediaType::Pdf => Ok(ExtractedText::new("Photosynthesis turns light into sugar.")),
            MediaType::Image(_) => Ok(ExtractedText::new("  \n ")),
        }
    }
}

/// Answers according to the kind of prompt and records every request.
#[derive(Default)]
struct FakeCompletion {
    requests: Mutex<Vec<Vec<ConversationTurn>>>,
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, messages: &[ConversationTurn]) -> PortResult<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();

        if last.contains("FAIL") {
            Err(PortError::Generation("endpoint refused".to_string()))
        } else if last.starts_with("Create flashcards") {
            Ok("Here are your flashcards:\nWhat is photosynthesis? - Turning light into sugar\nWhere? - In <leaves>".to_string())
        } else if last.starts_with("Summarize") {
            Ok("- Plants make sugar from light".to_string())
        } else {
            Ok(format!("Let's think about '{}' together.", last))
        }
    }
}

struct TestApp {
    router: Router,
    extractor: Arc<FakeExtractor>,
    completion: Arc<FakeCompletion>,
}

fn test_app() -> TestApp {
    let config = Arc::new(Config::from_vars(HashMap::new()).unwrap());
    let extractor = Arc::new(FakeExtractor::default());
    let completion = Arc::new(FakeCompletion::default());
    let assistant = StudyAssistant::new(
        extractor.clone(),
        completion.clone(),
        PromptBuilder::default(),
    );
    let state = Arc::new(AppState::new(config, assistant));
    TestApp {
        router: web::router(state),
        extractor,
        completion,
    }
}

//=========================================================================================
// Request Helpers
//=========================================================================================

enum Part<'a> {
    File { file_name: &'a str, content_type: &'a str, data: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File { file_name, content_type, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(router, request).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::Null))
}

fn pdf_part() -> Part<'static> {
    Part::File {
        file_name: "notes.pdf",
        content_type: "application/pdf",
        data: b"%PDF-1.7 fake",
    }
}

//=========================================================================================
// One-Shot Study Actions
//=========================================================================================

#[tokio::test]
async fn flashcards_are_parsed_and_drops_counted() {
    let app = test_app();
    let request = multipart_request(
        "/study",
        &[pdf_part(), Part::Text { name: "action", value: "flashcards" }],
    );

    let (status, body) = send_json(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "flashcards");
    assert_eq!(
        body["flashcards"],
        json!([
            { "question": "What is photosynthesis?", "answer": "Turning light into sugar" },
            { "question": "Where?", "answer": "In <leaves>" }
        ])
    );
    assert_eq!(body["dropped_lines"], 1);

    let requests = app.completion.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0][0]
        .content
        .ends_with("Photosynthesis turns light into sugar."));
}

#[tokio::test]
async fn flashcards_can_be_rendered_as_flip_cards() {
    let app = test_app();
    let request = multipart_request(
        "/study?format=html",
        &[pdf_part(), Part::Text { name: "action", value: "flashcards" }],
    );

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(page.matches("class=\"card\"").count(), 2);
    assert!(page.contains("In &lt;leaves&gt;"));
}

#[tokio::test]
async fn summaries_are_returned_verbatim() {
    let app = test_app();
    let request = multipart_request(
        "/study",
        &[pdf_part(), Part::Text { name: "action", value: "summary" }],
    );

    let (status, body) = send_json(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "- Plants make sugar from light");
    assert!(body.get("flashcards").is_none());
    assert!(body.get("dropped_lines").is_none());
}

#[tokio::test]
async fn html_is_rejected_for_non_flashcard_actions() {
    let app = test_app();
    let request = multipart_request(
        "/study?format=html",
        &[pdf_part(), Part::Text { name: "action", value: "quiz" }],
    );

    let (status, _) = send_json(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.completion.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unsupported_uploads_are_rejected_before_extraction() {
    let app = test_app();
    let request = multipart_request(
        "/study",
        &[
            Part::File {
                file_name: "essay.docx",
                content_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                data: b"PK\x03\x04",
            },
            Part::Text { name: "action", value: "summary" },
        ],
    );

    let (status, body) = send_json(&app.router, request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].as_str().unwrap().contains("not supported"));
    assert_eq!(app.extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_or_unknown_actions_are_bad_requests() {
    let app = test_app();

    let (status, _) = send_json(&app.router, multipart_request("/study", &[pdf_part()])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = multipart_request(
        "/study",
        &[pdf_part(), Part::Text { name: "action", value: "essay" }],
    );
    let (status, _) = send_json(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_file_is_a_bad_request() {
    let app = test_app();
    let request = multipart_request("/study", &[Part::Text { name: "action", value: "quiz" }]);

    let (status, body) = send_json(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Multipart form must include a file");
}

//=========================================================================================
// Extraction
//=========================================================================================

#[tokio::test]
async fn blank_scans_extract_to_empty_text() {
    let app = test_app();
    let request = multipart_request(
        "/extract",
        &[Part::File { file_name: "scan.JPG", content_type: "image/jpeg", data: b"\xff\xd8\xff" }],
    );

    let (status, body) = send_json(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "text": "", "characters": 0, "empty": true }));
}

#[tokio::test]
async fn unreadable_files_are_unprocessable() {
    let app = test_app();
    let request = multipart_request(
        "/extract",
        &[Part::File { file_name: "notes.pdf", content_type: "application/pdf", data: b"corrupt" }],
    );

    let (status, body) = send_json(&app.router, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("unreadable file"));
}

//=========================================================================================
// Tutoring Sessions
//=========================================================================================

async fn create_session(router: &Router) -> String {
    let (status, body) = send_json(router, empty_request("POST", "/sessions")).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn chat_history_grows_two_turns_per_exchange() {
    let app = test_app();
    let session_id = create_session(&app.router).await;

    let notes = multipart_request(&format!("/sessions/{}/notes", session_id), &[pdf_part()]);
    let (status, body) = send_json(&app.router, notes).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["empty"], false);

    for (k, question) in ["What is photosynthesis?", "Why do leaves need light?"]
        .iter()
        .enumerate()
    {
        let request = json_request(
            "POST",
            &format!("/sessions/{}/messages", session_id),
            json!({ "message": question }),
        );
        let (status, body) = send_json(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["history_len"], 1 + 2 * (k + 1));
    }

    let (status, body) = send_json(
        &app.router,
        empty_request("GET", &format!("/sessions/{}/messages", session_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_notes"], true);
    let roles: Vec<&str> = body["turns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user", "assistant"]);

    // The second request carried the notes and the whole first exchange.
    let requests = app.completion.requests.lock().unwrap();
    let second = &requests[1];
    assert_eq!(second.len(), 4);
    assert!(second[0].content.contains("Photosynthesis turns light into sugar."));
    assert_eq!(second[1].content, "What is photosynthesis?");
    assert_eq!(second[3].content, "Why do leaves need light?");
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let app = test_app();
    let first = create_session(&app.router).await;
    let second = create_session(&app.router).await;

    let request = json_request(
        "POST",
        &format!("/sessions/{}/messages", first),
        json!({ "message": "Hello" }),
    );
    let (status, _) = send_json(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(
        &app.router,
        empty_request("GET", &format!("/sessions/{}/messages", second)),
    )
    .await;
    assert_eq!(body["turns"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_notes"], false);
}

#[tokio::test]
async fn failed_generation_is_a_bad_gateway_and_keeps_history() {
    let app = test_app();
    let session_id = create_session(&app.router).await;

    let request = json_request(
        "POST",
        &format!("/sessions/{}/messages", session_id),
        json!({ "message": "please FAIL" }),
    );
    let (status, _) = send_json(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, body) = send_json(
        &app.router,
        empty_request("GET", &format!("/sessions/{}/messages", session_id)),
    )
    .await;
    assert_eq!(body["turns"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_messages_are_rejected() {
    let app = test_app();
    let session_id = create_session(&app.router).await;

    let request = json_request(
        "POST",
        &format!("/sessions/{}/messages", session_id),
        json!({ "message": "   " }),
    );
    let (status, _) = send_json(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.completion.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_sessions_are_not_found() {
    let app = test_app();
    let uri = format!("/sessions/{}/messages", uuid::Uuid::new_v4());

    let (status, _) = send_json(&app.router, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        send_json(&app.router, json_request("POST", &uri, json!({ "message": "Hi" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ended_sessions_are_not_found() {
    let app = test_app();
    let session_id = create_session(&app.router).await;
    let session_uri = format!("/sessions/{}", session_id);

    let (status, body) = send(&app.router, empty_request("DELETE", &session_uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send_json(
        &app.router,
        empty_request("GET", &format!("{}/messages", session_uri)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = json_request(
        "POST",
        &format!("{}/messages", session_uri),
        json!({ "message": "Still there?" }),
    );
    let (status, _) = send_json(&app.router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.completion.requests.lock().unwrap().is_empty());

    let (status, _) = send(&app.router, empty_request("DELETE", &session_uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
