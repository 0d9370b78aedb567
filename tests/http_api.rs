//! HTTP client tests against an in-process fake comments server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use commentree::api::{ApiClient, CommentError, CommentId, CommentsApi, HttpCommentsApi, NewComment};
use commentree::controller::CommentTreeController;

#[derive(Clone, Default)]
struct ServerState {
    comments: Arc<Mutex<Vec<Value>>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ServerState {
    fn log(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

/// The server stores ids as either strings or numbers.
fn has_id(node: &Value, id: &str) -> bool {
    match &node["id"] {
        Value::String(s) => s == id,
        other => other.to_string() == id,
    }
}

async fn list_comments(State(state): State<ServerState>) -> impl IntoResponse {
    state.log("GET /api/comments".to_string());
    let comments = state.comments.lock().unwrap().clone();
    Json(json!({ "success": true, "comments": comments }))
}

async fn add_comment(State(state): State<ServerState>, Json(body): Json<Value>) -> impl IntoResponse {
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    let text = body["comment"].as_str().unwrap_or_default().trim().to_string();
    state.log(format!(
        "POST /api/comments/add name={:?} comment={:?} parent={}",
        name, text, body["parent_id"]
    ));
    if name.is_empty() || text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Name and comment are required" })),
        );
    }

    let mut comments = state.comments.lock().unwrap();
    let id = format!("c{:07}", comments.len() + 1);
    let node = json!({
        "id": id,
        "name": name,
        "comment": text,
        "date": "2024-05-01",
        "time": "10:00",
        "replies": []
    });
    match body["parent_id"].as_str() {
        Some(parent) => match comments.iter_mut().find(|c| has_id(c, parent)) {
            Some(parent) => {
                if let Some(replies) = parent["replies"].as_array_mut() {
                    replies.push(node.clone());
                }
            }
            None => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Parent comment not found" })),
                )
            }
        },
        None => comments.insert(0, node.clone()),
    }
    (StatusCode::OK, Json(json!({ "success": true, "comment": node })))
}

async fn delete_comment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.log(format!("DELETE /api/comments/delete/{}", id));
    let mut comments = state.comments.lock().unwrap();
    match comments.iter_mut().find(|c| has_id(c, &id)) {
        Some(node) => {
            node["name"] = json!("[Deleted]");
            node["comment"] = json!("This comment has been deleted");
            node["deleted"] = json!(true);
            (StatusCode::OK, Json(json!({ "success": true })))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Comment not found" })),
        ),
    }
}

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn fake_server(initial: Vec<Value>) -> (HttpCommentsApi, ServerState) {
    let state = ServerState::default();
    *state.comments.lock().unwrap() = initial;
    let router = Router::new()
        .route("/api/comments", get(list_comments))
        .route("/api/comments/add", post(add_comment))
        .route("/api/comments/delete/{id}", delete(delete_comment))
        .with_state(state.clone());
    let base_url = spawn_server(router).await;
    (api_for(&base_url), state)
}

fn api_for(base_url: &str) -> HttpCommentsApi {
    HttpCommentsApi::new(ApiClient::new(base_url, Duration::from_secs(5)).unwrap())
}

fn seed() -> Vec<Value> {
    vec![json!({
        "id": 1,
        "name": "A",
        "comment": "hi",
        "date": "2024-05-01",
        "time": "09:00",
        "timestamp": "2024-05-01T09:00:00",
        "replies": []
    })]
}

#[tokio::test]
async fn test_fetch_accepts_numeric_ids() {
    let (api, _) = fake_server(seed()).await;
    let forest = api.fetch_comments().await.unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id, CommentId::from(1));
    assert!(!forest[0].deleted);
}

#[tokio::test]
async fn test_add_returns_created_id() {
    let (api, state) = fake_server(seed()).await;
    let created = api
        .add_comment(&NewComment {
            name: "B".to_string(),
            comment: "hello".to_string(),
            parent_id: None,
        })
        .await
        .unwrap();
    assert_eq!(created, Some(CommentId::from("c0000002")));
    assert_eq!(state.comments.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_error_body_on_4xx_is_surfaced() {
    let (api, _) = fake_server(seed()).await;
    let err = api
        .add_comment(&NewComment {
            name: "B".to_string(),
            comment: "x".to_string(),
            parent_id: Some(CommentId::from("nope")),
        })
        .await
        .unwrap_err();
    assert_eq!(err, CommentError::Server(Some("Parent comment not found".to_string())));

    let err = api.delete_comment(&CommentId::from("nope")).await.unwrap_err();
    assert_eq!(err.user_message("Failed to delete comment"), "Comment not found");
}

#[tokio::test]
async fn test_success_false_without_message() {
    let router = Router::new().route(
        "/api/comments",
        get(|| async { Json(json!({ "success": false })) }),
    );
    let api = api_for(&spawn_server(router).await);
    let err = api.fetch_comments().await.unwrap_err();
    assert_eq!(err, CommentError::Server(None));
}

#[tokio::test]
async fn test_undecodable_error_page_names_status() {
    let router = Router::new().route(
        "/api/comments",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
    );
    let api = api_for(&spawn_server(router).await);
    let err = api.fetch_comments().await.unwrap_err();
    assert!(matches!(err, CommentError::Server(Some(ref m)) if m.contains("500")));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = api_for(&format!("http://{}", addr));
    let err = api.fetch_comments().await.unwrap_err();
    assert!(err.is_network());
    assert!(err.to_string().starts_with("Network error: "));
}

#[tokio::test]
async fn test_controller_round_trip_against_server() {
    let (api, state) = fake_server(seed()).await;
    let mut controller = CommentTreeController::default();

    assert!(controller.load_all(&api).await);
    assert!(controller.start_reply(&CommentId::from(1), "A"));
    assert!(
        controller
            .submit_comment(&api, " B ", " a reply ", Some(CommentId::from(1)))
            .await
    );
    assert_eq!(controller.total_count(), 2);
    assert!(controller.reply_target().is_none());

    assert!(controller.request_delete(&CommentId::from(1)));
    assert!(controller.confirm_delete(&api).await);
    assert!(controller.forest()[0].deleted);
    assert_eq!(controller.forest()[0].replies.len(), 1);

    let log = state.log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec![
            "GET /api/comments".to_string(),
            r#"POST /api/comments/add name="B" comment="a reply" parent="1""#.to_string(),
            "GET /api/comments".to_string(),
            "DELETE /api/comments/delete/1".to_string(),
            "GET /api/comments".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_delete_encodes_reserved_characters_in_id() {
    let node = |id: &str| {
        json!({ "id": id, "name": "A", "comment": "hi", "replies": [] })
    };
    let (api, state) = fake_server(vec![node("x"), node("x#1"), node("a/b?c")]).await;

    api.delete_comment(&CommentId::from("x#1")).await.unwrap();
    api.delete_comment(&CommentId::from("a/b?c")).await.unwrap();

    let comments = state.comments.lock().unwrap().clone();
    let deleted: Vec<(&str, bool)> = comments
        .iter()
        .map(|c| (c["id"].as_str().unwrap(), c["deleted"] == json!(true)))
        .collect();
    assert_eq!(deleted, vec![("x", false), ("x#1", true), ("a/b?c", true)]);
    assert_eq!(
        state.log.lock().unwrap().clone(),
        vec![
            "DELETE /api/comments/delete/x#1".to_string(),
            "DELETE /api/comments/delete/a/b?c".to_string(),
        ]
    );
}
