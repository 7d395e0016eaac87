//! In-process stand-in for the Pushover messages API.
//!
//! Accepts every message except those whose `message` field is `"reject"`,
//! which get a 400 like Pushover returns for invalid input.

use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::PUSHOVER_MESSAGES_PATH;

type Received = Arc<Mutex<Vec<Value>>>;

pub(crate) struct MockPushover {
    pub base_url: String,
    received: Received,
}

impl MockPushover {
    pub async fn spawn() -> Self {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(PUSHOVER_MESSAGES_PATH, post(receive))
            .with_state(received.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            received,
        }
    }

    /// Message bodies received so far, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

async fn receive(State(received): State<Received>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let reject = body["message"] == "reject";
    received.lock().unwrap().push(body);

    if reject {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": 0, "errors": ["message is invalid"] })),
        )
    } else {
        (StatusCode::OK, Json(json!({ "status": 1, "request": "mock" })))
    }
}
