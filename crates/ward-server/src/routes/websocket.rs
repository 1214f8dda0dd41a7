use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::interval;

use crate::auth::{check_api_key, ApiKeyQuery};
use crate::normalize::normalize_session;
use crate::state::AppState;

const REFRESH_INTERVAL: Duration = Duration::from_secs(5);
const ALL_SESSIONS_SAMPLE: usize = 10_000;

fn sessions_snapshot(state: &AppState) -> Value {
    let mut sessions = state.store.list_sessions(ALL_SESSIONS_SAMPLE).unwrap_or_default();
    sessions.sort_by(|a, b| {
        let a_ts = a.get("started_at").and_then(Value::as_str).unwrap_or("");
        let b_ts = b.get("started_at").and_then(Value::as_str).unwrap_or("");
        b_ts.cmp(a_ts)
    });
    json!(sessions.iter().map(normalize_session).collect::<Vec<_>>())
}

fn agents_snapshot(state: &AppState) -> Value {
    json!(state.registry.list())
}

pub async fn ws_sessions(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if check_api_key(&state, &headers, query.api_key.as_deref()).is_err() {
        return axum::http::StatusCode::UNAUTHORIZED.into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let initial = json!({
        "type": "initial",
        "sessions": sessions_snapshot(&state),
        "agents": agents_snapshot(&state),
    });
    if socket.send(Message::Text(initial.to_string())).await.is_err() {
        return;
    }

    let mut refresh = interval(REFRESH_INTERVAL);
    refresh.tick().await; // first tick fires immediately; the initial send above already covers it
    let mut broadcasts = state.hub.subscribe();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if text == "ping" && socket.send(Message::Text("pong".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
            _ = refresh.tick() => {
                let update = json!({
                    "type": "update",
                    "sessions": sessions_snapshot(&state),
                    "agents": agents_snapshot(&state),
                });
                if socket.send(Message::Text(update.to_string())).await.is_err() {
                    break;
                }
            }
            event = broadcasts.recv() => {
                if event.is_err() {
                    continue;
                }
                let update = json!({
                    "type": "update",
                    "sessions": sessions_snapshot(&state),
                    "agents": agents_snapshot(&state),
                });
                if socket.send(Message::Text(update.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }
}
