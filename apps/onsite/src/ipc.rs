//! # IPC Bridge
//!
//! The front-end shell talks to the session over newline-delimited JSON:
//! one request per line on stdin, one response per line on stdout. Logs go
//! to stderr so they never interleave with responses.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request                                                                │
//! │  {"id": 7, "command": "updateCartItem", "args": {"id":"A","quantity":3}}│
//! │                                                                         │
//! │  Success                                                                │
//! │  {"id": 7, "ok": true, "data": { ...command result... }}                │
//! │                                                                         │
//! │  Failure                                                                │
//! │  {"id": 7, "ok": false,                                                 │
//! │   "error": {"code": "VALIDATION_ERROR", "message": "..."}}              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `id` is echoed back verbatim and may be any JSON value. A line that is
//! not valid JSON, or names an unknown command, gets a `BAD_REQUEST`
//! response; the session keeps going.

use mesa_core::MenuItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::commands::{cart, notifications};
use crate::error::ApiError;
use crate::events::OperationsEvent;
use crate::state::AppState;

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    id: Value,
    command: String,
    #[serde(default)]
    args: Value,
}

/// Every command the shell may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "camelCase")]
pub enum Command {
    GetCart,
    AddToCart {
        item: MenuItem,
        #[serde(default)]
        quantity: Option<i64>,
    },
    RemoveFromCart {
        id: String,
    },
    UpdateCartItem {
        id: String,
        quantity: i64,
    },
    ClearCart,
    OpenCart,
    CloseCart,
    ToggleCart,
    Checkout,

    ListNotifications,
    PostNotification(notifications::PostNotificationArgs),
    DismissNotification {
        id: Uuid,
    },
    ClearNotifications,
    PublishEvent(OperationsEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    fn success(id: Value, data: Value) -> Self {
        Response {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(id: Value, error: ApiError) -> Self {
        Response {
            id,
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Parses one request line and runs it against the session.
pub fn handle_line(state: &AppState, line: &str) -> Response {
    let raw: RawRequest = match serde_json::from_str(line) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Malformed request");
            return Response::failure(Value::Null, ApiError::bad_request(e.to_string()));
        }
    };

    let RawRequest { id, command, args } = raw;
    debug!(command = %command, "Handling request");

    // Shells send `args: {}` for argument-less commands too
    let mut envelope = serde_json::Map::new();
    envelope.insert("command".to_string(), Value::String(command));
    if !is_empty_args(&args) {
        envelope.insert("args".to_string(), args);
    }

    let result = serde_json::from_value::<Command>(Value::Object(envelope))
        .map_err(ApiError::from)
        .and_then(|command| dispatch(state, command));

    match result {
        Ok(data) => Response::success(id, data),
        Err(error) => Response::failure(id, error),
    }
}

/// Runs a decoded command and serializes its result.
pub fn dispatch(state: &AppState, command: Command) -> Result<Value, ApiError> {
    let data = match command {
        Command::GetCart => to_value(cart::get_cart(state))?,
        Command::AddToCart { item, quantity } => to_value(cart::add_to_cart(state, item, quantity)?)?,
        Command::RemoveFromCart { id } => to_value(cart::remove_from_cart(state, &id))?,
        Command::UpdateCartItem { id, quantity } => {
            to_value(cart::update_cart_item(state, &id, quantity)?)?
        }
        Command::ClearCart => to_value(cart::clear_cart(state))?,
        Command::OpenCart => to_value(cart::open_cart(state))?,
        Command::CloseCart => to_value(cart::close_cart(state))?,
        Command::ToggleCart => to_value(cart::toggle_cart(state))?,
        Command::Checkout => to_value(cart::checkout(state)?)?,

        Command::ListNotifications => to_value(notifications::list_notifications(state))?,
        Command::PostNotification(args) => {
            to_value(notifications::post_notification(state, args)?)?
        }
        Command::DismissNotification { id } => {
            to_value(notifications::dismiss_notification(state, id))?
        }
        Command::ClearNotifications => to_value(notifications::clear_notifications(state))?,
        Command::PublishEvent(event) => to_value(notifications::publish_event(state, event))?,
    };

    Ok(data)
}

fn is_empty_args(args: &Value) -> bool {
    match args {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

// =============================================================================
// Serve Loop
// =============================================================================

/// Serves requests until the reader reaches EOF.
///
/// Blank lines are skipped. Each response is flushed before the next line
/// is read.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(state, line);
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');

        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }

    debug!("Request stream closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(AppConfig::default()).unwrap()
    }

    fn call(state: &AppState, request: Value) -> Response {
        handle_line(state, &request.to_string())
    }

    #[tokio::test]
    async fn test_add_then_get_cart() {
        let state = state();
        let response = call(
            &state,
            json!({
                "id": 1,
                "command": "addToCart",
                "args": {
                    "item": {"id": "A", "name": "Soup", "unitPrice": 1000},
                    "quantity": 2
                }
            }),
        );
        assert!(response.ok, "{:?}", response.error);
        assert_eq!(response.id, json!(1));

        let response = call(&state, json!({"id": "two", "command": "getCart"}));
        let data = response.data.unwrap();
        assert_eq!(response.id, json!("two"));
        assert_eq!(data["subtotal"], 2000);
        assert_eq!(data["lines"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_update_to_zero_removes() {
        let state = state();
        call(
            &state,
            json!({
                "command": "addToCart",
                "args": {"item": {"id": "A", "name": "Soup", "unitPrice": 1000}}
            }),
        );
        let response = call(
            &state,
            json!({"command": "updateCartItem", "args": {"id": "A", "quantity": 0}}),
        );
        let data = response.data.unwrap();
        assert_eq!(data["subtotal"], 0);
        assert_eq!(data["change"]["change"], "removed");
    }

    #[tokio::test]
    async fn test_empty_args_object_for_unit_commands() {
        let state = state();
        for command in ["getCart", "toggleCart", "listNotifications", "clearNotifications"] {
            let response = call(&state, json!({"id": 1, "command": command, "args": {}}));
            assert!(response.ok, "{}: {:?}", command, response.error);
        }

        let response = call(&state, json!({"id": 2, "command": "updateCartItem", "args": {}}));
        assert_eq!(response.error.unwrap().code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_huge_quantity_is_rejected_and_session_survives() {
        let state = state();
        let response = call(
            &state,
            json!({
                "id": 1,
                "command": "addToCart",
                "args": {
                    "item": {"id": "A", "name": "Soup", "unitPrice": 1000},
                    "quantity": 10_000_000_000_000_000i64
                }
            }),
        );
        assert!(!response.ok);
        assert_eq!(response.error.unwrap().code, ErrorCode::ValidationError);

        let response = call(&state, json!({"id": 2, "command": "getCart", "args": {}}));
        assert_eq!(response.data.unwrap()["subtotal"], 0);
    }

    #[tokio::test]
    async fn test_malformed_line() {
        let state = state();
        let response = handle_line(&state, "{not json");
        assert!(!response.ok);
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.unwrap().code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_unknown_command_keeps_id() {
        let state = state();
        let response = call(&state, json!({"id": 9, "command": "launchRockets"}));
        assert!(!response.ok);
        assert_eq!(response.id, json!(9));
        assert_eq!(response.error.unwrap().code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_domain_error_is_reported() {
        let state = state();
        let response = call(&state, json!({"id": 3, "command": "checkout"}));
        assert!(!response.ok);
        assert_eq!(response.error.unwrap().code, ErrorCode::CartError);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_event_and_dismiss() {
        let state = state();
        let response = call(
            &state,
            json!({
                "command": "publishEvent",
                "args": {"type": "waiterCalled", "table": "12"}
            }),
        );
        let posted = response.data.unwrap();
        assert_eq!(posted["kind"], "urgent");

        let id = posted["id"].as_str().unwrap().to_string();
        let response = call(
            &state,
            json!({"command": "dismissNotification", "args": {"id": id}}),
        );
        assert_eq!(response.data.unwrap(), json!({"dismissed": true}));

        let response = call(&state, json!({"command": "listNotifications"}));
        assert_eq!(response.data.unwrap(), json!([]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_writes_one_line_per_request() {
        let state = state();
        let input = concat!(
            r#"{"id":1,"command":"toggleCart"}"#,
            "\n\n",
            r#"{"id":2,"command":"postNotification","args":{"kind":"info","title":"Hi"}}"#,
            "\n",
            "garbage\n",
        );
        let mut output = Vec::new();

        serve(&state, input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let responses: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["data"]["isOpen"], true);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["data"]["title"], "Hi");
        assert_eq!(responses[2]["ok"], false);
        assert_eq!(responses[2]["error"]["code"], "BAD_REQUEST");
    }
}
