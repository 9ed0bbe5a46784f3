//! `POST /chatbot` - keyword routing for the help widget

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Deserialize;

use crate::routes::response::{error_response, json_response};
use crate::services::route_message;
use crate::types::KavachError;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

pub async fn handle_chatbot(body: Bytes) -> Response<Full<Bytes>> {
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return error_response(&KavachError::from(e), "Chatbot error"),
    };

    match request.message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => {
            json_response(StatusCode::OK, &route_message(message))
        }
        _ => error_response(
            &KavachError::BadRequest("message is required".to_string()),
            "Chatbot error",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_routes_tracking_question() {
        let response = handle_chatbot(Bytes::from_static(br#"{"message":"Track my case"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["redirect"], "/track");
    }

    #[tokio::test]
    async fn test_missing_message() {
        let response = handle_chatbot(Bytes::from_static(b"{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = handle_chatbot(Bytes::from_static(br#"{"message":"  "}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
