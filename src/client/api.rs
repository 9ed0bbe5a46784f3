//! HTTP client for the complaint API

use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::ClientError;
use crate::db::{ComplaintDoc, ComplaintStatus, NewComplaint};
use crate::store::CaseLookup;

/// Default API location for local development
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Error body returned by the API
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedResponse {
    case_id: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UpdatedResponse {
    complaint: ComplaintDoc,
}

/// Typed client for the complaint endpoints
#[derive(Debug, Clone)]
pub struct ComplaintClient {
    base: Url,
    http: reqwest::Client,
}

impl ComplaintClient {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Transport(format!("Invalid API URL '{}': {}", base_url, e)))?;

        if base.cannot_be_a_base() {
            return Err(ClientError::Transport(format!(
                "Invalid API URL '{}'",
                base_url
            )));
        }

        Ok(Self {
            base,
            http: reqwest::Client::new(),
        })
    }

    /// File a complaint; returns the new case id
    pub async fn submit(&self, complaint: &NewComplaint) -> Result<String, ClientError> {
        let url = self.endpoint(&["api", "complaints"])?;
        debug!("POST {}", url);

        let response = self.http.post(url).json(complaint).send().await?;
        let created: CreatedResponse = parse(response).await?;
        Ok(created.case_id)
    }

    /// Look up a complaint by case id, Aadhaar number or phone
    pub async fn track(&self, lookup: &CaseLookup) -> Result<ComplaintDoc, ClientError> {
        let url = self.endpoint(&["api", "complaints", "track"])?;
        debug!("GET {} ({})", url, lookup.field());

        let response = self
            .http
            .get(url)
            .query(&[(lookup.field(), lookup.value())])
            .send()
            .await?;
        parse(response).await
    }

    /// Record a new status with a note; returns the server's message
    pub async fn append_status(
        &self,
        case_id: &str,
        status: ComplaintStatus,
        note: &str,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(&["api", "complaints", case_id, "status"])?;
        debug!("PATCH {}", url);

        let response = self
            .http
            .patch(url)
            .json(&json!({ "status": status, "note": note }))
            .send()
            .await?;
        let body: MessageResponse = parse(response).await?;
        Ok(body.message)
    }

    /// Administrative status update; returns the updated record
    pub async fn set_status(
        &self,
        case_id: &str,
        status: ComplaintStatus,
    ) -> Result<ComplaintDoc, ClientError> {
        let url = self.endpoint(&["api", "complaints", "update-status", case_id])?;
        debug!("PUT {}", url);

        let response = self
            .http
            .put(url)
            .json(&json!({ "status": status }))
            .send()
            .await?;
        let body: UpdatedResponse = parse(response).await?;
        Ok(body.complaint)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport(format!("Invalid API URL '{}'", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Decode a success body, or turn an error body into `ClientError::Api`
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&body, status.canonical_reason().unwrap_or("Request failed")),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Pull the user-facing message out of an error body
fn error_message(body: &str, fallback: &str) -> String {
    let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();

    let message = parsed
        .error
        .or(parsed.message)
        .unwrap_or_else(|| fallback.to_string());

    if parsed.details.is_empty() {
        message
    } else {
        format!("{}: {}", message, parsed.details.join("; "))
    }
}
