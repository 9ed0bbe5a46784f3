//! Complaint API routes
//!
//! - `POST /api/complaints` - file a complaint
//! - `GET /api/complaints/track` - look up by `caseId`, `aadharNumber` or `phone`
//! - `PATCH /api/complaints/{caseId}/status` - append a status to the timeline
//! - `PUT /api/complaints/update-status/{caseId}` - administrative status update
//!
//! Both status routes append a timeline entry; they differ only in the
//! response body. The tracking page's older parameter spellings `case-id` and
//! `aadhar` are accepted as aliases.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::db::{ComplaintDoc, ComplaintStatus, NewComplaint};
use crate::routes::response::{error_response, json_response};
use crate::services::ComplaintDesk;
use crate::store::CaseLookup;
use crate::types::KavachError;

const CREATE_FAILED: &str = "Failed to file complaint";
const TRACK_FAILED: &str = "Failed to fetch complaint";
const UPDATE_FAILED: &str = "Failed to update status";
const MISSING_IDENTIFIER: &str = "Please provide caseId, aadharNumber, or phone";

/// Response to a successful filing
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub message: String,
    pub case_id: String,
}

/// Response to the administrative status update
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedResponse {
    pub message: String,
    pub complaint: ComplaintDoc,
}

/// Tracking query parameters
#[derive(Debug, Default)]
pub struct TrackQuery {
    pub case_id: Option<String>,
    pub aadhar_number: Option<String>,
    pub phone: Option<String>,
}

impl TrackQuery {
    /// Parse from a raw query string
    ///
    /// When a key appears under both its canonical and legacy name the
    /// canonical one wins; repeated keys keep the first non-blank value.
    pub fn parse(query: &str) -> Result<Self, KavachError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| KavachError::BadRequest(format!("Invalid query string: {}", e)))?;

        let mut parsed = Self::default();
        let mut case_id_alias = None;
        let mut aadhar_alias = None;

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "caseId" => &mut parsed.case_id,
                "case-id" => &mut case_id_alias,
                "aadharNumber" => &mut parsed.aadhar_number,
                "aadhar" => &mut aadhar_alias,
                "phone" => &mut parsed.phone,
                _ => continue,
            };
            if slot.as_deref().map_or(true, |v| v.trim().is_empty()) {
                *slot = Some(value);
            }
        }

        parsed.case_id = present(parsed.case_id).or_else(|| present(case_id_alias));
        parsed.aadhar_number = present(parsed.aadhar_number).or_else(|| present(aadhar_alias));
        Ok(parsed)
    }

    /// Pick the lookup key. Case id beats Aadhaar beats phone; blank values
    /// count as absent.
    pub fn into_lookup(self) -> Option<CaseLookup> {
        present(self.case_id)
            .map(CaseLookup::CaseId)
            .or_else(|| present(self.aadhar_number).map(CaseLookup::Aadhaar))
            .or_else(|| present(self.phone).map(CaseLookup::Phone))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Status update request body
#[derive(Debug, Default, Deserialize)]
struct StatusUpdateRequest {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

impl StatusUpdateRequest {
    fn parse(body: &Bytes) -> Result<(ComplaintStatus, Option<String>), KavachError> {
        let request: StatusUpdateRequest = serde_json::from_slice(body)?;

        let status = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| KavachError::BadRequest("Status is required".to_string()))?
            .parse::<ComplaintStatus>()
            .map_err(KavachError::BadRequest)?;

        Ok((status, request.note))
    }
}

/// Handle `POST /api/complaints`
pub async fn handle_create(desk: &ComplaintDesk, body: Bytes) -> Response<Full<Bytes>> {
    let submission: NewComplaint = match serde_json::from_slice(&body) {
        Ok(s) => s,
        Err(e) => return error_response(&KavachError::from(e), CREATE_FAILED),
    };

    match desk.create_complaint(submission).await {
        Ok(doc) => json_response(
            StatusCode::CREATED,
            &CreatedResponse {
                message: "Complaint filed successfully".to_string(),
                case_id: doc.case_id,
            },
        ),
        Err(e) => error_response(&e, CREATE_FAILED),
    }
}

/// Handle `GET /api/complaints/track`
pub async fn handle_track(desk: &ComplaintDesk, query: Option<&str>) -> Response<Full<Bytes>> {
    let query = match TrackQuery::parse(query.unwrap_or("")) {
        Ok(q) => q,
        Err(e) => return error_response(&e, TRACK_FAILED),
    };

    let Some(lookup) = query.into_lookup() else {
        return error_response(
            &KavachError::BadRequest(MISSING_IDENTIFIER.to_string()),
            TRACK_FAILED,
        );
    };

    debug!("Tracking complaint by {}", lookup);

    match desk.find_complaint(&lookup).await {
        Ok(doc) => json_response(StatusCode::OK, &doc),
        Err(e) => error_response(&e, TRACK_FAILED),
    }
}

/// Handle `PATCH /api/complaints/{caseId}/status`
pub async fn handle_append_status(
    desk: &ComplaintDesk,
    case_id: &str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let (status, note) = match StatusUpdateRequest::parse(&body) {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e, UPDATE_FAILED),
    };

    match desk.append_status(case_id, status, note).await {
        Ok(_) => json_response(
            StatusCode::OK,
            &json!({ "message": "Complaint status updated successfully" }),
        ),
        Err(e) => error_response(&e, UPDATE_FAILED),
    }
}

/// Handle `PUT /api/complaints/update-status/{caseId}`
///
/// Same timeline-appending update as the PATCH route, with the updated
/// record in the response.
pub async fn handle_update_status(
    desk: &ComplaintDesk,
    case_id: &str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let (status, note) = match StatusUpdateRequest::parse(&body) {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e, UPDATE_FAILED),
    };

    match desk.append_status(case_id, status, note).await {
        Ok(complaint) => json_response(
            StatusCode::OK,
            &UpdatedResponse {
                message: "Status updated successfully".to_string(),
                complaint,
            },
        ),
        Err(e) => error_response(&e, UPDATE_FAILED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryComplaintStore;
    use http_body_util::BodyExt;
    use std::sync::Arc;

    fn desk() -> ComplaintDesk {
        ComplaintDesk::new(Arc::new(MemoryComplaintStore::new()))
    }

    fn complaint_body() -> Bytes {
        Bytes::from(
            json!({
                "aadharNumber": "123456789012",
                "fullName": "A",
                "complaintType": "Theft",
                "location": "X",
                "description": "wallet stolen",
                "phone": "9876543210",
                "priority": "",
                "incidentDate": "",
                "evidenceFiles": ["photo.jpg"]
            })
            .to_string(),
        )
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn file(desk: &ComplaintDesk) -> String {
        let response = handle_create(desk, complaint_body()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["caseId"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_track_query_aliases() {
        let q = TrackQuery::parse("case-id=CASE1").unwrap();
        assert_eq!(q.into_lookup(), Some(CaseLookup::CaseId("CASE1".into())));

        let q = TrackQuery::parse("aadhar=123456789012").unwrap();
        assert_eq!(q.into_lookup(), Some(CaseLookup::Aadhaar("123456789012".into())));

        let q = TrackQuery::parse("phone=9876543210&caseId=CASE2").unwrap();
        assert_eq!(q.into_lookup(), Some(CaseLookup::CaseId("CASE2".into())));

        let q = TrackQuery::parse("caseId=&phone=%209876543210").unwrap();
        assert_eq!(q.into_lookup(), Some(CaseLookup::Phone("9876543210".into())));

        assert_eq!(TrackQuery::parse("").unwrap().into_lookup(), None);
    }

    #[test]
    fn test_track_query_both_spellings() {
        let q = TrackQuery::parse("caseId=CASE1&case-id=CASE1").unwrap();
        assert_eq!(q.into_lookup(), Some(CaseLookup::CaseId("CASE1".into())));

        let q = TrackQuery::parse("case-id=OLD&caseId=NEW").unwrap();
        assert_eq!(q.into_lookup(), Some(CaseLookup::CaseId("NEW".into())));

        let q = TrackQuery::parse("caseId=&case-id=CASE2").unwrap();
        assert_eq!(q.into_lookup(), Some(CaseLookup::CaseId("CASE2".into())));

        let q = TrackQuery::parse("aadhar=111111111111&aadharNumber=123456789012").unwrap();
        assert_eq!(q.into_lookup(), Some(CaseLookup::Aadhaar("123456789012".into())));
    }

    #[tokio::test]
    async fn test_create_then_track() {
        let desk = desk();
        let case_id = file(&desk).await;
        assert!(!case_id.is_empty());

        let query = format!("caseId={}", case_id);
        let response = handle_track(&desk, Some(&query)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let record = body_json(response).await;
        assert_eq!(record["status"], "Pending");
        assert_eq!(record["timeline"].as_array().unwrap().len(), 1);
        assert_eq!(record["priority"], "low");
        assert_eq!(record["evidenceFiles"][0], "photo.jpg");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_aadhaar() {
        let mut body: serde_json::Value = serde_json::from_slice(&complaint_body()).unwrap();
        body["aadharNumber"] = json!("12345");

        let response = handle_create(&desk(), Bytes::from(body.to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = body_json(response).await;
        assert_eq!(value["details"][0], "aadharNumber must be a 12-digit number");
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let response = handle_create(&desk(), Bytes::from_static(b"{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_track_without_identifier() {
        let response = handle_track(&desk(), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], MISSING_IDENTIFIER);
    }

    #[tokio::test]
    async fn test_track_unknown_case() {
        let response = handle_track(&desk(), Some("caseId=CASE404")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Complaint not found");
    }

    #[tokio::test]
    async fn test_patch_status_appends_timeline() {
        let desk = desk();
        let case_id = file(&desk).await;

        let body = Bytes::from(json!({"status": "In Progress", "note": "officer assigned"}).to_string());
        let response = handle_append_status(&desk, &case_id, body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "Complaint status updated successfully"
        );

        let record = body_json(handle_track(&desk, Some(&format!("caseId={}", case_id))).await).await;
        assert_eq!(record["status"], "In Progress");
        assert_eq!(record["timeline"][1]["note"], "officer assigned");
    }

    #[tokio::test]
    async fn test_patch_status_unknown_case() {
        let body = Bytes::from(json!({"status": "Resolved", "note": "closed"}).to_string());
        let response = handle_append_status(&desk(), "CASE404", body).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_patch_status_requires_status() {
        let desk = desk();
        let case_id = file(&desk).await;

        let response = handle_append_status(&desk, &case_id, Bytes::from_static(b"{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Status is required");

        let body = Bytes::from(json!({"status": "Closed"}).to_string());
        let response = handle_append_status(&desk, &case_id, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_update_status_also_appends_timeline() {
        let desk = desk();
        let case_id = file(&desk).await;

        let body = Bytes::from(json!({"status": "Resolved"}).to_string());
        let response = handle_update_status(&desk, &case_id, body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let value = body_json(response).await;
        assert_eq!(value["message"], "Status updated successfully");
        let timeline = value["complaint"]["timeline"].as_array().unwrap();
        assert_eq!(timeline.len(), 2);
        assert_eq!(value["complaint"]["status"], timeline[1]["status"]);
    }
}
