//! End-to-end tests: the HTTP server on an ephemeral port with the in-memory
//! store, driven through reqwest and the typed client.

use clap::Parser;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use nyaya_kavach::{
    client::{ClientError, ComplaintClient, ComplaintForm},
    config::Args,
    db::{ComplaintDoc, ComplaintStatus, TimelineEntry},
    server::{self, AppState},
    services::ComplaintDesk,
    store::{CaseLookup, ComplaintStore, MemoryComplaintStore},
};

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(Arc::new(MemoryComplaintStore::new())).await
    }

    async fn start_with(store: Arc<dyn ComplaintStore>) -> Self {
        let args = Args::try_parse_from(["nyaya-kavach", "--dev-mode"]).unwrap();
        let desk = ComplaintDesk::new(store);
        let state = Arc::new(AppState::new(args, desk, None));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server::serve(listener, state, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            shutdown: Some(tx),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn client(&self) -> ComplaintClient {
        ComplaintClient::new(&self.base_url).unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}

/// Memory store whose lookups take a while, recording when one completes
struct SlowLookupStore {
    inner: MemoryComplaintStore,
    delay: Duration,
    lookup_done: AtomicBool,
}

#[async_trait]
impl ComplaintStore for SlowLookupStore {
    async fn insert(&self, doc: &ComplaintDoc) -> nyaya_kavach::Result<()> {
        self.inner.insert(doc).await
    }

    async fn find(&self, lookup: &CaseLookup) -> nyaya_kavach::Result<Option<ComplaintDoc>> {
        tokio::time::sleep(self.delay).await;
        let found = self.inner.find(lookup).await;
        self.lookup_done.store(true, Ordering::SeqCst);
        found
    }

    async fn append_status(
        &self,
        case_id: &str,
        entry: &TimelineEntry,
    ) -> nyaya_kavach::Result<Option<ComplaintDoc>> {
        self.inner.append_status(case_id, entry).await
    }

    fn backend(&self) -> &'static str {
        "slow-memory"
    }
}

fn theft_report() -> Value {
    json!({
        "aadharNumber": "123456789012",
        "fullName": "A",
        "complaintType": "Theft",
        "location": "X",
        "description": "wallet stolen",
        "phone": "9876543210",
        "priority": "",
        "incidentDate": "",
        "evidenceFiles": []
    })
}

async fn file(http: &reqwest::Client, server: &TestServer) -> String {
    let response = http
        .post(server.url("/api/complaints"))
        .json(&theft_report())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Complaint filed successfully");
    body["caseId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_filed_complaint_tracks_as_pending() {
    let server = TestServer::start().await;
    let http = reqwest::Client::new();

    let case_id = file(&http, &server).await;
    assert!(case_id.starts_with("CASE"));

    let response = http
        .get(server.url("/api/complaints/track"))
        .query(&[("caseId", case_id.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let record: Value = response.json().await.unwrap();
    assert_eq!(record["status"], "Pending");
    assert_eq!(record["timeline"].as_array().unwrap().len(), 1);
    assert_eq!(record["timeline"][0]["note"], "Complaint filed");

    server.stop().await;
}

#[tokio::test]
async fn test_legacy_query_parameters() {
    let server = TestServer::start().await;
    let http = reqwest::Client::new();
    let case_id = file(&http, &server).await;

    for query in [
        format!("case-id={}", case_id),
        "aadhar=123456789012".to_string(),
        "phone=9876543210".to_string(),
    ] {
        let response = http
            .get(server.url(&format!("/api/complaints/track?{}", query)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "query {}", query);

        let record: Value = response.json().await.unwrap();
        assert_eq!(record["caseId"], case_id.as_str());
    }

    server.stop().await;
}

#[tokio::test]
async fn test_track_requires_identifier() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/api/complaints/track")).await.unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please provide caseId, aadharNumber, or phone");

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_case_status_update_is_not_found() {
    let server = TestServer::start().await;

    let err = server
        .client()
        .append_status("CASEUNKNOWN", ComplaintStatus::Resolved, "closed")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Complaint not found");

    server.stop().await;
}

#[tokio::test]
async fn test_server_rejects_malformed_aadhaar() {
    let server = TestServer::start().await;

    let mut report = theft_report();
    report["aadharNumber"] = json!("12345");

    let response = reqwest::Client::new()
        .post(server.url("/api/complaints"))
        .json(&report)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["details"][0], "aadharNumber must be a 12-digit number");

    server.stop().await;
}

#[tokio::test]
async fn test_status_updates_append_to_timeline() {
    let server = TestServer::start().await;
    let client = server.client();

    let form = ComplaintForm {
        aadhar_number: "123456789012".into(),
        full_name: "A".into(),
        complaint_type: "Theft".into(),
        location: "X".into(),
        description: "wallet stolen".into(),
        evidence: vec!["/tmp/receipt.pdf".into()],
        ..Default::default()
    };
    let case_id = client.submit(&form.into_submission().unwrap()).await.unwrap();

    let message = client
        .append_status(&case_id, ComplaintStatus::InProgress, "officer assigned")
        .await
        .unwrap();
    assert_eq!(message, "Complaint status updated successfully");

    let updated = client
        .set_status(&case_id, ComplaintStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(updated.status, ComplaintStatus::Resolved);
    assert_eq!(updated.timeline.len(), 3);
    assert_eq!(updated.latest().unwrap().status, ComplaintStatus::Resolved);

    let tracked = client
        .track(&CaseLookup::CaseId(case_id.clone()))
        .await
        .unwrap();
    assert_eq!(tracked, updated);
    assert_eq!(tracked.timeline[1].note, "officer assigned");
    assert_eq!(tracked.evidence_files, vec!["receipt.pdf"]);

    server.stop().await;
}

#[tokio::test]
async fn test_missing_status_is_bad_request() {
    let server = TestServer::start().await;
    let http = reqwest::Client::new();
    let case_id = file(&http, &server).await;

    let response = http
        .patch(server.url(&format!("/api/complaints/{}/status", case_id)))
        .json(&json!({ "note": "no status" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let err = server
        .client()
        .track(&CaseLookup::Phone("0000000000".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));

    server.stop().await;
}

#[tokio::test]
async fn test_service_routes() {
    let server = TestServer::start().await;
    let http = reqwest::Client::new();

    let banner = reqwest::get(server.url("/")).await.unwrap().text().await.unwrap();
    assert_eq!(banner, "Nyaya Kavach backend is running!");

    let ready = reqwest::get(server.url("/readyz")).await.unwrap();
    assert_eq!(ready.status(), 200);

    let chat: Value = http
        .post(server.url("/chatbot"))
        .json(&json!({ "message": "I want to file a complaint" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chat["redirect"], "/complaint");

    let preflight = http
        .request(reqwest::Method::OPTIONS, server.url("/api/complaints"))
        .send()
        .await
        .unwrap();
    assert_eq!(preflight.status(), 200);
    assert_eq!(preflight.headers()["access-control-allow-origin"], "*");

    let missing = reqwest::get(server.url("/api/unknown")).await.unwrap();
    assert_eq!(missing.status(), 404);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["path"], "/api/unknown");

    server.stop().await;
}

#[tokio::test]
async fn test_percent_encoded_case_id_in_path() {
    let server = TestServer::start().await;
    let http = reqwest::Client::new();
    let case_id = file(&http, &server).await;

    // "%43" is "C"
    let encoded = format!("%43{}", &case_id[1..]);

    let response = http
        .patch(server.url(&format!("/api/complaints/{}/status", encoded)))
        .json(&json!({ "status": "In Progress", "note": "officer assigned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = http
        .put(server.url(&format!("/api/complaints/update-status/{}", encoded)))
        .json(&json!({ "status": "Resolved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["complaint"]["caseId"], case_id.as_str());
    assert_eq!(body["complaint"]["timeline"].as_array().unwrap().len(), 3);

    let response = http
        .patch(server.url("/api/complaints/CASE%FF/status"))
        .json(&json!({ "status": "Resolved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_requests() {
    let store = Arc::new(SlowLookupStore {
        inner: MemoryComplaintStore::new(),
        delay: Duration::from_millis(300),
        lookup_done: AtomicBool::new(false),
    });
    let server = TestServer::start_with(store.clone()).await;
    let http = reqwest::Client::new();
    let case_id = file(&http, &server).await;

    let track_url = server.url("/api/complaints/track");
    let request = tokio::spawn(async move {
        http.get(track_url)
            .query(&[("caseId", case_id.as_str())])
            .send()
            .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!store.lookup_done.load(Ordering::SeqCst));

    tokio::time::timeout(Duration::from_secs(5), server.stop())
        .await
        .expect("server did not stop");
    assert!(store.lookup_done.load(Ordering::SeqCst));

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
}
