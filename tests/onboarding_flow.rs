//! Integration tests for the onboarding REST surface.
//!
//! Each test spins up an Axum server on a random port over an in-memory
//! database and exercises the real HTTP contract, including the
//! gateway-injected actor headers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use uuid::Uuid;

use pro_onboard::onboarding::{GateRouteState, OnboardingGate, onboarding_routes};
use pro_onboard::store::LibSqlBackend;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Start an Axum server on a random port, return the port.
async fn start_server() -> u16 {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let gate = Arc::new(OnboardingGate::new(db));
    let app = onboarding_routes(GateRouteState { gate });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    port
}

struct Api {
    client: reqwest::Client,
    base: String,
}

impl Api {
    fn new(port: u16) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("http://127.0.0.1:{port}"),
        }
    }

    async fn post_as_professional(&self, id: Uuid, path: &str, body: Value) -> Value {
        self.client
            .post(format!("{}{path}", self.base))
            .header("x-actor-role", "professional")
            .header("x-actor-id", id.to_string())
            .json(&body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn post_as_admin(&self, path: &str, body: Value) -> Value {
        self.client
            .post(format!("{}{path}", self.base))
            .header("x-actor-role", "admin")
            .json(&body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn status(&self, id: Uuid) -> Value {
        self.client
            .get(format!("{}/api/onboarding/status", self.base))
            .header("x-actor-role", "professional")
            .header("x-actor-id", id.to_string())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

fn profile_body() -> Value {
    json!({
        "area_of_expertise": "FAMILY_LAWYER",
        "years_of_experience": 8,
        "bio": "Mediation-first family law practice.",
        "location": "Kochi"
    })
}

/// Upload a document and have the admin verify it; returns the document id.
async fn upload_and_verify(api: &Api, id: Uuid, file_ref: &str) -> String {
    let uploaded = api
        .post_as_professional(
            id,
            "/api/onboarding/documents",
            json!({"document_type": "GOVERNMENT_ID", "file_ref": file_ref}),
        )
        .await;
    assert_eq!(uploaded["success"], true, "upload failed: {uploaded}");
    let doc_id = uploaded["document"]["id"].as_str().unwrap().to_string();

    let verified = api
        .post_as_admin(
            "/api/onboarding/documents/verify",
            json!({
                "professional_id": id.to_string(),
                "document_id": doc_id,
                "verdict": "VERIFIED"
            }),
        )
        .await;
    assert_eq!(verified["success"], true, "verify failed: {verified}");
    doc_id
}

/// Walk the professional through documents and KYC, landing on PORTFOLIO.
async fn pass_evidence_steps(api: &Api, id: Uuid) {
    upload_and_verify(api, id, "upload-1").await;
    upload_and_verify(api, id, "upload-2").await;

    let advanced = api
        .post_as_professional(id, "/api/onboarding/steps/submit", json!({"step": "DOCUMENTS"}))
        .await;
    assert_eq!(advanced["success"], true);
    assert_eq!(advanced["current_step"], "VIDEO_KYC");

    let submitted = api
        .post_as_professional(id, "/api/onboarding/kyc", json!({"session_ref": "session-1"}))
        .await;
    assert_eq!(submitted["success"], true);
    assert_eq!(submitted["video_kyc"]["status"], "SUBMITTED");

    let verdict = api
        .post_as_admin(
            "/api/onboarding/kyc/verify",
            json!({"professional_id": id.to_string(), "verdict": "VERIFIED"}),
        )
        .await;
    assert_eq!(verdict["success"], true);

    let advanced = api
        .post_as_professional(id, "/api/onboarding/steps/submit", json!({"step": "VIDEO_KYC"}))
        .await;
    assert_eq!(advanced["success"], true);
    assert_eq!(advanced["current_step"], "PORTFOLIO");
}

#[tokio::test]
async fn full_onboarding_flow() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let api = Api::new(port);
        let id = Uuid::new_v4();

        let profile = api
            .post_as_professional(id, "/api/onboarding/profile", profile_body())
            .await;
        assert_eq!(profile["success"], true, "profile failed: {profile}");
        assert_eq!(profile["current_step"], "DOCUMENTS");

        pass_evidence_steps(&api, id).await;

        let portfolio = api
            .post_as_professional(
                id,
                "/api/onboarding/portfolio",
                json!({"name": "Custody appeals", "artifact_ref": "upload-7"}),
            )
            .await;
        assert_eq!(portfolio["success"], true);
        assert_eq!(portfolio["current_step"], "AVAILABILITY");

        let availability = api
            .post_as_professional(
                id,
                "/api/onboarding/availability",
                json!({
                    "monday": true,
                    "wednesday": true,
                    "from_time": "09:00:00",
                    "to_time": "17:00:00",
                    "consultation_type": "VIDEO",
                    "consultation_duration_minutes": 30
                }),
            )
            .await;
        assert_eq!(availability["success"], true);
        assert_eq!(availability["current_step"], "PAYMENT");
        assert!(
            availability["message"]
                .as_str()
                .unwrap()
                .contains("Monday, Wednesday")
        );

        let payment = api
            .post_as_professional(
                id,
                "/api/onboarding/payment-methods",
                json!({
                    "account_holder_name": "A. Menon",
                    "bank_name": "Federal Bank",
                    "account_number": "123456789012",
                    "ifsc_code": "FDRL0001234"
                }),
            )
            .await;
        assert_eq!(payment["success"], true, "payment failed: {payment}");
        assert_eq!(payment["current_step"], "COMPLETE");
        assert_eq!(payment["onboarding_completed"], true);

        let status = api.status(id).await;
        let status = &status["status"];
        assert_eq!(status["current_step"], "COMPLETE");
        assert_eq!(status["current_step_number"], 7);
        assert_eq!(status["onboarding_completed"], true);
        assert_eq!(status["completed_steps"].as_array().unwrap().len(), 6);
        assert_eq!(status["progress_percentage"], 100.0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn documents_step_needs_two_verified() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let api = Api::new(port);
        let id = Uuid::new_v4();

        api.post_as_professional(id, "/api/onboarding/profile", profile_body())
            .await;

        // One verified, one left pending
        upload_and_verify(&api, id, "upload-1").await;
        let pending = api
            .post_as_professional(
                id,
                "/api/onboarding/documents",
                json!({"document_type": "PASSPORT", "file_ref": "upload-2"}),
            )
            .await;
        assert_eq!(pending["success"], true);
        assert_eq!(pending["documents_count"], 2);

        let rejected = api
            .post_as_professional(id, "/api/onboarding/steps/submit", json!({"step": "DOCUMENTS"}))
            .await;
        assert_eq!(rejected["success"], false);
        assert_eq!(rejected["message"], "need 2 verified documents, have 1");

        // The failed submission mutated nothing
        let status = api.status(id).await;
        assert_eq!(status["status"]["current_step"], "DOCUMENTS");
        assert_eq!(
            status["status"]["blocking_issues"],
            json!(["1 document(s) pending admin verification"])
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn mixed_payment_descriptor_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let api = Api::new(port);
        let id = Uuid::new_v4();

        api.post_as_professional(id, "/api/onboarding/profile", profile_body())
            .await;
        pass_evidence_steps(&api, id).await;
        api.post_as_professional(
            id,
            "/api/onboarding/portfolio",
            json!({"name": "Sample filings", "no_artifact": true}),
        )
        .await;
        api.post_as_professional(
            id,
            "/api/onboarding/availability",
            json!({"friday": true, "from_time": "10:00:00", "to_time": "13:00:00"}),
        )
        .await;

        // Bank and wallet fields both partially filled
        let mixed = api
            .post_as_professional(
                id,
                "/api/onboarding/payment-methods",
                json!({"bank_name": "SBI", "wallet_provider": "gpay"}),
            )
            .await;
        assert_eq!(mixed["success"], false);
        assert_eq!(mixed["message"], "exactly one payment method type required");

        // A complete wallet descriptor still works afterwards
        let wallet = api
            .post_as_professional(
                id,
                "/api/onboarding/payment-methods",
                json!({"wallet_provider": "gpay", "wallet_phone_number": "+919567894970"}),
            )
            .await;
        assert_eq!(wallet["success"], true);
        assert_eq!(wallet["onboarding_completed"], true);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn steps_must_be_submitted_in_order() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let api = Api::new(port);
        let id = Uuid::new_v4();

        api.post_as_professional(id, "/api/onboarding/profile", profile_body())
            .await;

        let out_of_order = api
            .post_as_professional(
                id,
                "/api/onboarding/availability",
                json!({"monday": true, "from_time": "09:00:00", "to_time": "17:00:00"}),
            )
            .await;
        assert_eq!(out_of_order["success"], false);
        assert_eq!(
            out_of_order["message"],
            "cannot submit AVAILABILITY step while on DOCUMENTS, complete steps in order"
        );

        let status = api.status(id).await;
        assert_eq!(status["status"]["current_step"], "DOCUMENTS");
        assert_eq!(status["status"]["completed_steps"], json!(["PROFILE"]));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn verification_requires_admin() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let api = Api::new(port);
        let id = Uuid::new_v4();

        api.post_as_professional(id, "/api/onboarding/profile", profile_body())
            .await;
        let uploaded = api
            .post_as_professional(
                id,
                "/api/onboarding/documents",
                json!({"document_type": "PASSPORT", "file_ref": "upload-1"}),
            )
            .await;
        let doc_id = uploaded["document"]["id"].as_str().unwrap();

        // The professional attempting to verify their own document
        let response = api
            .post_as_professional(
                id,
                "/api/onboarding/documents/verify",
                json!({
                    "professional_id": id.to_string(),
                    "document_id": doc_id,
                    "verdict": "VERIFIED"
                }),
            )
            .await;
        assert_eq!(response["success"], false);
        assert!(response["message"].as_str().unwrap().starts_with("not authorized"));

        // Requests without actor headers are turned away at the door
        let raw = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/onboarding/documents"))
            .json(&json!({"document_type": "PASSPORT", "file_ref": "x"}))
            .send()
            .await
            .unwrap();
        assert_eq!(raw.status(), reqwest::StatusCode::UNAUTHORIZED);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn status_reads_are_idempotent_and_guidance_tracks_evidence() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let api = Api::new(port);
        let id = Uuid::new_v4();

        // First status contact creates the record at PROFILE
        let first = api.status(id).await;
        assert_eq!(first["status"]["current_step"], "PROFILE");
        assert_eq!(first["status"]["current_step_number"], 1);
        let second = api.status(id).await;
        assert_eq!(first, second);

        api.post_as_professional(id, "/api/onboarding/profile", profile_body())
            .await;
        let at_documents = api.status(id).await;
        assert_eq!(
            at_documents["status"]["next_step_guidance"],
            "need 2 verified documents, have 0"
        );

        upload_and_verify(&api, id, "upload-1").await;
        upload_and_verify(&api, id, "upload-2").await;
        let ready = api.status(id).await;
        assert_eq!(
            ready["status"]["next_step_guidance"],
            "All requirements met, submit the DOCUMENTS step to continue."
        );
        assert_eq!(ready["status"]["blocking_issues"], json!([]));
    })
    .await
    .expect("test timed out");
}
