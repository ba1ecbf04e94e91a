//! REST endpoints projecting the onboarding mutations.
//!
//! Every mutation answers `{success, message, ...}` with HTTP 200; a
//! failed call carries `success: false` and a human-readable message,
//! never a structured error code. Identity is established by the
//! upstream gateway, which injects the actor headers.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::GateError;
use crate::onboarding::guard::REQUIRED_VERIFIED_DOCUMENTS;

use super::gate::{EvidenceRef, OnboardingGate, StepAdvance, Verdict};
use super::payload::{
    AvailabilitySubmission, PaymentSubmission, PortfolioSubmission, ProfileSubmission, StepPayload,
};
use super::record::{Availability, DocumentType};

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct GateRouteState {
    pub gate: Arc<OnboardingGate>,
}

/// Header names the identity gateway injects after verifying the bearer
/// credential.
const ACTOR_ROLE_HEADER: &str = "x-actor-role";
const ACTOR_ID_HEADER: &str = "x-actor-id";

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let reject = |message: &str| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "message": message})),
            )
        };

        let role = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| reject("Missing actor role header"))?;

        match role {
            "admin" => Ok(Actor::Admin),
            "professional" => {
                let id = parts
                    .headers
                    .get(ACTOR_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| Uuid::parse_str(v).ok())
                    .ok_or_else(|| reject("Missing or invalid actor id header"))?;
                Ok(Actor::Professional { id })
            }
            _ => Err(reject("Unknown actor role")),
        }
    }
}

/// Map a gate error to the `{success: false, message}` envelope.
fn error_response(err: GateError) -> Json<Value> {
    let message = match &err {
        GateError::Database(db_err) => {
            tracing::error!(error = %db_err, "Database error during onboarding operation");
            "An unexpected error occurred. Please try again.".to_string()
        }
        other => other.to_string(),
    };
    Json(json!({"success": false, "message": message}))
}

/// The professional's own id, or a failure response for admin callers on
/// self-service routes.
fn own_id(actor: &Actor) -> Result<Uuid, Json<Value>> {
    match actor {
        Actor::Professional { id } => Ok(*id),
        Actor::Admin => Err(Json(json!({
            "success": false,
            "message": "not authorized: this operation is for professionals"
        }))),
    }
}

fn advance_json(advance: &StepAdvance, message: String) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
        "completed_step": advance.completed_step,
        "current_step": advance.current_step,
        "next_step": advance.current_step,
        "onboarding_completed": advance.onboarding_completed,
    }))
}

/// POST /api/onboarding/profile
///
/// Step 1: create or update the professional profile. The record is
/// created implicitly on the first call.
async fn update_profile(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(submission): Json<ProfileSubmission>,
) -> Json<Value> {
    let professional_id = match own_id(&actor) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state
        .gate
        .submit_step(&actor, professional_id, StepPayload::Profile(submission))
        .await
    {
        Ok(advance) => advance_json(
            &advance,
            "Profile setup completed successfully! Please proceed to document upload.".to_string(),
        ),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct UploadDocumentRequest {
    document_type: DocumentType,
    file_ref: String,
}

/// POST /api/onboarding/documents
///
/// Step 2: register an uploaded document (file travels out-of-band; only
/// the reference lands here). The document starts PENDING and the step
/// only advances after verification plus an explicit step submission.
async fn upload_document(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(request): Json<UploadDocumentRequest>,
) -> Json<Value> {
    let professional_id = match own_id(&actor) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state
        .gate
        .upload_document(&actor, professional_id, request.document_type, request.file_ref)
        .await
    {
        Ok((document, count)) => {
            let message = if count >= REQUIRED_VERIFIED_DOCUMENTS {
                format!(
                    "Document uploaded successfully. You have {count} documents uploaded. \
                     Please wait for admin verification."
                )
            } else {
                format!(
                    "Document uploaded successfully. Please upload at least {} more document(s).",
                    REQUIRED_VERIFIED_DOCUMENTS - count
                )
            };
            Json(json!({
                "success": true,
                "message": message,
                "document": document,
                "documents_count": count,
            }))
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct VerifyDocumentRequest {
    professional_id: Uuid,
    document_id: Uuid,
    verdict: Verdict,
}

/// POST /api/onboarding/documents/verify
///
/// Admin: record a document verdict. Never advances the professional's
/// step by itself.
async fn verify_document(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(request): Json<VerifyDocumentRequest>,
) -> Json<Value> {
    match state
        .gate
        .record_verdict(
            &actor,
            request.professional_id,
            EvidenceRef::Document { id: request.document_id },
            request.verdict,
        )
        .await
    {
        Ok(outcome) => {
            let verdict_word = match outcome.verdict {
                Verdict::Verified => "verified",
                Verdict::Rejected => "rejected",
            };
            let message = if outcome.guard_satisfied {
                format!(
                    "Document {verdict_word} successfully. \
                     Professional can now submit the documents step."
                )
            } else {
                format!(
                    "Document {verdict_word} successfully. {}/{REQUIRED_VERIFIED_DOCUMENTS} \
                     documents verified.",
                    outcome.verified_documents
                )
            };
            Json(json!({
                "success": true,
                "message": message,
                "verified_documents": outcome.verified_documents,
                "guard_satisfied": outcome.guard_satisfied,
            }))
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
struct CompleteKycRequest {
    #[serde(default)]
    session_ref: Option<String>,
}

/// POST /api/onboarding/kyc
///
/// Step 3: mark the video-KYC session as submitted. Advancement needs a
/// separate admin verdict plus an explicit step submission.
async fn complete_video_kyc(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(request): Json<CompleteKycRequest>,
) -> Json<Value> {
    let professional_id = match own_id(&actor) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state
        .gate
        .submit_video_kyc(&actor, professional_id, request.session_ref)
        .await
    {
        Ok(kyc) => Json(json!({
            "success": true,
            "message": "Video KYC submitted. Please wait for admin verification.",
            "video_kyc": kyc,
        })),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct VerifyKycRequest {
    professional_id: Uuid,
    verdict: Verdict,
}

/// POST /api/onboarding/kyc/verify
///
/// Admin: record the video-KYC verdict.
async fn verify_video_kyc(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(request): Json<VerifyKycRequest>,
) -> Json<Value> {
    match state
        .gate
        .record_verdict(&actor, request.professional_id, EvidenceRef::VideoKyc, request.verdict)
        .await
    {
        Ok(outcome) => {
            let verdict_word = match outcome.verdict {
                Verdict::Verified => "verified",
                Verdict::Rejected => "rejected",
            };
            let message = if outcome.guard_satisfied {
                format!(
                    "Video KYC {verdict_word} successfully. \
                     Professional can now submit the video KYC step."
                )
            } else {
                format!("Video KYC {verdict_word} successfully.")
            };
            Json(json!({
                "success": true,
                "message": message,
                "guard_satisfied": outcome.guard_satisfied,
            }))
        }
        Err(err) => error_response(err),
    }
}

/// POST /api/onboarding/portfolio
///
/// Step 4: create a portfolio entry and advance.
async fn create_portfolio(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(submission): Json<PortfolioSubmission>,
) -> Json<Value> {
    let professional_id = match own_id(&actor) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state
        .gate
        .submit_step(&actor, professional_id, StepPayload::Portfolio(submission))
        .await
    {
        Ok(advance) => advance_json(
            &advance,
            "Portfolio created successfully! Please proceed to set your consultation availability."
                .to_string(),
        ),
        Err(err) => error_response(err),
    }
}

/// POST /api/onboarding/availability
///
/// Step 5: set the weekly consultation window and advance.
async fn set_availability(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(submission): Json<AvailabilitySubmission>,
) -> Json<Value> {
    let professional_id = match own_id(&actor) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let selected_days = Availability::from(submission.clone()).selected_days().join(", ");
    match state
        .gate
        .submit_step(&actor, professional_id, StepPayload::Availability(submission))
        .await
    {
        Ok(advance) => advance_json(
            &advance,
            format!(
                "Consultation availability set successfully for {selected_days}. \
                 Please proceed to payment setup."
            ),
        ),
        Err(err) => error_response(err),
    }
}

/// POST /api/onboarding/payment-methods
///
/// Step 6: register the payout descriptor; completes onboarding.
async fn add_payment_method(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(submission): Json<PaymentSubmission>,
) -> Json<Value> {
    let professional_id = match own_id(&actor) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state
        .gate
        .submit_step(&actor, professional_id, StepPayload::Payment(submission))
        .await
    {
        Ok(advance) => advance_json(
            &advance,
            "Payment method added successfully! Onboarding completed! \
             You can now start receiving consultation bookings."
                .to_string(),
        ),
        Err(err) => error_response(err),
    }
}

/// POST /api/onboarding/steps/submit
///
/// Explicit step submission — the idempotent re-check used for the
/// evidence-driven steps once verdicts have landed.
async fn submit_step(
    State(state): State<GateRouteState>,
    actor: Actor,
    Json(payload): Json<StepPayload>,
) -> Json<Value> {
    let professional_id = match own_id(&actor) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let step = payload.step();
    match state.gate.submit_step(&actor, professional_id, payload).await {
        Ok(advance) => {
            let message = if advance.onboarding_completed {
                "All steps completed! You can now receive consultation bookings.".to_string()
            } else {
                format!("{step} step completed. Next: {}.", advance.current_step)
            };
            advance_json(&advance, message)
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
struct StatusQuery {
    #[serde(default)]
    professional_id: Option<Uuid>,
}

/// GET /api/onboarding/status
///
/// Current step, completed set, and fresh guidance for the unmet guard.
/// Admins pass `?professional_id=`; professionals read their own record.
async fn check_status(
    State(state): State<GateRouteState>,
    actor: Actor,
    Query(query): Query<StatusQuery>,
) -> Json<Value> {
    let professional_id = match (&actor, query.professional_id) {
        (Actor::Professional { id }, _) => *id,
        (Actor::Admin, Some(id)) => id,
        (Actor::Admin, None) => {
            return Json(json!({
                "success": false,
                "message": "professional_id query parameter required"
            }));
        }
    };
    match state.gate.get_status(&actor, professional_id).await {
        Ok(status) => Json(json!({
            "success": true,
            "message": "Onboarding status retrieved successfully",
            "status": status,
        })),
        Err(err) => error_response(err),
    }
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: GateRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/profile", post(update_profile))
        .route("/api/onboarding/documents", post(upload_document))
        .route("/api/onboarding/documents/verify", post(verify_document))
        .route("/api/onboarding/kyc", post(complete_video_kyc))
        .route("/api/onboarding/kyc/verify", post(verify_video_kyc))
        .route("/api/onboarding/portfolio", post(create_portfolio))
        .route("/api/onboarding/availability", post(set_availability))
        .route("/api/onboarding/payment-methods", post(add_payment_method))
        .route("/api/onboarding/steps/submit", post(submit_step))
        .route("/api/onboarding/status", get(check_status))
        .with_state(state)
}
