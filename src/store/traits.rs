//! `Database` trait — single async interface for onboarding persistence.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::onboarding::record::{
    Availability, Document, KycStatus, PaymentMethodRecord, PortfolioItem, ProfessionalRecord,
    ProfileDetails, VerificationStatus, VideoKyc,
};
use crate::onboarding::step::OnboardingStep;

/// Backend-agnostic persistence for onboarding records and their evidence.
///
/// Every method is a single atomic mutation (or read); serialization of
/// the guard-check-then-advance sequence is the gate's responsibility.
/// Records are never deleted.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Load a record with all evidence collections, if it exists.
    async fn get_record(&self, professional_id: Uuid) -> Result<Option<ProfessionalRecord>, DatabaseError>;

    /// Load a record, creating a fresh one at the first step if missing.
    async fn ensure_record(&self, professional_id: Uuid) -> Result<ProfessionalRecord, DatabaseError>;

    /// Persist progression state: current step, completed set, and the
    /// derived completion flag.
    async fn save_progress(
        &self,
        professional_id: Uuid,
        current_step: OnboardingStep,
        completed_steps: &BTreeSet<OnboardingStep>,
        onboarding_completed: bool,
    ) -> Result<(), DatabaseError>;

    /// Persist profile fields.
    async fn save_profile(
        &self,
        professional_id: Uuid,
        profile: &ProfileDetails,
    ) -> Result<(), DatabaseError>;

    /// Append a document evidence row.
    async fn insert_document(
        &self,
        professional_id: Uuid,
        document: &Document,
    ) -> Result<(), DatabaseError>;

    /// Set a document's verification verdict. Returns false when no such
    /// document exists for the professional.
    async fn set_document_status(
        &self,
        professional_id: Uuid,
        document_id: Uuid,
        status: VerificationStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DatabaseError>;

    /// Insert or replace the single video-KYC row.
    async fn upsert_video_kyc(
        &self,
        professional_id: Uuid,
        kyc: &VideoKyc,
    ) -> Result<(), DatabaseError>;

    /// Set the video-KYC verdict. Returns false when no KYC row exists.
    async fn set_video_kyc_status(
        &self,
        professional_id: Uuid,
        status: KycStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DatabaseError>;

    /// Append a portfolio item.
    async fn insert_portfolio_item(
        &self,
        professional_id: Uuid,
        item: &PortfolioItem,
    ) -> Result<(), DatabaseError>;

    /// Insert or replace the availability window.
    async fn upsert_availability(
        &self,
        professional_id: Uuid,
        availability: &Availability,
    ) -> Result<(), DatabaseError>;

    /// Append a payment method.
    async fn insert_payment_method(
        &self,
        professional_id: Uuid,
        method: &PaymentMethodRecord,
    ) -> Result<(), DatabaseError>;
}
