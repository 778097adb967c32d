use crate::domain::model::{EmailMessage, Page, Participant, ParticipantQuery, Winner};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Insert a new participant. A taken email yields `DuplicateEmail`.
    async fn create(&self, participant: Participant) -> Result<Participant>;
    async fn get(&self, id: Uuid) -> Result<Option<Participant>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Participant>>;
    async fn find_by_verification_token(&self, token: Uuid) -> Result<Option<Participant>>;
    async fn find_by_password_token(&self, token: Uuid) -> Result<Option<Participant>>;
    /// Overwrite an existing participant; `NotFound` if it is gone.
    async fn save(&self, participant: &Participant) -> Result<()>;
    /// Verified, active, non-admin participants.
    async fn eligible(&self) -> Result<Vec<Participant>>;
    async fn list(&self, query: &ParticipantQuery) -> Result<Page<Participant>>;
    /// Non-admin participants, optionally by verification flag.
    async fn count(&self, is_verified: Option<bool>) -> Result<u64>;
    /// Remove every non-admin participant, returning how many went.
    async fn clear_non_admins(&self) -> Result<u64>;
}

#[async_trait]
pub trait WinnerStore: Send + Sync {
    async fn insert(&self, winner: &Winner) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Winner>>;
    /// Flip `notified` from false to true. Returns false when it was already set or the row is gone.
    async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Winner>>;
    async fn count(&self) -> Result<u64>;
    async fn clear(&self) -> Result<u64>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}
