use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a participant stands in the credential flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStage {
    /// Registered, email not yet confirmed.
    Unverified,
    /// Email confirmed; waiting for a password.
    AwaitingPassword,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Uuid,
    #[serde(skip_serializing)]
    pub password_token: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// A freshly registered, unverified participant.
    pub fn new(email: String, full_name: String, phone: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            full_name,
            phone,
            password_hash: None,
            is_verified: false,
            verification_token: Uuid::new_v4(),
            password_token: None,
            verified_at: None,
            is_active: true,
            is_staff: false,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Verified, active and not an administrator.
    pub fn is_eligible(&self) -> bool {
        self.is_verified && self.is_active && !self.is_admin
    }

    pub fn credential_stage(&self) -> CredentialStage {
        if !self.is_verified {
            CredentialStage::Unverified
        } else if self.password_hash.is_none() {
            CredentialStage::AwaitingPassword
        } else {
            CredentialStage::Active
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.full_name, self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub drawn_at: DateTime<Utc>,
    pub drawn_by: Option<Uuid>,
    pub notified: bool,
    pub notified_at: Option<DateTime<Utc>>,
    pub prize_description: String,
}

impl Winner {
    pub fn new(
        participant_id: Uuid,
        drawn_by: Option<Uuid>,
        prize_description: String,
        drawn_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            participant_id,
            drawn_at,
            drawn_by,
            notified: false,
            notified_at: None,
            prize_description,
        }
    }
}

/// The authenticated administrator acting on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
}

impl From<&Participant> for Operator {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            email: p.email.clone(),
            full_name: p.full_name.clone(),
        }
    }
}

/// Winner joined with the participant and operator it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerDetails {
    pub id: Uuid,
    pub participant: Uuid,
    pub participant_name: String,
    pub participant_email: String,
    pub participant_phone: String,
    pub drawn_at: DateTime<Utc>,
    pub drawn_by: Option<Uuid>,
    pub drawn_by_name: Option<String>,
    pub notified: bool,
    pub notified_at: Option<DateTime<Utc>>,
    pub prize_description: String,
}

impl WinnerDetails {
    pub fn new(winner: &Winner, participant: &Participant, drawn_by_name: Option<String>) -> Self {
        Self {
            id: winner.id,
            participant: participant.id,
            participant_name: participant.full_name.clone(),
            participant_email: participant.email.clone(),
            participant_phone: participant.phone.clone(),
            drawn_at: winner.drawn_at,
            drawn_by: winner.drawn_by,
            drawn_by_name,
            notified: winner.notified,
            notified_at: winner.notified_at,
            prize_description: winner.prize_description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticipantOrdering {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
    FullNameAsc,
    FullNameDesc,
    VerifiedAsc,
    VerifiedDesc,
}

impl ParticipantOrdering {
    /// Parses `created_at`, `-created_at`, `full_name`, `is_verified` and friends.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "created_at" => Some(Self::CreatedAtAsc),
            "-created_at" => Some(Self::CreatedAtDesc),
            "full_name" => Some(Self::FullNameAsc),
            "-full_name" => Some(Self::FullNameDesc),
            "is_verified" => Some(Self::VerifiedAsc),
            "-is_verified" => Some(Self::VerifiedDesc),
            _ => None,
        }
    }
}

/// Filter for the admin participant listing. Admin accounts are always excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantQuery {
    pub is_verified: Option<bool>,
    pub search: Option<String>,
    pub ordering: ParticipantOrdering,
    /// 1-based.
    pub page: u64,
    pub page_size: u64,
}

impl Default for ParticipantQuery {
    fn default() -> Self {
        Self {
            is_verified: None,
            search: None,
            ordering: ParticipantOrdering::default(),
            page: 1,
            page_size: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub total_participants: u64,
    pub verified: u64,
    pub pending: u64,
    pub eligible_for_draw: u64,
    pub winners_drawn: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub text_body: String,
}
