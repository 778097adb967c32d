use crate::domain::model::{
    Page, Participant, ParticipantQuery, ParticipantStats, Winner, WinnerDetails,
};
use crate::domain::ports::{ParticipantStore, WinnerStore};
use crate::utils::crypto;
use crate::utils::error::{RaffleError, Result};
use crate::utils::validation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

const DEMO_PASSWORD: &str = "Sorteo-Demo-2025";

const DEMO_PARTICIPANTS: &[(&str, &str, &str)] = &[
    ("maria.gonzalez@gmail.com", "María González Pérez", "+56987654321"),
    ("carlos.rodriguez@outlook.com", "Carlos Rodríguez Silva", "+56912345678"),
    ("sofia.martinez@yahoo.com", "Sofía Martínez López", "+56923456789"),
    ("diego.fernandez@gmail.com", "Diego Fernández Castro", "+56934567890"),
    ("valentina.torres@hotmail.com", "Valentina Torres Ramírez", "+56945678901"),
    ("sebastian.morales@gmail.com", "Sebastián Morales Herrera", "+56956789012"),
];

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

impl From<Participant> for ParticipantSummary {
    fn from(p: Participant) -> Self {
        let status = if p.is_verified {
            "Verified"
        } else {
            "Pending verification"
        };
        Self {
            id: p.id,
            email: p.email,
            full_name: p.full_name,
            phone: p.phone,
            is_verified: p.is_verified,
            created_at: p.created_at,
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDetail {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub can_participate: bool,
}

impl From<&Participant> for ParticipantDetail {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            email: p.email.clone(),
            full_name: p.full_name.clone(),
            phone: p.phone.clone(),
            is_verified: p.is_verified,
            verified_at: p.verified_at,
            created_at: p.created_at,
            can_participate: p.is_eligible(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CleanupReport {
    pub winners_deleted: u64,
    pub participants_deleted: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Read side of the admin dashboard plus the maintenance actions.
pub struct AdminService {
    participants: Arc<dyn ParticipantStore>,
    winners: Arc<dyn WinnerStore>,
    password_iterations: u32,
}

impl AdminService {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        winners: Arc<dyn WinnerStore>,
        password_iterations: u32,
    ) -> Self {
        Self {
            participants,
            winners,
            password_iterations,
        }
    }

    pub async fn list_participants(&self, query: &ParticipantQuery) -> Result<Page<ParticipantSummary>> {
        let page = self.participants.list(query).await?;
        Ok(Page {
            count: page.count,
            page: page.page,
            page_size: page.page_size,
            results: page.results.into_iter().map(ParticipantSummary::from).collect(),
        })
    }

    pub async fn participant(&self, id: Uuid) -> Result<ParticipantDetail> {
        self.participants
            .get(id)
            .await?
            .filter(|p| !p.is_admin)
            .map(|p| ParticipantDetail::from(&p))
            .ok_or(RaffleError::NotFound {
                entity: "Participant",
                id,
            })
    }

    pub async fn stats(&self) -> Result<ParticipantStats> {
        let total = self.participants.count(None).await?;
        let verified = self.participants.count(Some(true)).await?;
        let eligible = self.participants.eligible().await?.len() as u64;
        let winners_drawn = self.winners.count().await?;
        Ok(ParticipantStats {
            total_participants: total,
            verified,
            pending: total.saturating_sub(verified),
            eligible_for_draw: eligible,
            winners_drawn,
        })
    }

    pub async fn list_winners(&self) -> Result<Vec<WinnerDetails>> {
        let winners = self.winners.list().await?;
        let mut cache: HashMap<Uuid, Option<Participant>> = HashMap::new();
        let mut details = Vec::with_capacity(winners.len());
        for winner in &winners {
            if let Some(d) = self.details(winner, &mut cache).await? {
                details.push(d);
            }
        }
        Ok(details)
    }

    pub async fn winner(&self, id: Uuid) -> Result<WinnerDetails> {
        let not_found = RaffleError::NotFound {
            entity: "Winner",
            id,
        };
        let Some(winner) = self.winners.get(id).await? else {
            return Err(not_found);
        };
        self.details(&winner, &mut HashMap::new())
            .await?
            .ok_or(not_found)
    }

    async fn details(
        &self,
        winner: &Winner,
        cache: &mut HashMap<Uuid, Option<Participant>>,
    ) -> Result<Option<WinnerDetails>> {
        let Some(participant) = self.lookup(winner.participant_id, cache).await? else {
            tracing::warn!(winner_id = %winner.id, "Winner references a missing participant");
            return Ok(None);
        };
        let drawn_by_name = match winner.drawn_by {
            Some(id) => self.lookup(id, cache).await?.map(|p| p.full_name),
            None => None,
        };
        Ok(Some(WinnerDetails::new(winner, &participant, drawn_by_name)))
    }

    async fn lookup(
        &self,
        id: Uuid,
        cache: &mut HashMap<Uuid, Option<Participant>>,
    ) -> Result<Option<Participant>> {
        if let Some(hit) = cache.get(&id) {
            return Ok(hit.clone());
        }
        let found = self.participants.get(id).await?;
        cache.insert(id, found.clone());
        Ok(found)
    }

    /// Bootstraps an administrator account that can log in right away.
    pub async fn create_admin(
        &self,
        email: &str,
        full_name: &str,
        phone: &str,
        password: &str,
    ) -> Result<Participant> {
        let email = validation::normalize_email(email);
        validation::validate_email(&email)?;
        validation::validate_full_name(full_name)?;
        validation::validate_phone(phone)?;
        validation::validate_password(password, &email)?;

        if self.participants.find_by_email(&email).await?.is_some() {
            return Err(RaffleError::DuplicateEmail { email });
        }

        let now = Utc::now();
        let mut admin = Participant::new(email, full_name.trim().to_string(), phone.trim().to_string(), now);
        admin.is_admin = true;
        admin.is_staff = true;
        admin.is_verified = true;
        admin.verified_at = Some(now);
        admin.password_hash = Some(crypto::hash_password(password, self.password_iterations)?);

        let admin = self.participants.create(admin).await?;
        tracing::info!(email = %admin.email, "Administrator created");
        Ok(admin)
    }

    /// Inserts the demo participants (verified, with a password), skipping existing emails.
    pub async fn seed_fake_participants(&self) -> Result<SeedReport> {
        let mut report = SeedReport::default();
        // 所有示範帳號共用同一組密碼
        let password_hash = crypto::hash_password(DEMO_PASSWORD, self.password_iterations)?;

        for (email, full_name, phone) in DEMO_PARTICIPANTS {
            if self.participants.find_by_email(email).await?.is_some() {
                tracing::warn!(email = %email, "Participant already exists, skipping");
                report.skipped.push(email.to_string());
                continue;
            }

            let now = Utc::now();
            let mut participant =
                Participant::new(email.to_string(), full_name.to_string(), phone.to_string(), now);
            participant.is_verified = true;
            participant.verified_at = Some(now);
            participant.password_hash = Some(password_hash.clone());

            self.participants.create(participant).await?;
            report.created.push(email.to_string());
        }

        tracing::info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            "Demo participants seeded"
        );
        Ok(report)
    }

    /// Deletes all winners and all non-admin participants.
    pub async fn clean_database(&self) -> Result<CleanupReport> {
        let winners_deleted = self.winners.clear().await?;
        let participants_deleted = self.participants.clear_non_admins().await?;
        tracing::warn!(winners_deleted, participants_deleted, "🧹 Database cleaned");
        Ok(CleanupReport {
            winners_deleted,
            participants_deleted,
        })
    }
}
