use crate::domain::model::{Page, Participant, ParticipantOrdering, ParticipantQuery, Winner};
use crate::domain::ports::{ParticipantStore, WinnerStore};
use crate::utils::error::{RaffleError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store for both tables. Data is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    participants: RwLock<HashMap<Uuid, Participant>>,
    winners: RwLock<Vec<Winner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_search(p: &Participant, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    p.email.to_lowercase().contains(&needle)
        || p.full_name.to_lowercase().contains(&needle)
        || p.phone.to_lowercase().contains(&needle)
}

fn sort_participants(rows: &mut [Participant], ordering: ParticipantOrdering) {
    match ordering {
        ParticipantOrdering::CreatedAtAsc => rows.sort_by_key(|p| p.created_at),
        ParticipantOrdering::CreatedAtDesc => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ParticipantOrdering::FullNameAsc => rows.sort_by(|a, b| a.full_name.cmp(&b.full_name)),
        ParticipantOrdering::FullNameDesc => rows.sort_by(|a, b| b.full_name.cmp(&a.full_name)),
        ParticipantOrdering::VerifiedAsc => rows.sort_by_key(|p| p.is_verified),
        ParticipantOrdering::VerifiedDesc => rows.sort_by(|a, b| b.is_verified.cmp(&a.is_verified)),
    }
}

#[async_trait]
impl ParticipantStore for InMemoryStore {
    async fn create(&self, participant: Participant) -> Result<Participant> {
        let mut rows = self.participants.write().await;
        if rows.values().any(|p| p.email == participant.email) {
            return Err(RaffleError::DuplicateEmail {
                email: participant.email,
            });
        }
        rows.insert(participant.id, participant.clone());
        Ok(participant)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Participant>> {
        Ok(self.participants.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Participant>> {
        let rows = self.participants.read().await;
        Ok(rows.values().find(|p| p.email == email).cloned())
    }

    async fn find_by_verification_token(&self, token: Uuid) -> Result<Option<Participant>> {
        let rows = self.participants.read().await;
        Ok(rows.values().find(|p| p.verification_token == token).cloned())
    }

    async fn find_by_password_token(&self, token: Uuid) -> Result<Option<Participant>> {
        let rows = self.participants.read().await;
        Ok(rows
            .values()
            .find(|p| p.password_token == Some(token))
            .cloned())
    }

    async fn save(&self, participant: &Participant) -> Result<()> {
        let mut rows = self.participants.write().await;
        match rows.get_mut(&participant.id) {
            Some(row) => {
                *row = participant.clone();
                Ok(())
            }
            None => Err(RaffleError::NotFound {
                entity: "Participant",
                id: participant.id,
            }),
        }
    }

    async fn eligible(&self) -> Result<Vec<Participant>> {
        let rows = self.participants.read().await;
        let mut eligible: Vec<Participant> = rows.values().filter(|p| p.is_eligible()).cloned().collect();
        sort_participants(&mut eligible, ParticipantOrdering::CreatedAtAsc);
        Ok(eligible)
    }

    async fn list(&self, query: &ParticipantQuery) -> Result<Page<Participant>> {
        let rows = self.participants.read().await;
        let mut matched: Vec<Participant> = rows
            .values()
            .filter(|p| !p.is_admin)
            .filter(|p| query.is_verified.is_none_or(|v| p.is_verified == v))
            .filter(|p| {
                query
                    .search
                    .as_deref()
                    .is_none_or(|s| s.is_empty() || matches_search(p, s))
            })
            .cloned()
            .collect();
        sort_participants(&mut matched, query.ordering);

        let page = query.page.max(1);
        let page_size = query.page_size.max(1);
        let count = matched.len() as u64;
        let offset = (page - 1).saturating_mul(page_size);
        let results = matched
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(page_size).unwrap_or(usize::MAX))
            .collect();

        Ok(Page {
            count,
            page,
            page_size,
            results,
        })
    }

    async fn count(&self, is_verified: Option<bool>) -> Result<u64> {
        let rows = self.participants.read().await;
        Ok(rows
            .values()
            .filter(|p| !p.is_admin)
            .filter(|p| is_verified.is_none_or(|v| p.is_verified == v))
            .count() as u64)
    }

    async fn clear_non_admins(&self) -> Result<u64> {
        let mut rows = self.participants.write().await;
        let before = rows.len();
        rows.retain(|_, p| p.is_admin);
        // 與資料庫的 ON DELETE CASCADE 一致
        let remaining: Vec<Uuid> = rows.keys().copied().collect();
        self.winners
            .write()
            .await
            .retain(|w| remaining.contains(&w.participant_id));
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl WinnerStore for InMemoryStore {
    async fn insert(&self, winner: &Winner) -> Result<()> {
        self.winners.write().await.push(winner.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Winner>> {
        Ok(self.winners.read().await.iter().find(|w| w.id == id).cloned())
    }

    async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let mut rows = self.winners.write().await;
        match rows.iter_mut().find(|w| w.id == id && !w.notified) {
            Some(w) => {
                w.notified = true;
                w.notified_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<Winner>> {
        let mut rows = self.winners.read().await.clone();
        rows.sort_by(|a, b| b.drawn_at.cmp(&a.drawn_at));
        Ok(rows)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.winners.read().await.len() as u64)
    }

    async fn clear(&self) -> Result<u64> {
        let mut rows = self.winners.write().await;
        let n = rows.len() as u64;
        rows.clear();
        Ok(n)
    }
}
