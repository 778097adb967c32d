use crate::core::messages::MessageTemplates;
use crate::domain::model::{Operator, Participant, Winner, WinnerDetails};
use crate::domain::ports::{Notifier, ParticipantStore, WinnerStore};
use crate::utils::error::{RaffleError, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Picks a winner among the eligible participants and notifies them.
pub struct DrawService {
    participants: Arc<dyn ParticipantStore>,
    winners: Arc<dyn WinnerStore>,
    notifier: Arc<dyn Notifier>,
    templates: MessageTemplates,
    prize_description: String,
    // Held from the eligible-set read until the winner row is written.
    draw_lock: Mutex<StdRng>,
}

impl DrawService {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        winners: Arc<dyn WinnerStore>,
        notifier: Arc<dyn Notifier>,
        templates: MessageTemplates,
        prize_description: String,
    ) -> Self {
        Self::with_rng(
            participants,
            winners,
            notifier,
            templates,
            prize_description,
            StdRng::from_os_rng(),
        )
    }

    pub fn with_rng(
        participants: Arc<dyn ParticipantStore>,
        winners: Arc<dyn WinnerStore>,
        notifier: Arc<dyn Notifier>,
        templates: MessageTemplates,
        prize_description: String,
        rng: StdRng,
    ) -> Self {
        Self {
            participants,
            winners,
            notifier,
            templates,
            prize_description,
            draw_lock: Mutex::new(rng),
        }
    }

    pub async fn draw_winner(&self, operator: &Operator) -> Result<WinnerDetails> {
        let (chosen, mut winner) = {
            let mut rng = self.draw_lock.lock().await;

            let mut eligible = self.participants.eligible().await?;
            if eligible.is_empty() {
                tracing::warn!(operator = %operator.email, "Draw requested with no eligible participants");
                return Err(RaffleError::NoEligibleParticipants);
            }

            let index = rng.random_range(0..eligible.len());
            let chosen = eligible.swap_remove(index);
            let winner = Winner::new(
                chosen.id,
                Some(operator.id),
                self.prize_description.clone(),
                Utc::now(),
            );
            self.winners.insert(&winner).await?;

            tracing::info!(
                winner_id = %winner.id,
                participant = %chosen.email,
                operator = %operator.email,
                "🎉 Winner drawn"
            );
            (chosen, winner)
        };

        if let Err(e) = self.send_notification(&chosen, &mut winner).await {
            tracing::warn!(
                winner_id = %winner.id,
                "❌ Winner notification failed, draw kept with notified=false: {}",
                e
            );
        }

        Ok(WinnerDetails::new(
            &winner,
            &chosen,
            Some(operator.full_name.clone()),
        ))
    }

    /// Re-sends the prize email for a winner that has not been notified yet.
    pub async fn notify_winner(&self, winner_id: Uuid) -> Result<WinnerDetails> {
        let mut winner = self
            .winners
            .get(winner_id)
            .await?
            .ok_or(RaffleError::NotFound {
                entity: "Winner",
                id: winner_id,
            })?;
        if winner.notified {
            return Err(RaffleError::AlreadyNotified { id: winner_id });
        }

        let participant = self
            .participants
            .get(winner.participant_id)
            .await?
            .ok_or(RaffleError::NotFound {
                entity: "Participant",
                id: winner.participant_id,
            })?;

        self.send_notification(&participant, &mut winner).await?;

        let drawn_by_name = match winner.drawn_by {
            Some(id) => self.participants.get(id).await?.map(|p| p.full_name),
            None => None,
        };
        Ok(WinnerDetails::new(&winner, &participant, drawn_by_name))
    }

    /// Sends the prize email, then flips the stored flag. `winner` mirrors what was stored.
    async fn send_notification(&self, participant: &Participant, winner: &mut Winner) -> Result<()> {
        let message = self.templates.winner_email(participant, winner);
        self.notifier.send(&message).await.map_err(|e| match e {
            RaffleError::NotificationFailure { .. } => e,
            other => RaffleError::NotificationFailure {
                message: other.to_string(),
            },
        })?;

        let now = Utc::now();
        if self.winners.mark_notified(winner.id, now).await? {
            winner.notified = true;
            winner.notified_at = Some(now);
            tracing::info!(winner_id = %winner.id, to = %participant.email, "✅ Winner notified");
        } else {
            tracing::warn!(winner_id = %winner.id, "Winner flag was already set or row is gone");
        }
        Ok(())
    }
}
