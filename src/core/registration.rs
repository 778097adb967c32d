use crate::core::messages::MessageTemplates;
use crate::domain::model::{CredentialStage, Participant};
use crate::domain::ports::{Notifier, ParticipantStore};
use crate::utils::crypto;
use crate::utils::error::{RaffleError, Result};
use crate::utils::validation;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub full_name: String,
    pub phone: String,
}

/// Result of confirming an email: the participant plus the one-time password token.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedParticipant {
    pub participant: Participant,
    pub password_token: Uuid,
}

/// Registration, email verification and password setup.
pub struct RegistrationService {
    participants: Arc<dyn ParticipantStore>,
    notifier: Arc<dyn Notifier>,
    templates: MessageTemplates,
    password_iterations: u32,
}

impl RegistrationService {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        notifier: Arc<dyn Notifier>,
        templates: MessageTemplates,
        password_iterations: u32,
    ) -> Self {
        Self {
            participants,
            notifier,
            templates,
            password_iterations,
        }
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<Participant> {
        let email = validation::normalize_email(&request.email);
        let full_name = request.full_name.trim().to_string();
        let phone = request.phone.trim().to_string();

        validation::validate_email(&email)?;
        validation::validate_full_name(&full_name)?;
        validation::validate_phone(&phone)?;

        if self.participants.find_by_email(&email).await?.is_some() {
            return Err(RaffleError::DuplicateEmail { email });
        }

        let participant = self
            .participants
            .create(Participant::new(email, full_name, phone, Utc::now()))
            .await?;
        tracing::info!(participant_id = %participant.id, email = %participant.email, "Participant registered");

        // 寄信失敗不影響註冊結果
        let message = self.templates.verification_email(&participant);
        match self.notifier.send(&message).await {
            Ok(()) => tracing::info!(to = %participant.email, "✅ Verification email sent"),
            Err(e) => tracing::warn!(to = %participant.email, "❌ Verification email failed: {}", e),
        }

        Ok(participant)
    }

    /// Consumes the verification token and issues the password token.
    pub async fn verify_email(&self, token: Uuid) -> Result<VerifiedParticipant> {
        let mut participant = self
            .participants
            .find_by_verification_token(token)
            .await?
            .filter(|p| p.credential_stage() == CredentialStage::Unverified)
            .ok_or_else(|| RaffleError::invalid_token("Invalid or already used verification token."))?;

        let now = Utc::now();
        let password_token = Uuid::new_v4();
        participant.is_verified = true;
        participant.verified_at = Some(now);
        participant.password_token = Some(password_token);
        participant.updated_at = now;
        self.participants.save(&participant).await?;

        tracing::info!(participant_id = %participant.id, "Email verified");
        Ok(VerifiedParticipant {
            participant,
            password_token,
        })
    }

    pub async fn set_password(
        &self,
        password_token: Uuid,
        password: &str,
        password_confirm: &str,
    ) -> Result<Participant> {
        let mut participant = self
            .participants
            .find_by_password_token(password_token)
            .await?
            .filter(|p| p.credential_stage() == CredentialStage::AwaitingPassword)
            .ok_or_else(|| RaffleError::invalid_token("Invalid token or email not verified."))?;

        if password != password_confirm {
            return Err(RaffleError::validation("password_confirm", "Passwords do not match."));
        }
        validation::validate_password(password, &participant.email)?;

        participant.password_hash = Some(crypto::hash_password(password, self.password_iterations)?);
        participant.password_token = None;
        participant.updated_at = Utc::now();
        self.participants.save(&participant).await?;

        tracing::info!(participant_id = %participant.id, "Password set, participant active");
        Ok(participant)
    }
}
