#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use raffle_server::config::AppConfig;
use raffle_server::core::messages::MessageTemplates;
use raffle_server::domain::model::{EmailMessage, Operator, Participant};
use raffle_server::domain::ports::{Notifier, ParticipantStore};
use raffle_server::utils::crypto;
use raffle_server::{RaffleError, Result};
use std::sync::Mutex;

/// Low iteration count so hashing stays fast in tests.
pub const TEST_ITERATIONS: u32 = 1_000;
pub const ADMIN_PASSWORD: &str = "Admin-Secret-42";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "memory".to_string();
    config.auth.jwt_secret = "test-secret".to_string();
    config.auth.password_iterations = TEST_ITERATIONS;
    config.raffle.prize_description = "Weekend at the lake".to_string();
    config
}

pub fn templates() -> MessageTemplates {
    MessageTemplates::from_config(&test_config())
}

/// Remembers every message it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Always fails, like a mail provider that is down.
#[derive(Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: &EmailMessage) -> Result<()> {
        Err(RaffleError::NotificationFailure {
            message: "smtp unreachable".to_string(),
        })
    }
}

/// Verified, active participant created `age_minutes` ago.
pub fn verified(email: &str, full_name: &str, age_minutes: i64) -> Participant {
    let now = Utc::now() - Duration::minutes(age_minutes);
    let mut p = Participant::new(email.to_string(), full_name.to_string(), "+56911112222".to_string(), now);
    p.is_verified = true;
    p.verified_at = Some(now);
    p
}

pub fn unverified(email: &str, full_name: &str, age_minutes: i64) -> Participant {
    let now = Utc::now() - Duration::minutes(age_minutes);
    Participant::new(email.to_string(), full_name.to_string(), "+56933334444".to_string(), now)
}

pub fn admin(email: &str) -> Participant {
    let mut p = verified(email, "Raffle Admin", 500);
    p.is_admin = true;
    p.is_staff = true;
    p.password_hash = Some(crypto::hash_password(ADMIN_PASSWORD, TEST_ITERATIONS).unwrap());
    p
}

pub fn operator_of(p: &Participant) -> Operator {
    Operator::from(p)
}

pub async fn insert_all(store: &dyn ParticipantStore, participants: &[Participant]) {
    for p in participants {
        store.create(p.clone()).await.unwrap();
    }
}
