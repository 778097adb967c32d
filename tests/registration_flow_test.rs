mod common;

use common::*;
use raffle_server::core::admin::AdminService;
use raffle_server::core::auth::AuthService;
use raffle_server::core::registration::{RegistrationRequest, RegistrationService};
use raffle_server::domain::model::CredentialStage;
use raffle_server::domain::ports::ParticipantStore;
use raffle_server::utils::crypto;
use raffle_server::{InMemoryStore, RaffleError};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

struct Harness {
    store: Arc<InMemoryStore>,
    notifier: Arc<RecordingNotifier>,
    registration: RegistrationService,
    auth: AuthService,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let config = test_config();
    Harness {
        registration: RegistrationService::new(
            store.clone(),
            notifier.clone(),
            templates(),
            TEST_ITERATIONS,
        ),
        auth: AuthService::new(store.clone(), &config.auth),
        store,
        notifier,
    }
}

fn request(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        email: email.to_string(),
        full_name: "  María González  ".to_string(),
        phone: "+56 9 8765-4321".to_string(),
    }
}

#[tokio::test]
async fn test_register_verify_set_password() {
    let h = harness();

    let registered = assert_ok!(h.registration.register(request("Maria@GMAIL.com")).await);
    assert_eq!(registered.email, "Maria@gmail.com");
    assert_eq!(registered.full_name, "María González");
    assert_eq!(registered.credential_stage(), CredentialStage::Unverified);
    assert!(!registered.is_eligible());

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0]
        .text_body
        .contains(&format!("/verify/{}", registered.verification_token)));

    let verified = assert_ok!(h.registration.verify_email(registered.verification_token).await);
    assert!(verified.participant.is_verified);
    assert!(verified.participant.verified_at.is_some());
    assert_eq!(
        verified.participant.credential_stage(),
        CredentialStage::AwaitingPassword
    );

    let active = assert_ok!(
        h.registration
            .set_password(verified.password_token, "Corazon-2025", "Corazon-2025")
            .await
    );
    assert_eq!(active.credential_stage(), CredentialStage::Active);
    assert!(active.password_token.is_none());
    assert!(crypto::verify_password(
        "Corazon-2025",
        active.password_hash.as_deref().unwrap()
    ));

    let eligible = h.store.eligible().await.unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, registered.id);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let h = harness();
    h.registration.register(request("ana@example.com")).await.unwrap();

    let err = assert_err!(h.registration.register(request("ana@EXAMPLE.com")).await);
    assert!(matches!(err, RaffleError::DuplicateEmail { .. }));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_register_validates_fields() {
    let h = harness();

    let mut bad_email = request("not-an-email");
    bad_email.email = "not-an-email".to_string();
    let err = assert_err!(h.registration.register(bad_email).await);
    assert!(matches!(err, RaffleError::ValidationError { ref field, .. } if field == "email"));

    let mut bad_phone = request("phone@example.com");
    bad_phone.phone = "call me".to_string();
    let err = assert_err!(h.registration.register(bad_phone).await);
    assert!(matches!(err, RaffleError::ValidationError { ref field, .. } if field == "phone"));

    assert_eq!(h.store.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_registration_survives_mail_failure() {
    let store = Arc::new(InMemoryStore::new());
    let registration = RegistrationService::new(
        store.clone(),
        Arc::new(FailingNotifier),
        templates(),
        TEST_ITERATIONS,
    );

    assert_ok!(registration.register(request("ana@example.com")).await);
    assert_eq!(store.count(None).await.unwrap(), 1);
}

#[tokio::test]
async fn test_tokens_are_single_use_and_stage_bound() {
    let h = harness();
    let registered = h.registration.register(request("ana@example.com")).await.unwrap();

    // 驗證 token 不能拿來設定密碼
    let err = assert_err!(
        h.registration
            .set_password(registered.verification_token, "Corazon-2025", "Corazon-2025")
            .await
    );
    assert!(matches!(err, RaffleError::InvalidToken { .. }));

    let verified = h.registration.verify_email(registered.verification_token).await.unwrap();
    let err = assert_err!(h.registration.verify_email(registered.verification_token).await);
    assert!(matches!(err, RaffleError::InvalidToken { .. }));

    h.registration
        .set_password(verified.password_token, "Corazon-2025", "Corazon-2025")
        .await
        .unwrap();
    let err = assert_err!(
        h.registration
            .set_password(verified.password_token, "Another-Pass-9", "Another-Pass-9")
            .await
    );
    assert!(matches!(err, RaffleError::InvalidToken { .. }));
}

#[tokio::test]
async fn test_set_password_rules() {
    let h = harness();
    let registered = h.registration.register(request("corazon@example.com")).await.unwrap();
    let token = h
        .registration
        .verify_email(registered.verification_token)
        .await
        .unwrap()
        .password_token;

    let mismatch = assert_err!(h.registration.set_password(token, "Corazon-2025", "Corazon-2026").await);
    assert!(matches!(mismatch, RaffleError::ValidationError { ref field, .. } if field == "password_confirm"));

    for weak in ["short", "12345678901", "password123", "corazon"] {
        let err = assert_err!(h.registration.set_password(token, weak, weak).await);
        assert!(matches!(err, RaffleError::ValidationError { .. }), "{weak} accepted");
    }

    // 失敗後 token 仍可使用
    assert_ok!(h.registration.set_password(token, "Corazon-2025", "Corazon-2025").await);
}

#[tokio::test]
async fn test_login_only_for_admins() {
    let h = harness();
    let admin_service = AdminService::new(h.store.clone(), h.store.clone(), TEST_ITERATIONS);
    admin_service
        .create_admin("boss@example.com", "The Boss", "+56900000000", ADMIN_PASSWORD)
        .await
        .unwrap();

    let registered = h.registration.register(request("ana@example.com")).await.unwrap();
    let token = h
        .registration
        .verify_email(registered.verification_token)
        .await
        .unwrap()
        .password_token;
    h.registration
        .set_password(token, "Corazon-2025", "Corazon-2025")
        .await
        .unwrap();

    let outcome = assert_ok!(h.auth.login("boss@example.com", ADMIN_PASSWORD).await);
    assert!(outcome.user.is_admin);
    assert_eq!(outcome.user.full_name, "The Boss");

    let operator = assert_ok!(
        h.auth
            .authorize(Some(&format!("Bearer {}", outcome.tokens.access)))
            .await
    );
    assert_eq!(operator.email, "boss@example.com");

    let wrong = assert_err!(h.auth.login("boss@example.com", "Not-The-Password").await);
    assert!(matches!(wrong, RaffleError::Unauthorized { .. }));

    let unknown = assert_err!(h.auth.login("nobody@example.com", ADMIN_PASSWORD).await);
    assert!(matches!(unknown, RaffleError::Unauthorized { .. }));

    let participant = assert_err!(h.auth.login("ana@example.com", "Corazon-2025").await);
    assert!(matches!(participant, RaffleError::Forbidden { .. }));
}

#[tokio::test]
async fn test_refresh_and_token_types() {
    let h = harness();
    let admin_service = AdminService::new(h.store.clone(), h.store.clone(), TEST_ITERATIONS);
    admin_service
        .create_admin("boss@example.com", "The Boss", "+56900000000", ADMIN_PASSWORD)
        .await
        .unwrap();
    let outcome = h.auth.login("boss@example.com", ADMIN_PASSWORD).await.unwrap();

    let access = assert_ok!(h.auth.refresh(&outcome.tokens.refresh).await);
    assert_ok!(h.auth.authorize(Some(&format!("Bearer {access}"))).await);

    // access token 不能當 refresh token 用，反之亦然
    let err = assert_err!(h.auth.refresh(&outcome.tokens.access).await);
    assert!(matches!(err, RaffleError::TokenError { .. }));
    let err = assert_err!(
        h.auth
            .authorize(Some(&format!("Bearer {}", outcome.tokens.refresh)))
            .await
    );
    assert!(matches!(err, RaffleError::TokenError { .. }));

    let err = assert_err!(h.auth.authorize(None).await);
    assert!(matches!(err, RaffleError::Unauthorized { .. }));
    let err = assert_err!(h.auth.authorize(Some("Bearer not.a.jwt")).await);
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_deactivated_admin_loses_access() {
    let h = harness();
    let admin_service = AdminService::new(h.store.clone(), h.store.clone(), TEST_ITERATIONS);
    let mut boss = admin_service
        .create_admin("boss@example.com", "The Boss", "+56900000000", ADMIN_PASSWORD)
        .await
        .unwrap();
    let outcome = h.auth.login("boss@example.com", ADMIN_PASSWORD).await.unwrap();

    boss.is_active = false;
    h.store.save(&boss).await.unwrap();

    let err = assert_err!(
        h.auth
            .authorize(Some(&format!("Bearer {}", outcome.tokens.access)))
            .await
    );
    assert!(matches!(err, RaffleError::Forbidden { .. }));
}
