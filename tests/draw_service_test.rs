mod common;

use common::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use raffle_server::domain::ports::{Notifier, ParticipantStore, WinnerStore};
use raffle_server::{DrawService, InMemoryStore, RaffleError};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

fn draw_service(store: &Arc<InMemoryStore>, notifier: Arc<dyn Notifier>, seed: u64) -> DrawService {
    DrawService::with_rng(
        store.clone(),
        store.clone(),
        notifier,
        templates(),
        "Weekend at the lake".to_string(),
        StdRng::seed_from_u64(seed),
    )
}

#[tokio::test]
async fn test_winner_is_always_in_the_eligible_set() {
    for n in 1..=6usize {
        for seed in 0..5u64 {
            let store = Arc::new(InMemoryStore::new());
            let op = admin("admin@example.com");
            let eligible: Vec<_> = (0..n)
                .map(|i| verified(&format!("p{i}@example.com"), &format!("Person {i}"), i as i64))
                .collect();
            insert_all(store.as_ref(), &eligible).await;
            insert_all(store.as_ref(), &[op.clone(), unverified("late@example.com", "Late", 1)]).await;

            let service = draw_service(&store, Arc::new(RecordingNotifier::default()), seed);
            let details = assert_ok!(service.draw_winner(&operator_of(&op)).await);

            let ids: HashSet<Uuid> = eligible.iter().map(|p| p.id).collect();
            assert!(ids.contains(&details.participant), "n={n} seed={seed}");
        }
    }
}

#[tokio::test]
async fn test_empty_eligible_set_fails_without_writing() {
    let store = Arc::new(InMemoryStore::new());
    let op = admin("admin@example.com");
    let mut inactive = verified("gone@example.com", "Gone", 3);
    inactive.is_active = false;
    insert_all(
        store.as_ref(),
        &[op.clone(), inactive, unverified("new@example.com", "New", 1)],
    )
    .await;

    let service = draw_service(&store, Arc::new(RecordingNotifier::default()), 7);
    let err = assert_err!(service.draw_winner(&operator_of(&op)).await);

    assert!(matches!(err, RaffleError::NoEligibleParticipants));
    assert_eq!(err.status_code(), 400);
    assert_eq!(WinnerStore::count(store.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failing_notifier_keeps_the_draw() {
    let store = Arc::new(InMemoryStore::new());
    let op = admin("admin@example.com");
    let ana = verified("ana@example.com", "Ana", 5);
    insert_all(store.as_ref(), &[op.clone(), ana.clone()]).await;

    let service = draw_service(&store, Arc::new(FailingNotifier), 1);
    let details = assert_ok!(service.draw_winner(&operator_of(&op)).await);

    assert_eq!(details.participant, ana.id);
    assert!(!details.notified);
    assert!(details.notified_at.is_none());

    let stored = WinnerStore::get(store.as_ref(), details.id).await.unwrap().unwrap();
    assert!(!stored.notified);
    assert_eq!(WinnerStore::count(store.as_ref()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_admin_is_never_selected() {
    let store = Arc::new(InMemoryStore::new());
    let op = admin("admin@example.com");
    let bob = verified("bob@example.com", "Bob", 2);
    insert_all(store.as_ref(), &[op.clone(), bob.clone()]).await;

    let service = draw_service(&store, Arc::new(RecordingNotifier::default()), 42);
    for _ in 0..20 {
        let details = service.draw_winner(&operator_of(&op)).await.unwrap();
        assert_eq!(details.participant, bob.id);
    }
}

#[tokio::test]
async fn test_three_eligible_participants_with_working_notifier() {
    let store = Arc::new(InMemoryStore::new());
    let op = admin("admin@example.com");
    let trio = vec![
        verified("maria@example.com", "María", 30),
        verified("carlos@example.com", "Carlos", 20),
        verified("sofia@example.com", "Sofía", 10),
    ];
    insert_all(store.as_ref(), &trio).await;
    insert_all(store.as_ref(), &[op.clone()]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let service = draw_service(&store, notifier.clone(), 3);
    let before = WinnerStore::count(store.as_ref()).await.unwrap();

    let details = service.draw_winner(&operator_of(&op)).await.unwrap();

    assert_eq!(WinnerStore::count(store.as_ref()).await.unwrap(), before + 1);
    assert!(details.notified);
    assert!(details.notified_at.is_some());
    assert!(trio.iter().any(|p| p.id == details.participant));
    assert_eq!(details.drawn_by, Some(op.id));
    assert_eq!(details.drawn_by_name.as_deref(), Some("Raffle Admin"));
    assert_eq!(details.prize_description, "Weekend at the lake");

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_email, details.participant_email);
    assert!(sent[0].text_body.contains("Weekend at the lake"));
}

#[tokio::test]
async fn test_same_seed_gives_same_winner() {
    let store = Arc::new(InMemoryStore::new());
    let op = admin("admin@example.com");
    let people: Vec<_> = (0..10)
        .map(|i| verified(&format!("p{i}@example.com"), &format!("Person {i}"), i))
        .collect();
    insert_all(store.as_ref(), &people).await;

    let first = draw_service(&store, Arc::new(RecordingNotifier::default()), 99)
        .draw_winner(&operator_of(&op))
        .await
        .unwrap();
    let second = draw_service(&store, Arc::new(RecordingNotifier::default()), 99)
        .draw_winner(&operator_of(&op))
        .await
        .unwrap();

    assert_eq!(first.participant, second.participant);
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_notify_winner_after_failed_send() {
    let store = Arc::new(InMemoryStore::new());
    let op = admin("admin@example.com");
    insert_all(store.as_ref(), &[op.clone(), verified("ana@example.com", "Ana", 5)]).await;

    let failed = draw_service(&store, Arc::new(FailingNotifier), 1)
        .draw_winner(&operator_of(&op))
        .await
        .unwrap();
    assert!(!failed.notified);

    let notifier = Arc::new(RecordingNotifier::default());
    let service = draw_service(&store, notifier.clone(), 1);

    let resent = assert_ok!(service.notify_winner(failed.id).await);
    assert!(resent.notified);
    assert_eq!(resent.drawn_by_name.as_deref(), Some("Raffle Admin"));
    assert_eq!(notifier.sent().len(), 1);

    // 旗標只會由 false 變 true 一次
    let again = assert_err!(service.notify_winner(failed.id).await);
    assert!(matches!(again, RaffleError::AlreadyNotified { .. }));
    assert_eq!(notifier.sent().len(), 1);

    let stored = WinnerStore::get(store.as_ref(), failed.id).await.unwrap().unwrap();
    assert!(stored.notified);
    assert_eq!(stored.notified_at, resent.notified_at);
}

#[tokio::test]
async fn test_notify_winner_surfaces_send_failure() {
    let store = Arc::new(InMemoryStore::new());
    let op = admin("admin@example.com");
    insert_all(store.as_ref(), &[op.clone(), verified("ana@example.com", "Ana", 5)]).await;

    let service = draw_service(&store, Arc::new(FailingNotifier), 1);
    let drawn = service.draw_winner(&operator_of(&op)).await.unwrap();

    let err = assert_err!(service.notify_winner(drawn.id).await);
    assert!(matches!(err, RaffleError::NotificationFailure { .. }));
    assert_eq!(err.status_code(), 502);

    let missing = assert_err!(service.notify_winner(Uuid::new_v4()).await);
    assert!(matches!(missing, RaffleError::NotFound { entity: "Winner", .. }));
}

#[tokio::test]
async fn test_concurrent_draws_each_record_one_winner() {
    let store = Arc::new(InMemoryStore::new());
    let op = admin("admin@example.com");
    let people: Vec<_> = (0..4)
        .map(|i| verified(&format!("p{i}@example.com"), &format!("Person {i}"), i))
        .collect();
    insert_all(store.as_ref(), &people).await;
    insert_all(store.as_ref(), &[op.clone()]).await;

    let service = Arc::new(draw_service(&store, Arc::new(RecordingNotifier::default()), 5));
    let operator = operator_of(&op);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let service = Arc::clone(&service);
            let operator = operator.clone();
            tokio::spawn(async move { service.draw_winner(&operator).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let details = handle.await.unwrap().unwrap();
        ids.insert(details.id);
    }

    assert_eq!(ids.len(), 10);
    assert_eq!(WinnerStore::count(store.as_ref()).await.unwrap(), 10);
    assert_eq!(ParticipantStore::count(store.as_ref(), None).await.unwrap(), 4);
}
