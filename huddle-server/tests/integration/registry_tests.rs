use crate::{create_test_roster, init_tracing};
use huddle_core::{ConnectionId, ServerMessage};
use huddle_server::RegistryError;

#[tokio::test]
async fn join_with_case_variant_of_taken_name_is_rejected() {
    init_tracing();
    let (roster, _outbound) = create_test_roster();

    let alice = ConnectionId::new();
    let snapshot = roster.join(alice, "Alice", true).await.expect("first join");
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Alice");

    let intruder = ConnectionId::new();
    let err = roster.join(intruder, "alice", true).await.unwrap_err();
    assert_eq!(err, RegistryError::NameTaken("alice".into()));

    // The rejected join must not have touched the roster.
    assert_eq!(roster.snapshot().await.len(), 1);
}

#[tokio::test]
async fn validate_name_reflects_current_roster() {
    init_tracing();
    let (roster, _outbound) = create_test_roster();

    assert!(roster.validate_name("Bea").await);

    roster
        .join(ConnectionId::new(), "Bea", false)
        .await
        .expect("join");

    assert!(!roster.validate_name("Bea").await);
    assert!(!roster.validate_name("BEA").await);
    assert!(roster.validate_name("Ben").await);
}

#[tokio::test]
async fn join_broadcasts_to_others_and_snapshots_to_caller() {
    init_tracing();
    let (roster, outbound) = create_test_roster();

    let alice = ConnectionId::new();
    roster.join(alice, "Alice", true).await.expect("alice joins");

    // An empty room has nobody to notify.
    assert_eq!(outbound.delivery_count().await, 0);

    let bob = ConnectionId::new();
    let snapshot = roster.join(bob, "Bob", false).await.expect("bob joins");

    let names: Vec<_> = snapshot.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(snapshot.len(), 2);
    assert!(names.contains(&"Alice") && names.contains(&"Bob"));

    let to_alice = outbound.messages_for(alice).await;
    assert_eq!(to_alice.len(), 1);
    match &to_alice[0] {
        ServerMessage::ParticipantJoined { participant } => {
            assert_eq!(participant.id, bob);
            assert_eq!(participant.name, "Bob");
            assert!(!participant.audio_enabled);
        }
        other => panic!("unexpected broadcast: {other:?}"),
    }

    // The joiner learns the roster from the reply, not from its own delta.
    assert!(outbound.messages_for(bob).await.is_empty());
}

#[tokio::test]
async fn audio_toggle_broadcasts_to_everyone_including_sender() {
    init_tracing();
    let (roster, outbound) = create_test_roster();

    let alice = ConnectionId::new();
    let bob = ConnectionId::new();
    roster.join(alice, "Alice", false).await.expect("alice");
    roster.join(bob, "Bob", false).await.expect("bob");

    roster.set_audio(alice, true).await;
    // Commands are processed in order, so a snapshot reply fences the
    // toggle's broadcasts.
    roster.snapshot().await;

    let expected = ServerMessage::ParticipantUpdated {
        id: alice,
        audio_enabled: true,
    };
    assert!(outbound.messages_for(alice).await.contains(&expected));
    assert!(outbound.messages_for(bob).await.contains(&expected));
}

#[tokio::test]
async fn audio_toggle_after_leave_is_a_noop() {
    init_tracing();
    let (roster, outbound) = create_test_roster();

    let ghost = ConnectionId::new();
    roster.set_audio(ghost, true).await;
    roster.snapshot().await;

    assert_eq!(outbound.delivery_count().await, 0);
    assert!(roster.snapshot().await.is_empty());
}

#[tokio::test]
async fn leave_broadcasts_to_remaining_and_is_idempotent() {
    init_tracing();
    let (roster, outbound) = create_test_roster();

    let alice = ConnectionId::new();
    let bob = ConnectionId::new();
    let carol = ConnectionId::new();
    roster.join(alice, "Alice", true).await.expect("alice");
    roster.join(bob, "Bob", true).await.expect("bob");
    roster.join(carol, "Carol", true).await.expect("carol");

    roster.leave(bob).await;
    roster.snapshot().await;

    let left = ServerMessage::ParticipantLeft { id: bob };
    assert!(outbound.messages_for(alice).await.contains(&left));
    assert!(outbound.messages_for(carol).await.contains(&left));
    assert!(!outbound.messages_for(bob).await.contains(&left));

    let count_after_first = outbound.delivery_count().await;
    roster.leave(bob).await;
    roster.snapshot().await;
    assert_eq!(outbound.delivery_count().await, count_after_first);

    let names: Vec<_> = roster
        .snapshot()
        .await
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(!names.contains(&"Bob".to_string()));
}

#[tokio::test]
async fn concurrent_joins_with_same_name_admit_exactly_one() {
    init_tracing();
    let (roster, _outbound) = create_test_roster();

    let (first, second) = tokio::join!(
        roster.join(ConnectionId::new(), "Dana", true),
        roster.join(ConnectionId::new(), "dana", false),
    );

    assert!(
        first.is_ok() != second.is_ok(),
        "exactly one join may win: {first:?} / {second:?}"
    );
    assert_eq!(roster.snapshot().await.len(), 1);
}

#[tokio::test]
async fn rejoining_over_the_same_connection_replaces_the_entry() {
    init_tracing();
    let (roster, _outbound) = create_test_roster();

    let alice = ConnectionId::new();
    roster.join(alice, "Alice", true).await.expect("join");

    // Same handle, new name: the uniqueness check excludes the caller.
    let snapshot = roster.join(alice, "Alicia", false).await.expect("rejoin");
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Alicia");
    assert!(!snapshot[0].audio_enabled);

    // And the old name is free again.
    assert!(roster.validate_name("Alice").await);
}
