//! Conversation roster tests
//!
//! Run with: cargo test -p integration-tests --test conversation_tests

use std::sync::atomic::Ordering;
use std::sync::Arc;

use integration_tests::{author, message, viewer, MockChatApi};
use relay_core::{ConversationId, UserId};
use relay_sync::{shared_state, ConversationManager};

fn setup() -> (Arc<MockChatApi>, relay_sync::SharedState, ConversationManager) {
    let api = Arc::new(MockChatApi::new(viewer()));
    let state = shared_state(viewer().id);
    let manager = ConversationManager::new(api.clone(), state.clone());
    (api, state, manager)
}

fn ids(raw: &[&str]) -> Vec<UserId> {
    raw.iter().map(|id| UserId::new(*id)).collect()
}

#[tokio::test]
async fn test_create_requires_two_distinct_participants() {
    let (api, _state, manager) = setup();

    let result = manager.create(ids(&["me", "me"]), None, false).await;

    assert!(result.unwrap_err().is_validation());
    assert_eq!(api.create_conversation_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_group_requires_a_name() {
    let (api, _state, manager) = setup();

    let result = manager.create(ids(&["me", "u2", "u3"]), Some("  ".into()), true).await;

    assert!(result.unwrap_err().is_validation());
    assert_eq!(api.create_conversation_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_create_one_to_one() {
    let (_api, _state, manager) = setup();

    let outcome = manager.create(ids(&["me", "u2"]), None, false).await.unwrap();

    assert!(!outcome.is_existing());
    assert_eq!(manager.list().len(), 1);
}

#[tokio::test]
async fn test_duplicate_one_to_one_short_circuits_locally() {
    let (api, _state, manager) = setup();

    let first = manager.create(ids(&["me", "u2"]), None, false).await.unwrap();
    // Participant order must not matter
    let second = manager.create(ids(&["u2", "me"]), None, false).await.unwrap();

    assert!(second.is_existing());
    assert_eq!(second.conversation().id, first.conversation().id);
    assert_eq!(api.create_conversation_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_duplicate_one_to_one_resolved_by_the_server() {
    let (api, _state, manager) = setup();
    let first = manager.create(ids(&["me", "u2"]), None, false).await.unwrap();

    // A second client with an empty roster cannot dedup locally
    let fresh_state = shared_state(viewer().id);
    let other_client = ConversationManager::new(api.clone(), fresh_state);
    let second = other_client.create(ids(&["me", "u2"]), None, false).await.unwrap();

    assert!(second.is_existing());
    assert_eq!(second.conversation().id, first.conversation().id);
    assert_eq!(api.create_conversation_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_groups_with_same_participants_are_not_deduped() {
    let (_api, _state, manager) = setup();

    let first = manager
        .create(ids(&["me", "u2", "u3"]), Some("launch".into()), true)
        .await
        .unwrap();
    let second = manager
        .create(ids(&["me", "u2", "u3"]), Some("retro".into()), true)
        .await
        .unwrap();

    assert!(!second.is_existing());
    assert_ne!(first.conversation().id, second.conversation().id);
}

#[tokio::test]
async fn test_mark_read_zeroes_unread_count() {
    let (api, _state, manager) = setup();
    let mut conv = integration_tests::conversation("c1", &["me", "u2"], false);
    conv.unread_count = 3;
    api.seed_conversations(vec![conv]);
    manager.refresh().await.unwrap();
    assert_eq!(manager.unread_total(), 3);

    manager.mark_read(&ConversationId::new("c1")).await.unwrap();
    assert_eq!(manager.unread_total(), 0);
}

#[tokio::test]
async fn test_failed_mark_read_restores_the_unread_count() {
    let (api, _state, manager) = setup();
    let mut conv = integration_tests::conversation("c1", &["me", "u2"], false);
    conv.unread_count = 3;
    api.seed_conversations(vec![conv]);
    manager.refresh().await.unwrap();

    api.fail_mark_reads(true);
    assert!(manager.mark_read(&ConversationId::new("c1")).await.is_err());
    assert_eq!(manager.unread_total(), 3);
}

#[tokio::test]
async fn test_failed_mark_read_keeps_the_mention_badge() {
    let (api, state, manager) = setup();
    api.seed_conversations(vec![integration_tests::conversation("c1", &["me", "u2"], false)]);
    manager.refresh().await.unwrap();

    let mut msg = message("m1", author("u2", "Bea"), "ping @me", 0);
    msg.conversation_id = Some(ConversationId::new("c1"));
    msg.mentions = vec![viewer().id];
    state.lock().apply_delta(vec![msg]);
    assert_eq!(state.lock().mentions.total(), 1);

    // Counted message ids are never re-observed, so a reset that outran
    // the server would lose the badge for good
    api.fail_mark_reads(true);
    assert!(manager.mark_read(&ConversationId::new("c1")).await.is_err());
    assert_eq!(state.lock().mentions.total(), 1);

    api.fail_mark_reads(false);
    manager.mark_read(&ConversationId::new("c1")).await.unwrap();
    assert_eq!(state.lock().mentions.total(), 0);
}

#[tokio::test]
async fn test_server_conflict_resolves_to_the_existing_conversation() {
    let (api, _state, manager) = setup();
    let first = manager.create(ids(&["me", "u2"]), None, false).await.unwrap();

    // A second client with an empty roster hits a server that answers 409
    // for the duplicate instead of resolving it
    api.conflict_on_duplicate_create(true);
    let fresh_state = shared_state(viewer().id);
    let other_client = ConversationManager::new(api.clone(), fresh_state);
    let second = other_client.create(ids(&["u2", "me"]), None, false).await.unwrap();

    assert!(second.is_existing());
    assert_eq!(second.conversation().id, first.conversation().id);
}

#[tokio::test]
async fn test_mark_read_resets_the_context_mention_badge() {
    let (api, state, manager) = setup();
    api.seed_conversations(vec![integration_tests::conversation("c1", &["me", "u2"], false)]);
    manager.refresh().await.unwrap();

    let mut msg = message("m1", author("u2", "Bea"), "ping @me", 0);
    msg.conversation_id = Some(ConversationId::new("c1"));
    msg.mentions = vec![viewer().id];
    state.lock().apply_delta(vec![msg]);
    assert_eq!(state.lock().mentions.total(), 1);

    manager.mark_read(&ConversationId::new("c1")).await.unwrap();
    assert_eq!(state.lock().mentions.total(), 0);
}

#[tokio::test]
async fn test_mark_read_unknown_conversation() {
    let (_api, _state, manager) = setup();
    let result = manager.mark_read(&ConversationId::new("ghost")).await;
    assert!(result.unwrap_err().is_not_found());
}
