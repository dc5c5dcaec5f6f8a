//! In-memory session registry.
//!
//! All connection and history state lives behind one `tokio::sync::Mutex`.
//! Frames are pushed into each connection's unbounded channel while the lock
//! is held: the push never waits on the network, and holding the lock keeps
//! every connection's frames in submission order.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use roundtable_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    config::ChatConfig,
    domain::{
        BroadcastOutcome, ChatEvent, ChatMessage, Connection, ConnectionId, MessageHistory,
        PusherChannel, RegisteredSession, RegistryError, SessionRegistry, Timestamp, Username,
    },
    infrastructure::dto::conversion::encode_event,
};

/// A registered connection and its outbound channel
struct Session {
    connection: Connection,
    channel: PusherChannel,
    /// Registration order, used for stable roster listing
    seq: u64,
}

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<ConnectionId, Session>,
    history: MessageHistory,
    next_seq: u64,
}

impl RegistryState {
    /// Push a frame to every session except `exclude`, dropping dead ones
    fn deliver_all(&mut self, frame: &str, exclude: Option<ConnectionId>) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        let mut dead = Vec::new();

        for (id, session) in &self.sessions {
            if Some(*id) == exclude {
                continue;
            }
            if session.channel.send(frame.to_string()).is_ok() {
                outcome.delivered += 1;
            } else {
                dead.push(*id);
            }
        }

        for id in dead {
            if let Some(session) = self.sessions.remove(&id) {
                tracing::warn!(
                    "Dropped connection '{}' ({}) after failed delivery",
                    id,
                    session.connection.username
                );
                outcome.evicted += 1;
            }
        }

        outcome
    }

    fn usernames(&self) -> Vec<Username> {
        let mut sessions: Vec<&Session> = self.sessions.values().collect();
        sessions.sort_by_key(|s| s.seq);
        sessions
            .into_iter()
            .map(|s| s.connection.username.clone())
            .collect()
    }
}

/// In-memory [`SessionRegistry`] implementation
pub struct InMemorySessionRegistry {
    state: Mutex<RegistryState>,
    replay_limit: usize,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionRegistry {
    pub fn new(config: ChatConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                history: MessageHistory::new(config.history_capacity),
                ..Default::default()
            }),
            replay_limit: config.replay_limit,
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn register(
        &self,
        connection_id: ConnectionId,
        username: Username,
        channel: PusherChannel,
    ) -> Result<RegisteredSession, RegistryError> {
        let connected_at = self.now();
        let mut state = self.state.lock().await;

        if state.sessions.contains_key(&connection_id) {
            tracing::error!("Connection '{}' registered twice", connection_id);
            return Err(RegistryError::DuplicateConnection(connection_id));
        }

        // The replay goes into the channel before the session becomes visible,
        // so no broadcast can overtake it.
        let replay = state.history.recent(self.replay_limit);
        if !replay.is_empty() {
            let frame = encode_event(&ChatEvent::History(replay.clone()))
                .map_err(|e| RegistryError::Encode(e.to_string()))?;
            if channel.send(frame).is_err() {
                tracing::warn!(
                    "Connection '{}' closed before its history replay",
                    connection_id
                );
                return Err(RegistryError::DeliveryFailed(connection_id));
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.sessions.insert(
            connection_id,
            Session {
                connection: Connection::new(connection_id, username.clone(), connected_at),
                channel,
                seq,
            },
        );
        let online_count = state.sessions.len();

        let joined = ChatEvent::joined(&username, connected_at, online_count);
        match encode_event(&joined) {
            Ok(frame) => {
                let outcome = state.deliver_all(&frame, Some(connection_id));
                tracing::debug!(
                    "Announced '{}' to {} connection(s), evicted {}",
                    username,
                    outcome.delivered,
                    outcome.evicted
                );
            }
            Err(e) => tracing::error!("Failed to encode join notice: {}", e),
        }

        tracing::debug!(
            "Registered connection '{}' as '{}' ({} online)",
            connection_id,
            username,
            online_count
        );

        Ok(RegisteredSession {
            connection_id,
            username,
            connected_at,
            online_count,
            replay,
        })
    }

    async fn unregister(&self, connection_id: ConnectionId) -> Option<Username> {
        let mut state = self.state.lock().await;
        let removed = state.sessions.remove(&connection_id)?;
        tracing::debug!(
            "Unregistered connection '{}' ({})",
            connection_id,
            removed.connection.username
        );
        Some(removed.connection.username)
    }

    async fn broadcast(
        &self,
        event: &ChatEvent,
        exclude: Option<ConnectionId>,
    ) -> BroadcastOutcome {
        let frame = match encode_event(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode {} frame: {}", event.kind(), e);
                return BroadcastOutcome::default();
            }
        };

        let mut state = self.state.lock().await;
        let outcome = state.deliver_all(&frame, exclude);
        tracing::debug!(
            "Broadcasted {} frame to {} connection(s), evicted {}",
            event.kind(),
            outcome.delivered,
            outcome.evicted
        );
        outcome
    }

    async fn send_to(
        &self,
        connection_id: ConnectionId,
        event: &ChatEvent,
    ) -> Result<(), RegistryError> {
        let frame = encode_event(event).map_err(|e| RegistryError::Encode(e.to_string()))?;

        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .get(&connection_id)
            .ok_or(RegistryError::ConnectionNotFound(connection_id))?;

        if session.channel.send(frame).is_err() {
            state.sessions.remove(&connection_id);
            tracing::warn!(
                "Dropped connection '{}' after failed {} delivery",
                connection_id,
                event.kind()
            );
            return Err(RegistryError::DeliveryFailed(connection_id));
        }

        tracing::debug!("Sent {} frame to '{}'", event.kind(), connection_id);
        Ok(())
    }

    async fn record_history(&self, message: ChatMessage) {
        let mut state = self.state.lock().await;
        state.history.push(message);
    }

    async fn history(&self) -> Vec<ChatMessage> {
        let state = self.state.lock().await;
        state.history.to_vec()
    }

    async fn list_online_usernames(&self) -> Vec<Username> {
        let state = self.state.lock().await;
        state.usernames()
    }

    async fn online_count(&self) -> usize {
        let state = self.state.lock().await;
        state.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_shared::time::FixedClock;
    use serde_json::Value;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    // ========================================
    // Covered here:
    // - registration / unregistration bookkeeping and idempotence
    // - broadcast exclusion and lazy removal of dead channels
    // - bounded history and the replay slice handed out on register
    // - roster ordering
    // ========================================

    const NOW: i64 = 1_700_000_000_000;

    fn create_test_registry() -> InMemorySessionRegistry {
        InMemorySessionRegistry::new(ChatConfig::default(), Arc::new(FixedClock::new(NOW)))
    }

    async fn join(
        registry: &InMemorySessionRegistry,
        name: &str,
    ) -> (ConnectionId, UnboundedReceiver<String>) {
        let id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        registry
            .register(id, Username::from(name), tx)
            .await
            .unwrap();
        (id, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    fn message(n: usize) -> ChatMessage {
        ChatMessage::new(
            Username::from("alice"),
            format!("payload {}", n),
            Timestamp::new(n as i64),
        )
    }

    #[tokio::test]
    async fn test_register_adds_connection() {
        // given:
        let registry = create_test_registry();
        let id = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when:
        let session = registry
            .register(id, Username::from("alice"), tx)
            .await
            .unwrap();

        // then:
        assert_eq!(session.connection_id, id);
        assert_eq!(session.username.as_str(), "alice");
        assert_eq!(session.connected_at, Timestamp::new(NOW));
        assert_eq!(session.online_count, 1);
        assert!(session.replay.is_empty());
        assert_eq!(registry.online_count().await, 1);
    }

    #[tokio::test]
    async fn test_register_twice_with_same_id_is_rejected() {
        // given:
        let registry = create_test_registry();
        let (id, mut first_rx) = join(&registry, "alice").await;
        let (tx, _rx) = mpsc::unbounded_channel();

        // when:
        let result = registry.register(id, Username::from("mallory"), tx).await;

        // then: the original entry is untouched
        assert_eq!(result, Err(RegistryError::DuplicateConnection(id)));
        assert_eq!(
            registry.list_online_usernames().await,
            vec![Username::from("alice")]
        );
        assert!(drain(&mut first_rx).is_empty());
    }

    #[tokio::test]
    async fn test_register_announces_join_to_others_only() {
        // given:
        let registry = create_test_registry();
        let (_alice, mut alice_rx) = join(&registry, "alice").await;

        // when:
        let (_bob, mut bob_rx) = join(&registry, "bob").await;

        // then: alice hears about bob with the post-join count; bob hears nothing
        let alice_frames = drain(&mut alice_rx);
        assert_eq!(alice_frames.len(), 1);
        assert_eq!(alice_frames[0]["type"], "system");
        assert_eq!(alice_frames[0]["message"], "bob joined the chat");
        assert_eq!(alice_frames[0]["online_count"], 2);
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_register_returns_existing_history_as_replay() {
        // given: three recorded messages
        let registry = create_test_registry();
        for n in 1..=3 {
            registry.record_history(message(n)).await;
        }

        // when: carol joins
        let id = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = registry
            .register(id, Username::from("carol"), tx)
            .await
            .unwrap();

        // then: the replay holds exactly those three entries and is already queued
        assert_eq!(session.replay, vec![message(1), message(2), message(3)]);
        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "history");
        assert_eq!(frames[0]["messages"].as_array().unwrap().len(), 3);
        assert_eq!(frames[0]["messages"][0]["message"], "payload 1");
    }

    #[tokio::test]
    async fn test_register_queues_history_ahead_of_later_broadcasts() {
        // given:
        let registry = create_test_registry();
        registry.record_history(message(1)).await;
        let (_alice, _alice_rx) = join(&registry, "alice").await;
        let (_bob, mut bob_rx) = join(&registry, "bob").await;

        // when: a message goes out right after bob registered
        registry.broadcast(&ChatEvent::Message(message(2)), None).await;

        // then:
        let frames = drain(&mut bob_rx);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["type"], "history");
        assert_eq!(frames[1]["type"], "message");
        assert_eq!(frames[1]["message"], "payload 2");
    }

    #[tokio::test]
    async fn test_register_with_closed_channel_and_history_is_not_added() {
        // given:
        let registry = create_test_registry();
        registry.record_history(message(1)).await;
        let (_alice, mut alice_rx) = join(&registry, "alice").await;
        drain(&mut alice_rx);
        let id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        // when:
        let result = registry.register(id, Username::from("ghost"), tx).await;

        // then: nobody hears about the ghost
        assert_eq!(result, Err(RegistryError::DeliveryFailed(id)));
        assert_eq!(registry.online_count().await, 1);
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_register_replay_is_capped_at_fifty() {
        // given:
        let registry = create_test_registry();
        for n in 1..=80 {
            registry.record_history(message(n)).await;
        }

        // when:
        let id = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = registry
            .register(id, Username::from("carol"), tx)
            .await
            .unwrap();

        // then:
        assert_eq!(session.replay.len(), 50);
        assert_eq!(session.replay[0], message(31));
        assert_eq!(session.replay[49], message(80));
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // given:
        let registry = create_test_registry();
        let (alice, _alice_rx) = join(&registry, "alice").await;
        let (_bob, _bob_rx) = join(&registry, "bob").await;

        // when:
        let first = registry.unregister(alice).await;
        let second = registry.unregister(alice).await;

        // then:
        assert_eq!(first, Some(Username::from("alice")));
        assert_eq!(second, None);
        assert_eq!(registry.online_count().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_unknown_handle_is_noop() {
        // given:
        let registry = create_test_registry();
        let (_alice, _rx) = join(&registry, "alice").await;

        // when:
        let result = registry.unregister(ConnectionId::generate()).await;

        // then:
        assert_eq!(result, None);
        assert_eq!(registry.online_count().await, 1);
    }

    #[tokio::test]
    async fn test_registry_size_tracks_registers_minus_successful_unregisters() {
        // given:
        let registry = create_test_registry();
        let mut ids = Vec::new();
        let mut receivers = Vec::new();
        for n in 0..5 {
            let (id, rx) = join(&registry, &format!("user{}", n)).await;
            ids.push(id);
            receivers.push(rx);
        }

        // when: two real removals, one repeat, one unknown
        let mut removed = 0;
        for id in [ids[0], ids[3], ids[0], ConnectionId::generate()] {
            if registry.unregister(id).await.is_some() {
                removed += 1;
            }
        }

        // then:
        assert_eq!(removed, 2);
        assert_eq!(registry.online_count().await, 5 - removed);
    }

    #[tokio::test]
    async fn test_broadcast_with_exclusion_skips_excluded_connection() {
        // given: alice and bob
        let registry = create_test_registry();
        let (alice, mut alice_rx) = join(&registry, "alice").await;
        let (_bob, mut bob_rx) = join(&registry, "bob").await;
        drain(&mut alice_rx);

        // when:
        let event = ChatEvent::Message(ChatMessage::new(
            Username::from("alice"),
            "hello",
            Timestamp::new(NOW),
        ));
        let outcome = registry.broadcast(&event, Some(alice)).await;

        // then: only bob receives it
        assert_eq!(outcome, BroadcastOutcome { delivered: 1, evicted: 0 });
        assert!(drain(&mut alice_rx).is_empty());
        let bob_frames = drain(&mut bob_rx);
        assert_eq!(bob_frames.len(), 1);
        assert_eq!(bob_frames[0]["message"], "hello");
        assert_eq!(
            registry.list_online_usernames().await,
            vec![Username::from("alice"), Username::from("bob")]
        );
    }

    #[tokio::test]
    async fn test_broadcast_without_exclusion_reaches_everyone() {
        // given:
        let registry = create_test_registry();
        let (_alice, mut alice_rx) = join(&registry, "alice").await;
        let (_bob, mut bob_rx) = join(&registry, "bob").await;
        drain(&mut alice_rx);

        // when:
        let event = ChatEvent::Message(message(1));
        let outcome = registry.broadcast(&event, None).await;

        // then:
        assert_eq!(outcome.delivered, 2);
        assert_eq!(drain(&mut alice_rx).len(), 1);
        assert_eq!(drain(&mut bob_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_drops_dead_connections_and_keeps_delivering() {
        // given: bob's receiving side is gone
        let registry = create_test_registry();
        let (_alice, mut alice_rx) = join(&registry, "alice").await;
        let (bob, bob_rx) = join(&registry, "bob").await;
        let (_carol, mut carol_rx) = join(&registry, "carol").await;
        drop(bob_rx);
        drain(&mut alice_rx);

        // when:
        let outcome = registry.broadcast(&ChatEvent::Message(message(1)), None).await;

        // then: the others still get the frame and bob is gone without a leave notice
        assert_eq!(outcome, BroadcastOutcome { delivered: 2, evicted: 1 });
        assert_eq!(drain(&mut alice_rx).len(), 1);
        assert_eq!(drain(&mut carol_rx).len(), 1);
        assert_eq!(
            registry.list_online_usernames().await,
            vec![Username::from("alice"), Username::from("carol")]
        );
        assert_eq!(registry.unregister(bob).await, None);
    }

    #[tokio::test]
    async fn test_broadcast_preserves_per_connection_order() {
        // given:
        let registry = create_test_registry();
        let (_alice, mut alice_rx) = join(&registry, "alice").await;

        // when:
        for n in 1..=10 {
            registry.broadcast(&ChatEvent::Message(message(n)), None).await;
        }

        // then:
        let texts: Vec<String> = drain(&mut alice_rx)
            .iter()
            .map(|f| f["message"].as_str().unwrap().to_string())
            .collect();
        let expected: Vec<String> = (1..=10).map(|n| format!("payload {}", n)).collect();
        assert_eq!(texts, expected);
    }

    #[tokio::test]
    async fn test_send_to_delivers_to_one_connection() {
        // given:
        let registry = create_test_registry();
        let (alice, mut alice_rx) = join(&registry, "alice").await;
        let (_bob, mut bob_rx) = join(&registry, "bob").await;
        drain(&mut alice_rx);

        // when:
        let users = registry.list_online_usernames().await;
        let result = registry.send_to(alice, &ChatEvent::OnlineUsers(users)).await;

        // then:
        assert!(result.is_ok());
        let frames = drain(&mut alice_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "online_users");
        assert_eq!(frames[0]["count"], 2);
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_send_to_unknown_connection_reports_error() {
        // given:
        let registry = create_test_registry();
        let unknown = ConnectionId::generate();

        // when:
        let result = registry.send_to(unknown, &ChatEvent::History(vec![])).await;

        // then:
        assert_eq!(result, Err(RegistryError::ConnectionNotFound(unknown)));
    }

    #[tokio::test]
    async fn test_send_to_dead_connection_reports_error_and_removes_it() {
        // given:
        let registry = create_test_registry();
        let (alice, alice_rx) = join(&registry, "alice").await;
        drop(alice_rx);

        // when:
        let result = registry
            .send_to(alice, &ChatEvent::History(vec![message(1)]))
            .await;

        // then:
        assert_eq!(result, Err(RegistryError::DeliveryFailed(alice)));
        assert!(registry.list_online_usernames().await.is_empty());
        assert_eq!(registry.unregister(alice).await, None);
    }

    #[tokio::test]
    async fn test_record_history_keeps_last_hundred() {
        // given:
        let registry = create_test_registry();

        // when: 150 distinct payloads
        for n in 1..=150 {
            registry.record_history(message(n)).await;
        }

        // then:
        let history = registry.history().await;
        assert_eq!(history.len(), 100);
        assert_eq!(history[0], message(51));
        assert_eq!(history[99], message(150));
    }

    #[tokio::test]
    async fn test_record_history_does_not_broadcast() {
        // given:
        let registry = create_test_registry();
        let (_alice, mut alice_rx) = join(&registry, "alice").await;

        // when:
        registry.record_history(message(1)).await;

        // then:
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_history_capacity_follows_config() {
        // given:
        let config = ChatConfig {
            history_capacity: 5,
            replay_limit: 2,
        };
        let registry = InMemorySessionRegistry::new(config, Arc::new(FixedClock::new(NOW)));
        for n in 1..=7 {
            registry.record_history(message(n)).await;
        }

        // when:
        let id = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = registry.register(id, Username::from("dave"), tx).await.unwrap();

        // then:
        assert_eq!(registry.history().await.len(), 5);
        assert_eq!(session.replay, vec![message(6), message(7)]);
    }

    #[tokio::test]
    async fn test_list_online_usernames_in_registration_order_with_duplicates() {
        // given:
        let registry = create_test_registry();
        let mut receivers = Vec::new();
        for name in ["zoe", "alice", "zoe", "mike"] {
            let (_, rx) = join(&registry, name).await;
            receivers.push(rx);
        }

        // when:
        let users = registry.list_online_usernames().await;

        // then:
        let names: Vec<&str> = users.iter().map(Username::as_str).collect();
        assert_eq!(names, vec!["zoe", "alice", "zoe", "mike"]);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_all_land() {
        // given:
        let registry = Arc::new(create_test_registry());

        // when: 32 tasks register at once
        let mut handles = Vec::new();
        for n in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (tx, rx) = mpsc::unbounded_channel();
                let username = Username::from(format!("u{}", n).as_str());
                registry
                    .register(ConnectionId::generate(), username, tx)
                    .await
                    .unwrap();
                rx
            }));
        }
        let mut receivers = Vec::new();
        for handle in handles {
            receivers.push(handle.await.unwrap());
        }

        // then:
        assert_eq!(registry.online_count().await, 32);
    }
}
