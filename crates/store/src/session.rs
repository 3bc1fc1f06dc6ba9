//! Process-wide auth session.
//!
//! One `SessionProvider` is constructed at bootstrap and shared by
//! reference everywhere a component needs the signed-in user. Consumers
//! subscribe for changes and unsubscribe by dropping the receiver —
//! nothing re-reads or re-instantiates session state on its own.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use cf_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(AuthSession),
    SignedOut,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct SessionProvider {
    current: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionProvider {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            events: broadcast::channel(16).0,
        }
    }

    /// The current session, if signed in.
    pub fn current(&self) -> Option<AuthSession> {
        self.current.read().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.read().is_some()
    }

    /// Install a session and notify subscribers.
    pub fn set_session(&self, session: AuthSession) {
        TraceEvent::SessionChanged {
            user_id: session.user_id.clone(),
            signed_in: true,
        }
        .emit();
        *self.current.write() = Some(session.clone());
        let _ = self.events.send(SessionEvent::SignedIn(session));
    }

    /// Clear the session and notify subscribers.
    pub fn clear(&self) {
        let previous = self.current.write().take();
        if let Some(prev) = previous {
            TraceEvent::SessionChanged {
                user_id: prev.user_id,
                signed_in: false,
            }
            .emit();
            let _ = self.events.send(SessionEvent::SignedOut);
        }
    }

    /// Subscribe to session changes. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Active subscriber count (diagnostics only).
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user: &str) -> AuthSession {
        AuthSession {
            user_id: user.into(),
            email: Some(format!("{user}@example.com")),
            access_token: "tok".into(),
            confirmed_at: Some(Utc::now()),
        }
    }

    #[test]
    fn starts_signed_out() {
        let provider = SessionProvider::new();
        assert!(provider.current().is_none());
        assert!(!provider.is_signed_in());
    }

    #[test]
    fn set_and_clear() {
        let provider = SessionProvider::new();
        provider.set_session(session("u1"));
        assert_eq!(provider.current().unwrap().user_id, "u1");

        provider.clear();
        assert!(provider.current().is_none());
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let provider = SessionProvider::new();
        let mut rx = provider.subscribe();

        provider.set_session(session("u1"));
        provider.clear();

        match rx.recv().await.unwrap() {
            SessionEvent::SignedIn(s) => assert_eq!(s.user_id, "u1"),
            other => panic!("expected SignedIn, got {other:?}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), SessionEvent::SignedOut));
    }

    #[test]
    fn dropping_receiver_unsubscribes() {
        let provider = SessionProvider::new();
        let rx = provider.subscribe();
        assert_eq!(provider.subscriber_count(), 1);
        drop(rx);
        assert_eq!(provider.subscriber_count(), 0);
    }

    #[test]
    fn clear_without_session_emits_nothing() {
        let provider = SessionProvider::new();
        let mut rx = provider.subscribe();
        provider.clear();
        assert!(rx.try_recv().is_err());
    }
}
