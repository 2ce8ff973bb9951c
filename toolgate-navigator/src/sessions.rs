//! Navigation state keyed by session.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use toolgate_primitives::SessionId;
use tracing::debug;

use crate::navigation::NavigationState;

/// Per-session [`NavigationState`]s. Sessions never observe each other.
///
/// Only sessions positioned inside a category hold an entry; a session at
/// the top is indistinguishable from one never seen.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<SessionId, NavigationState>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a session's state. Unknown sessions are at the top.
    #[must_use]
    pub fn state(&self, session: &SessionId) -> NavigationState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    /// Runs `f` on the session's state while holding the write lock.
    pub fn update<T>(&self, session: &SessionId, f: impl FnOnce(&mut NavigationState) -> T) -> T {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut state = inner.get(session).cloned().unwrap_or_default();
        let result = f(&mut state);
        match state {
            NavigationState::AtTop => {
                inner.remove(session);
            }
            inside => {
                inner.insert(session.clone(), inside);
            }
        }
        result
    }

    /// Drops a session, returning its last state.
    pub fn end_session(&self, session: &SessionId) -> Option<NavigationState> {
        let removed = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session);
        if removed.is_some() {
            debug!(session = %session, "navigation session ended");
        }
        removed
    }

    /// Number of sessions currently inside a category.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no session is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new();
        let alice = SessionId::random();
        let bob = SessionId::random();

        store.update(&alice, |state| *state = NavigationState::InCategory("DAG".into()));

        assert_eq!(store.state(&alice).category(), Some("DAG"));
        assert_eq!(store.state(&bob), NavigationState::AtTop);
    }

    #[test]
    fn top_level_sessions_hold_no_entry() {
        let store = SessionStore::new();
        let session = SessionId::random();

        store.update(&session, |_| ());
        assert!(store.is_empty());

        store.update(&session, |state| *state = NavigationState::InCategory("DAG".into()));
        assert_eq!(store.len(), 1);

        store.update(&session, |state| *state = NavigationState::AtTop);
        assert!(store.is_empty());
    }

    #[test]
    fn ending_a_session_resets_it() {
        let store = SessionStore::new();
        let session = SessionId::new("conn-1").unwrap();
        store.update(&session, |state| *state = NavigationState::InCategory("Pool".into()));

        assert_eq!(
            store.end_session(&session),
            Some(NavigationState::InCategory("Pool".into()))
        );
        assert!(store.is_empty());
        assert_eq!(store.state(&session), NavigationState::AtTop);
    }
}
