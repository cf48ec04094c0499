use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::session::models::Session;

/// In-memory store of live quiz sessions. Each session sits behind its own
/// mutex and an action holds the lock for its full duration, so a session
/// never has two actions, or two generation calls, in flight at once.
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn create(&self) -> (Uuid, Arc<Mutex<Session>>) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.insert(id, session.clone());

        (id, session)
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &Uuid) {
        self.sessions.remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Drops sessions that have been idle for longer than `max_idle` and
    /// returns how many were dropped. A locked session has an action in
    /// flight and is left alone.
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        let cutoff = Utc::now() - max_idle;
        self.sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.last_active > cutoff,
            Err(_) => true,
        });

        before.saturating_sub(self.sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch() {
        let store = SessionStore::new();
        let (id, _) = store.create();

        assert!(store.get(&id).is_some());
        assert_eq!(store.len(), 1);

        store.remove(&id);
        assert!(store.get(&id).is_none());
    }

    #[tokio::test]
    async fn prune_drops_idle_sessions() {
        let store = SessionStore::new();
        let (stale_id, stale) = store.create();
        let (fresh_id, _) = store.create();

        {
            let mut guard = stale.lock().await;
            guard.last_active = Utc::now() - Duration::hours(2);
        }

        let pruned = store.prune_idle(Duration::minutes(30));
        assert_eq!(pruned, 1);
        assert!(store.get(&stale_id).is_none());
        assert!(store.get(&fresh_id).is_some());
    }
}
