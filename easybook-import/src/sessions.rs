//! In-memory registry of import sessions
//!
//! Holds import sessions together with the cancellation token of their
//! background run. At most one session may be
//! running at a time; registration checks and inserts under a single lock so
//! two concurrent start requests cannot both succeed. Only the most recent
//! `MAX_FINISHED_SESSIONS` terminal sessions are kept.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::ImportSession;

/// Terminal sessions retained for status queries
pub const MAX_FINISHED_SESSIONS: usize = 20;

struct SessionEntry {
    session: ImportSession,
    cancel: CancellationToken,
}

/// Shared session registry
///
/// Uses `std::sync::RwLock` because progress observers update sessions from
/// synchronous callbacks. The lock is never held across an await point.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` unless another one is still running
    ///
    /// Returns the new session's cancellation token, or the id of the
    /// session that is already active.
    pub fn try_register(&self, session: ImportSession) -> Result<CancellationToken, Uuid> {
        let mut sessions = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(active) = sessions.values().find(|e| !e.session.is_terminal()) {
            return Err(active.session.session_id);
        }

        prune_finished(&mut sessions);

        let cancel = CancellationToken::new();
        sessions.insert(
            session.session_id,
            SessionEntry {
                session,
                cancel: cancel.clone(),
            },
        );
        Ok(cancel)
    }

    /// Snapshot of one session
    pub fn load(&self, session_id: Uuid) -> Option<ImportSession> {
        let sessions = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(&session_id).map(|e| e.session.clone())
    }

    /// Apply `f` to a session; returns false for unknown ids
    pub fn update<F>(&self, session_id: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut ImportSession),
    {
        let mut sessions = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match sessions.get_mut(&session_id) {
            Some(entry) => {
                f(&mut entry.session);
                true
            }
            None => false,
        }
    }

    /// Signal a session's run to stop
    ///
    /// Returns the session snapshot at the time of the request; the run
    /// itself moves to `Cancelled` once it observes the token.
    pub fn request_cancel(&self, session_id: Uuid) -> Option<ImportSession> {
        let sessions = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions.get(&session_id)?;
        if !entry.session.is_terminal() {
            entry.cancel.cancel();
        }
        Some(entry.session.clone())
    }

    pub fn has_running_session(&self) -> bool {
        let sessions = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        sessions.values().any(|e| !e.session.is_terminal())
    }
}

/// Drop the oldest terminal sessions beyond `MAX_FINISHED_SESSIONS`
fn prune_finished(sessions: &mut HashMap<Uuid, SessionEntry>) {
    let mut finished: Vec<(DateTime<Utc>, Uuid)> = sessions
        .values()
        .filter(|e| e.session.is_terminal())
        .map(|e| {
            let ended = e.session.ended_at.unwrap_or(e.session.started_at);
            (ended, e.session.session_id)
        })
        .collect();

    if finished.len() <= MAX_FINISHED_SESSIONS {
        return;
    }

    finished.sort();
    let excess = finished.len() - MAX_FINISHED_SESSIONS;
    for (_, session_id) in finished.into_iter().take(excess) {
        sessions.remove(&session_id);
    }
    tracing::debug!(evicted = excess, "Pruned finished import sessions");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImportPhase, ImportResult};

    #[test]
    fn test_second_registration_conflicts_while_running() {
        let registry = SessionRegistry::new();
        let first = ImportSession::new("repairshopr");
        let first_id = first.session_id;

        registry.try_register(first).unwrap();
        assert!(registry.has_running_session());

        let err = registry.try_register(ImportSession::new("repairshopr")).unwrap_err();
        assert_eq!(err, first_id);
    }

    #[test]
    fn test_registration_allowed_after_terminal() {
        let registry = SessionRegistry::new();
        let first = ImportSession::new("repairshopr");
        let first_id = first.session_id;
        registry.try_register(first).unwrap();

        assert!(registry.update(first_id, |s| s.finish(ImportResult::failed("boom"), false)));
        assert!(!registry.has_running_session());
        assert!(registry.try_register(ImportSession::new("repairshopr")).is_ok());
    }

    #[test]
    fn test_request_cancel_signals_token() {
        let registry = SessionRegistry::new();
        let session = ImportSession::new("repairshopr");
        let id = session.session_id;
        let token = registry.try_register(session).unwrap();

        let snapshot = registry.request_cancel(id).unwrap();
        assert_eq!(snapshot.state, ImportPhase::Idle);
        assert!(token.is_cancelled());

        assert!(registry.request_cancel(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_oldest_finished_sessions_are_evicted() {
        let registry = SessionRegistry::new();
        let base = Utc::now();
        let mut ids = Vec::new();

        for i in 0..25 {
            let session = ImportSession::new("repairshopr");
            let id = session.session_id;
            registry.try_register(session).unwrap();
            registry.update(id, |s| {
                s.finish(ImportResult::failed("boom"), false);
                s.ended_at = Some(base + chrono::Duration::seconds(i));
            });
            ids.push(id);
        }

        let latest = ImportSession::new("repairshopr");
        let latest_id = latest.session_id;
        registry.try_register(latest).unwrap();

        assert!(ids[..5].iter().all(|id| registry.load(*id).is_none()));
        assert!(ids[5..].iter().all(|id| registry.load(*id).is_some()));
        assert!(registry.load(latest_id).is_some());
    }

    #[test]
    fn test_update_unknown_session() {
        let registry = SessionRegistry::new();
        assert!(!registry.update(Uuid::new_v4(), |s| s.transition_to(ImportPhase::Failed)));
        assert!(registry.load(Uuid::new_v4()).is_none());
    }
}
