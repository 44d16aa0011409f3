//! # Session Registry
//!
//! In-memory correlation records for evaluation requests, keyed by a
//! client-supplied session id. The registry is the only owner of [`Session`]
//! values; callers receive clones.
//!
//! A session is registered as [`SessionStatus::Processing`] and moves at most
//! once more, to `Completed` or `Error`. Re-registering an id replaces the
//! record (last write wins). Terminal updates are addressed through the
//! [`SessionHandle`] returned by [`SessionRegistry::upsert`], so a request can
//! only finish the registration it created; updates for swept or replaced
//! registrations are dropped.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    clock::{Clock, SystemClock},
    protocol::EvaluationResult,
};

pub type SessionId = String;

/// Session id used when the caller supplies none.
pub const ANONYMOUS_SESSION_ID: &str = "anonymous";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    /// Set only when `status` is `Completed`
    pub result: Option<EvaluationResult>,
    /// Set only when `status` is `Error`
    pub error: Option<String>,
    generation: u64,
}

/// Identifies one registration of a session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub session_id: SessionId,
    generation: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {session_id}")]
    NotFound { session_id: SessionId },
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<SessionId, Session>>,
    next_generation: Arc<AtomicU64>,
    clock: Arc<dyn Clock>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            next_generation: Arc::new(AtomicU64::new(0)),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create or reset a session in the `processing` state.
    pub fn upsert(&self, session_id: &str) -> SessionHandle {
        let now = self.clock.now();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let session = Session {
            id: session_id.to_string(),
            status: SessionStatus::Processing,
            created_at: now,
            last_activity_at: now,
            result: None,
            error: None,
            generation,
        };
        if self.sessions.insert(session_id.to_string(), session).is_some() {
            debug!(session_id, "Replaced existing session");
        }
        SessionHandle {
            session_id: session_id.to_string(),
            generation,
        }
    }

    pub fn get(&self, session_id: &str) -> Result<Session, SessionError> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SessionError::NotFound {
                session_id: session_id.to_string(),
            })
    }

    /// Returns false when the update was dropped.
    pub fn mark_completed(&self, handle: &SessionHandle, result: EvaluationResult) -> bool {
        self.transition(handle, |session| {
            session.status = SessionStatus::Completed;
            session.result = Some(result);
        })
    }

    /// Returns false when the update was dropped.
    pub fn mark_error(&self, handle: &SessionHandle, message: impl Into<String>) -> bool {
        let message = message.into();
        self.transition(handle, |session| {
            session.status = SessionStatus::Error;
            session.error = Some(message);
        })
    }

    fn transition(&self, handle: &SessionHandle, apply: impl FnOnce(&mut Session)) -> bool {
        let now = self.clock.now();
        match self.sessions.get_mut(&handle.session_id) {
            Some(mut session)
                if session.generation == handle.generation
                    && session.status == SessionStatus::Processing =>
            {
                apply(&mut session);
                session.last_activity_at = now;
                true
            }
            Some(_) => {
                debug!(
                    session_id = %handle.session_id,
                    "Dropping update for a replaced or finished session"
                );
                false
            }
            None => {
                debug!(
                    session_id = %handle.session_id,
                    "Dropping update for an expired session"
                );
                false
            }
        }
    }

    /// Remove every session whose last activity is older than `now - retention`.
    pub fn sweep(&self, now: DateTime<Utc>, retention: Duration) -> usize {
        let retention = TimeDelta::from_std(retention).unwrap_or(TimeDelta::MAX);
        let Some(cutoff) = now.checked_sub_signed(retention) else {
            return 0;
        };
        let mut removed = 0;
        self.sessions.retain(|_, session| {
            let keep = session.last_activity_at >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// [`Self::sweep`] against the registry's own clock.
    pub fn sweep_expired(&self, retention: Duration) -> usize {
        self.sweep(self.clock.now(), retention)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
