//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-session tutoring store.

use crate::config::Config;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use study_assistant_core::{PortError, PortResult, StudyAssistant, TutorSession};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub assistant: StudyAssistant,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, assistant: StudyAssistant) -> Self {
        Self {
            config,
            assistant,
            sessions: Arc::new(SessionStore::default()),
        }
    }
}

//=========================================================================================
// SessionStore (One TutorSession per Session Id)
//=========================================================================================

/// The longest wait between two idle-session sweeps.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

struct SessionEntry {
    session: Arc<Mutex<TutorSession>>,
    last_used: Instant,
}

/// In-memory tutoring sessions. Each session sits behind its own lock, so requests
/// for one session are serialized while different sessions proceed independently.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    /// Stores a new session and returns its id.
    pub async fn insert(&self, session: TutorSession) -> Uuid {
        let id = session.id;
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(session)),
            last_used: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        info!("Created tutoring session {}", id);
        id
    }

    /// Looks a session up and marks it as used.
    pub async fn get(&self, id: Uuid) -> PortResult<Arc<Mutex<TutorSession>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("session {}", id)))?;
        entry.last_used = Instant::now();
        Ok(entry.session.clone())
    }

    /// Ends a session. Requests already holding it finish normally.
    pub async fn remove(&self, id: Uuid) -> PortResult<()> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Ended tutoring session {}", id);
                Ok(())
            }
            None => Err(PortError::NotFound(format!("session {}", id))),
        }
    }

    /// Drops every session unused for at least `idle_ttl` and returns how many went.
    pub async fn evict_idle(&self, idle_ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_used.elapsed() < idle_ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Periodically evicts sessions that have been idle for `idle_ttl`.
pub fn spawn_session_sweeper(store: Arc<SessionStore>, idle_ttl: Duration) -> JoinHandle<()> {
    let period = idle_ttl.clamp(Duration::from_secs(1), MAX_SWEEP_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(idle_ttl).await;
            if evicted > 0 {
                info!("Evicted {} idle tutoring sessions", evicted);
            }
        }
    })
}
