//! Per-session exclusivity.
//!
//! Two players racing to submit a move (or a move racing a seat
//! assignment) must not interleave: a naive check-then-act sequence would
//! let both submissions read the same turn and both be accepted. The gate
//! serializes mutations per session identifier while unrelated sessions
//! proceed fully in parallel.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    db::SessionStore,
    session::entities::{GameSession, SessionId},
    session::errors::SessionResult,
};

/// Per-session critical sections around load-mutate-persist cycles.
///
/// The critical section spans from loading the latest persisted state
/// through persisting the update, so no mutation is ever validated against
/// state that could go stale before its own commit. In-process the lock is
/// authoritative; across processes the store's version check backs it up.
pub struct SessionGate {
    store: Arc<dyn SessionStore>,
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionGate {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, id: SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id).or_default().clone()
    }

    /// Run `op` exclusively against the latest persisted state of session
    /// `id`, persisting the mutation afterwards.
    ///
    /// When `op` fails nothing is persisted; the lock is released on every
    /// exit path (guard drop). Returns the session as persisted together
    /// with the operation's result.
    pub async fn with_session<R, F>(
        &self,
        id: SessionId,
        op: F,
    ) -> SessionResult<(GameSession, R)>
    where
        F: FnOnce(&mut GameSession) -> SessionResult<R>,
    {
        let cell = self.lock_for(id).await;
        let _guard = cell.lock().await;

        let mut session = self.store.load(id).await?;
        let result = op(&mut session)?;
        let persisted = self.store.save(&session).await?;
        Ok((persisted, result))
    }

    /// Delete session `id` under its critical section and drop the lock
    /// entry. Returns the final persisted state.
    pub async fn remove(&self, id: SessionId) -> SessionResult<GameSession> {
        let cell = self.lock_for(id).await;
        {
            let _guard = cell.lock().await;
            let session = self.store.load(id).await?;
            self.store.delete(id).await?;
            self.locks.lock().await.remove(&id);
            Ok(session)
        }
    }
}
