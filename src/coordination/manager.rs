//! Session orchestration: the public entry point wiring the turn
//! coordinator, the session gate, the rules engine, and the repositories.

use std::{future::Future, sync::Arc};

use super::{config::CoordinationConfig, coordinator::TurnCoordinator, gate::SessionGate};
use crate::{
    db::{PlayerRegistry, SessionStore},
    rules::RulesEngine,
    session::{
        entities::{GameSession, Player, PlayerId, Seat, SessionId, SessionStatus},
        errors::{SessionError, SessionResult},
        lifecycle::SeatEvent,
    },
};

/// Public entry point for session coordination.
///
/// Every mutating operation runs inside the session gate; reads go
/// straight to the store and tolerate a slightly stale snapshot.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    registry: Arc<dyn PlayerRegistry>,
    rules: Arc<dyn RulesEngine>,
    coordinator: TurnCoordinator,
    gate: SessionGate,
    config: CoordinationConfig,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        registry: Arc<dyn PlayerRegistry>,
        rules: Arc<dyn RulesEngine>,
    ) -> Self {
        Self::with_config(store, registry, rules, CoordinationConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn SessionStore>,
        registry: Arc<dyn PlayerRegistry>,
        rules: Arc<dyn RulesEngine>,
        config: CoordinationConfig,
    ) -> Self {
        Self {
            coordinator: TurnCoordinator::new(rules.clone()),
            gate: SessionGate::new(store.clone()),
            store,
            registry,
            rules,
            config,
        }
    }

    /// Run `op` to completion, retrying retryable failures (storage
    /// faults, timeouts, version conflicts) with bounded backoff. Domain
    /// rejections surface immediately. Every gated mutation goes through
    /// here so the retry policy is uniform across operations.
    async fn retrying<T, F, Fut>(&self, id: SessionId, what: &str, mut op: F) -> SessionResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SessionResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let backoff = self.config.backoff_for(attempt);
                    log::warn!(
                        "session {id}: retrying {what} after {err} \
                         (attempt {attempt}, backoff {backoff:?})"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Keep a player's back-reference set in step with a committed seat
    /// assignment or session deletion. The session mutation has already
    /// been persisted by the time this runs, so a registry failure here
    /// must not fail the operation: retry it, then log for reconciliation.
    async fn sync_back_reference(
        &self,
        id: SessionId,
        player: PlayerId,
        name: &str,
        add: bool,
    ) {
        let result = self
            .retrying(id, "back-reference update", move || async move {
                if add {
                    Ok(self.registry.add_active_session(player, id).await?)
                } else {
                    Ok(self.registry.remove_active_session(player, id).await?)
                }
            })
            .await;
        if let Err(err) = result {
            log::error!(
                "session {id}: back-reference for {name} out of step after {err}"
            );
        }
    }

    /// Create a fresh, unseated session.
    ///
    /// The only mutating operation that needs no gating: the identifier it
    /// allocates is not visible to anyone else yet.
    pub async fn create_session(&self) -> SessionResult<GameSession> {
        let session = self.store.create().await?;
        log::info!("created session {}", session.id());
        Ok(session)
    }

    /// Seat a registered player in a session.
    ///
    /// Filling the second seat activates the session: the starting
    /// position and first turn come from the rules engine and are set in
    /// the same gated mutation as the seat assignment.
    ///
    /// The join is committed once the gated save succeeds. The player's
    /// back-reference is brought in step afterwards and never fails a
    /// committed join.
    ///
    /// # Errors
    ///
    /// * `SessionError::PlayerNotFound` - Unknown player name
    /// * `SessionError::SessionNotFound` - Unknown session id
    /// * `SessionError::SessionFull` / `SessionError::DuplicateSeat` -
    ///   Seat preconditions violated
    pub async fn join_session(
        &self,
        id: SessionId,
        player_name: &str,
        preferred_seat: Option<Seat>,
    ) -> SessionResult<GameSession> {
        let player = self.registry.resolve(player_name).await?;
        let seated = &player;
        let (session, event) = self
            .retrying(id, "seat assignment", move || {
                self.gate.with_session(id, move |session| {
                    let event = session.seat(seated, preferred_seat)?;
                    if let SeatEvent::SeatsFilled { .. } = event {
                        session.begin(
                            self.rules.initial_position(),
                            self.rules.first_seat_to_move(),
                        )?;
                    }
                    Ok(event)
                })
            })
            .await?;

        self.sync_back_reference(id, player.id, &player.name, true)
            .await;
        log::info!(
            "{} took the {} seat in session {} (status: {})",
            player.name,
            event.seat(),
            id,
            session.status()
        );
        Ok(session)
    }

    /// Submit a move for `player_name` in session `id`.
    ///
    /// Domain rejections (wrong turn, illegal move, finished session, ...)
    /// surface immediately. Infrastructure failures are retried with
    /// backoff up to the configured bound; each attempt reloads state
    /// under the gate, so retries are idempotent.
    pub async fn submit_move(
        &self,
        id: SessionId,
        player_name: &str,
        notation: &str,
    ) -> SessionResult<GameSession> {
        let player = self.registry.resolve(player_name).await?;
        let mover = &player;
        let (session, ()) = self
            .retrying(id, "move submission", move || {
                self.gate.with_session(id, move |session| {
                    self.coordinator.submit_move(session, mover, notation)
                })
            })
            .await?;
        log::debug!(
            "session {}: {} played {} (status: {})",
            id,
            player.name,
            notation,
            session.status()
        );
        Ok(session)
    }

    /// Latest persisted state of a session. Ungated; tolerates reading a
    /// snapshot that a concurrent mutation is about to replace.
    pub async fn get_session(&self, id: SessionId) -> SessionResult<GameSession> {
        Ok(self.store.load(id).await?)
    }

    /// All sessions, oldest first.
    pub async fn list_sessions(&self) -> SessionResult<Vec<GameSession>> {
        Ok(self.store.list().await?)
    }

    /// Create a session and seat `player_name` in it.
    pub async fn create_and_join(&self, player_name: &str) -> SessionResult<GameSession> {
        let session = self.create_session().await?;
        self.join_session(session.id(), player_name, None).await
    }

    /// Delete a session, dropping its gate entry and every player
    /// back-reference. Runs under the session's critical section so it
    /// cannot interleave with an in-flight move.
    pub async fn delete_session(&self, id: SessionId) -> SessionResult<()> {
        let session = self
            .retrying(id, "session deletion", move || self.gate.remove(id))
            .await?;
        for seated in session.players() {
            self.sync_back_reference(id, seated.id, &seated.name, false)
                .await;
        }
        log::info!("deleted session {id}");
        Ok(())
    }

    /// Register a new player. Names are unique case-insensitively and
    /// immutable afterwards.
    pub async fn register_player(&self, name: &str) -> SessionResult<Player> {
        let player = self.registry.register(name).await?;
        log::info!("registered player {} ({})", player.name, player.id);
        Ok(player)
    }

    /// Look up a player by name.
    pub async fn get_player(&self, name: &str) -> SessionResult<Player> {
        Ok(self.registry.resolve(name).await?)
    }

    /// All registered players.
    pub async fn list_players(&self) -> SessionResult<Vec<Player>> {
        Ok(self.registry.list().await?)
    }

    /// Remove a player who is not seated in any unfinished session.
    ///
    /// Finished sessions in the player's history do not block removal;
    /// dangling references to since-deleted sessions are ignored.
    ///
    /// The still-seated check reads ungated snapshots, so a join racing
    /// the removal can seat the player an instant before the record is
    /// deleted. Stop issuing joins for the player before removing them if
    /// that window matters.
    pub async fn remove_player(&self, name: &str) -> SessionResult<()> {
        let player = self.registry.resolve(name).await?;
        for &session_id in &player.active_sessions {
            match self.store.load(session_id).await {
                Ok(session) if session.status() != SessionStatus::Finished => {
                    return Err(SessionError::PlayerStillSeated {
                        name: player.name.clone(),
                    });
                }
                Ok(_) => {}
                Err(crate::db::StoreError::SessionNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.registry.remove(player.id).await?;
        log::info!("removed player {}", player.name);
        Ok(())
    }
}
