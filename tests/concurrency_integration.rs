//! Concurrency tests: per-session serialization under racing submissions
//! and independence of unrelated sessions.

use std::sync::Arc;

use chess_arbiter::{
    MemoryRegistry, MemoryStore, ScriptedEngine, SessionError, SessionManager, SessionStatus,
    rules::chess::STARTING_FEN,
    session::entities::Seat,
};

fn manager_with(engine: ScriptedEngine) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryRegistry::new()),
        Arc::new(engine),
    ))
}

async fn activated_session(manager: &SessionManager) -> chess_arbiter::SessionId {
    manager.register_player("ann").await.unwrap();
    manager.register_player("bo").await.unwrap();
    let session = manager.create_session().await.unwrap();
    manager
        .join_session(session.id(), "ann", None)
        .await
        .unwrap();
    manager
        .join_session(session.id(), "bo", None)
        .await
        .unwrap();
    session.id()
}

#[tokio::test]
async fn racing_submissions_accept_exactly_one_move()
{
    // only ann holds a legal move for the current turn
    let manager = manager_with(ScriptedEngine::new().legal(STARTING_FEN, "e4", "p1"));
    let id = activated_session(&manager).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let manager = manager.clone();
        let (name, mv) = if i == 0 { ("ann", "e4") } else { ("bo", "e4") };
        handles.push(tokio::spawn(async move {
            manager.submit_move(id, name, mv).await
        }));
    }

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(
                SessionError::WrongTurn { .. }
                | SessionError::IllegalMove { .. }
                | SessionError::SessionFinished,
            ) => rejected += 1,
            Err(other) => panic!("unexpected rejection kind: {other:?}"),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(rejected, 7);

    // exactly one mutation landed
    let session = manager.get_session(id).await.unwrap();
    assert_eq!(session.position().unwrap().as_str(), "p1");
    assert_eq!(session.turn(), Some(Seat::Second));
}

#[tokio::test]
async fn duplicate_legal_submissions_accept_only_the_first() {
    // ann races herself with the same legal move; the loser must see
    // wrong-turn (the turn flipped), never a second acceptance
    let manager = manager_with(ScriptedEngine::new().legal(STARTING_FEN, "e4", "p1"));
    let id = activated_session(&manager).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let manager = manager.clone();
        handles.push(tokio::spawn(
            async move { manager.submit_move(id, "ann", "e4").await },
        ));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(SessionError::WrongTurn { .. }) => {}
            Err(other) => panic!("unexpected rejection kind: {other:?}"),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(
        manager.get_session(id).await.unwrap().turn(),
        Some(Seat::Second)
    );
}

#[tokio::test]
async fn independent_sessions_progress_in_parallel() {
    let engine = ScriptedEngine::new().legal(STARTING_FEN, "e4", "p1");
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(MemoryRegistry::new());
    let manager = Arc::new(SessionManager::new(store, registry, Arc::new(engine)));

    // eight separate games, two fresh players each
    let mut ids = Vec::new();
    for i in 0..8 {
        let white = format!("white{i}");
        let black = format!("black{i}");
        manager.register_player(&white).await.unwrap();
        manager.register_player(&black).await.unwrap();
        let session = manager.create_session().await.unwrap();
        manager
            .join_session(session.id(), &white, None)
            .await
            .unwrap();
        manager
            .join_session(session.id(), &black, None)
            .await
            .unwrap();
        ids.push((session.id(), white));
    }

    let mut handles = Vec::new();
    for (id, white) in ids.clone() {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager.submit_move(id, &white, "e4").await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for (id, _) in ids {
        let session = manager.get_session(id).await.unwrap();
        assert_eq!(session.position().unwrap().as_str(), "p1");
        assert_eq!(session.status(), SessionStatus::Active);
    }
}

#[tokio::test]
async fn racing_joins_fill_exactly_two_seats() {
    let manager = manager_with(ScriptedEngine::new());
    for name in ["ann", "bo", "carol", "dave"] {
        manager.register_player(name).await.unwrap();
    }
    let session = manager.create_session().await.unwrap();

    let mut handles = Vec::new();
    for name in ["ann", "bo", "carol", "dave"] {
        let manager = manager.clone();
        let id = session.id();
        handles.push(tokio::spawn(async move {
            manager.join_session(id, name, None).await
        }));
    }

    let mut seated = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => seated += 1,
            Err(SessionError::SessionFull) => {}
            Err(other) => panic!("unexpected rejection kind: {other:?}"),
        }
    }
    assert_eq!(seated, 2);

    let fresh = manager.get_session(session.id()).await.unwrap();
    assert!(fresh.is_full());
    assert_eq!(fresh.status(), SessionStatus::Active);
}

#[tokio::test]
async fn moves_race_with_session_postgame_checks() {
    // a full scripted game raced move-by-move: whoever is out of turn is
    // rejected, and the final state is exactly the scripted line
    let engine = ScriptedEngine::new()
        .legal(STARTING_FEN, "f3", "p1")
        .legal("p1", "e5", "p2")
        .legal("p2", "g4", "p3")
        .mate("p3", "Qh4#", "mated");
    let manager = manager_with(engine);
    let id = activated_session(&manager).await;

    let line = [("ann", "f3"), ("bo", "e5"), ("ann", "g4"), ("bo", "Qh4#")];
    for (name, mv) in line {
        // fire the legal move together with a junk move from the opponent
        let opponent = if name == "ann" { "bo" } else { "ann" };
        let legal = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.submit_move(id, name, mv).await })
        };
        let offturn = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.submit_move(id, opponent, "zz9").await })
        };
        // the legal move must eventually land regardless of interleaving
        legal.await.unwrap().unwrap();
        let _ = offturn.await.unwrap();
    }

    let session = manager.get_session(id).await.unwrap();
    assert_eq!(session.status(), SessionStatus::Finished);
    assert_eq!(session.position().unwrap().as_str(), "mated");
}
