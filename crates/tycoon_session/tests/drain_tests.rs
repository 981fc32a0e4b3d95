//! Paced log drain behaviour, on paused tokio time.

use std::time::Duration;

use tokio::time::Instant;
use tycoon_core::prelude::*;
use tycoon_session::{NoDelay, Session, SessionError};
use tycoon_test_utils::determinism::{apply, Command};
use tycoon_test_utils::fixtures::half_draws;
use tycoon_test_utils::init_test_tracing;

const INTERVAL: Duration = Duration::from_millis(300);

fn paced_game() -> Game<ConstantDraw> {
    Game::new(
        GameConfig::default(),
        Mode::Nonprofit,
        ServerType::Vanilla,
        half_draws(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_entries_arrive_in_order_one_interval_apart() {
    init_test_tracing();
    let start = Instant::now();
    let (session, mut log) = Session::start(paced_game());

    let first = log.recv().await.unwrap();
    assert_eq!(first.message, "Server initialised...");
    assert!(start.elapsed() < INTERVAL);

    let second = log.recv().await.unwrap();
    assert!(second.message.starts_with("Current hardware: [Starter VPS]"));
    assert!(start.elapsed() >= INTERVAL);

    session.wait_settled().await.unwrap();
    assert!(start.elapsed() >= INTERVAL * 2);
    assert!(session.is_settled());
}

#[tokio::test(start_paused = true)]
async fn test_commands_refused_while_draining() {
    init_test_tracing();
    let (session, _log) = Session::start(paced_game());

    let refused = session.perform_action(ActionKind::Work).await;
    assert!(matches!(
        refused,
        Err(SessionError::Game(GameError::Action(ActionError::LogBusy)))
    ));
    assert_eq!(
        session.advance_turn().await,
        Err(SessionError::Game(GameError::LogBusy))
    );

    session.wait_settled().await.unwrap();
    assert!(session.perform_action(ActionKind::Work).await.is_ok());
    assert!(!session.is_settled());
}

#[tokio::test(start_paused = true)]
async fn test_start_clears_a_lock_left_in_flight() {
    init_test_tracing();
    let mut game = paced_game();
    while game.pending_log_len() > 0 {
        assert!(game.release_log_entry().is_some());
    }
    assert!(game.is_log_busy());

    let (session, _log) = Session::start(game);
    assert!(!session.is_settled());

    session.wait_settled().await.unwrap();
    assert!(!session.snapshot().await.log_busy);
    assert!(session.perform_action(ActionKind::Work).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_settled_signal_follows_the_queue() {
    init_test_tracing();
    let (session, _log) = Session::start(paced_game());
    let mut settled = session.settled();
    assert!(!*settled.borrow());

    settled.wait_for(|s| *s).await.unwrap();
    assert!(!session.snapshot().await.log_busy);

    session.advance_turn().await.unwrap();
    assert!(!*settled.borrow_and_update());
    assert!(session.snapshot().await.log_busy);

    settled.wait_for(|s| *s).await.unwrap();
    assert!(!session.snapshot().await.log_busy);
}

#[tokio::test(start_paused = true)]
async fn test_late_subscriber_sees_only_later_entries() {
    init_test_tracing();
    let (session, _log) = Session::start(paced_game());
    session.wait_settled().await.unwrap();

    let mut late = session.subscribe().unwrap();
    session.perform_action(ActionKind::Work).await.unwrap();
    session.wait_settled().await.unwrap();

    let entry = late.try_recv().unwrap();
    assert_ne!(entry.message, "Server initialised...");
    assert_eq!(entry.week, 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_flushes_without_waiting() {
    init_test_tracing();
    let (session, mut log) = Session::start(paced_game());
    session.wait_settled().await.unwrap();

    session.advance_turn().await.unwrap();
    let before = Instant::now();
    session.shutdown().await.unwrap();
    assert!(before.elapsed() < INTERVAL);

    let mut received = Vec::new();
    while let Some(entry) = log.recv().await {
        received.push(entry);
    }
    assert_eq!(received, session.log_history().await);
    assert!(session.is_settled());

    assert_eq!(
        session.perform_action(ActionKind::Work).await,
        Err(SessionError::Closed)
    );
    assert_eq!(session.shutdown().await, Err(SessionError::Closed));
    assert!(session.subscribe().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_no_delay_drains_without_time_passing() {
    init_test_tracing();
    let start = Instant::now();
    let (session, mut log) = Session::with_delay(paced_game(), NoDelay);

    session.wait_settled().await.unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(log.try_recv().unwrap().message, "Server initialised...");
    assert!(log.try_recv().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_session_matches_direct_driver() {
    init_test_tracing();
    let script = [
        Command::Act(ActionKind::Work),
        Command::Act(ActionKind::Study),
        Command::EndWeek,
        Command::Act(ActionKind::Promote),
        Command::Act(ActionKind::Maintain),
        Command::EndWeek,
        Command::EndWeek,
    ];

    let mut direct = Game::seeded(GameConfig::default(), Mode::Commercial, ServerType::Modded, 9);
    for &command in &script {
        apply(&mut direct, command);
    }

    let game = Game::seeded(GameConfig::default(), Mode::Commercial, ServerType::Modded, 9);
    let (session, _log) = Session::start(game);
    for &command in &script {
        session.wait_settled().await.unwrap();
        match command {
            Command::Act(kind) => {
                let _ = session.perform_action(kind).await;
            }
            Command::EndWeek => {
                let _ = session.advance_turn().await;
            }
            Command::Continue => {
                let _ = session.continue_run().await;
            }
        }
    }
    session.wait_settled().await.unwrap();

    assert_eq!(session.state_hash().await, direct.state_hash());
    assert_eq!(session.log_history().await, direct.log_history());
}
