//! # Tycoon Session
//!
//! Async runtime around a [`Game`]: the presentation side of a run.
//!
//! A [`Session`] owns the game behind a tokio mutex and spawns one drain
//! task that releases the queued log at the configured display interval.
//! Released entries are fanned out to every subscriber. While entries are
//! pending the engine refuses commands with `LogBusy`, exactly as it would
//! for any other driver; [`Session::wait_settled`] resolves once the queue
//! has emptied and the last entry has had its interval.
//!
//! ```no_run
//! use tycoon_core::prelude::*;
//! use tycoon_session::Session;
//!
//! # async fn demo() -> tycoon_session::Result<()> {
//! let game = Game::seeded(GameConfig::default(), Mode::Nonprofit, ServerType::Vanilla, 42);
//! let (session, mut log) = Session::start(game);
//! session.wait_settled().await?;
//! session.perform_action(ActionKind::Work).await?;
//! while let Ok(entry) = log.try_recv() {
//!     println!("{}", entry.message);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod delay;
mod drain;
pub mod error;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tycoon_core::actions::{ActionKind, ActionReport};
use tycoon_core::facade::GameFacade;
use tycoon_core::game::Game;
use tycoon_core::log::LogEntry;
use tycoon_core::rng::{DrawSource, SeededDraws};
use tycoon_core::snapshot::Snapshot;
use tycoon_core::turn::TurnOutcome;

pub use delay::{Delay, NoDelay, TokioDelay};
use drain::{Drain, DrainCommand};
pub use error::{Result, SessionError};

/// Stream of released log entries.
pub type LogReceiver = mpsc::UnboundedReceiver<LogEntry>;

/// Handle to a running session. Cheap to clone.
pub struct Session<D: DrawSource + Send + 'static = SeededDraws> {
    game: Arc<Mutex<Game<D>>>,
    commands: mpsc::UnboundedSender<DrainCommand>,
    settled: Arc<watch::Sender<bool>>,
}

impl<D: DrawSource + Send + 'static> Clone for Session<D> {
    fn clone(&self) -> Self {
        Self {
            game: Arc::clone(&self.game),
            commands: self.commands.clone(),
            settled: Arc::clone(&self.settled),
        }
    }
}

impl<D: DrawSource + Send + 'static> Session<D> {
    /// Start a session on the tokio timer.
    ///
    /// Returns the handle and a first subscriber, attached before anything
    /// is released so it sees the opening lines too.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(game: Game<D>) -> (Self, LogReceiver) {
        Self::with_delay(game, TokioDelay)
    }

    /// Start a session with a custom wait primitive.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn with_delay<W: Delay>(game: Game<D>, delay: W) -> (Self, LogReceiver) {
        let interval = game.config().log_drain_interval();
        let pending = game.is_log_busy() || game.pending_log_len() > 0;

        let game = Arc::new(Mutex::new(game));
        let (settled, _) = watch::channel(!pending);
        let settled = Arc::new(settled);
        let (commands, inbox) = mpsc::unbounded_channel();
        let (first_tx, first_rx) = mpsc::unbounded_channel();

        let drain = Drain {
            game: Arc::clone(&game),
            subscribers: vec![first_tx],
            delay,
            interval,
            settled: Arc::clone(&settled),
        };
        tokio::spawn(drain.run(inbox));
        tracing::debug!(?interval, "session started");

        if pending {
            let _ = commands.send(DrainCommand::Wake);
        }

        (
            Self {
                game,
                commands,
                settled,
            },
            first_rx,
        )
    }

    /// Run a command against the game and wake the drain if it logged.
    async fn command<T>(&self, f: impl FnOnce(&mut Game<D>) -> T) -> Result<T> {
        if self.commands.is_closed() {
            return Err(SessionError::Closed);
        }
        let mut game = self.game.lock().await;
        let out = f(&mut *game);
        if game.pending_log_len() > 0 {
            self.settled.send_replace(false);
            self.commands
                .send(DrainCommand::Wake)
                .map_err(|_| SessionError::Closed)?;
        }
        Ok(out)
    }

    /// Perform one action this week.
    ///
    /// # Errors
    ///
    /// Returns the engine's refusal, or [`SessionError::Closed`] after
    /// shutdown.
    pub async fn perform_action(&self, kind: ActionKind) -> Result<ActionReport> {
        Ok(self.command(|game| game.perform_action(kind)).await??)
    }

    /// End the week.
    ///
    /// # Errors
    ///
    /// Returns the engine's refusal, or [`SessionError::Closed`] after
    /// shutdown.
    pub async fn advance_turn(&self) -> Result<TurnOutcome> {
        Ok(self.command(|game| game.advance_turn()).await??)
    }

    /// Roll a settled run into the next semester.
    ///
    /// # Errors
    ///
    /// Returns the engine's refusal, or [`SessionError::Closed`] after
    /// shutdown.
    pub async fn continue_run(&self) -> Result<()> {
        Ok(self.command(|game| game.continue_run()).await??)
    }

    /// Start over with the same mode and server type.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] after shutdown.
    pub async fn reset(&self) -> Result<()> {
        self.command(|game| game.reset()).await
    }

    /// Capture the run for display.
    pub async fn snapshot(&self) -> Snapshot {
        self.game.lock().await.snapshot()
    }

    /// Every entry released so far, oldest first.
    pub async fn log_history(&self) -> Vec<LogEntry> {
        self.game.lock().await.log_history().to_vec()
    }

    /// Hash of the run, for determinism checks across drivers.
    pub async fn state_hash(&self) -> u64 {
        self.game.lock().await.state_hash()
    }

    /// Receive every entry released from now on.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] after shutdown.
    pub fn subscribe(&self) -> Result<LogReceiver> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.commands
            .send(DrainCommand::Subscribe(tx))
            .map_err(|_| SessionError::Closed)?;
        Ok(rx)
    }

    /// Watch the settled signal: `true` while nothing is pending.
    #[must_use]
    pub fn settled(&self) -> watch::Receiver<bool> {
        self.settled.subscribe()
    }

    /// Whether the log has fully drained.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        *self.settled.borrow()
    }

    /// Wait until the log has fully drained.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the drain stopped with entries
    /// still pending.
    pub async fn wait_settled(&self) -> Result<()> {
        let mut settled = self.settled.subscribe();
        if self.commands.is_closed() && !*settled.borrow() {
            return Err(SessionError::Closed);
        }
        settled
            .wait_for(|settled| *settled)
            .await
            .map(|_| ())
            .map_err(|_| SessionError::Closed)
    }

    /// Flush every pending entry to subscribers without waiting, then stop
    /// the drain. Later commands fail with [`SessionError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session was already shut down.
    pub async fn shutdown(&self) -> Result<()> {
        let (done, acked) = oneshot::channel();
        self.commands
            .send(DrainCommand::Shutdown(done))
            .map_err(|_| SessionError::Closed)?;
        acked.await.map_err(|_| SessionError::Closed)
    }
}
