//! The log drain task.
//!
//! One spawned task per session. It sleeps on its command channel until
//! woken, then releases the game's log one entry at a time, publishing each
//! to every subscriber and waiting the display interval in between. The
//! release that finds the queue empty lifts the engine's soft lock and
//! raises the settled signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tycoon_core::facade::GameFacade;
use tycoon_core::game::Game;
use tycoon_core::log::LogEntry;
use tycoon_core::rng::DrawSource;

use crate::delay::Delay;

/// Messages from session handles to the drain task.
#[derive(Debug)]
pub(crate) enum DrainCommand {
    /// New entries were queued.
    Wake,
    /// Publish released entries to this channel as well.
    Subscribe(mpsc::UnboundedSender<LogEntry>),
    /// Flush everything pending and stop.
    Shutdown(oneshot::Sender<()>),
}

pub(crate) struct Drain<D: DrawSource, W: Delay> {
    pub(crate) game: Arc<Mutex<Game<D>>>,
    pub(crate) subscribers: Vec<mpsc::UnboundedSender<LogEntry>>,
    pub(crate) delay: W,
    pub(crate) interval: Duration,
    pub(crate) settled: Arc<watch::Sender<bool>>,
}

impl<D, W> Drain<D, W>
where
    D: DrawSource + Send + 'static,
    W: Delay,
{
    pub(crate) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<DrainCommand>) {
        // Wakes already queued when the last handle drops are still drained.
        while let Some(command) = commands.recv().await {
            let done = match command {
                DrainCommand::Wake => self.drain(&mut commands).await,
                DrainCommand::Subscribe(tx) => {
                    self.subscribers.push(tx);
                    None
                }
                DrainCommand::Shutdown(done) => Some(done),
            };
            if let Some(done) = done {
                self.flush().await;
                commands.close();
                let _ = done.send(());
                tracing::debug!("log drain stopped");
                return;
            }
        }
        tracing::debug!("all session handles dropped, log drain stopped");
    }

    /// Release entries until the queue is empty.
    ///
    /// Returns the shutdown acknowledgement if one arrived mid-drain.
    async fn drain(
        &mut self,
        commands: &mut mpsc::UnboundedReceiver<DrainCommand>,
    ) -> Option<oneshot::Sender<()>> {
        let mut open = true;
        loop {
            let released = {
                let mut game = self.game.lock().await;
                let entry = game.release_log_entry();
                if entry.is_none() {
                    self.settled.send_replace(true);
                }
                entry
            };
            let Some(entry) = released else {
                tracing::trace!("log queue settled");
                return None;
            };
            self.publish(entry);

            let wait = self.delay.wait(self.interval);
            tokio::pin!(wait);
            loop {
                tokio::select! {
                    () = &mut wait => break,
                    command = commands.recv(), if open => match command {
                        Some(DrainCommand::Subscribe(tx)) => self.subscribers.push(tx),
                        Some(DrainCommand::Wake) => {}
                        Some(DrainCommand::Shutdown(done)) => return Some(done),
                        None => open = false,
                    },
                }
            }
        }
    }

    /// Release everything at once.
    async fn flush(&mut self) {
        let entries = {
            let mut game = self.game.lock().await;
            let entries = game.poll_log();
            self.settled.send_replace(true);
            entries
        };
        tracing::debug!(flushed = entries.len(), "flushing log on shutdown");
        for entry in entries {
            self.publish(entry);
        }
    }

    fn publish(&mut self, entry: LogEntry) {
        tracing::trace!(week = entry.week, message = %entry.message, "log entry released");
        self.subscribers.retain(|tx| tx.send(entry.clone()).is_ok());
    }
}
