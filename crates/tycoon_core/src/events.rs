//! Random events rolled once per normal week.
//!
//! A badly damaged server may crash first; a crash pre-empts everything
//! else. Otherwise every entry of [`EVENT_TABLE`] whose trigger holds is a
//! candidate, a coin flip decides whether anything happens at all, and one
//! candidate is picked uniformly.

use serde::{Deserialize, Serialize};

use crate::log::{LogQueue, Severity};
use crate::math::{percent, roll_below};
use crate::rng::DrawSource;
use crate::state::RunState;

const CRASH_HEALTH_THRESHOLD: i32 = 30;
const CRASH_CHANCE_PERCENT: i32 = 60;
const CRASH_REPUTATION: i32 = -5;
const CRASH_PASSION: i32 = -10;

const EVENT_GATE_PERCENT: i32 = 50;

/// Something that happened to the run this week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The server went down hard.
    Crash,
    /// Kept after school for missing homework.
    Detention,
    /// Vandals wrecked the world.
    Griefers,
    /// A promotional video took off.
    ViralVideo,
}

/// When an event may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Culture strictly below the value.
    CultureBelow(i32),
    /// Reputation strictly below the value.
    ReputationBelow(i32),
    /// An independent draw below the percentage. Consumes one draw.
    Chance(i32),
}

impl Trigger {
    fn holds<D: DrawSource + ?Sized>(self, state: &RunState, draws: &mut D) -> bool {
        match self {
            Self::CultureBelow(limit) => state.player.culture < limit,
            Self::ReputationBelow(limit) => state.server.reputation < limit,
            Self::Chance(pct) => draws.chance(percent(pct)),
        }
    }
}

/// One row of the event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpec {
    /// Which event.
    pub kind: EventKind,
    /// When it is a candidate.
    pub trigger: Trigger,
    /// Headline for the log.
    pub narrative: &'static str,
}

/// Candidate events, in evaluation order.
pub static EVENT_TABLE: [EventSpec; 3] = [
    EventSpec {
        kind: EventKind::Detention,
        trigger: Trigger::CultureBelow(60),
        narrative: "Homework unfinished, kept in detention.",
    },
    EventSpec {
        kind: EventKind::Griefers,
        trigger: Trigger::ReputationBelow(30),
        narrative: "Griefers blew up the spawn!",
    },
    EventSpec {
        kind: EventKind::ViralVideo,
        trigger: Trigger::Chance(20),
        narrative: "Your promo video went viral!",
    },
];

/// Roll this week's event and apply it.
pub fn roll<D: DrawSource + ?Sized>(
    state: &mut RunState,
    draws: &mut D,
    log: &mut LogQueue,
) -> Option<EventKind> {
    let week = state.week;

    if state.server.health < CRASH_HEALTH_THRESHOLD && draws.chance(percent(CRASH_CHANCE_PERCENT))
    {
        state.server.online_players = 0;
        state.server.reputation += CRASH_REPUTATION;
        state.player.add_passion(CRASH_PASSION);
        log.push(
            week,
            Severity::Danger,
            "Critical failure! The server was force-restarted.",
        );
        tracing::debug!(week, "server crashed");
        return Some(EventKind::Crash);
    }

    let candidates: Vec<&EventSpec> = EVENT_TABLE
        .iter()
        .filter(|spec| spec.trigger.holds(state, draws))
        .collect();
    if candidates.is_empty() || draws.next_draw() <= percent(EVENT_GATE_PERCENT) {
        return None;
    }

    let index = roll_below(draws.next_draw(), candidates.len() as i32) as usize;
    let spec = candidates[index.min(candidates.len() - 1)];
    log.push(week, Severity::Event, format!("[Event] {}", spec.narrative));
    apply(spec.kind, state, log);
    tracing::debug!(week, kind = ?spec.kind, "event fired");
    Some(spec.kind)
}

fn apply(kind: EventKind, state: &mut RunState, log: &mut LogQueue) {
    let week = state.week;
    match kind {
        EventKind::Detention => {
            state.player.energy = (state.player.energy - 3).max(0);
            log.push(week, Severity::Danger, "Energy drops sharply (-3)!");
        }
        EventKind::Griefers => {
            state.server.add_hype(-15);
            state.server.add_health(-20);
            log.push(week, Severity::Danger, "Had to roll back the world. Heavy losses.");
        }
        EventKind::ViralVideo => {
            state.server.add_hype(20);
            log.push(week, Severity::Success, "Hype surges!");
        }
        EventKind::Crash => {}
    }
}
