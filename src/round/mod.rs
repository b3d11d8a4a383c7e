//! Round core: clock, spawner, fall simulation, scoring and the session that
//! drives them from a single cooperative timeline.
//!
//! Nothing in here touches the DOM. The browser layer calls
//! [`GameSession::advance`] once per animation frame and subscribes
//! [`RoundObserver`]s for everything visual or audible.

mod clock;
mod events;
mod fall;
mod messages;
mod scheduler;
mod scoring;
mod session;
mod spawner;

pub use clock::{ClockSignal, RoundClock};
pub use events::{GameEvent, RoundObserver};
pub use fall::{FallSimulator, FallStep, FallingObject};
pub use messages::{EndSummary, MessageKey};
pub use scheduler::{Fired, RoundToken, Scheduler, Task, TimerId};
pub use scoring::{ClaimOutcome, Outcome, RoundResult, RoundState, ScoringEngine};
pub use session::GameSession;
pub use spawner::{Spawner, classify};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of a falling object, unique for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectKind {
    Clean,
    Polluted,
}

impl ObjectKind {
    /// CSS class used by the presentation layer.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Clean => "clean",
            ObjectKind::Polluted => "polluted",
        }
    }
}

/// How a falling object left play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Resolution {
    ClaimedClean,
    ClaimedPolluted,
    Expired,
}

impl Resolution {
    pub fn claimed(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Clean => Resolution::ClaimedClean,
            ObjectKind::Polluted => Resolution::ClaimedPolluted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoundStatus {
    #[default]
    NotStarted,
    Running,
    Ended,
}
