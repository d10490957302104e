/// Crawl phase definitions for the coordinator's state machine
use std::fmt;

/// Represents the lifecycle phase of a crawl session
///
/// A session moves `Idle -> Running -> Done` exactly once. `Running` is
/// re-entered for every frontier entry, which is not a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Coordinator built, frontier seeded, nothing fetched yet
    Idle,

    /// Frontier is being drained
    Running,

    /// Frontier exhausted and no work in flight
    Done,
}

impl CrawlPhase {
    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running) | (Self::Running, Self::Done)
        )
    }

    /// Returns the phase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
