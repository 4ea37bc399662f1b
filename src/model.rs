//! Core data model.
//!
//! A work item is one channel to subscribe to. The engine walks each item
//! through a small lifecycle and tallies the outcome of every remote attempt.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Channel ID
// ---------------------------------------------------------------------------

/// Opaque identifier of a channel to subscribe to. Never empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Build an identifier from raw text, trimming whitespace.
    /// Returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle state of a work item within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Not yet attempted this run.
    Pending,
    /// Already resolved by an earlier run (or earlier in this one). Never sent.
    Skipped,
    /// Subscribed, or confirmed already subscribed. Recorded.
    Done,
    /// Failed for some other reason. Retried next run.
    Deferred,
    /// Quota exhausted on this item. The run stops here.
    Halted,
}

impl ItemState {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: ItemState) -> bool {
        use ItemState::*;
        matches!(
            (self, to),
            (Pending, Skipped) | (Pending, Done) | (Pending, Deferred) | (Pending, Halted)
        )
    }

    /// Is this a terminal state?
    pub fn is_terminal(self) -> bool {
        !matches!(self, ItemState::Pending)
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemState::Pending => "pending",
            ItemState::Skipped => "skipped",
            ItemState::Done => "done",
            ItemState::Deferred => "deferred",
            ItemState::Halted => "halted",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Classified result of one remote subscription attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    AlreadySubscribed,
    QuotaExceeded { message: String },
    OtherFailure { message: String },
}

impl Outcome {
    /// The lifecycle state an item lands in after this outcome.
    pub fn next_state(&self) -> ItemState {
        match self {
            Outcome::Success | Outcome::AlreadySubscribed => ItemState::Done,
            Outcome::QuotaExceeded { .. } => ItemState::Halted,
            Outcome::OtherFailure { .. } => ItemState::Deferred,
        }
    }

    /// Short label for logs and metric attributes.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::AlreadySubscribed => "already_subscribed",
            Outcome::QuotaExceeded { .. } => "quota_exceeded",
            Outcome::OtherFailure { .. } => "other_failure",
        }
    }
}

// ---------------------------------------------------------------------------
// Counters and summaries
// ---------------------------------------------------------------------------

/// Per-run tallies, owned and mutated only by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub new_subscriptions: usize,
    pub duplicates: usize,
    pub failures: usize,
    /// Items never sent because they were already resolved.
    pub skipped: usize,
}

/// Why the run stopped consuming items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every item was visited.
    Finished,
    /// The remote quota ran out; remaining items wait for the next run.
    QuotaExhausted,
}

/// Snapshot shown before any remote call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartSummary {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

/// Final tallies of a run, handed to the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub counters: RunCounters,
    pub total: usize,
    /// Resolved before this run started.
    pub completed_before: usize,
    pub termination: Termination,
}

impl RunSummary {
    /// Resolved so far: earlier runs plus this run's new and duplicate items.
    /// Failures are not resolved.
    pub fn resolved(&self) -> usize {
        self.completed_before + self.counters.new_subscriptions + self.counters.duplicates
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.resolved())
    }

    pub fn halted(&self) -> bool {
        self.termination == Termination::QuotaExhausted
    }
}
