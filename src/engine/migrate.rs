//! The resumable migration loop.

use crate::error::{Error, Result};
use crate::gateway::{Gateway, SubscriptionApi};
use crate::model::{
    ChannelId, ItemState, Outcome, RunCounters, RunSummary, StartSummary, Termination,
};
use crate::progress::ProgressLog;
use crate::report::print_item;
use crate::telemetry::metrics;
use crate::telemetry::migration::{record_state_transition, start_item_span};
use opentelemetry::KeyValue;
use std::collections::HashSet;
use tracing::{Instrument, Span, info, warn};

use super::throttle::Throttle;

/// Drives one migration run.
///
/// Owns the gateway, the progress log handle and the in-memory set of
/// resolved identifiers for the run's duration. Items are processed strictly
/// one at a time.
pub struct MigrationEngine<A, P> {
    gateway: Gateway<A>,
    progress: P,
    completed: HashSet<ChannelId>,
    throttle: Throttle,
}

impl<A: SubscriptionApi, P: ProgressLog> MigrationEngine<A, P> {
    /// `completed` is the set loaded from the progress store at startup.
    pub fn new(
        gateway: Gateway<A>,
        progress: P,
        completed: HashSet<ChannelId>,
        throttle: Throttle,
    ) -> Self {
        Self {
            gateway,
            progress,
            completed,
            throttle,
        }
    }

    /// Counts shown before the run starts.
    pub fn start_summary(&self, items: &[ChannelId]) -> StartSummary {
        start_summary(items, &self.completed)
    }

    /// Process `items` in order until they run out or the quota does.
    ///
    /// # Errors
    ///
    /// Only a failure to append to the progress log aborts the run. Remote
    /// failures are classified and never surface as errors.
    pub async fn run(&mut self, items: &[ChannelId]) -> Result<RunSummary> {
        let (total, completed_before) = resolved_counts(items, &self.completed);
        let mut counters = RunCounters::default();
        let mut termination = Termination::Finished;

        info!(total, completed_before, "migration run started");

        for (position, channel) in items.iter().enumerate() {
            let span = start_item_span(channel, position);

            if self.completed.contains(channel) {
                transition(&span, ItemState::Skipped)?;
                counters.skipped += 1;
                metrics::items_skipped().add(1, &[]);
                continue;
            }

            let outcome = self
                .gateway
                .subscribe(channel)
                .instrument(span.clone())
                .await;
            metrics::subscription_outcomes().add(1, &[KeyValue::new("outcome", outcome.label())]);
            print_item(channel, &outcome);

            let state = span.in_scope(|| self.apply(channel, &outcome, &mut counters))?;
            transition(&span, state)?;

            if state == ItemState::Halted {
                termination = Termination::QuotaExhausted;
                break;
            }

            self.throttle.pause().await;
        }

        let summary = RunSummary {
            counters,
            total,
            completed_before,
            termination,
        };
        info!(
            new = counters.new_subscriptions,
            duplicates = counters.duplicates,
            failed = counters.failures,
            skipped = counters.skipped,
            remaining = summary.remaining(),
            halted = summary.halted(),
            "migration run finished"
        );
        Ok(summary)
    }

    /// Fold one outcome into progress and counters; return the item's new state.
    fn apply(
        &mut self,
        channel: &ChannelId,
        outcome: &Outcome,
        counters: &mut RunCounters,
    ) -> Result<ItemState> {
        match outcome {
            Outcome::Success => {
                self.mark_resolved(channel)?;
                counters.new_subscriptions += 1;
                info!(channel = %channel, "subscribed");
            }
            Outcome::AlreadySubscribed => {
                self.mark_resolved(channel)?;
                counters.duplicates += 1;
                info!(channel = %channel, "already subscribed, marked as done");
            }
            Outcome::QuotaExceeded { message } => {
                warn!(channel = %channel, error = %message, "quota exhausted, stopping run");
            }
            Outcome::OtherFailure { message } => {
                counters.failures += 1;
                warn!(
                    channel = %channel,
                    error = %message,
                    "subscription failed, will retry next run"
                );
            }
        }
        Ok(outcome.next_state())
    }

    fn mark_resolved(&mut self, channel: &ChannelId) -> Result<()> {
        self.progress.record(channel)?;
        self.completed.insert(channel.clone());
        Ok(())
    }
}

/// Move an item out of `Pending`, rejecting anything the lifecycle forbids.
fn transition(span: &Span, to: ItemState) -> Result<ItemState> {
    let from = ItemState::Pending;
    if !from.can_transition_to(to) {
        return Err(Error::InvalidTransition { from, to });
    }
    debug_assert!(to.is_terminal());
    record_state_transition(span, from, to);
    Ok(to)
}

/// Counts of `items` against a resolved set, before anything is sent.
///
/// Totals are over distinct identifiers, so repeated input lines and stale
/// progress entries for channels no longer in the input don't skew them.
pub fn start_summary(items: &[ChannelId], completed: &HashSet<ChannelId>) -> StartSummary {
    let (total, completed) = resolved_counts(items, completed);
    StartSummary {
        total,
        completed,
        remaining: total - completed,
    }
}

/// Distinct identifiers in `items`, and how many of them are resolved.
fn resolved_counts(items: &[ChannelId], completed: &HashSet<ChannelId>) -> (usize, usize) {
    let distinct: HashSet<&ChannelId> = items.iter().collect();
    let done = distinct.iter().filter(|id| completed.contains(**id)).count();
    (distinct.len(), done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_only_leave_pending() {
        let span = Span::none();
        assert_eq!(transition(&span, ItemState::Done).unwrap(), ItemState::Done);
        assert_eq!(transition(&span, ItemState::Halted).unwrap(), ItemState::Halted);

        let err = transition(&span, ItemState::Pending).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ItemState::Pending,
                to: ItemState::Pending
            }
        ));
    }
}
