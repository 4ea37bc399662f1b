//! Span helpers for items flowing through the migration engine.

use crate::model::{ChannelId, ItemState};
use tracing::Span;

/// Start a span for one work item.
///
/// The `item.state` field is declared empty and filled by
/// [`record_state_transition`].
pub fn start_item_span(channel: &ChannelId, position: usize) -> Span {
    tracing::info_span!(
        "migration.item",
        "item.channel" = %channel,
        "item.position" = position,
        "item.state" = tracing::field::Empty,
    )
}

/// Record a state transition on the item's span.
pub fn record_state_transition(span: &Span, from: ItemState, to: ItemState) {
    span.record("item.state", tracing::field::display(to));
    span.in_scope(|| {
        tracing::debug!(from = %from, to = %to, "state_transition");
    });
}
