//! Run reporter: start banner and end-of-run summary.
//!
//! Pure formatting over values supplied by the engine.

use crate::model::{ChannelId, Outcome, RunSummary, StartSummary, Termination};

/// Banner printed before the first remote call.
pub fn render_start(start: &StartSummary) -> String {
    format!(
        "===== Starting Run =====\nTotal channels: {}, Completed: {}, Remaining: {}\n",
        start.total, start.completed, start.remaining
    )
}

/// Summary printed after the run, whether it finished or halted.
pub fn render_summary(summary: &RunSummary) -> String {
    let c = &summary.counters;
    let mut lines = vec![
        String::new(),
        "===== Run Summary =====".to_string(),
        format!(
            "New: {}, Already Subscribed: {}, Failed: {}",
            c.new_subscriptions, c.duplicates, c.failures
        ),
    ];
    if c.skipped > 0 {
        lines.push(format!("Skipped (already done): {}", c.skipped));
    }
    lines.push(format!(
        "Completed so far: {} / {}",
        summary.resolved(),
        summary.total
    ));
    lines.push(format!("Remaining: {}", summary.remaining()));
    lines.push(String::new());
    lines.push(
        match summary.termination {
            Termination::QuotaExhausted => {
                "Stopped early due to YouTube quota limit. Please rerun tomorrow to continue."
            }
            Termination::Finished if summary.remaining() == 0 => "Finished all subscriptions!",
            Termination::Finished => "Pass complete. Rerun to retry the channels that failed.",
        }
        .to_string(),
    );
    lines.push(String::new());
    lines.join("\n")
}

/// One console line per attempted item.
pub fn render_item(channel: &ChannelId, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success => format!("Subscribed to: {channel}"),
        Outcome::AlreadySubscribed => format!("Already subscribed (marked as done): {channel}"),
        Outcome::QuotaExceeded { message } => {
            format!("Failed to subscribe to {channel}: {message}\nYouTube quota reached. Stopping now.")
        }
        Outcome::OtherFailure { message } => format!(
            "Failed to subscribe to {channel}: {message}\nWill retry {channel} next run."
        ),
    }
}

/// Success lines go to stdout, failures to stderr.
pub fn print_item(channel: &ChannelId, outcome: &Outcome) {
    let line = render_item(channel, outcome);
    match outcome {
        Outcome::Success | Outcome::AlreadySubscribed => println!("{line}"),
        Outcome::QuotaExceeded { .. } | Outcome::OtherFailure { .. } => eprintln!("{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunCounters;

    fn summary(termination: Termination, failures: usize) -> RunSummary {
        RunSummary {
            counters: RunCounters {
                new_subscriptions: 2,
                duplicates: 1,
                failures,
                skipped: 0,
            },
            total: 3 + failures,
            completed_before: 0,
            termination,
        }
    }

    #[test]
    fn start_banner_lists_counts() {
        let text = render_start(&StartSummary {
            total: 10,
            completed: 4,
            remaining: 6,
        });
        assert!(text.contains("Total channels: 10, Completed: 4, Remaining: 6"));
    }

    #[test]
    fn summary_distinguishes_halt_from_finish() {
        let halted = render_summary(&summary(Termination::QuotaExhausted, 0));
        assert!(halted.contains("quota limit"));
        assert!(!halted.contains("Finished"));

        let finished = render_summary(&summary(Termination::Finished, 0));
        assert!(finished.contains("New: 2, Already Subscribed: 1, Failed: 0"));
        assert!(finished.contains("Completed so far: 3 / 3"));
        assert!(finished.contains("Finished all subscriptions!"));
    }

    #[test]
    fn summary_with_failures_asks_for_rerun() {
        let text = render_summary(&summary(Termination::Finished, 1));
        assert!(text.contains("Remaining: 1"));
        assert!(text.contains("Rerun to retry"));
        assert!(text.ends_with("channels that failed.\n"));
    }

    #[test]
    fn item_lines_name_the_channel_and_the_error() {
        let id = ChannelId::parse("UCabc").unwrap();
        assert_eq!(render_item(&id, &Outcome::Success), "Subscribed to: UCabc");
        assert_eq!(
            render_item(&id, &Outcome::AlreadySubscribed),
            "Already subscribed (marked as done): UCabc"
        );

        let failed = render_item(
            &id,
            &Outcome::OtherFailure {
                message: "500 backendError".into(),
            },
        );
        assert!(failed.starts_with("Failed to subscribe to UCabc: 500 backendError"));
        assert!(failed.contains("retry UCabc next run"));

        let quota = render_item(
            &id,
            &Outcome::QuotaExceeded {
                message: "403 quotaExceeded".into(),
            },
        );
        assert!(quota.contains("403 quotaExceeded"));
        assert!(quota.ends_with("Stopping now."));
    }
}
