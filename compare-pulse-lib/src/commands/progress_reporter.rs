use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::task::JoinHandle;

/// Refresh rate for the spinner (10 Hz).
const REFRESH_INTERVAL_MS: u64 = 100;

const TEMPLATE: &str = "{prefix:>12.bold.cyan} [{spinner}] {msg}";
const TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{spinner}] {msg}";

/// A spinner on stderr that only appears once an operation has run longer than a delay.
#[derive(Debug)]
pub struct ProgressReporter {
    bar: ProgressBar,
    reveal_task: JoinHandle<()>,
}

impl ProgressReporter {
    /// Start reporting an operation.
    ///
    /// When `use_colors` is false, the spinner is rendered without ANSI styling.
    #[must_use]
    pub fn start(phase: &str, message: impl Into<String>, delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());

        let template = if use_colors { TEMPLATE } else { TEMPLATE_NO_COLOR };
        bar.set_style(ProgressStyle::default_spinner().template(template).expect("could not create progress bar style"));
        bar.set_prefix(phase.to_string());
        bar.set_message(message.into());

        let revealed = bar.clone();
        let reveal_task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            revealed.set_draw_target(ProgressDrawTarget::stderr());
            revealed.enable_steady_tick(Duration::from_millis(REFRESH_INTERVAL_MS));
        });

        Self { bar, reveal_task }
    }

    /// Stop reporting and erase the spinner.
    pub fn finish(self) {
        self.reveal_task.abort();
        self.bar.finish_and_clear();
    }
}
