//! Progress indicator shown while waiting on an operation.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const TEMPLATE: &str = "{msg} {spinner}";
const TICK_CHARS: &str = "|/-\\ ";

/// Start a spinner animating `message` on stderr.
///
/// indicatif draws nothing when stderr is not a terminal. Call
/// [`ProgressBar::finish_and_clear`] before printing anything else.
pub fn start(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        bar.set_style(style.tick_chars(TICK_CHARS));
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(TICK_INTERVAL);
    bar
}

/// A spinner that draws nothing.
pub fn hidden() -> ProgressBar {
    ProgressBar::hidden()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_valid() {
        assert!(ProgressStyle::with_template(TEMPLATE).is_ok());
    }

    #[test]
    fn keeps_the_message() {
        let bar = start("Creating instance");
        assert_eq!(bar.message(), "Creating instance");
        bar.finish_and_clear();
        assert!(bar.is_finished());
    }

    #[test]
    fn hidden_spinner_is_silent() {
        let bar = hidden();
        assert!(bar.is_hidden());
        bar.finish_and_clear();
    }
}
