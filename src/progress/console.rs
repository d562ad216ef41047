//! Line-oriented reporter for terminals.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Mutex;

use tracing::debug;

use super::{ProgressReporter, StepKey};

struct ConsoleState<W> {
    out: W,
    last_message: HashMap<StepKey, String>,
}

/// Prints one line per progress event.
///
/// Completed steps get a `✓`; the trace and starting lines never do.
/// Fractions are not rendered, the `N/total` text already carries them.
pub struct ConsoleReporter<W: Write + Send = io::Stdout> {
    state: Mutex<ConsoleState<W>>,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(ConsoleState {
                out,
                last_message: HashMap::new(),
            }),
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        let state = self.state.into_inner().unwrap_or_else(|e| e.into_inner());
        state.out
    }

    fn print(&self, step: StepKey, message: &str, done: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.last_message.insert(step, message.to_string());

        let line = if step.is_informational() {
            message.to_string()
        } else if done {
            format!("✓ {message}")
        } else {
            format!("… {message}")
        };

        if let Err(e) = writeln!(state.out, "{line}").and_then(|_| state.out.flush()) {
            debug!(error = %e, step = %step, "Failed to write progress line");
        }
    }
}

impl<W: Write + Send> ProgressReporter for ConsoleReporter<W> {
    fn update(&self, step: StepKey, message: &str, done: bool) {
        self.print(step, message, done);
    }

    fn mark_done(&self, step: StepKey) {
        let last = {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.last_message.get(&step).cloned()
        };
        let message = last.unwrap_or_else(|| step.as_str().to_string());
        self.print(step, &message, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(reporter: ConsoleReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_console_lines() {
        let reporter = ConsoleReporter::new(Vec::new());
        reporter.update(StepKey::Trace, "Trace id: trace_1", true);
        reporter.update(StepKey::Planning, "Planning searches...", false);
        reporter.update(StepKey::Planning, "Will perform 2 searches", true);

        assert_eq!(
            output(reporter),
            "Trace id: trace_1\n… Planning searches...\n✓ Will perform 2 searches\n"
        );
    }

    #[test]
    fn test_mark_done_repeats_last_message() {
        let reporter = ConsoleReporter::new(Vec::new());
        reporter.update(StepKey::Searching, "Searching... 2/2 completed", false);
        reporter.set_fraction(StepKey::Searching, 1.0);
        reporter.mark_done(StepKey::Searching);
        reporter.mark_done(StepKey::Writing);

        assert_eq!(
            output(reporter),
            "… Searching... 2/2 completed\n✓ Searching... 2/2 completed\n✓ writing\n"
        );
    }
}
