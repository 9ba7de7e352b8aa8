//! Terminal progress display

use crate::core::transfer::{ProgressReporter, ProgressSnapshot};
use console::{Style, Term};
use std::sync::Mutex;

/// Renders progress snapshots on stdout, redrawing in place on a terminal
///
/// Logs go to stderr, so clearing the previous frame never erases a log line.
pub struct TerminalReporter {
    term: Term,
    drawn: Mutex<usize>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    /// Create a reporter writing to stdout
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            drawn: Mutex::new(0),
        }
    }
}

impl ProgressReporter for TerminalReporter {
    fn report(&self, snapshot: &ProgressSnapshot) {
        let lines = render_snapshot(snapshot);
        let mut drawn = match self.drawn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Write failures only lose a frame
        if self.term.is_term() {
            if *drawn > 0 {
                let _ = self.term.clear_last_lines(*drawn);
            }
            for line in &lines {
                let _ = self.term.write_line(line);
            }
            *drawn = lines.len();
        } else if let Some(line) = lines.last() {
            let _ = self.term.write_line(&console::strip_ansi_codes(line));
        }
    }
}

/// Format a snapshot as display lines
pub fn render_snapshot(snapshot: &ProgressSnapshot) -> Vec<String> {
    let green = Style::new().green();
    let total = snapshot.total.max(0.0) as u64;
    let processed = snapshot.processed.max(0.0) as u64;

    vec![
        format!("Source database: {}", green.apply_to(&snapshot.source)),
        format!("Target database: {}", green.apply_to(&snapshot.destination)),
        format!("Total rows: {}", green.apply_to(total)),
        format!(
            "Progress: {} of {} ({})",
            green.apply_to(processed),
            green.apply_to(total),
            green.apply_to(format!("{}%", snapshot.percent() as u64))
        ),
    ]
}
