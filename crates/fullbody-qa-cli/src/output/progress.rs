//! Progress bar adapter using indicatif.

use fullbody_qa_core::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress bar adapter for CLI output.
///
/// Without a bar, rejected images are summarized on stderr one per line.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of items, if known
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise show per-item status
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = if show_bar {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);

            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }

            Some(bar)
        } else {
            None
        };

        Self { bar, quiet }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { record } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                } else if !record.verdict.approved {
                    let reasons: Vec<&str> =
                        record.verdict.reasons.iter().map(|r| r.as_str()).collect();
                    eprintln!("{}: rejected ({})", record.path, reasons.join(", "));
                    for hint in record.verdict.reasons.iter().filter_map(|r| r.guidance()) {
                        eprintln!("  - {hint}");
                    }
                }
            }
            ProgressEvent::Unreadable { path, reason } => {
                eprintln!("WARN: Unreadable {path}: {reason}");
            }
            ProgressEvent::Finished {
                approved,
                rejected,
                unreadable,
            } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(summary(approved, rejected, unreadable));
                }
            }
        }
    }
}

/// One-line batch summary.
fn summary(approved: usize, rejected: usize, unreadable: usize) -> String {
    if unreadable == 0 {
        format!("Done: {approved} approved, {rejected} rejected")
    } else {
        format!("Done: {approved} approved, {rejected} rejected ({unreadable} unreadable)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        assert_eq!(summary(3, 1, 0), "Done: 3 approved, 1 rejected");
        assert_eq!(summary(0, 2, 2), "Done: 0 approved, 2 rejected (2 unreadable)");
    }
}
