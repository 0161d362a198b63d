//! Relative-performance reporting.
//!
//! The first trial of every pass is the baseline (100%); every other trial is reported
//! as a fraction of it, both as a number and as a bar.

use crate::catalog::Hierarchy;
use crate::class::{Handle, Root};
use crate::trial::{Sink, TrialResult};
use std::io;
use std::io::Write;
use std::mem::size_of;

/// The widest a bar gets before it is cut off.
pub const BAR_COLS: usize = 60;

/// How many columns one percent of the baseline takes, divided by [`BAR_COLS`].
const BAR_SCALE: f64 = 4.0;

const HZ_PER_MHZ: f64 = 1_000_000.0;

/// Draws the bar of `percent` (a fraction of the baseline) with `fill`.
///
/// Bars wider than [`BAR_COLS`] are cut off and end in `...` instead of `|`, so anything
/// above 25% of the baseline saturates.
pub fn bar(percent: f64, fill: char) -> String {
    let width = (BAR_COLS as f64 * percent * BAR_SCALE) as usize;
    let mut bar = String::with_capacity(BAR_COLS + 4);
    bar.push('|');
    if width > BAR_COLS {
        bar.extend(std::iter::repeat(fill).take(BAR_COLS));
        bar.push_str("...");
    } else {
        bar.extend(std::iter::repeat(fill).take(width));
        bar.push('|');
    }
    bar
}

/// Running sum of the rates of one implementation.
#[derive(Copy, Clone, Default, Debug)]
struct Group {
    sum: f64,
    count: usize,
}

/// Writes the report of a run and keeps the baseline of the current pass.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    /// The rate of the first trial of the current pass.
    baseline: Option<f64>,
    group: Group,
    /// Whether a hierarchy header was written in the current pass.
    in_hierarchy: bool,
}

impl<W: Write> Reporter<W> {
    /// Creates a new [`Reporter`] writing to `out`.
    pub fn new(out: W) -> Self {
        Reporter {
            out,
            baseline: None,
            group: Group::default(),
            in_hierarchy: false,
        }
    }

    /// The baseline rate of the current pass, once the first trial was recorded.
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Gets the writer back.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Starts a repetition pass. The next trial becomes the new baseline.
    pub fn begin_pass(&mut self, title: &str) -> io::Result<()> {
        self.baseline = None;
        self.in_hierarchy = false;
        write!(self.out, "\n\n\n\n\n## {}\n\n", title)
    }

    /// Writes the header of a hierarchy section.
    pub fn hierarchy(&mut self, hierarchy: Hierarchy) -> io::Result<()> {
        if self.in_hierarchy {
            write!(self.out, "\n\n\n\n\n")?;
        }
        self.in_hierarchy = true;
        write!(self.out, "### Class hierarchy: {}\n\n", hierarchy)
    }

    /// Writes the header of a dataset section.
    pub fn dataset(&mut self, title: &str) -> io::Result<()> {
        write!(self.out, "#### Cast type: {}\n\n", title)
    }

    /// Opens a block of trials and starts a new average.
    pub fn begin_block(&mut self, heading: &str, name: &str) -> io::Result<()> {
        self.group = Group::default();
        write!(self.out, "{}: `{}`\n```\n", heading, name)
    }

    /// Closes a block of trials.
    pub fn end_block(&mut self) -> io::Result<()> {
        write!(self.out, "```\n\n")
    }

    /// Computes the fraction of the baseline for `rate`.
    ///
    /// If no baseline is set yet, `rate` becomes the baseline and this returns exactly `1.0`.
    pub fn relative(&mut self, rate: f64) -> f64 {
        match self.baseline {
            Some(baseline) => rate / baseline,
            None => {
                self.baseline = Some(rate);
                1.0
            }
        }
    }

    /// Writes the line of one trial and returns its fraction of the baseline.
    ///
    /// If `summed` is set, the rate counts towards the average of the current block.
    pub fn trial(&mut self, label: &str, result: &TrialResult, summed: bool) -> io::Result<f64> {
        let rate = result.rate();
        let percent = self.relative(rate);
        if summed {
            self.group.sum += rate;
            self.group.count += 1;
        }

        writeln!(
            self.out,
            "{:>3}: {:5.1} MHz ({:3.0}%) [{:7}] {}",
            label,
            rate / HZ_PER_MHZ,
            percent * 100.0,
            result.successes,
            bar(percent, '-'),
        )?;
        Ok(percent)
    }

    /// The mean rate of the summed trials of the current block.
    pub fn mean(&self) -> Option<f64> {
        if self.group.count == 0 {
            return None;
        }
        Some(self.group.sum / self.group.count as f64)
    }

    /// Writes the average of the summed trials of the current block.
    ///
    /// Returns the mean as a fraction of the baseline, or [`None`] if nothing was summed.
    pub fn average(&mut self) -> io::Result<Option<f64>> {
        let (mean, baseline) = match (self.mean(), self.baseline) {
            (Some(mean), Some(baseline)) => (mean, baseline),
            _ => return Ok(None),
        };
        let percent = mean / baseline;

        writeln!(self.out, "------------")?;
        writeln!(
            self.out,
            "AVG: {:5.1} MHz ({:3.0}%)           {}",
            mean / HZ_PER_MHZ,
            percent * 100.0,
            bar(percent, '='),
        )?;
        Ok(Some(percent))
    }

    /// Writes the object sizes and the sink value.
    pub fn footer(&mut self, sink: &Sink) -> io::Result<()> {
        write!(self.out, "\n\n\n\n\n")?;
        writeln!(self.out, "sizeof Root: {}", size_of::<Root>())?;
        writeln!(self.out, "sizeof Handle: {}", size_of::<Handle>())?;
        writeln!(self.out, "{:.6}", sink.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(successes: u64, millis: u64) -> TrialResult {
        TrialResult::new(successes, Duration::from_millis(millis), 1_000_000)
    }

    fn text(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn bars() {
        assert_eq!(bar(0.0, '-'), "||");
        assert_eq!(bar(0.1, '-'), format!("|{}|", "-".repeat(24)));
        assert_eq!(bar(0.25, '='), format!("|{}|", "=".repeat(60)));
        assert_eq!(bar(0.5, '-'), format!("|{}...", "-".repeat(60)));
        assert_eq!(bar(f64::NAN, '-'), "||");
        assert_eq!(bar(f64::INFINITY, '-'), format!("|{}...", "-".repeat(60)));
    }

    #[test]
    fn first_trial_is_the_baseline() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.begin_pass("Run 1").unwrap();
        assert_eq!(reporter.baseline(), None);

        let first = reporter.trial("-", &result(5, 100), false).unwrap();
        assert_eq!(first, 1.0);
        assert_eq!(reporter.baseline(), Some(10_000_000.0));

        let second = reporter.trial("B", &result(5, 400), false).unwrap();
        assert_eq!(second, 0.25);

        let out = text(reporter);
        assert!(out.contains("## Run 1"));
        assert!(out.contains("  -:  10.0 MHz (100%) [      5] |"));
        assert!(out.contains("  B:   2.5 MHz ( 25%) [      5] |"));
    }

    #[test]
    fn baseline_resets_every_pass() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.begin_pass("Run 0").unwrap();
        reporter.trial("-", &result(1, 100), false).unwrap();

        reporter.begin_pass("Run 1").unwrap();
        assert_eq!(reporter.baseline(), None);
        let first = reporter.trial("-", &result(1, 200), false).unwrap();
        assert_eq!(first, 1.0);
        assert_eq!(reporter.baseline(), Some(5_000_000.0));
    }

    #[test]
    fn averages_summed_trials_only() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.begin_pass("Run 1").unwrap();
        reporter.trial("-", &result(1, 100), false).unwrap();

        reporter.begin_block("Implementation", "native").unwrap();
        reporter.trial("A", &result(1, 100), false).unwrap();
        reporter.trial("B", &result(1, 200), true).unwrap();
        reporter.trial("Z", &result(0, 400), true).unwrap();
        assert_eq!(reporter.mean(), Some((5_000_000.0 + 2_500_000.0) / 2.0));

        let average = reporter.average().unwrap().unwrap();
        assert_eq!(average, 0.375);
        reporter.end_block().unwrap();

        // A new block starts a new average.
        reporter.begin_block("Implementation", "registry").unwrap();
        assert_eq!(reporter.mean(), None);
        assert_eq!(reporter.average().unwrap(), None);

        let out = text(reporter);
        assert!(out.contains("Implementation: `native`\n```\n"));
        assert!(out.contains("AVG:   3.8 MHz ( 38%)"));
        assert!(out.contains(&format!("|{}...", "=".repeat(60))));
    }

    #[test]
    fn hierarchy_sections_are_separated() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.begin_pass("Run 2 (objects shuffled)").unwrap();
        reporter.hierarchy(Hierarchy::Deep).unwrap();
        reporter.hierarchy(Hierarchy::Shallow).unwrap();

        let out = text(reporter);
        let head = "\n\n\n\n\n## Run 2 (objects shuffled)\n\n### Class hierarchy: deep\n\n";
        assert!(out.starts_with(head));
        assert!(out.ends_with("\n\n\n\n\n### Class hierarchy: shallow\n\n"));
    }
}
