use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};

/// Streamed output emits a percentage marker every this many records.
pub const STREAM_PROGRESS_INTERVAL: usize = 50;

/// Receives per-record progress from the import driver.
pub trait ProgressReporter {
    fn start(&mut self, total: usize);
    /// Called after every record, committed or skipped. `index` is 0-based.
    fn record_done(&mut self, index: usize);
    fn finish(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProgressMode {
    /// Bar on a terminal, percentage markers otherwise
    #[default]
    Auto,
    Bar,
    Percent,
    None,
}

impl ProgressMode {
    pub fn reporter(self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Auto if std::io::stdout().is_terminal() => Box::new(BarReporter::new()),
            ProgressMode::Auto | ProgressMode::Percent => {
                Box::new(PercentReporter::new(std::io::stdout()))
            }
            ProgressMode::Bar => Box::new(BarReporter::new()),
            ProgressMode::None => Box::new(SilentReporter),
        }
    }
}

fn bar_template() -> &'static str {
    "{wide_bar:.cyan/blue} {pos}/{len} {percent}% {msg}"
}

#[derive(Default)]
pub struct BarReporter {
    bar: Option<ProgressBar>,
}

impl BarReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for BarReporter {
    fn start(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar = Some(bar);
    }

    fn record_done(&mut self, _index: usize) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

/// Writes `NN%... ` markers for non-interactive sinks such as HTTP responses.
pub struct PercentReporter<W: Write> {
    out: W,
    total: usize,
}

impl<W: Write> PercentReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, total: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressReporter for PercentReporter<W> {
    fn start(&mut self, total: usize) {
        self.total = total;
    }

    fn record_done(&mut self, index: usize) {
        if self.total == 0 || index % STREAM_PROGRESS_INTERVAL != 0 {
            return;
        }
        let percent = index as f64 / self.total as f64 * 100.0;
        // A closed sink must not fail the import.
        let _ = write!(self.out, "{percent:.0}%... ");
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn start(&mut self, _total: usize) {}
    fn record_done(&mut self, _index: usize) {}
    fn finish(&mut self) {}
}
