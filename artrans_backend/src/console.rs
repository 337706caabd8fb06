use crate::artran::Artran;
use crate::importer::PreflightSummary;
use std::io::{self, BufRead, Write};

/// The human (or stand-in) who reviews and approves an import.
pub trait Operator {
    /// Shows the preflight summary and the first record.
    fn review(&mut self, summary: &PreflightSummary, first: &Artran) -> io::Result<()>;
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
    fn report(&mut self, message: &str) -> io::Result<()>;
}

pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn review(&mut self, summary: &PreflightSummary, first: &Artran) -> io::Result<()> {
        write_review(&mut self.output, summary, first)
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{question} [y/N]: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(matches!(
            line.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    fn report(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }
}

/// Approves every prompt. Used for `--yes` and for HTTP-triggered imports.
pub struct AutoConfirm<W> {
    output: W,
}

impl<W: Write> AutoConfirm<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<W: Write> Operator for AutoConfirm<W> {
    fn review(&mut self, summary: &PreflightSummary, first: &Artran) -> io::Result<()> {
        write_review(&mut self.output, summary, first)
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        writeln!(self.output, "{question} [auto-confirmed]")?;
        Ok(true)
    }

    fn report(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }
}

fn write_review<W: Write>(
    out: &mut W,
    summary: &PreflightSummary,
    first: &Artran,
) -> io::Result<()> {
    writeln!(out, "# Please review before importing\n")?;
    writeln!(out, "First comment:")?;
    let preview = serde_json::to_string_pretty(first).map_err(io::Error::other)?;
    writeln!(out, "{preview}\n")?;
    write!(out, "{}", render_table(&summary.rows()))?;
    writeln!(out)?;
    out.flush()
}

/// Renders two-column rows as a boxed plain-text table.
pub fn render_table(rows: &[(&str, String)]) -> String {
    let key_width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or(0);
    let border = format!(
        "+-{}-+-{}-+\n",
        "-".repeat(key_width),
        "-".repeat(value_width)
    );

    let mut table = border.clone();
    for (key, value) in rows {
        table.push_str(&format!(
            "| {key:<key_width$} | {value:<value_width$} |\n"
        ));
    }
    table.push_str(&border);
    table
}
