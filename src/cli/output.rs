//! Colored terminal output for cross builds.
//!
//! Progress goes to stdout, failures and their recovery suggestions to stderr.
//! Container output is echoed only in verbose (`--debug`) mode.

use crate::error::CrossError;
use crate::pipeline::BuildOutcome;
use crate::target::{Architecture, TargetOs};
use std::io::Write;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
        }
    }

    fn marked(&self, marker: &str, spec: &ColorSpec, message: &str) -> std::io::Result<()> {
        let mut buffer = self.bufwtr.buffer();
        write_marked(&mut buffer, marker, spec, message);
        self.bufwtr.print(&buffer)
    }

    /// Announce the start of one target
    pub fn target_started(&self, os: TargetOs, arch: Architecture) -> std::io::Result<()> {
        self.marked(
            "⋯",
            ColorSpec::new().set_fg(Some(Color::Magenta)),
            &format!("Target: {os}/{arch}"),
        )
    }

    /// Announce a stage of the build of target `id`
    pub fn stage(&self, id: &str, message: &str) -> std::io::Result<()> {
        self.marked(
            "ℹ",
            ColorSpec::new().set_fg(Some(Color::Cyan)),
            &format!("[{id}] {message}"),
        )
    }

    /// Report the archive of a finished target
    pub fn packaged(&self, id: &str, package: &str) -> std::io::Result<()> {
        self.marked(
            "✓",
            ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true),
            &format!("[{id}] Package: {package:?}"),
        )
    }

    /// Echo a line of container output (only in verbose mode)
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.marked("→", ColorSpec::new().set_fg(Some(Color::Blue)), message)
    }

    /// Print a command's usage text
    pub fn usage(&self, text: &str) -> std::io::Result<()> {
        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{text}");
        self.bufwtr.print(&buffer)
    }

    /// Print the per-target results of a successful invocation
    pub fn summary(&self, outcomes: &[BuildOutcome]) -> std::io::Result<()> {
        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer);
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = writeln!(&mut buffer, "═══ Build summary ═══");
        let _ = buffer.reset();
        for outcome in outcomes {
            let _ = writeln!(&mut buffer, "    {} ({})", outcome.target, outcome.architecture);
            let _ = writeln!(&mut buffer, "      package:    {}", outcome.archive.display());
            let _ = writeln!(&mut buffer, "      executable: {}", outcome.bin_dir.display());
        }
        self.bufwtr.print(&buffer)
    }

    /// Print an error message to stderr (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        write_marked(
            &mut buffer,
            "✗",
            ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true),
            message,
        );
        if bufwtr.print(&buffer).is_err() {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {message}");
        }
    }

    /// Print a failure followed by its recovery suggestions
    pub fn failure(&self, headline: &str, error: &CrossError) {
        self.error(&format!("{headline}: {error}"));

        let lines = suggestion_lines(&error.recovery_suggestions());
        if lines.is_empty() {
            return;
        }
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        for line in lines {
            let _ = writeln!(&mut buffer, "{line}");
        }
        let _ = bufwtr.print(&buffer);
    }
}

fn write_marked(buffer: &mut Buffer, marker: &str, spec: &ColorSpec, message: &str) {
    let _ = buffer.set_color(spec);
    let _ = write!(buffer, "{marker}");
    let _ = buffer.reset();
    let _ = writeln!(buffer, " {message}");
}

/// Recovery suggestions as printed under a failure
fn suggestion_lines(suggestions: &[String]) -> Vec<String> {
    if suggestions.is_empty() {
        return Vec::new();
    }
    std::iter::once("\n💡 Recovery suggestions:".to_string())
        .chain(suggestions.iter().map(|s| format!("  • {s}")))
        .collect()
}
