//! Terminal presentation surface.
//!
//! The surface is the only part of sunalert that touches the terminal. It
//! reads one coordinate line per fetch and redraws the status and alert
//! regions of [`DisplayState`] when they change. The core never depends on
//! how the text is laid out.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use tokio::sync::mpsc;

use crate::constants::{INPUT_PROMPT, QUIT_COMMANDS};
use crate::display::DisplayState;

/// One submission from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Raw text to run a fetch cycle with.
    Coordinates(String),
    Quit,
}

impl UserInput {
    /// Classify a line of input; quit words are case-insensitive.
    pub fn from_line(line: &str) -> Self {
        let trimmed = line.trim();
        if QUIT_COMMANDS
            .iter()
            .any(|cmd| trimmed.eq_ignore_ascii_case(cmd))
        {
            UserInput::Quit
        } else {
            UserInput::Coordinates(trimmed.to_string())
        }
    }
}

/// The operations the event loop needs from a front end.
pub trait Surface {
    /// Redraw whatever changed since the last call.
    fn render(&mut self, display: &mut DisplayState) -> Result<()>;

    fn prompt(&mut self) -> Result<()>;

    /// Show input the user did not type themselves (e.g. from the CLI).
    fn echo_input(&mut self, input: &str) -> Result<()>;

    /// Wait for the next submission. Must be cancel-safe: the loop drops the
    /// future when an alert fires first.
    fn next_input(&mut self) -> impl Future<Output = Result<UserInput>>;
}

/// Line-oriented surface on stdin/stdout.
///
/// Stdin is read on a plain thread that is never joined, so a blocked read
/// cannot hold up runtime shutdown after Ctrl-C.
pub struct TerminalSurface {
    lines: mpsc::UnboundedReceiver<io::Result<String>>,
}

impl TerminalSurface {
    pub fn new() -> Result<Self> {
        let (tx, lines) = mpsc::unbounded_channel();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || forward_lines(io::stdin().lock(), tx))
            .context("Failed to start terminal input thread")?;
        Ok(Self { lines })
    }
}

/// Send each line of `reader` until EOF, a read error or a closed receiver.
fn forward_lines<R: BufRead>(reader: R, tx: mpsc::UnboundedSender<io::Result<String>>) {
    for line in reader.lines() {
        let failed = line.is_err();
        if tx.send(line).is_err() || failed {
            break;
        }
    }
}

/// Write the changed regions of `display` to `out`.
pub fn render_to<W: Write>(out: &mut W, display: &mut DisplayState) -> io::Result<()> {
    let changes = display.take_changes();

    if changes.status {
        writeln!(out, "┃")?;
        for (i, line) in display.status().lines().enumerate() {
            let marker = if i == 0 { "┣" } else { "┃" };
            writeln!(out, "{} {}", marker, line)?;
        }
    }

    if changes.alert && !display.alert().is_empty() {
        writeln!(out, "┃")?;
        writeln!(out, "┣ {}", display.alert().bold().yellow())?;
    }

    out.flush()
}

impl Surface for TerminalSurface {
    fn render(&mut self, display: &mut DisplayState) -> Result<()> {
        let mut stdout = io::stdout().lock();
        render_to(&mut stdout, display).context("Failed to write to terminal")
    }

    fn prompt(&mut self) -> Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "┃ {}", INPUT_PROMPT.dim())?;
        stdout.flush().context("Failed to write to terminal")
    }

    fn echo_input(&mut self, input: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "┃ {}{}", INPUT_PROMPT.dim(), input)?;
        stdout.flush().context("Failed to write to terminal")
    }

    async fn next_input(&mut self) -> Result<UserInput> {
        // Receiving from the channel is cancel-safe.
        match self.lines.recv().await {
            Some(line) => {
                let line = line.context("Failed to read from terminal")?;
                Ok(UserInput::from_line(&line))
            }
            None => Ok(UserInput::Quit),
        }
    }
}
