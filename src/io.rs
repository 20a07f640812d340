//! Byte I/O for the machine.
//!
//! Output is byte-at-a-time through [`OutputSink`]. Input is unit-at-a-time
//! through [`InputSource`]: each `,` asks the source for one line of text
//! and stores the first character's code value, so interactive programs get
//! one answer per prompt rather than raw byte streaming. An exhausted or
//! empty answer yields the zero byte.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

/// Receives program output one byte at a time.
pub trait OutputSink {
    fn emit(&mut self, byte: u8) -> io::Result<()>;

    /// Flush buffered bytes. Default is a no-op for unbuffered sinks.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Supplies one unit of text per `,` instruction.
///
/// `read_unit` may block until input arrives; it is the machine's only
/// suspension point. `Ok(None)` means the source is exhausted. The returned
/// unit carries no line terminator.
pub trait InputSource {
    fn read_unit(&mut self) -> io::Result<Option<String>>;
}

/// Code value of the first character of an input unit, truncated to a cell.
///
/// `None` (exhausted source) and empty units both read as 0.
pub fn unit_to_byte(unit: Option<&str>) -> u8 {
    unit.and_then(|text| text.chars().next())
        .map(|c| (c as u32) as u8)
        .unwrap_or(0)
}

/// Line-oriented stdin input. When stdin is a terminal, a `<< ` prompt is
/// written to stderr before each read so piped program output stays clean.
pub struct StdinInput {
    prompt: bool,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            prompt: io::stdin().is_terminal(),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for StdinInput {
    fn read_unit(&mut self) -> io::Result<Option<String>> {
        if self.prompt {
            eprint!("<< ");
            io::stderr().flush()?;
        }

        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Ok(None); // EOF
        }
        Ok(Some(strip_terminator(line)))
    }
}

fn strip_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// A scripted queue of input units, for tests and non-interactive callers.
#[derive(Default)]
pub struct QueuedInput {
    units: VecDeque<String>,
}

impl QueuedInput {
    pub fn new<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            units: units.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for QueuedInput {
    fn read_unit(&mut self) -> io::Result<Option<String>> {
        Ok(self.units.pop_front())
    }
}

/// Adapts any [`Write`] into an [`OutputSink`].
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn emit(&mut self, byte: u8) -> io::Result<()> {
        self.writer.write_all(&[byte])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Captures output bytes in memory, for tests.
#[derive(Default)]
pub struct CaptureSink {
    bytes: Vec<u8>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl OutputSink for CaptureSink {
    fn emit(&mut self, byte: u8) -> io::Result<()> {
        self.bytes.push(byte);
        Ok(())
    }
}
