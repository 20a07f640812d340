//! Source preparation: whitespace stripping and bracket validation.
//!
//! A [`Program`] is the immutable instruction stream the machine executes.
//! Parsing strips whitespace and control characters, then checks bracket
//! balance in a single scan, so the machine never meets a malformed loop at
//! runtime. Characters outside the instruction set survive sanitization and
//! are dispatched as no-ops.

use crate::error::RunError;

/// Remove every whitespace and control character, preserving order.
pub fn sanitize(source: &str) -> String {
    source
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect()
}

/// A sanitized, bracket-validated instruction stream.
pub struct Program {
    text: String,
    ops: Vec<char>,
}

impl Program {
    /// Sanitize `source` and validate its brackets.
    ///
    /// Fails with [`RunError::DanglingClose`] on the first `]` that has no
    /// open `[` before it, or [`RunError::UnmatchedOpen`] naming the
    /// earliest `[` left open at the end of the scan.
    pub fn parse(source: &str) -> Result<Self, RunError> {
        let text = sanitize(source);
        let ops: Vec<char> = text.chars().collect();

        let mut opens: Vec<usize> = Vec::new();
        for (i, &c) in ops.iter().enumerate() {
            match c {
                '[' => opens.push(i),
                ']' => {
                    if opens.pop().is_none() {
                        return Err(RunError::DanglingClose { index: i });
                    }
                }
                _ => {}
            }
        }

        if let Some(&earliest) = opens.first() {
            return Err(RunError::UnmatchedOpen { index: earliest });
        }

        Ok(Self { text, ops })
    }

    /// The sanitized stream as text, for diagnostics.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The instruction characters, indexed 0..len.
    pub fn ops(&self) -> &[char] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
