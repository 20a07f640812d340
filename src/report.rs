//! Human-readable error reporting for the CLI and REPL.
//!
//! Errors that point at an instruction get a caret context window over the
//! sanitized stream. Everything lands on stderr so piped program output
//! stays clean.

use std::io::{self, Write};

use crate::error::RunError;

/// Pretty-print a [`RunError`] with caret positioning against `stream`
/// (the sanitized instruction stream the indices refer to). When `program`
/// is set, messages are prefixed `program: ...` in CLI fashion.
pub fn print_run_error(program: Option<&str>, stream: &str, err: &RunError) {
    let header = match program {
        Some(p) => format!("{p}: {err}"),
        None => err.to_string(),
    };

    match err.index() {
        Some(pos) if !stream.is_empty() => print_with_caret(&header, stream, pos),
        _ => {
            eprintln!("{header}");
            let _ = io::stderr().flush();
        }
    }
}

/// Show a short window of the stream around `pos` with a caret underneath,
/// slicing by char indices so multi-byte pass-through characters can't
/// split the string.
fn print_with_caret(header: &str, stream: &str, pos: usize) {
    const WINDOW_CHARS: usize = 32;

    let total_chars = stream.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(stream, start_char);
    let end_byte = char_to_byte_index(stream, end_char);

    eprintln!("{header}");
    eprintln!("  {}", &stream[start_byte..end_byte]);

    let mut underline = " ".repeat(pos.saturating_sub(start_char));
    underline.push('^');
    eprintln!("  {underline}");
    let _ = io::stderr().flush();
}

/// Byte offset of the `char_idx`-th character of `s`.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(b, _)| b).unwrap_or(s.len())
}
