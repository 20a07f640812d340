//! Interactive read-eval-print loop.
//!
//! Two modes, selected by flag, environment, or TTY detection:
//! - **Editor**: a reedline multi-line editor with per-instruction syntax
//!   highlighting. Enter inserts a newline; Ctrl+D (or Ctrl+Z on Windows)
//!   submits the buffer.
//! - **Bare**: reads the whole of stdin as one submission, for pipes.
//!
//! Each submission executes on a fresh machine, so no state leaks between
//! runs. Lines starting with `:` are meta commands (`:help`, `:exit`) and
//! never reach the program.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use nu_ansi_term::Style;
use reedline::{
    DefaultPrompt, DefaultPromptSegment, Highlighter, HistoryItem, Signal, StyledText,
};

use crate::config::{Palette, RunConfig, settings};
use crate::io::{StdinInput, WriterSink};
use crate::program::sanitize;
use crate::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    // Flag override
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !io::stdin().is_terminal() {
                return Err(
                    "cannot start editor: stdin is not a TTY (use --bare or BFRUN_REPL_MODE=bare)"
                        .to_string(),
                );
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    // Environment override
    if let Ok(val) = env::var("BFRUN_REPL_MODE") {
        let v = val.trim().to_ascii_lowercase();
        return match v.as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" => {
                if !io::stdin().is_terminal() {
                    return Err(
                        "cannot start editor: stdin is not a TTY (use BFRUN_REPL_MODE=bare)"
                            .to_string(),
                    );
                }
                Ok(ReplMode::Editor)
            }
            _ => Err(format!(
                "invalid BFRUN_REPL_MODE value: {val}, must be 'bare' or 'editor'"
            )),
        };
    }

    // Auto-detect
    if io::stdin().is_terminal() {
        Ok(ReplMode::Editor)
    } else {
        Ok(ReplMode::Bare)
    }
}

pub fn repl_loop() -> io::Result<()> {
    let mut editor = init_line_editor()?;

    loop {
        let submission = read_submission_interactive(&mut editor)?;
        let Some(submission) = submission else {
            // EOF or editor closed. End the session cleanly so a closed
            // stdin can't hang the loop.
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        match process_submission(&submission) {
            SubmissionOutcome::Skipped => continue,
            SubmissionOutcome::Exit => return Ok(()),
            SubmissionOutcome::Executed => {
                // Test hook: if BFRUN_REPL_ONCE=1, exit after one execution
                if env::var("BFRUN_REPL_ONCE").ok().as_deref() == Some("1") {
                    return Ok(());
                }
            }
        }
    }
}

/// Bare mode: one submission collected from stdin until EOF, executed once.
pub fn execute_bare_once() -> io::Result<()> {
    let submission = {
        let mut locked = io::BufReader::new(io::stdin().lock());
        read_submission(&mut locked)
    };
    if let Some(s) = submission {
        process_submission(&s);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubmissionOutcome {
    Skipped,
    Executed,
    Exit,
}

/// Split meta lines from program text, execute what remains.
fn process_submission(submission: &str) -> SubmissionOutcome {
    let mut exit = false;
    let mut program_lines: Vec<&str> = Vec::new();

    for line in submission.lines() {
        let trimmed = line.trim();
        if let Some(meta) = trimmed.strip_prefix(':') {
            match meta.trim() {
                "help" => print_meta_help(),
                "exit" | "quit" => exit = true,
                other => {
                    eprintln!("repl: unknown command ':{other}' (try :help)");
                    let _ = io::stderr().flush();
                }
            }
        } else {
            program_lines.push(line);
        }
    }

    let buffer = program_lines.join("\n");
    let executed = if sanitize(&buffer).is_empty() {
        SubmissionOutcome::Skipped
    } else {
        execute_buffer(&buffer);
        SubmissionOutcome::Executed
    };

    if exit { SubmissionOutcome::Exit } else { executed }
}

fn print_meta_help() {
    eprintln!("Commands:");
    eprintln!("  :help         show this help");
    eprintln!("  :exit, :quit  leave the repl");
    eprintln!("Anything else is executed as a program on a fresh tape.");
    eprintln!("Ctrl+d (Ctrl+z Enter on Windows) submits the buffer; ctrl+c exits.");
    let _ = io::stderr().flush();
}

/// Executes a single program contained in `buffer`.
/// - Program output goes to stdout (with the trailing newline marker on
///   success).
/// - Errors are printed concisely to stderr, plus a bare newline to stdout
///   so the prompt begins at column 0 on the next iteration.
fn execute_buffer(buffer: &str) {
    let prefs = settings();
    let config = RunConfig::default()
        .with_tape_length(prefs.tape_length)
        .with_step_delay(prefs.delay_ms.map(Duration::from_millis));

    let mut input = StdinInput::new();
    let mut output = WriterSink::new(io::stdout());

    if let Err(err) = crate::run(buffer, &config, &mut input, &mut output) {
        report::print_run_error(None, &sanitize(buffer), &err);
        println!();
    }
    let _ = io::stdout().flush();
}

fn init_line_editor() -> io::Result<reedline::Reedline> {
    use reedline::{
        EditCommand, Emacs, KeyCode, KeyModifiers, Reedline, ReedlineEvent,
        default_emacs_keybindings,
    };

    // Start from default emacs-like bindings and adjust:
    // - Enter -> InsertNewline (do not submit)
    // - Ctrl+D -> AcceptLine (submit)
    // - Ctrl+Z -> AcceptLine (submit, for Windows)
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('z'), ReedlineEvent::Submit);

    // Up/down move within the current multiline buffer, not history.
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);

    // Alt+Up/Alt+Down or Ctrl+Up/Ctrl+Down navigate history items.
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Down, ReedlineEvent::NextHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Down, ReedlineEvent::NextHistory);

    let history = reedline::FileBackedHistory::new(1_000).unwrap();

    let editor = Reedline::create()
        .with_highlighter(Box::new(OpHighlighter::from_palette(&settings().palette)))
        .with_history(Box::new(history))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    Ok(editor)
}

fn read_submission_interactive(editor: &mut reedline::Reedline) -> io::Result<Option<String>> {
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("bfrun".to_string()),
        DefaultPromptSegment::Empty,
    );

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            // One history item per submitted buffer (program-level)
            if !buffer.trim().is_empty() {
                let _ = editor
                    .history_mut()
                    .save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) => Ok(None), // Global SIGINT, exit immediately
        Ok(Signal::CtrlD) => Ok(None), // EOF, exit cleanly
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

pub fn read_submission<R: io::BufRead>(stdin: &mut R) -> Option<String> {
    // Collect all lines until EOF
    let mut buffer = String::new();

    loop {
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => buffer.push_str(&line),
            Err(_) => return None,
        }
    }

    if buffer.is_empty() { None } else { Some(buffer) }
}

/// Per-instruction styling: movement, arithmetic, I/O, and flow control
/// each get their own palette slot.
struct OpHighlighter {
    right: Style,
    left: Style,
    inc: Style,
    dec: Style,
    output: Style,
    input: Style,
    bracket: Style,
    other: Style,
}

impl OpHighlighter {
    fn from_palette(palette: &Palette) -> Self {
        Self {
            right: Style::new().fg(palette.op_right).bold(),
            left: Style::new().fg(palette.op_left).bold(),
            inc: Style::new().fg(palette.op_inc).bold(),
            dec: Style::new().fg(palette.op_dec).bold(),
            output: Style::new().fg(palette.op_output).bold(),
            input: Style::new().fg(palette.op_input).bold(),
            bracket: Style::new().fg(palette.op_bracket).bold(),
            other: Style::new().fg(palette.op_other),
        }
    }

    #[inline]
    fn style_for(&self, ch: char) -> Style {
        match ch {
            '>' => self.right,
            '<' => self.left,
            '+' => self.inc,
            '-' => self.dec,
            '.' => self.output,
            ',' => self.input,
            '[' | ']' => self.bracket,
            _ => self.other,
        }
    }
}

impl Highlighter for OpHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out = StyledText::new();
        let mut current_style: Option<Style> = None;
        let mut buffer = String::new();

        for ch in line.chars() {
            let style = self.style_for(ch);

            match current_style {
                None => {
                    current_style = Some(style);
                    buffer.push(ch);
                }
                Some(s) if s == style => buffer.push(ch),
                Some(s) => {
                    out.push((s, std::mem::take(&mut buffer)));
                    current_style = Some(style);
                    buffer.push(ch);
                }
            }
        }

        if let Some(s) = current_style {
            if !buffer.is_empty() {
                out.push((s, buffer));
            }
        }
        out
    }
}
