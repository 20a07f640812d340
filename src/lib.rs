//! A Brainfuck interpreter with strict tape semantics.
//!
//! The crate executes the eight-instruction tape language over a
//! zero-initialized memory tape (default 30,000 cells) with a single data
//! pointer.
//!
//! Behaviors:
//! - Strict pointer bounds: moving left of cell 0 or right past the last
//!   cell is an error, never a wrap or a clamp.
//! - Cell arithmetic wraps modulo 256 by definition: 255+1=0, 0-1=255.
//! - Brackets are validated in a single scan before execution starts, so a
//!   malformed program never runs at all.
//! - Input `,` consumes one unit of text from the input source and stores
//!   the first character's code value; an empty or exhausted source reads
//!   as 0.
//! - Output `.` emits the current cell through the output sink; after a
//!   successful run, [`run`] appends a single trailing newline.
//! - Characters outside the instruction set pass through as no-ops, so
//!   inline commentary is fine as long as it avoids the eight ops.
//!
//! Quick start:
//!
//! ```no_run
//! use bfrun::{run, QueuedInput, RunConfig, WriterSink};
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let mut input = QueuedInput::default();
//! let mut output = WriterSink::new(std::io::stdout());
//! run(code, &RunConfig::default(), &mut input, &mut output).expect("program should run");
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod machine;
pub mod program;
pub mod repl;
pub mod report;
pub mod theme;
pub mod trace;

pub use config::{DEFAULT_TAPE_LENGTH, RunConfig};
pub use error::RunError;
pub use io::{CaptureSink, InputSource, OutputSink, QueuedInput, StdinInput, WriterSink};
pub use machine::{Machine, StepView};
pub use program::{Program, sanitize};

/// Run `source` to completion: sanitize, validate, execute, and on success
/// emit the trailing newline marker through the sink.
pub fn run(
    source: &str,
    config: &RunConfig,
    input: &mut dyn InputSource,
    output: &mut dyn OutputSink,
) -> Result<(), RunError> {
    let program = Program::parse(source)?;
    let mut machine = Machine::new(program, config)?;
    run_machine(&mut machine, input, output)
}

/// Drive an already-built machine to completion, then emit the trailing
/// newline and flush. Callers that need an observer (tracing) build the
/// [`Machine`] themselves and hand it here.
pub fn run_machine(
    machine: &mut Machine,
    input: &mut dyn InputSource,
    output: &mut dyn OutputSink,
) -> Result<(), RunError> {
    machine.run(input, output)?;

    let end = machine.program().len();
    output
        .emit(b'\n')
        .and_then(|_| output.flush())
        .map_err(|source| RunError::Io { ip: end, source })?;
    Ok(())
}
