use std::fs;
use std::io::{self, Write};
use std::time::Duration;

use clap::Args;

use bfrun::config::settings;
use bfrun::trace::Tracer;
use bfrun::{Machine, Program, RunConfig, RunError, StdinInput, WriterSink, sanitize};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of dispatches to stderr while executing
    #[arg(short = 't', long = "trace")]
    pub trace: bool,

    /// Read code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Number of tape cells (fallback: settings file; default 30000)
    #[arg(long = "tape-length", value_name = "CELLS")]
    pub tape_length: Option<usize>,

    /// Pause inserted after each step, in milliseconds
    #[arg(long = "delay", value_name = "MS")]
    pub delay: Option<u64>,

    /// Concatenated code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        trace,
        file,
        tape_length,
        delay,
        code,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    // Resolve options: flags -> settings file -> defaults
    let prefs = settings();
    let config = RunConfig::default()
        .with_tape_length(tape_length.unwrap_or(prefs.tape_length))
        .with_step_delay(delay.or(prefs.delay_ms).map(Duration::from_millis));

    if let Err(err) = execute(&code_str, &config, trace) {
        bfrun::report::print_run_error(Some(program), &sanitize(&code_str), &err);
        let _ = io::stderr().flush();
        return 1;
    }
    0
}

fn execute(source: &str, config: &RunConfig, trace: bool) -> Result<(), RunError> {
    let parsed = Program::parse(source)?;
    let mut machine = Machine::new(parsed, config)?;

    if trace {
        let tracer = Tracer::new();
        machine.set_step_observer(move |view| tracer.observe(view));
    }

    let mut input = StdinInput::new();
    let mut output = WriterSink::new(io::stdout());
    bfrun::run_machine(&mut machine, &mut input, &mut output)
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [--trace|-t] "<code>"
  {0} run [--trace|-t] --file <PATH>

Options:
  --file, -f <PATH>     Read code from PATH instead of positional "<code>"
  --trace, -t           Print a step-by-step table of dispatches to stderr
  --tape-length <CELLS> Number of tape cells (default 30000, must be >= 1)
  --delay <MS>          Pause inserted after each step, in milliseconds
  --help, -h            Show this help

Notes:
- Input (`,`) reads one line from stdin and stores its first character;
  an empty line or EOF stores 0.
- Characters outside ><+-.,[] are ignored by the machine.
- On success a single trailing newline is printed after the program output.

Examples:
- Load code from a file:
    {0} run --file ./program.bf
- Feed lines from a file as input (`,` consumes one line per read):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
