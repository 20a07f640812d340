use std::env;
use std::io::{self, IsTerminal, Write};

use clap::{Parser, Subcommand};

mod commands;

use commands::repl::ReplArgs;
use commands::run::RunArgs;

#[derive(Parser, Debug)]
#[command(name = "bfrun", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Repl(ReplArgs),
}

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run  [--trace|-t] "<code>"      # Run code (args are concatenated)
  {0} run  [--trace|-t] --file <PATH> # Run code loaded from file
  {0} repl [--bare|--editor]          # Start a read-eval-print loop
  {0} < program.bf                    # Piped stdin is read as a program

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

fn main() {
    // Program name is kept for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfrun"));

    let cli = Cli::parse();

    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match cli.command {
        Some(Command::Run(args)) => commands::run::run(&program, args),
        Some(Command::Repl(args)) => commands::repl::run(&program, args),
        None => {
            // Bare mode: treat piped stdin as a program, one shot.
            if io::stdin().is_terminal() {
                print_top_usage_and_exit(&program, 2);
            }
            match bfrun::repl::execute_bare_once() {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("{program}: {e}");
                    let _ = io::stderr().flush();
                    1
                }
            }
        }
    };

    std::process::exit(code);
}
