use std::io::{self, Write};

use clap::Args;

use bfrun::repl::{self, ModeFlagOverride, ReplMode};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force bare mode (read stdin once, no editor)
    #[arg(long = "bare")]
    pub bare: bool,

    /// Force the interactive editor (requires a TTY)
    #[arg(long = "editor")]
    pub editor: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: ReplArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let flag = if args.bare {
        ModeFlagOverride::Bare
    } else if args.editor {
        ModeFlagOverride::Editor
    } else {
        ModeFlagOverride::None
    };

    let mode = match repl::select_mode(flag) {
        Ok(mode) => mode,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    match mode {
        ReplMode::Editor => {
            println!("bfrun repl");
            println!(
                "Ctrl+d/Ctrl+z Enter (Windows) executes the current buffer. Press ctrl+c to exit"
            );
            if let Err(e) = repl::repl_loop() {
                eprintln!("{program}: repl error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
        ReplMode::Bare => {
            if let Err(e) = repl::execute_bare_once() {
                eprintln!("{program}: repl error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    }
    0
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl [--bare|--editor]

Options:
  --bare        Read stdin once and execute it, no editor
  --editor      Force the interactive editor (requires a TTY)
  --help, -h    Show this help

Description:
  Starts a repl where you can enter code and execute it live.

Notes:
    - Ctrl+d executes the current buffer on *nix/macOS.
    - Ctrl+z and Enter will execute the current buffer on Windows.
    - Ctrl+c exits the repl immediately.
    - Lines starting with ':' are meta commands; try :help.
    - Each execution starts with a fresh tape and pointer.
    - The repl exits after a single execution when BFRUN_REPL_ONCE=1.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
