// minicc: compile and run an int/float subset of C

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser as _;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use minicc::config::{Config, FormatPolicy};
use minicc::diagnostics::CompileError;
use minicc::interpreter::Interpreter;
use minicc::ir::{pretty, Vm};
use minicc::parser::lexer::Lexer;
use minicc::pipeline;
use minicc::semantic::CheckedProgram;
use minicc::ui::{App, ErrorState};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the C source file
    file: PathBuf,

    /// Print the token stream and stop
    #[arg(long)]
    tokens: bool,

    /// Print the checked syntax tree and stop
    #[arg(long)]
    ast: bool,

    /// Print the lowered IR listing and stop
    #[arg(long)]
    emit_ir: bool,

    /// Execute through the IR VM instead of the tree walker
    #[arg(long)]
    run_ir: bool,

    /// Step through the recorded execution in a terminal UI
    #[arg(long)]
    tui: bool,

    /// How printf treats %d with a float or %f with an int
    #[arg(long, default_value_t = FormatPolicy::Strict)]
    format_policy: FormatPolicy,

    /// Fail any loop that runs more than N iterations
    #[arg(long, value_name = "N")]
    max_iterations: Option<u64>,

    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default().with_format_policy(self.format_policy);
        if let Some(limit) = self.max_iterations {
            config = config.with_max_loop_iterations(limit);
        }
        if self.tui {
            config = config.with_snapshots();
        }
        config
    }
}

/// Why the command failed; decides the exit code
enum Failure {
    /// The program was rejected or failed at runtime (already reported)
    Program,
    /// Usage or I/O problem
    Io(anyhow::Error),
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Io(err)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Program) => ExitCode::from(1),
        Err(Failure::Io(err)) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), Failure> {
    let path = args.file.display().to_string();
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read '{}'", path))?;
    let config = args.config();
    debug!(file = %path, bytes = source.len(), ?config, "loaded source");

    let report = |err: CompileError| {
        eprint!("{}", err.render(&source, &path));
        Failure::Program
    };

    if args.tokens {
        return print_tokens(&source, &path);
    }

    let program = pipeline::compile_with(&source, &config).map_err(report)?;

    if args.ast {
        println!("{:#?}", program.program());
        return Ok(());
    }

    if args.emit_ir {
        let module = pipeline::lower(&program).map_err(|e| report(e.into()))?;
        print!("{}", pretty::format_module(&module));
        return Ok(());
    }

    if args.tui {
        return run_tui(&program, config, source.clone());
    }

    let stdout = io::stdout().lock();
    if args.run_ir {
        let module = pipeline::lower(&program).map_err(|e| report(e.into()))?;
        let mut vm = Vm::new(&module, config).with_echo(stdout);
        vm.run().map_err(|e| report(e.into()))
    } else {
        let mut interpreter = Interpreter::new(&program, config).with_echo(stdout);
        interpreter.run().map_err(|e| report(e.into()))
    }
}

/// One token per line; every lex error is reported, not just the first
fn print_tokens(source: &str, path: &str) -> Result<(), Failure> {
    let (tokens, errors) = Lexer::new(source).tokenize_recovering();

    let mut out = io::stdout().lock();
    for token in &tokens {
        writeln!(
            out,
            "{:>8}  {:<10} {}",
            token.location.to_string(),
            format!("{:?}", token.category()),
            token.lexeme
        )
        .context("failed to write token listing")?;
    }

    if errors.is_empty() {
        return Ok(());
    }
    for err in errors {
        eprint!("{}", CompileError::from(err).render(source, path));
    }
    Err(Failure::Program)
}

fn run_tui(program: &CheckedProgram, config: Config, source: String) -> Result<(), Failure> {
    let mut interpreter = Interpreter::new(program, config);
    let error = interpreter.run().err().map(|e| ErrorState {
        message: e.to_string(),
        location: e.location(),
    });
    let failed = error.is_some();
    let (snapshots, output) = interpreter.into_history();
    debug!(snapshots = snapshots.len(), failed, "recorded execution");

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("failed to set up terminal")?;

    let mut app = App::new(source, snapshots, output, error);
    let res = app.run(&mut terminal);

    // Restore the terminal before reporting anything
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    res.context("terminal UI failed")?;
    if failed {
        return Err(Failure::Program);
    }
    Ok(())
}
