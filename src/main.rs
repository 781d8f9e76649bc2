use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use exprasm::symbol::DEFAULT_CAPACITY;
use exprasm::{Config, Driver};
use tracing_subscriber::EnvFilter;

/// Compile one statement per line into register-machine pseudo-assembly.
#[derive(Parser, Debug)]
#[command(name = "exprasm", version)]
struct Cli {
  /// Source file to read; standard input when omitted.
  input: Option<PathBuf>,

  /// Maximum number of variables, including the builtin x, y and z.
  #[arg(long, value_name = "N", default_value_t = DEFAULT_CAPACITY)]
  symbol_capacity: usize,

  /// Print each statement's AST in prefix notation, and the final symbol table, to stderr.
  #[arg(long)]
  dump_ast: bool,

  /// Do not explain fatal errors on stderr.
  #[arg(short, long)]
  quiet: bool,
}

impl From<&Cli> for Config {
  fn from(cli: &Cli) -> Self {
    Self {
      symbol_capacity: cli.symbol_capacity,
      dump_ast: cli.dump_ast,
      diagnostics: !cli.quiet,
    }
  }
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_target(false)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .init();

  let cli = Cli::parse();
  let config = Config::from(&cli);

  let input: Box<dyn BufRead> = match &cli.input {
    Some(path) => match File::open(path) {
      Ok(file) => Box::new(BufReader::new(file)),
      Err(err) => {
        eprintln!("failed to open {}: {err}", path.display());
        return ExitCode::FAILURE;
      }
    },
    None => Box::new(io::stdin().lock()),
  };

  let mut driver = Driver::new(input, BufWriter::new(io::stdout().lock()), &config);
  match driver.run() {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) if err.is_io() => {
      eprintln!("{err}");
      ExitCode::FAILURE
    }
    Err(err) => {
      if config.diagnostics {
        eprintln!(
          "line {}: {}",
          driver.line_number(),
          err.report(driver.current_line())
        );
      }
      // Rejected programs still exit 0; stdout ends with `EXIT 1`.
      ExitCode::SUCCESS
    }
  }
}
