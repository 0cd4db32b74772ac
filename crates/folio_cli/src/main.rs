use std::path::PathBuf;

use clap::{Parser, Subcommand};

use folio_cli::EXIT_OPERATIONAL;

mod commands;

#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Validate book chapter front matter and assemble the book manifest"
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (error|warn|info|debug|trace)
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every chapter and print the manifest summary or the error list
    Validate(ValidateArgs),
    /// Validate, then print the table of contents as Markdown
    Toc(TocArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum PlaceholderPolicyArg {
    Ignore,
    Warn,
    Error,
}

impl From<PlaceholderPolicyArg> for folio_book::PlaceholderPolicy {
    fn from(arg: PlaceholderPolicyArg) -> Self {
        match arg {
            PlaceholderPolicyArg::Ignore => folio_book::PlaceholderPolicy::Ignore,
            PlaceholderPolicyArg::Warn => folio_book::PlaceholderPolicy::Warn,
            PlaceholderPolicyArg::Error => folio_book::PlaceholderPolicy::Error,
        }
    }
}

#[derive(Parser)]
struct SourceArgs {
    /// Book root directory
    #[arg(value_name = "ROOT_DIR")]
    root: PathBuf,

    /// Config file (default: ROOT_DIR/folio.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How reviewer/translator placeholders such as "TBD" are treated
    #[arg(long, value_enum)]
    placeholder_policy: Option<PlaceholderPolicyArg>,

    /// Worker threads for loading chapters (0 = one per core)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

impl SourceArgs {
    fn into_input(self) -> folio_cli::ValidateInput {
        folio_cli::ValidateInput {
            root: self.root,
            config: self.config,
            placeholder_policy: self.placeholder_policy.map(Into::into),
            jobs: self.jobs,
        }
    }
}

#[derive(Parser)]
struct ValidateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output JSON instead of key=value lines
    #[arg(long)]
    json: bool,

    /// Also write the manifest JSON to this file when validation passes
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[derive(Parser)]
struct TocArgs {
    #[command(flatten)]
    source: SourceArgs,
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.use_stderr() {
                // Exit code 3 still reports the usage error if stderr is gone.
                err.print().ok();
                std::process::exit(EXIT_OPERATIONAL);
            }
            err.exit();
        }
    };
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Validate(args) => commands::validate::run_validate(args),
        Commands::Toc(args) => commands::toc::run_toc(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(EXIT_OPERATIONAL);
        }
    }
}
