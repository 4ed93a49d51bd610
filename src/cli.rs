use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "askdb",
    version,
    about = "Ask questions in plain English, answered with read-only SQL"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short = 'c', long, global = true, env = "ASKDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit debug diagnostics to stderr
    #[arg(short = 'v', long, global = true, env = "ASKDB_VERBOSE")]
    pub verbose: bool,

    /// Disable credential masking in diagnostics
    #[arg(long, global = true, env = "ASKDB_SHOW_SECRETS")]
    pub show_secrets: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP query API
    Serve(ServeArgs),

    /// Answer one question and print the SQL and rows
    Ask(AskArgs),

    /// Check a SQL statement against the read-only policy
    Validate(ValidateArgs),

    /// Create and seed the sample SQLite database
    Seed(SeedArgs),
}

/// Database and model settings shared by `serve` and `ask`.
#[derive(Args, Debug, Default)]
pub struct ConnectArgs {
    /// Database connection string (default: sqlite://./sample.db)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections (default: 5)
    #[arg(long, env = "ASKDB_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,

    /// Open database connections read-only
    #[arg(long, env = "ASKDB_READ_ONLY")]
    pub read_only: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY")]
    pub api_key: Option<String>,

    /// Gemini model name (default: gemini-2.5-flash)
    #[arg(short = 'm', long, env = "ASKDB_MODEL")]
    pub model: Option<String>,

    /// Gemini API base URL
    #[arg(long, env = "ASKDB_API_BASE")]
    pub api_base: Option<String>,

    /// Config file profile name
    #[arg(short = 'P', long, env = "ASKDB_PROFILE")]
    pub profile: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Address to listen on (default: 127.0.0.1:8000)
    #[arg(short = 'L', long, env = "ASKDB_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Per-request timeout in seconds (default: 120)
    #[arg(short = 't', long, env = "ASKDB_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Disable the per-request timeout
    #[arg(long)]
    pub no_timeout: bool,
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Question in plain English
    pub question: String,

    /// Schema description given to the model (default: the sample schema)
    #[arg(short = 's', long, conflicts_with = "schema_file")]
    pub schema: Option<String>,

    /// Read the schema description from file
    #[arg(short = 'f', long)]
    pub schema_file: Option<PathBuf>,

    /// Max rows to return (default: 200)
    #[arg(short = 'l', long, env = "ASKDB_MAX_RESULTS")]
    pub max_results: Option<usize>,

    /// Write rows to file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// SQL statement text
    pub sql: Option<String>,

    /// Read SQL from file
    #[arg(short = 'f', long = "file", conflicts_with = "sql")]
    pub sql_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Database file to create
    #[arg(long, default_value = "sample.db")]
    pub path: PathBuf,
}
