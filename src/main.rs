use askdb::backend::sqlite::{self, SqliteBackend};
use askdb::cli::{self, Cli, Command};
use askdb::config::{self, AppConfig};
use askdb::error::AskError;
use askdb::handler::{self, QueryRequest};
use askdb::llm::gemini::GeminiClient;
use askdb::server::{self, AppState};
use askdb::validation::{self, ValidationResult};
use askdb::{format, masking, output, verbose};
use clap::Parser;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Load .env file (optional, ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // serve and ask start tracing once the config file has been read.
    let result = match cli.command {
        Command::Serve(ref args) => {
            serve(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
        Command::Ask(ref args) => ask(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await,
        Command::Validate(ref args) => {
            verbose::init(cli.verbose);
            validate(args)
        }
        Command::Seed(ref args) => {
            verbose::init(cli.verbose);
            seed(args).await
        }
    };

    if let Err(err) = result {
        output::print_error(&err);
        process::exit(1);
    }
}

async fn serve(
    args: &cli::ServeArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&std::path::PathBuf>,
) -> Result<(), AskError> {
    let app_config = config::load_from_serve_args(args, verbose, show_secrets, config_path)?;
    verbose::init(app_config.verbose);
    log_config(&app_config);

    let state = AppState {
        generator: build_generator(&app_config),
        backend: build_backend(&app_config)?,
        request_timeout: app_config.request_timeout_secs.map(Duration::from_secs),
        default_max_results: app_config.max_results,
    };

    server::serve(app_config.listen, state).await
}

async fn ask(
    args: &cli::AskArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&std::path::PathBuf>,
) -> Result<(), AskError> {
    let app_config = config::load_from_ask_args(args, verbose, show_secrets, config_path)?;
    verbose::init(app_config.verbose);
    log_config(&app_config);

    let request = QueryRequest {
        question: args.question.clone(),
        schema: resolve_schema(args)?,
        max_results: Some(app_config.max_results),
    };

    let generator = build_generator(&app_config);
    let backend = build_backend(&app_config)?;

    let run = handler::generate_and_run(&generator, &backend, &request);
    let response = match app_config.request_timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .unwrap_or(Err(AskError::Timeout { seconds: secs })),
        None => run.await,
    };
    backend.close().await;
    let response = response?;

    output::print_sql(response.sql());

    if let Some(message) = response.error() {
        return Err(AskError::Query {
            message: message.to_string(),
        });
    }

    let columns = response.columns().unwrap_or_default();
    let rows = response.rows().unwrap_or_default();
    if rows.is_empty() {
        output::print_empty_notice();
    }
    let toon = format::to_toon(columns, rows)?;

    match &args.output {
        Some(path) => {
            output::write_file(&toon, path)?;
            tracing::info!("wrote {} rows to {}", rows.len(), path.display());
        }
        None => output::print_result(&toon),
    }

    Ok(())
}

fn validate(args: &cli::ValidateArgs) -> Result<(), AskError> {
    let sql = resolve_sql(args)?;
    match validation::validate(&sql) {
        ValidationResult::Safe => {
            println!("safe");
            Ok(())
        }
        ValidationResult::Denied { reason } => Err(AskError::UnsafeQuery {
            reason: reason.detail,
        }),
    }
}

async fn seed(args: &cli::SeedArgs) -> Result<(), AskError> {
    sqlite::seed_sample_database(&args.path).await?;
    println!("created and seeded {}", args.path.display());
    Ok(())
}

// --- Helpers ---

fn build_generator(app_config: &AppConfig) -> GeminiClient {
    GeminiClient::new(
        app_config.llm.api_base.clone(),
        clone_secret(&app_config.llm.api_key),
        app_config.llm.model.clone(),
        app_config.llm.max_output_tokens,
    )
}

fn clone_secret(secret: &secrecy::SecretString) -> secrecy::SecretString {
    use secrecy::ExposeSecret;
    secrecy::SecretString::from(secret.expose_secret().to_string())
}

fn build_backend(app_config: &AppConfig) -> Result<SqliteBackend, AskError> {
    SqliteBackend::connect(
        &app_config.database.url,
        app_config.database.max_connections,
        app_config.database.read_only,
    )
}

fn log_config(app_config: &AppConfig) {
    tracing::debug!(
        database = %masking::redact_url_password(&app_config.database.url, app_config.show_secrets),
        max_connections = app_config.database.max_connections,
        read_only = app_config.database.read_only,
        model = %app_config.llm.model,
        api_key = %masking::format_secret(&app_config.llm.api_key, app_config.show_secrets),
        max_results = app_config.max_results,
        "configuration resolved"
    );
}

fn resolve_schema(args: &cli::AskArgs) -> Result<String, AskError> {
    if let Some(ref schema) = args.schema {
        return Ok(schema.clone());
    }
    if let Some(ref path) = args.schema_file {
        return std::fs::read_to_string(path).map_err(|e| AskError::Config {
            message: format!("cannot read schema file {}: {}", path.display(), e),
        });
    }
    Ok(sqlite::SAMPLE_SCHEMA.to_string())
}

fn resolve_sql(args: &cli::ValidateArgs) -> Result<String, AskError> {
    if let Some(ref sql) = args.sql {
        return Ok(sql.clone());
    }
    if let Some(ref path) = args.sql_file {
        return std::fs::read_to_string(path).map_err(|e| AskError::Config {
            message: format!("cannot read SQL file {}: {}", path.display(), e),
        });
    }
    Err(AskError::Config {
        message: "no SQL provided — use positional argument or --file".to_string(),
    })
}
