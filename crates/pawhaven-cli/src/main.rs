// pawhaven-cli/src/main.rs
// ============================================================================
// Module: PawHaven CLI Entry Point
// Description: Command dispatcher for serving the site and seeding records.
// Purpose: Run the web server, validate config, and manage staff and imports.
// Dependencies: clap, pawhaven-config, pawhaven-core, pawhaven-web, tokio,
//               tracing-subscriber
// ============================================================================

//! ## Overview
//! The `pawhaven` binary loads `pawhaven.toml`, opens the configured store,
//! and either serves the site or runs a one-shot administrative task. Import
//! files are validated in full before any record is written, so a rejected
//! file leaves the store untouched.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use pawhaven_config::PawhavenConfig;
use pawhaven_config::StoreType;
use pawhaven_core::Account;
use pawhaven_core::PasswordHasher;
use pawhaven_core::PetForm;
use pawhaven_core::Shelter;
use pawhaven_core::SharedShelterStore;
use pawhaven_core::ShelterStore;
use pawhaven_core::StaffOutcome;
use pawhaven_core::StoryForm;
use pawhaven_core::Timestamp;
use pawhaven_web::Argon2PasswordHasher;
use pawhaven_web::Clock;
use pawhaven_web::ShelterServer;
use pawhaven_web::SystemClock;
use pawhaven_web::build_store;
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an import file.
const MAX_IMPORT_BYTES: u64 = 8 * 1024 * 1024;
/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LOG_LEVEL: &str = "info";
/// Environment variable holding the staff password by default.
const DEFAULT_PASSWORD_ENV: &str = "PAWHAVEN_STAFF_PASSWORD";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pawhaven", version, disable_help_subcommand = true)]
struct Cli {
    /// Log filter such as `info` or `pawhaven_web=debug` (overrides `RUST_LOG`).
    #[arg(long, value_name = "FILTER", global = true)]
    log_level: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the PawHaven site.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Staff account utilities.
    Staff {
        /// Selected staff subcommand.
        #[command(subcommand)]
        command: StaffCommand,
    },
    /// Pet record utilities.
    Pets {
        /// Selected pets subcommand.
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Success story utilities.
    Stories {
        /// Selected stories subcommand.
        #[command(subcommand)]
        command: ImportCommand,
    },
}

/// Config file selection shared by every command.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file path (defaults to `PAWHAVEN_CONFIG`, then `pawhaven.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a PawHaven configuration file.
    Validate(ConfigArgs),
}

/// Staff subcommands.
#[derive(Subcommand, Debug)]
enum StaffCommand {
    /// Create a staff account, or promote and re-key an existing one.
    Create(StaffCreateCommand),
}

/// Arguments for `staff create`.
#[derive(Args, Debug)]
struct StaffCreateCommand {
    /// Account username.
    #[arg(long)]
    username: String,
    /// Account email address.
    #[arg(long)]
    email: String,
    /// Environment variable holding the password.
    #[arg(long, value_name = "VAR", default_value = DEFAULT_PASSWORD_ENV)]
    password_env: String,
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
}

/// Import subcommands.
#[derive(Subcommand, Debug)]
enum ImportCommand {
    /// Bulk-create records from a JSON array.
    Import(ImportArgs),
}

/// Arguments for an import.
#[derive(Args, Debug)]
struct ImportArgs {
    /// JSON file holding an array of records.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a display message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self { message }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;
    match cli.command {
        Commands::Serve(args) => command_serve(args).await,
        Commands::Config { command: ConfigCommand::Validate(args) } => {
            command_config_validate(&args)
        }
        Commands::Staff { command: StaffCommand::Create(command) } => {
            command_staff_create(&command)
        }
        Commands::Pets { command: ImportCommand::Import(args) } => {
            command_import(&args, RecordKind::Pets)
        }
        Commands::Stories { command: ImportCommand::Import(args) } => {
            command_import(&args, RecordKind::Stories)
        }
    }
}

/// Installs the fmt subscriber on stderr.
fn init_tracing(level: Option<&str>) -> CliResult<()> {
    let filter = log_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::new(format!("logging init failed: {err}")))
}

/// Resolves the log filter: the flag, then `RUST_LOG`, then the default.
fn log_filter(level: Option<&str>) -> CliResult<EnvFilter> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level),
        None => {
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
        }
    };
    filter.map_err(|err| CliError::new(format!("invalid log filter: {err}")))
}

// ============================================================================
// SECTION: Serve and Config
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(args: ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(&args)?;
    let server = tokio::task::spawn_blocking(move || ShelterServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config validate`.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    write_stdout_line(&config_summary(&config))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates configuration.
fn load_config(args: &ConfigArgs) -> CliResult<PawhavenConfig> {
    PawhavenConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// One-line description of a valid configuration.
fn config_summary(config: &PawhavenConfig) -> String {
    let store = match config.store.store_type {
        StoreType::Memory => "memory".to_string(),
        StoreType::Sqlite => config.store.sqlite().map_or_else(
            || "sqlite".to_string(),
            |sqlite| format!("sqlite {}", sqlite.path.display()),
        ),
    };
    format!("config ok: bind {} store {store}", config.server.bind)
}

/// Opens the configured store behind the shelter service.
fn open_shelter(args: &ConfigArgs) -> CliResult<Shelter<SharedShelterStore>> {
    let config = load_config(args)?;
    let store =
        build_store(&config).map_err(|err| CliError::new(format!("store open failed: {err}")))?;
    Ok(Shelter::new(store, config.shelter_settings()))
}

// ============================================================================
// SECTION: Staff
// ============================================================================

/// Executes `staff create`.
fn command_staff_create(command: &StaffCreateCommand) -> CliResult<ExitCode> {
    let password = std::env::var(&command.password_env).map_err(|_| {
        CliError::new(format!("password env var {} is not set", command.password_env))
    })?;
    let shelter = open_shelter(&command.config)?;
    let (account, outcome) = create_staff(
        &shelter,
        &command.username,
        &command.email,
        &password,
        &Argon2PasswordHasher,
        SystemClock.now(),
    )?;
    write_stdout_line(&staff_message(&account, outcome))?;
    Ok(ExitCode::SUCCESS)
}

/// Creates or promotes a staff account.
fn create_staff<S: ShelterStore>(
    shelter: &Shelter<S>,
    username: &str,
    email: &str,
    password: &str,
    hasher: &dyn PasswordHasher,
    now: Timestamp,
) -> CliResult<(Account, StaffOutcome)> {
    let result = shelter.create_staff(username, email, password, hasher, now);
    result.map_err(|err| CliError::new(format!("staff create failed: {err}")))
}

/// Reports what `staff create` did.
fn staff_message(account: &Account, outcome: StaffOutcome) -> String {
    match outcome {
        StaffOutcome::Created => format!("created staff account {}", account.username),
        StaffOutcome::Promoted => format!("promoted {} to staff", account.username),
    }
}

// ============================================================================
// SECTION: Imports
// ============================================================================

/// Record type carried by an import file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    /// `PetForm` records.
    Pets,
    /// `StoryForm` records.
    Stories,
}

impl RecordKind {
    /// Plural label for messages.
    const fn label(self) -> &'static str {
        match self {
            Self::Pets => "pets",
            Self::Stories => "stories",
        }
    }
}

/// Executes `pets import` or `stories import`.
fn command_import(args: &ImportArgs, kind: RecordKind) -> CliResult<ExitCode> {
    let bytes = read_import_file(&args.file)?;
    let shelter = open_shelter(&args.config)?;
    let now = SystemClock.now();
    let count = match kind {
        RecordKind::Pets => import_pets(&shelter, &bytes, now)?,
        RecordKind::Stories => import_stories(&shelter, &bytes, now)?,
    };
    tracing::info!(count, kind = kind.label(), "import finished");
    write_stdout_line(&format!("imported {count} {}", kind.label()))?;
    Ok(ExitCode::SUCCESS)
}

/// Reads an import file up to [`MAX_IMPORT_BYTES`].
fn read_import_file(path: &Path) -> CliResult<Vec<u8>> {
    let file = File::open(path)
        .map_err(|err| CliError::new(format!("failed to open {}: {err}", path.display())))?;
    let mut bytes = Vec::new();
    file.take(MAX_IMPORT_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|err| CliError::new(format!("failed to read {}: {err}", path.display())))?;
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_IMPORT_BYTES {
        return Err(CliError::new(format!(
            "{} exceeds the {MAX_IMPORT_BYTES} byte import limit",
            path.display()
        )));
    }
    Ok(bytes)
}

/// Decodes a JSON array of records, naming the failing record on error.
fn parse_records<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
    kind: RecordKind,
) -> CliResult<Vec<T>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| CliError::new(format!("{} import: invalid json: {err}", kind.label())))?;
    let Value::Array(items) = value else {
        return Err(CliError::new(format!("{} import: expected a json array", kind.label())));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| {
                CliError::new(format!("{} import: record {index}: {err}", kind.label()))
            })
        })
        .collect()
}

/// Fails with every problem found, or succeeds when there are none.
fn reject_problems(kind: RecordKind, problems: &[String]) -> CliResult<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(CliError::new(format!(
            "{} import rejected, nothing written: {}",
            kind.label(),
            problems.join("; ")
        )))
    }
}

/// Validates and creates pets; returns how many were written.
fn import_pets<S: ShelterStore>(
    shelter: &Shelter<S>,
    bytes: &[u8],
    now: Timestamp,
) -> CliResult<usize> {
    let forms: Vec<PetForm> = parse_records(bytes, RecordKind::Pets)?;
    let problems: Vec<String> = forms
        .iter()
        .enumerate()
        .filter_map(|(index, form)| {
            form.validate().err().map(|errors| format!("record {index}: {errors}"))
        })
        .collect();
    reject_problems(RecordKind::Pets, &problems)?;
    for (index, form) in forms.iter().enumerate() {
        shelter
            .create_pet(form, now)
            .map_err(|err| CliError::new(format!("pets import: record {index}: {err}")))?;
    }
    Ok(forms.len())
}

/// Validates and creates success stories; linked pets must already exist.
fn import_stories<S: ShelterStore>(
    shelter: &Shelter<S>,
    bytes: &[u8],
    now: Timestamp,
) -> CliResult<usize> {
    let forms: Vec<StoryForm> = parse_records(bytes, RecordKind::Stories)?;
    let mut problems = Vec::new();
    for (index, form) in forms.iter().enumerate() {
        match form.validate() {
            Err(errors) => problems.push(format!("record {index}: {errors}")),
            Ok(story) => {
                let Some(pet_id) = story.pet_id else { continue };
                let known = shelter
                    .store()
                    .pet(pet_id)
                    .map_err(|err| CliError::new(format!("stories import: {err}")))?;
                if known.is_none() {
                    problems.push(format!("record {index}: pet {pet_id} does not exist"));
                }
            }
        }
    }
    reject_problems(RecordKind::Stories, &problems)?;
    for (index, form) in forms.iter().enumerate() {
        shelter
            .create_story(form, now)
            .map_err(|err| CliError::new(format!("stories import: record {index}: {err}")))?;
    }
    Ok(forms.len())
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}
