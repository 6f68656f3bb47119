//! Dojo API server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `DOJO_*` environment variables, opens the SQLite store and serves the API.
//!
//! # Bootstrapping
//!
//! The first admin account is created from the command line:
//!
//! ```text
//! cargo run -p dojo-api --bin server -- create-staff --username admin --role admin
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dojo_api::{AppState, ServerConfig, auth::hash_password};
use dojo_core::{
  principal::{NewStaff, Role},
  store::AcademyStore,
};
use dojo_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Dojo academy API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Create a staff account; the password is read from stdin.
  CreateStaff {
    #[arg(long)]
    username:     String,
    #[arg(long)]
    display_name: Option<String>,
    /// admin, teacher or receptionist.
    #[arg(long)]
    role:         Role,
    #[arg(long)]
    teacher_id:   Option<Uuid>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => {
      let password = read_password()?;
      println!("{}", hash_password(&password)?);
      Ok(())
    }
    Command::CreateStaff { username, display_name, role, teacher_id } => {
      let cfg = load_config(&cli.config)?;
      let store = open_store(&cfg).await?;
      let password = read_password()?;
      let staff = store
        .add_staff(NewStaff {
          display_name: display_name.unwrap_or_else(|| username.clone()),
          username,
          password_hash: hash_password(&password)?,
          role,
          teacher_id,
        })
        .await
        .context("failed to create staff account")?;
      println!("{} ({}) {}", staff.username, staff.role.as_str(), staff.staff_id);
      Ok(())
    }
    Command::Serve => serve(load_config(&cli.config)?).await,
  }
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  if cfg.auth.jwt_secret.is_empty() {
    anyhow::bail!("auth.jwt_secret must be set (or DOJO_AUTH__JWT_SECRET)");
  }

  let store = open_store(&cfg).await?;
  let address = cfg.address();
  let app = dojo_api::router(AppState::new(store, cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("DOJO")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = expand_tilde(&cfg.store_path);
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_string();
  if password.is_empty() {
    anyhow::bail!("password must not be empty");
  }
  Ok(password)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
