//! reel-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `REEL__*` environment variables, seeds the in-memory stores and serves
//! one service over HTTP.
//!
//! ```
//! reel-server --service users
//! REEL__ORACLE__BASE_URL=http://localhost:8001 reel-server --service movies
//! ```
//!
//! # Token generation
//!
//! Login is not part of these services. To mint a token for local testing:
//!
//! ```
//! cargo run -p reel-server -- --issue-token 7 --email ana@example.com
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use reel_auth::{TokenIssuer, issue::DEFAULT_TTL_HOURS};
use reel_core::subject::SubjectId;
use reel_server::{ServerConfig, Service, store::Seed};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Reel movie, user and subscription services")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Which service to run.
  #[arg(short, long, value_enum, default_value = "movies")]
  service: Service,

  /// Print a signed token for this user id and exit.
  #[arg(long, value_name = "USER_ID")]
  issue_token: Option<u64>,

  /// Email claim for `--issue-token`.
  #[arg(long, default_value = "dev@example.com")]
  email: String,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("REEL").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  tracing::debug!(config = ?server_cfg, "configuration loaded");

  // Helper mode: mint a token and exit.
  if let Some(user_id) = cli.issue_token {
    let user_id = SubjectId::new(user_id).context("user id must be at least 1")?;
    let secret = server_cfg.jwt_secret.as_deref().unwrap_or_default();
    let token = TokenIssuer::new(secret)
      .context("jwt_secret is not configured")?
      .issue(user_id, &cli.email, chrono::Duration::hours(DEFAULT_TTL_HOURS))
      .context("failed to sign token")?;
    println!("{token}");
    return Ok(());
  }

  let seed = match &server_cfg.seed_path {
    Some(path) => Seed::load(path).context("failed to load seed data")?,
    None => {
      tracing::warn!("no seed_path configured, starting with empty stores");
      Seed::default()
    }
  };

  let app = reel_server::app(cli.service, &server_cfg, seed)
    .with_context(|| format!("failed to configure the {:?} service", cli.service))?;
  let address = server_cfg.address(cli.service);

  tracing::info!(service = ?cli.service, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
