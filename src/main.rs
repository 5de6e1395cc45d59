use clap::Parser;
use cobj_portal::{config, create_router, telemetry, CachedCrmClient, CrmClient};
use color_eyre::Result;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cobj-portal")]
#[command(about = "View and create HubSpot custom object records from a browser")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./cobj-portal.yaml, then $XDG_CONFIG_HOME/cobj-portal/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Address to listen on
  #[arg(short, long)]
  bind: Option<SocketAddr>,

  /// Directory of static assets
  #[arg(long)]
  static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over the config file
  if let Some(bind) = args.bind {
    config.server.bind = bind;
  }
  if let Some(static_dir) = args.static_dir {
    config.server.static_dir = static_dir;
  }

  let _log_guard = telemetry::init(&config.logging)?;

  // No token, no server
  let token = config::Config::get_access_token()?;

  let client = CrmClient::new(&config.crm, &token)?;
  let crm = CachedCrmClient::new(client);
  let router = create_router(crm, Some(config.server.static_dir.as_path()));

  let listener = tokio::net::TcpListener::bind(config.server.bind).await?;
  tracing::info!(
    object_type_id = %config.crm.object_type_id,
    "Listening on http://{}",
    listener.local_addr()?
  );

  axum::serve(listener, router).await?;

  Ok(())
}
