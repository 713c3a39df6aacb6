use std::{env, fs, path::PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use membrane_auth::keys::MIN_RSA_BITS;
use membrane_server::config::KeysConfig;
use membrane_server::{ServerBuilder, keygen};
use membrane_server::config::loader::{DEFAULT_CONFIG_PATH, load_config};

#[derive(Parser)]
#[command(name = "membrane-server")]
#[command(about = "Membrane single-sign-on server")]
#[command(version)]
struct Cli {
    /// Configuration file (falls back to MEMBRANE_CONFIG, then membrane.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Generate an RSA keypair in the key directory layout
    Keygen(KeygenArgs),
    /// Load and validate the configuration, then print it with secrets masked
    CheckConfig,
}

#[derive(Args)]
struct KeygenArgs {
    /// Key root laid out as DIR/server_*.pem and DIR/clients/ (defaults to the configured [keys] paths)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Generate a client application keypair instead of the server keypair
    #[arg(long)]
    app_id: Option<String>,
    /// File for the client private key (printed to stdout otherwise)
    #[arg(long, requires = "app_id")]
    private_key_out: Option<PathBuf>,
    /// RSA modulus size
    #[arg(long, default_value_t = MIN_RSA_BITS)]
    bits: usize,
}

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    CliArgument,
    EnvironmentVariable,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (MEMBRANE_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    if let Err(e) = dotenvy::dotenv()
        && !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("Warning: Failed to load .env file: {e}");
    }

    let cli = Cli::parse();

    membrane_server::observability::init_tracing();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(cli.config).await,
        Commands::Keygen(args) => run_keygen(cli.config, args),
        Commands::CheckConfig => {
            let (config_path, _) = resolve_config_path(cli.config);
            let cfg = load_config(Some(&config_path))?;
            print!("{}", cfg.to_redacted_toml()?);
            Ok(())
        }
    }
}

async fn serve(config: Option<String>) -> anyhow::Result<()> {
    let (config_path, source) = resolve_config_path(config);

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );
    membrane_server::observability::apply_logging_level(&cfg.logging.level);

    let server = ServerBuilder::new(cfg)
        .build()
        .context("server initialization failed")?;
    server.run().await
}

fn run_keygen(config: Option<String>, args: KeygenArgs) -> anyhow::Result<()> {
    let layout = match args.out {
        Some(root) => KeysConfig::rooted_at(root),
        None => {
            let (config_path, _) = resolve_config_path(config);
            load_config(Some(&config_path))
                .context("failed to load [keys] from the configuration, pass --out")?
                .keys
        }
    };

    match args.app_id {
        None => {
            let paths = keygen::write_server_keypair(&layout, args.bits)?;
            println!("{}", paths.private_key.display());
            println!("{}", paths.public_key.display());
        }
        Some(app_id) => {
            if let Some(path) = &args.private_key_out
                && path.starts_with(&layout.directory)
            {
                anyhow::bail!(
                    "refusing to write a private key into the client key directory {}",
                    layout.directory.display()
                );
            }

            let client = keygen::register_client(&layout, &app_id, args.bits)?;
            eprintln!("{}", client.public_key_path.display());
            match args.private_key_out {
                Some(path) => {
                    fs::write(&path, client.private_key.as_str())
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("{}", path.display());
                }
                None => print!("{}", client.private_key.as_str()),
            }
        }
    }
    Ok(())
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: MEMBRANE_CONFIG
/// 3. Default: membrane.toml
fn resolve_config_path(cli: Option<String>) -> (String, ConfigSource) {
    if let Some(path) = cli {
        return (path, ConfigSource::CliArgument);
    }

    if let Ok(path) = env::var("MEMBRANE_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }

    (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default)
}
