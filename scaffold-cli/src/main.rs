//! Scaffold Command Line Interface
//!
//! Talks to the Scaffold API with a configured service identity, and signs
//! or checks request URLs offline.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scaffold_client::{ClientConfig, ParameterSet, Session, SessionState};
use scaffold_core::{url_codec, Canonicalizer, SignatureAlgorithm, Signer};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "scaffold", about = "Scaffold verification API client", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service identifier (overrides the configuration file)
    #[arg(long)]
    service_id: Option<String>,

    /// API key (overrides the configuration file)
    #[arg(long)]
    api_key: Option<String>,

    /// Server base URL
    #[arg(long)]
    server: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers
    Ping,
    /// Authenticate and print the session token
    Token,
    /// Ask the server to check this client's signature
    VerifySignature,
    /// Send a signed command and print the JSON response
    Call {
        /// Command path, e.g. background_check/check_result
        command: String,
        /// Parameters as name=value
        params: Vec<String>,
    },
    /// Sign a URL with a key
    SignUrl {
        /// URL to sign
        url: String,
        /// Signing key
        #[arg(short, long)]
        key: String,
        /// Sign with HMAC-SHA256 instead of HMAC-SHA1
        #[arg(long)]
        sha256: bool,
    },
    /// Verify a signed URL
    VerifyUrl {
        /// Signed URL
        url: String,
        /// Signing key
        #[arg(short, long)]
        key: String,
        /// Verify HMAC-SHA256 instead of HMAC-SHA1
        #[arg(long)]
        sha256: bool,
    },
    /// Print the canonical string a URL's signature covers
    Canonical {
        /// URL to canonicalize
        url: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("scaffold_client={},scaffold_core={}", log_level, log_level))
        .init();

    match &cli.command {
        Commands::Ping => {
            let config = load_config(&cli)?;
            let session = Session::unauthenticated(&config, http_transport(&config)?)?;
            if session.ping() {
                println!("{} is reachable", session.server());
            } else {
                bail!("{} did not answer the ping", session.server());
            }
        }

        Commands::Token => {
            let session = connect(&cli)?;
            match session.token() {
                Some(token) => println!("{}", token.expose_secret()),
                None => bail!("no token: session is {:?}", session.state()),
            }
        }

        Commands::VerifySignature => {
            let session = connect(&cli)?;
            if session.verify_signature()? {
                println!("Signature accepted");
            } else {
                bail!("server rejected the signature");
            }
        }

        Commands::Call { command, params } => {
            let session = connect(&cli)?;
            let params = parse_params(params)?;
            let result = session.call(command, params)?;

            println!("Status: {}", result.status);
            println!("{}", serde_json::to_string_pretty(&result.body)?);
            if !result.is_success() {
                std::process::exit(1);
            }
        }

        Commands::SignUrl { url, key, sha256 } => {
            let timestamp = chrono::Utc::now().timestamp();
            let signed = signer(*sha256)
                .sign_url(url, key.as_bytes(), timestamp)
                .context("Failed to sign URL")?;
            println!("{}", signed);
        }

        Commands::VerifyUrl { url, key, sha256 } => {
            let valid = signer(*sha256)
                .verify_url(url, key.as_bytes())
                .context("Failed to parse URL")?;
            println!("Valid: {}", if valid { "✓" } else { "✗" });
            if !valid {
                std::process::exit(1);
            }
        }

        Commands::Canonical { url } => {
            let (_, params) = url_codec::parse(url).context("Failed to parse URL")?;
            println!("{}", Canonicalizer::default().canonicalize(&params));
        }
    }

    Ok(())
}

/// Flags override the file; the file is skipped only when no `--config` is
/// given and both credential flags are.
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match (&cli.config, &cli.service_id, &cli.api_key) {
        (None, Some(service_id), Some(api_key)) => ClientConfig::new(service_id.as_str(), api_key.as_str()),
        (path, _, _) => {
            let path = path.clone().unwrap_or_else(ClientConfig::default_config_path);
            ClientConfig::load_from_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
    };

    if let Some(service_id) = &cli.service_id {
        config.service_id = service_id.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.api_key = secrecy::SecretString::new(api_key.clone());
    }
    if let Some(server) = &cli.server {
        config.server = server.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn http_transport(config: &ClientConfig) -> Result<std::sync::Arc<dyn scaffold_client::Transport>> {
    let transport = scaffold_client::HttpTransport::new(config).context("Failed to build HTTP client")?;
    Ok(std::sync::Arc::new(transport))
}

fn connect(cli: &Cli) -> Result<Session> {
    let config = load_config(cli)?;
    let session = Session::connect(config).context("Failed to authenticate")?;
    if session.state() != SessionState::Tokened {
        bail!("{} did not answer the ping; no token obtained", session.server());
    }
    info!(service_id = session.service_id(), "authenticated");
    Ok(session)
}

fn signer(sha256: bool) -> Signer {
    if sha256 {
        Signer::with_algorithm(SignatureAlgorithm::HmacSha256)
    } else {
        Signer::default()
    }
}

fn parse_params(raw: &[String]) -> Result<ParameterSet> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
            _ => bail!("parameter {:?} is not name=value", pair),
        })
        .collect()
}
