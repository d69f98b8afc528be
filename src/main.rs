use std::{path::Path, sync::Arc};

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use explorer_server::{
    AccessList, ExplorerHandler, ExplorerServer, GracefulShutdown, HttpServer, ServerSettings,
    UpstreamAdapter,
    config::{ExplorerConfig, ServerConfigValidator, load_config},
    core::Renderer,
    tracing_setup,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(short, long, default_value = "explorer.toml")]
    config: String,

    /// Log filter, overrides the configured level (RUST_LOG still wins)
    #[clap(long)]
    log_level: Option<String>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[clap(short, long, default_value = "explorer.toml")]
        config: String,
    },
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "explorer.toml")]
        config: String,
    },
    /// Start the explorer server (default)
    Serve {
        /// Configuration file to use
        #[clap(short, long, default_value = "explorer.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        Some(Commands::Validate { config }) => validate_config_command(&config).await,
        Some(Commands::Init { config }) => init_config_command(&config).await,
        Some(Commands::Serve { config }) => serve(&config, args.log_level.as_deref()).await,
        None => serve(&args.config, args.log_level.as_deref()).await,
    }
}

async fn serve(config_path: &str, log_level: Option<&str>) -> Result<()> {
    let config: ExplorerConfig = load_config(config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    ServerConfigValidator::validate(&config)
        .map_err(|e| eyre!("Invalid configuration in {config_path}: {e}"))?;

    let level = log_level.unwrap_or(&config.logging.level);
    tracing_setup::init_tracing(level, config.logging.json)
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    let upstream = config
        .upstream
        .as_ref()
        .ok_or_else(|| eyre!("No [upstream] section in {config_path}; nothing to query"))?;
    let backend = Arc::new(
        UpstreamAdapter::new(upstream).context("Failed to create upstream adapter")?,
    );

    let access_list = Arc::new(AccessList::load(config.access_list_path.clone()).await);
    match access_list.path() {
        Some(path) => tracing::info!(
            path = %path.display(),
            entries = access_list.permitted().len(),
            "access list enabled"
        ),
        None => tracing::info!("access list disabled, all peers permitted"),
    }

    let handler = Arc::new(ExplorerHandler::new(
        backend,
        access_list.clone(),
        Renderer::new(config.render_options()),
    ));

    let settings = ServerSettings::from_config(&config)?;
    let graceful_shutdown = GracefulShutdown::new();

    let signal_handler_shutdown = graceful_shutdown.clone();
    tokio::spawn(async move {
        signal_handler_shutdown.run_signal_handler().await;
    });

    tracing::info!(
        listen_addr = %settings.listen_addr,
        whitelist = settings.whitelist.len(),
        upstream = %upstream.url,
        "starting explorer server"
    );

    let server = ExplorerServer::new(handler, access_list, settings, graceful_shutdown.token());
    server.run().await.context("Server error")?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Validate configuration file and exit
async fn validate_config_command(config_path: &str) -> Result<()> {
    println!("🔍 Validating configuration file: {config_path}");

    if !Path::new(config_path).exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' not found");
        std::process::exit(1);
    }

    let config = match load_config(config_path).await {
        Ok(config) => {
            println!("✅ Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("❌ Configuration parsing failed:");
            eprintln!("   {e}");
            std::process::exit(1);
        }
    };

    match ServerConfigValidator::validate(&config) {
        Ok(()) => {
            println!("✅ Configuration validation: OK");
            println!();
            println!("📋 Configuration Summary:");
            println!("   • Listen Address: {}", config.listen_addr);
            println!(
                "   • Access List: {}",
                config
                    .access_list_path
                    .as_ref()
                    .map_or_else(|| "disabled".to_string(), |p| p.display().to_string())
            );
            println!("   • Whitelist Entries: {}", config.whitelist.len());
            println!(
                "   • Upstream: {}",
                config
                    .upstream
                    .as_ref()
                    .map_or("not configured", |u| u.url.as_str())
            );
            println!();
            println!("🎉 Configuration is valid and ready to use!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("{e}");
            println!();
            println!("💡 Common fixes:");
            println!("   • Ensure the upstream URL starts with http://");
            println!("   • Verify listen address format (e.g., '127.0.0.1:8888')");
            println!("   • Whitelist entries must be plain IP addresses");
            std::process::exit(1);
        }
    }
}

/// Initialize a new configuration file
async fn init_config_command(config_path: &str) -> Result<()> {
    let path = Path::new(config_path);
    if path.exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' already exists");
        std::process::exit(1);
    }

    let default_config = r#"# Explorer Server Configuration

# The address to listen on
listen_addr = "127.0.0.1:8888"

# File with one permitted peer address per line; omit to allow everyone
# access_list_path = "/etc/explorer/acl.txt"

# Peers accepted at the TCP level; empty accepts everyone
whitelist = []

restart_interval_ms = 1000
acl_refresh_interval_ms = 5555
drain_timeout_ms = 5000

[amount]
decimal_places = 8

[native_asset]
id = 0
label = "Beam"

# Node-side explorer endpoint queries are relayed to
[upstream]
url = "http://127.0.0.1:10000"
timeout_secs = 30

[logging]
level = "info"
json = false
"#;

    tokio::fs::write(path, default_config)
        .await
        .context("Failed to write config file")?;
    println!("✅ Created default configuration at: {config_path}");
    println!("   Run 'explorer-server serve --config {config_path}' to start the server");
    Ok(())
}
