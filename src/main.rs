//! stampy CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use stampy::{
    auth::Credentials,
    commands::{cmd_add_site, cmd_chat, cmd_init, cmd_remove_site, print_sites},
    config::Config,
    error::{Error, Result},
    registry::SiteRegistry,
    storage::open_stores,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stampy")]
#[command(version, about = "Chat with any website", long_about = None)]
struct Cli {
    /// Base directory (defaults to ~/.stampy)
    #[arg(short, long, global = true)]
    base_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize stampy configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Sign in to the chat service
    Login {
        /// Username to record
        username: String,

        /// API key for the chat service (falls back to the configured env var)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show the signed-in user
    Whoami,

    /// Register a website and build its search index
    Add {
        /// Display name for the site
        name: String,

        /// Sitemap URL (e.g. https://example.com/sitemap.xml)
        sitemap_url: String,
    },

    /// List registered sites
    Sites {
        /// Output only site IDs (one per line, for scripting)
        #[arg(long)]
        ids_only: bool,
    },

    /// Remove a site and all its indexed content
    Remove {
        /// Site ID, hostname, or name
        site: String,
    },

    /// Chat about a registered site
    Chat {
        /// Site ID, hostname, or name
        site: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Handle completions command (doesn't need config)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "stampy", &mut std::io::stdout());
        return Ok(());
    }

    // Handle init command specially
    if let Commands::Init { force } = cli.command {
        let config = cmd_init(cli.base_dir, force)?;
        println!("✓ Initialized stampy at {:?}", config.paths.base_dir);
        println!("\nNext steps:");
        println!("  stampy login <username> --api-key <key>");
        println!("  stampy add \"My Docs\" https://example.com/sitemap.xml");
        println!("  stampy chat example.com");
        return Ok(());
    }

    // Load configuration and storage clients
    let config = Config::load_from(cli.base_dir)?;
    let (files, kv) = open_stores(&config.paths);
    let mut registry = SiteRegistry::load(kv)?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Login { username, api_key } => {
            let api_key = api_key
                .or_else(|| std::env::var(&config.chat.api_key_env).ok())
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    Error::Config(format!(
                        "Provide --api-key or set {}",
                        config.chat.api_key_env
                    ))
                })?;

            let credentials = Credentials { username, api_key };
            credentials.save(&config.paths.credentials_file)?;
            println!("✓ Signed in as {}", credentials.username);
        }

        Commands::Whoami => match Credentials::load(&config.paths.credentials_file)? {
            Some(credentials) => println!("{}", credentials.username),
            None => {
                eprintln!("Not signed in. Run 'stampy login <username>' first.");
                std::process::exit(1);
            }
        },

        Commands::Add { name, sitemap_url } => {
            let (site, stats) =
                cmd_add_site(&config, &files, &mut registry, &name, &sitemap_url).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&site)?);
            } else {
                println!("\n✓ Site '{}' registered", site.name);
                println!("  URLs in sitemap: {}", stats.urls_found);
                println!("  Pages indexed: {}", stats.pages_extracted);
                println!("  Pages skipped: {}", stats.pages_skipped);
            }
        }

        Commands::Sites { ids_only } => {
            let sites = registry.list();

            if ids_only {
                for site in sites {
                    println!("{}", site.id);
                }
            } else if cli.json {
                println!("{}", serde_json::to_string_pretty(sites)?);
            } else {
                print_sites(sites);
            }
        }

        Commands::Remove { site } => {
            if cmd_remove_site(&mut registry, &files, &site)? {
                println!("✓ Site '{}' removed", site);
            } else {
                println!("No site matching '{}'", site);
            }
        }

        Commands::Chat { site } => {
            cmd_chat(&config, &files, &registry, &site).await?;
        }
    }

    Ok(())
}
