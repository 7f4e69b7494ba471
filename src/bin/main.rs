//! SchemaLens CLI - Discover database schemas as graphs
//!
//! Usage:
//!   schemalens serve [--host <host>] [--port <port>]
//!   schemalens discover <mysql|mongo> [--url <url>] [--database <name>] [--profile <id>]
//!   schemalens profiles list|add|remove
//!
//! Examples:
//!   schemalens discover mysql --url mysql://root:pw@localhost:3306/shop --no-save
//!   schemalens discover mongo --url mongodb://localhost:27017 --database blog --sample-cap 50
//!   schemalens profiles add "local shop" mysql mysql://root:pw@localhost/shop

use clap::{Parser, Subcommand, ValueEnum};
use schemalens::config::{DbKind, Settings};
use schemalens::discovery::{
    Discovery, DiscoveryDefaults, DiscoveryRequest, DiscoveryService, LiveConnector,
};
use schemalens::export::Exporter;
use schemalens::store::{NewProfile, ProfileStore};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "schemalens")]
#[command(about = "SchemaLens - Discover MySQL and MongoDB schemas as graphs")]
#[command(version)]
struct Cli {
    /// Path to a settings file (overrides the default search)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (defaults to settings)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to settings)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Discover a database schema and print it as JSON
    Discover {
        /// Database kind
        kind: KindArg,

        /// Connection string (falls back to the configured default)
        #[arg(short, long)]
        url: Option<String>,

        /// Database name
        #[arg(short, long)]
        database: Option<String>,

        /// Saved connection profile id
        #[arg(long)]
        profile: Option<i64>,

        /// Documents sampled per collection (mongo only)
        #[arg(long)]
        sample_cap: Option<usize>,

        /// Skip writing the export file
        #[arg(long)]
        no_save: bool,
    },

    /// Manage saved connection profiles
    Profiles {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List saved profiles
    List,
    /// Save a new profile
    Add {
        name: String,
        kind: KindArg,
        connection_string: String,
    },
    /// Delete a profile
    Remove { id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Mysql,
    Mongo,
}

impl From<KindArg> for DbKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Mysql => DbKind::Relational,
            KindArg::Mongo => DbKind::Document,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("schemalens=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve { host, port } => cmd_serve(settings, host, port),
        Commands::Discover {
            kind,
            url,
            database,
            profile,
            sample_cap,
            no_save,
        } => {
            let request = DiscoveryRequest {
                connection_string: url,
                database_name: database,
                save: !no_save,
                connection_profile_id: profile,
                sample_cap,
            };
            cmd_discover(settings, kind.into(), request)
        }
        Commands::Profiles { action } => cmd_profiles(settings, action),
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, schemalens::config::SettingsError> {
    match path {
        Some(path) => {
            let mut settings = Settings::from_file(path)?;
            settings.apply_env_overrides();
            Ok(settings)
        }
        None => Settings::load(),
    }
}

fn runtime() -> Option<tokio::runtime::Runtime> {
    match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => Some(rt),
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            None
        }
    }
}

fn open_store(settings: &Settings) -> Option<ProfileStore> {
    let path = match settings.store.resolved_path() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error locating profile store: {}", e);
            return None;
        }
    };
    match ProfileStore::open(&path) {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!("Error opening profile store '{}': {}", path.display(), e);
            None
        }
    }
}

#[cfg(feature = "server")]
fn cmd_serve(settings: Settings, host: Option<String>, port: Option<u16>) -> ExitCode {
    let Some(rt) = runtime() else {
        return ExitCode::FAILURE;
    };

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    match rt.block_on(schemalens::web::serve(settings, &host, port)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "server"))]
fn cmd_serve(_settings: Settings, _host: Option<String>, _port: Option<u16>) -> ExitCode {
    eprintln!("This build of schemalens was compiled without the `server` feature");
    ExitCode::FAILURE
}

fn cmd_discover(settings: Settings, kind: DbKind, request: DiscoveryRequest) -> ExitCode {
    let Some(store) = open_store(&settings) else {
        return ExitCode::FAILURE;
    };
    let defaults = match DiscoveryDefaults::from_settings(&settings) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error in default connections: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let discovery = Discovery::new(defaults, Arc::new(LiveConnector), Arc::new(store));
    let service = DiscoveryService::new(discovery, Exporter::new(&settings.export.dir));

    let Some(rt) = runtime() else {
        return ExitCode::FAILURE;
    };

    match rt.block_on(service.run(kind, &request)) {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing schema: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Discovery failed [{}]: {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_profiles(settings: Settings, action: ProfileAction) -> ExitCode {
    let Some(store) = open_store(&settings) else {
        return ExitCode::FAILURE;
    };

    let result = match action {
        ProfileAction::List => store.list().map(|profiles| {
            if profiles.is_empty() {
                println!("No saved profiles.");
            }
            for p in profiles {
                println!(
                    "{:>4}  {:<8} {:<24} {}",
                    p.id,
                    p.db_kind.as_str(),
                    p.name,
                    schemalens::config::redact(&p.connection_string)
                );
            }
        }),
        ProfileAction::Add {
            name,
            kind,
            connection_string,
        } => store
            .create(NewProfile {
                name,
                db_kind: kind.into(),
                connection_string,
            })
            .map(|p| println!("Saved profile {} ({})", p.id, p.name)),
        ProfileAction::Remove { id } => store.delete(id).map(|removed| {
            if removed {
                println!("Removed profile {}", id);
            } else {
                println!("No profile with id {}", id);
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Profile store error: {}", e);
            ExitCode::FAILURE
        }
    }
}
