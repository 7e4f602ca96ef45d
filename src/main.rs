//! Crawl-Ledger main entry point
//!
//! This is the administrative command-line interface over the crawl metadata store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crawl_ledger::config::{load_config, Config};
use crawl_ledger::output::{load_fleet_statistics, print_fleet_statistics, print_task_log};
use crawl_ledger::storage::{
    BcryptHasher, BlacklistPolicy, CrawlFleetRegistry, CredentialStore, NewCrawlServer,
    SqliteCredentials, SqliteStore, TaskResultLog, TokenIssuer, WebsiteRegistry,
};
use crawl_ledger::{submit_website, Submission};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawl-Ledger: metadata store for a distributed crawl and search service
///
/// Manages the website registry, the origin blacklist, the crawl server
/// fleet and the task result log.
#[derive(Parser, Debug)]
#[command(name = "crawl-ledger")]
#[command(version)]
#[command(about = "Metadata store for a distributed crawl and search service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "ledger.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show per-server task statistics
    Stats,

    /// Show the task result log
    Log,

    /// List websites, most recently modified first
    Websites {
        /// Only list URLs starting with this prefix
        #[arg(long, default_value = "")]
        prefix: String,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 50)]
        per_page: u32,
    },

    /// List websites due for a re-crawl
    Stale,

    /// Print a random website
    Random,

    /// Submit a discovered URL to the registry
    Submit {
        url: String,

        #[arg(long)]
        ip: Option<String>,

        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Delete a website
    Delete { id: i64 },

    /// Manage the origin blacklist
    #[command(subcommand)]
    Blacklist(BlacklistCommand),

    /// Manage the crawl server fleet
    #[command(subcommand)]
    Servers(ServerCommand),

    /// Manage API tokens
    #[command(subcommand)]
    Tokens(TokenCommand),

    /// Manage administrator accounts
    #[command(subcommand)]
    Admins(AdminCommand),
}

#[derive(Subcommand, Debug)]
enum BlacklistCommand {
    List,
    Add { url: String },
    Remove { id: i64 },
}

#[derive(Subcommand, Debug)]
enum ServerCommand {
    List,
    Add {
        #[arg(long)]
        url: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        slots: u32,
        /// Callback token; a random one is generated if omitted
        #[arg(long)]
        token: Option<String>,
    },
    Remove {
        id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        url: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        slots: u32,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    List,
    Issue { description: String },
    Revoke { token: String },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Create an account; the password is stored bcrypt-hashed
    Add {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Check a username/password pair
    Check {
        username: String,
        #[arg(long)]
        password: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::debug!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let store = SqliteStore::from_config(&config.database)
        .with_context(|| format!("failed to open database {}", config.database.path))?;

    run(cli.command, &config, &store)?;
    Ok(())
}

/// Dispatches a subcommand against an open store
fn run(command: Command, config: &Config, store: &SqliteStore) -> crawl_ledger::Result<()> {
    match command {
        Command::Stats => {
            let stats = load_fleet_statistics(store)?;
            print_fleet_statistics(&stats);
        }
        Command::Log => {
            let results = store.list_results()?;
            print_task_log(&results);
        }
        Command::Websites {
            prefix,
            page,
            per_page,
        } => {
            for website in store.list_websites(per_page, page, &prefix)? {
                println!(
                    "{:>8}  {}  {}",
                    website.id,
                    website.last_modified.to_rfc3339(),
                    website.url
                );
            }
        }
        Command::Stale => {
            let interval = config.crawl.recrawl_interval();
            let due = store.websites_older_than(interval)?;
            tracing::info!(
                "{} websites not crawled in the last {} hours",
                due.len(),
                config.crawl.recrawl_interval_hours
            );
            for id in due {
                println!("{}", id);
            }
        }
        Command::Random => match store.random_website_id()? {
            Some(id) => {
                if let Some(website) = store.website_by_id(id)? {
                    println!("{:>8}  {}", website.id, website.url);
                }
            }
            None => println!("Registry is empty"),
        },
        Command::Submit {
            url,
            ip,
            user_agent,
        } => match submit_website(store, &url, ip.as_deref(), user_agent.as_deref())? {
            Submission::Inserted(id) => println!("Registered {} as website {}", url, id),
            Submission::AlreadyCovered(id) => println!("{} is already covered by website {}", url, id),
            Submission::Blacklisted => println!("{} is blacklisted", url),
        },
        Command::Delete { id } => {
            store.delete_website(id)?;
            println!("Deleted website {}", id);
        }
        Command::Blacklist(command) => handle_blacklist(store, command)?,
        Command::Servers(command) => handle_servers(store, command)?,
        Command::Tokens(command) => handle_tokens(store, command)?,
        Command::Admins(command) => handle_admins(store, command)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_ledger=info,warn"),
            1 => EnvFilter::new("crawl_ledger=debug,info"),
            2 => EnvFilter::new("crawl_ledger=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_blacklist(store: &SqliteStore, command: BlacklistCommand) -> crawl_ledger::Result<()> {
    match command {
        BlacklistCommand::List => {
            for entry in store.list_blacklist()? {
                println!("{:>6}  {}", entry.id, entry.origin);
            }
        }
        BlacklistCommand::Add { url } => {
            let id = store.add_blacklist(&url)?;
            println!("Blacklisted origin of {} (entry {})", url, id);
        }
        BlacklistCommand::Remove { id } => {
            store.remove_blacklist(id)?;
            println!("Removed blacklist entry {}", id);
        }
    }
    Ok(())
}

fn handle_servers(store: &SqliteStore, command: ServerCommand) -> crawl_ledger::Result<()> {
    match command {
        ServerCommand::List => {
            for server in store.list_servers()? {
                println!(
                    "{:>6}  {:<24} slots={:<4} {}",
                    server.id, server.name, server.slots, server.url
                );
            }
        }
        ServerCommand::Add {
            url,
            name,
            slots,
            token,
        } => {
            let token = token.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let id = store.register_server(&NewCrawlServer {
                url,
                name,
                slots,
                token: token.clone(),
            })?;
            println!("Registered crawl server {} with token {}", id, token);
        }
        ServerCommand::Remove { id } => {
            store.unregister_server(id)?;
            println!("Unregistered crawl server {}", id);
        }
        ServerCommand::Update {
            id,
            url,
            name,
            slots,
        } => {
            store.update_server(id, &url, &name, slots)?;
            println!("Updated crawl server {}", id);
        }
    }
    Ok(())
}

fn handle_tokens(store: &SqliteStore, command: TokenCommand) -> crawl_ledger::Result<()> {
    match command {
        TokenCommand::List => {
            for token in store.list_tokens()? {
                println!("{}  {}", token.token, token.description);
            }
        }
        TokenCommand::Issue { description } => {
            println!("{}", store.issue_token(&description)?);
        }
        TokenCommand::Revoke { token } => {
            store.revoke_token(&token)?;
            println!("Revoked {}", token);
        }
    }
    Ok(())
}

fn handle_admins(store: &SqliteStore, command: AdminCommand) -> crawl_ledger::Result<()> {
    let accounts = SqliteCredentials::new(store.clone(), BcryptHasher::default());
    match command {
        AdminCommand::Add { username, password } => {
            accounts.create_account(&username, &password)?;
            println!("Created administrator {}", username);
        }
        AdminCommand::Check { username, password } => {
            if accounts.verify_password(&username, &password)? {
                println!("Credentials valid");
            } else {
                println!("Credentials invalid");
            }
        }
    }
    Ok(())
}
