//! `rolodex` - HTTP server and CLI for the phonebook and blog list
//!
//! `rolodex serve` runs the API; the other commands work on the same store
//! directly.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use rolodex::cli::{unquote, BlogsCommand, Cli, Command, ConfigCommand, PhonebookCommand};
use rolodex::config::Backend;
use rolodex::{
    init_logging, serve, stats, Blog, Config, MemoryStore, Person, RecordStore, Resource,
    SqliteStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(serve_cmd) => {
            let mut config = load_config(cli.config)?;
            serve_cmd.apply(&mut config);
            config.validate()?;
            handle_serve(&config).await
        }
        Command::Phonebook(phonebook_cmd) => {
            let config = load_config(cli.config)?;
            match config.storage.backend {
                Backend::Sqlite => {
                    let store = SqliteStore::open(config.database_path())?;
                    handle_phonebook(&store, phonebook_cmd).await
                }
                Backend::Memory => {
                    warn!("Memory backend keeps nothing between runs");
                    handle_phonebook(&MemoryStore::new(), phonebook_cmd).await
                }
            }
        }
        Command::Blogs(blogs_cmd) => {
            let config = load_config(cli.config)?;
            match config.storage.backend {
                Backend::Sqlite => {
                    let store = SqliteStore::open(config.database_path())?;
                    handle_blogs(&store, &blogs_cmd).await
                }
                Backend::Memory => {
                    warn!("Memory backend keeps nothing between runs");
                    handle_blogs(&MemoryStore::new(), &blogs_cmd).await
                }
            }
        }
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

async fn handle_serve(config: &Config) -> anyhow::Result<()> {
    info!(
        "Starting rolodex on {}:{} with {} storage",
        config.server.host, config.server.port, config.storage.backend
    );
    match config.storage.backend {
        Backend::Sqlite => serve(SqliteStore::open(config.database_path())?, &config.server).await?,
        Backend::Memory => serve(MemoryStore::new(), &config.server).await?,
    }
    Ok(())
}

async fn handle_phonebook<S: RecordStore>(store: &S, cmd: PhonebookCommand) -> anyhow::Result<()> {
    match cmd {
        PhonebookCommand::List => {
            println!("phonebook:");
            for record in store.find_all::<Person>().await? {
                println!("{} {}", record.fields.name, record.fields.number);
            }
        }
        PhonebookCommand::Add { name, number } => {
            let person = Person::new(unquote(&name), number);
            person.validate()?;
            if store.find_by_unique_key::<Person>(&person.name).await?.is_some() {
                bail!("name must be unique: {} is already in the phonebook", person.name);
            }

            let record = store.insert(person).await?;
            println!(
                "added {} {} to phonebook",
                record.fields.name, record.fields.number
            );
        }
    }
    Ok(())
}

async fn handle_blogs<S: RecordStore>(store: &S, cmd: &BlogsCommand) -> anyhow::Result<()> {
    match cmd {
        BlogsCommand::Stats { json } => {
            let blogs: Vec<Blog> = store
                .find_all::<Blog>()
                .await?
                .into_iter()
                .map(|record| record.fields)
                .collect();
            let summary = stats::summarize(&blogs);

            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("Blog statistics");
            println!("===============");
            println!("Blogs:        {}", summary.blogs);
            println!("Total likes:  {}", summary.total_likes);
            match &summary.favorite_blog {
                Some(blog) => println!(
                    "Favorite:     {} by {} ({} likes)",
                    blog.title, blog.author, blog.likes
                ),
                None => println!("Favorite:     -"),
            }
            match &summary.most_blogs {
                Some(top) => println!("Most blogs:   {} ({})", top.author, top.blogs),
                None => println!("Most blogs:   -"),
            }
            match &summary.most_likes {
                Some(top) => println!("Most likes:   {} ({})", top.author, top.likes),
                None => println!("Most likes:   -"),
            }
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!("  CORS:               {}", config.server.cors);
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
