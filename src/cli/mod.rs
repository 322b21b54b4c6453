use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod init;
pub mod job;
pub mod migrate;
pub mod serve;
pub mod user;

use job::JobId;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Create the database and its schema
    Init {},
    /// Apply pending db schema migrations
    Migrate {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Add or update a user in the directory
    User {
        #[arg(long)]
        id: String,
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        email: String,
    },
    /// Run a periodic job once
    Job {
        #[arg(long, value_enum)]
        id: JobId,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            init::run(&config.db_path).await?;
        }
        Some(Command::Migrate {}) => {
            migrate::run(&config.db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::User {
            id,
            first_name,
            last_name,
            email,
        }) => {
            user::run(&config.db_path, id, first_name, last_name, email).await?;
        }
        Some(Command::Job { id }) => {
            job::run(id, config).await?;
        }
        None => {}
    }

    Ok(())
}
