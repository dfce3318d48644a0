mod commands;
mod config;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use habitica_api::{Error, Habitica, Method};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "habitica")]
#[command(about = "Send requests to the Habitica API")]
struct Cli {
    /// API origin, e.g. https://habitica.com
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// User id sent in x-api-user
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// API key sent in x-api-key
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Client identifier sent in x-client
    #[arg(long, global = true)]
    platform: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get(commands::request::RequestArgs),
    /// Send a POST request
    Post(commands::request::RequestArgs),
    /// Send a PUT request
    Put(commands::request::RequestArgs),
    /// Send a DELETE request
    Delete(commands::request::RequestArgs),
    /// Register a new local account
    Register(commands::auth::RegisterArgs),
    /// Log in with a username or email
    Login(commands::auth::LoginArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("habitica=info".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(Error::Api(api)) => eprintln!("{}", api),
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env().merge(Settings {
        endpoint: cli.endpoint,
        user_id: cli.user_id,
        api_key: cli.api_key,
        platform: cli.platform,
    });
    let api = Habitica::new(settings.to_update())?;

    match &cli.command {
        Commands::Get(args) => commands::request::run(&api, Method::GET, args).await,
        Commands::Post(args) => commands::request::run(&api, Method::POST, args).await,
        Commands::Put(args) => commands::request::run(&api, Method::PUT, args).await,
        Commands::Delete(args) => commands::request::run(&api, Method::DELETE, args).await,
        Commands::Register(args) => commands::auth::register(&api, args).await,
        Commands::Login(args) => commands::auth::login(&api, args).await,
    }
}
