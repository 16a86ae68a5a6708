use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agent_client::app::ClientConfig;
use agent_client::chat::ChatApi;
use agent_client::cli::{self, Cli, Commands, ConfigAction};
use agent_client::platform::AppPaths;

fn init_logging(debug: bool) -> Result<()> {
    let directive = if debug { "agent_client=debug" } else { "agent_client=warn" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
        config.validate()?;
    }

    info!(
        "Using base URL {:?} with {} ms timeout",
        config.base_url, config.timeout_ms
    );
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.debug)?;

    match &cli.command {
        Commands::Send {
            message,
            conversation,
            raw,
        } => {
            let api = ChatApi::from_config(&load_config(&cli)?)?;
            let reply = api
                .send(message, conversation.as_deref())
                .await
                .context("Chat request failed")?;

            if *raw {
                println!("{}", cli::pretty(&reply));
            } else {
                println!("{}", cli::render_reply(&reply));
            }
        }
        Commands::History { conversation, raw } => {
            let api = ChatApi::from_config(&load_config(&cli)?)?;
            let history = api
                .get_history(conversation)
                .await
                .context("History request failed")?;

            if *raw {
                println!("{}", cli::pretty(&history));
            } else {
                println!("{}", cli::render_history(&history));
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", load_config(&cli)?.to_toml()?);
            }
            ConfigAction::Init { force } => {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => {
                        let paths = AppPaths::new()?;
                        paths.ensure_dirs_exist()?;
                        paths.config_file()
                    }
                };

                if path.exists() && !*force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }

                ClientConfig::default().save(&path).await?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
