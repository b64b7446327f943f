mod config;
mod error;
mod logging;
mod shell;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runtime::{McpToolSession, Orchestrator, ToolSession};

use config::Config;
use error::Result;

const DEMO_QUERY: &str = "What is the current time?";

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Answer queries with an LLM and the tools of an MCP server", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(
        short,
        long,
        env = "TETHER_CONFIG",
        default_value = "config/config.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one demonstration query and exit
    Demo,
    /// Start an interactive query loop
    Chat,
}

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let transport = config.transport()?;
    let settings = config.settings()?;
    let backend = config.backend()?;
    tracing::info!(transport = %transport.kind(), %backend, "starting");

    let session = McpToolSession::connect(transport).await?;
    let agent = Orchestrator::new(session, backend, settings);

    let result = match cli.command {
        Some(Commands::Demo) | None => cmd_demo(&agent).await,
        Some(Commands::Chat) => cmd_chat(&agent).await,
    };

    agent.into_session().close().await;
    result
}

async fn print_tools(agent: &Orchestrator<McpToolSession, runtime::OpenAiBackend>) -> Result<()> {
    let tools = agent
        .session()
        .list_tools()
        .await
        .map_err(runtime::Error::ToolDiscovery)?;
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    println!("\nConnected to server with tools: {names:?}");
    Ok(())
}

async fn cmd_demo(agent: &Orchestrator<McpToolSession, runtime::OpenAiBackend>) -> Result<()> {
    print_tools(agent).await?;
    let response = agent.process_query(DEMO_QUERY).await?;
    shell::write_response(io::stdout(), &response)?;
    Ok(())
}

async fn cmd_chat(agent: &Orchestrator<McpToolSession, runtime::OpenAiBackend>) -> Result<()> {
    print_tools(agent).await?;
    shell::chat_loop(agent, io::stdin().lock(), io::stdout()).await?;
    Ok(())
}
