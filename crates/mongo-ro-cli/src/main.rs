use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;

/// How long shutdown waits for blocking work left on the runtime.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "mongo-ro", version, about = "Read-only MongoDB tools over MCP")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve(commands::serve::ServeArgs),

    /// List the tools the server exposes. Needs no database.
    Tools {
        /// Print each tool's input schema.
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // stdout belongs to the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        match cli.cmd {
            Command::Serve(args) => commands::serve::execute(args).await,
            Command::Tools { verbose } => commands::tools::list(verbose),
        }
    });

    // A blocked stdio read or write must not hold the process open after shutdown.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
