use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dogmail::commands::{run_animate, run_serve, run_treat, ServeArgs};
use dogmail::logging::init_logging;
use dogmail_core::animation::SequenceVariant;
use dogmail_core::utils::config::Config;

#[derive(Parser)]
#[command(name = "dogmail")]
#[command(about = "DogMail - give the dog a treat by signing up", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the submission endpoint
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory for the emails.jsonl file
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Keep submissions in memory only
        #[arg(long)]
        memory: bool,
    },

    /// Submit an email and watch the treat sequence
    Treat {
        email: String,

        /// Base URL of the server
        #[arg(long)]
        api_url: Option<String>,

        /// snack or feast
        #[arg(long)]
        variant: Option<SequenceVariant>,
    },

    /// Play the treat sequence locally
    Animate {
        #[arg(long)]
        variant: Option<SequenceVariant>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default()?;

    match cli.command {
        Command::Serve { port, data_dir, memory } => {
            run_serve(config, ServeArgs { port, data_dir, memory }).await
        }
        Command::Treat { email, api_url, variant } => run_treat(config, email, api_url, variant).await,
        Command::Animate { variant } => run_animate(config, variant).await,
    }
}
