mod admit;

use anyhow::Context as _;
use clap::Parser;
use sriov_defaults::{MutatingAdmissionHook, PodDefaultNetworkHook};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Sets the default Multus network on new pods")]
struct Args {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Admit one AdmissionReview and print the response review
    Review(ReviewArgs),
    /// Print the resource the hook registers under
    Resource,
}

#[derive(clap::Args, Debug)]
struct ReviewArgs {
    /// File holding the AdmissionReview; stdin when omitted
    #[arg(long, short)]
    input: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level {}", level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn read_input(path: Option<&PathBuf>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

async fn review(args: ReviewArgs) -> anyhow::Result<()> {
    let input = read_input(args.input.as_ref()).await?;
    let hook = PodDefaultNetworkHook::new();
    hook.initialize()?;
    let resp = admit::review(&hook, &input)?;
    let mut out = admit::render(&resp, args.pretty)?;
    out.push('\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(out.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;
    tracing::info!("Starting webhook tool");

    match args.command {
        Command::Review(review_args) => review(review_args).await,
        Command::Resource => {
            let (gvr, singular) = PodDefaultNetworkHook::new().mutating_resource();
            println!("{} (singular: {})", gvr, singular);
            Ok(())
        }
    }
}
