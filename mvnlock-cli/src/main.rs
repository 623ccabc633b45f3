use anyhow::Result;
use clap::Parser;
use mvnlock_core::repository::normalize_repositories;
use mvnlock_core::LockFileConverter;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mvnlock",
    about = "convert a resolver's raw dependency tree into a v2 lock file",
    version,
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// Path to the resolver-generated dependency tree
    #[arg(long)]
    json: Option<PathBuf>,

    /// Where to write the lock file (defaults to stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Repository URL, repeatable; order encodes priority
    #[arg(long = "repo")]
    repos: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing()?;

    let args = Cli::parse();

    let Some(json) = args.json else {
        eprintln!(
            "Path to the resolver-generated dependency tree is required. Add it using the `--json` flag"
        );
        process::exit(1);
    };

    let repositories = normalize_repositories(&args.repos);

    tracing::info!(tree = %json.display(), repositories = repositories.len(), "converting dependency tree");

    let lock = LockFileConverter::new(repositories, &json)?.convert()?;

    match args.output {
        Some(path) => {
            lock.write(&path)?;
            tracing::info!(output = %path.display(), "lock file written");
        }
        None => println!("{}", lock.to_json()?),
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
