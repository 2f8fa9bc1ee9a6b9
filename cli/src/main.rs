mod columns;
mod output;
mod run;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "decimate",
    version,
    about = "Reduce the number of points of signals and curves",
    long_about = "Generates decimated files from a delimited file for use in plotting tools.\n\
                  Every y column is decimated against the x column and written to its own file.\n\
                  Column numbering starts at 1.\n\n\
                  Examples:\n\n  \
                  decimate -x time -y \"x,y,z\" myFile.csv\n  \
                  decimate -x time -y \"*\" -d tab aFile.tsv"
)]
struct Cli {
    #[command(flatten)]
    opts: run::Opts,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.opts.silent { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    run::run(&cli.opts).await
}
