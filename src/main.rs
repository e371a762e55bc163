use clap::Parser;

use cohortscope::{init_tracing, run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "cohortscope failed");
        std::process::exit(1);
    }
}
