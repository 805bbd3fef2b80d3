use anyhow::Result;
use clap::Parser;
use squad2_editor::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("squad2_editor=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
