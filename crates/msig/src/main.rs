mod commands;

use {
    anyhow::Result,
    clap::Parser,
    msig::{
        cli::Cli,
        logger::{init_log, rotate_log_file, LogOpts},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    rotate_log_file(&cli.log_file).await;
    init_log(LogOpts {
        level: cli.log_level.clone(),
        file: cli.log_file.clone(),
    })?;

    commands::process(cli).await
}
