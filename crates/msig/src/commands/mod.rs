use {
    anyhow::{anyhow, Result},
    msig::{
        cli::{Cli, Commands},
        config::Config,
        context::Context,
    },
    multisig_sdk::inspect::inspect_message,
    solana_sdk::{instruction::Instruction, pubkey::Pubkey},
};

pub mod action;
pub mod approve;
pub mod config;
pub mod execute;
pub mod multisig;
pub mod tx;

pub async fn process(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        url,
        keypair,
        command,
        ..
    } = cli;
    match command {
        Commands::NewConfig => config::new_config(&config_path).await,
        command => {
            let cfg = Config::load(&config_path)
                .await?
                .with_overrides(url, keypair);
            dispatch(&Context::new(cfg)?, command).await
        }
    }
}

async fn dispatch(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Multisig { command } => multisig::process(ctx, command).await,
        Commands::Tx { command } => tx::process(ctx, command).await,
        Commands::Approve {
            index,
            target,
            owner,
        } => approve::approve(ctx, &target.multisig, index, owner).await,
        Commands::ApproveAll { target } => approve::approve_all(ctx, &target.multisig).await,
        Commands::Execute { index, target } => execute::execute(ctx, &target.multisig, index).await,
        Commands::Action { command } => action::process(ctx, command).await,
        Commands::NewConfig => Err(anyhow!("new-config does not use an rpc context")),
    }
}

/// proposes `instructions` on the multisig created with `base` and logs where it landed
pub async fn propose(
    ctx: &Context,
    base: &str,
    instructions: Vec<Instruction>,
    index: Option<u32>,
) -> Result<()> {
    let multisig = ctx.multisig(base)?;
    let inspection = inspect_message(&instructions, &ctx.client.payer(), &ctx.config.cluster);
    let handle = ctx
        .client
        .create_transaction(&multisig, instructions, index)
        .await?;
    ctx.submit(
        &format!("create_transaction(index={})", handle.index),
        handle.transaction,
    )
    .await?;
    log::info!(
        "proposed transaction {} at {} on multisig {multisig}",
        handle.index,
        handle.address
    );
    log::info!("inspect: {}", inspection.url);
    Ok(())
}

pub fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

pub fn format_keys(keys: &[Pubkey]) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod test {
    use {super::*, clap::Parser};

    #[tokio::test]
    async fn test_new_config_skips_context() {
        let path =
            std::env::temp_dir().join(format!("msig-new-config-{}.yaml", std::process::id()));
        let path = path.to_str().unwrap();
        // an unreadable keypair would fail any command that builds a context
        let cli = Cli::try_parse_from([
            "msig",
            "--config",
            path,
            "--keypair",
            "/nonexistent",
            "new-config",
        ])
        .unwrap();
        process(cli).await.unwrap();
        assert_eq!(Config::load(path).await.unwrap(), Config::default());

        let cli = Cli::try_parse_from([
            "msig",
            "--config",
            path,
            "--keypair",
            "/nonexistent",
            "approve-all",
            "--multisig",
            "treasury",
        ])
        .unwrap();
        assert!(process(cli)
            .await
            .unwrap_err()
            .to_string()
            .contains("failed to read keypair"));
        tokio::fs::remove_file(path).await.unwrap();
    }
}
