use {
    super::{format_keys, format_timestamp, propose},
    anyhow::{anyhow, Context as _, Result},
    msig::{cli::TxCommands, context::Context},
    multisig_sdk::{
        actions::{instructions_to_json, parse_instructions},
        filter::TransactionFilter,
        inspect::inspect_message,
        state::{Multisig, Transaction},
    },
    solana_sdk::pubkey::Pubkey,
};

pub async fn process(ctx: &Context, command: TxCommands) -> Result<()> {
    match command {
        TxCommands::New {
            file,
            target,
            index,
        } => {
            let json = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {file}"))?;
            let instructions = parse_instructions(&json)?;
            propose(ctx, &target.multisig, instructions, index).await
        }
        TxCommands::Show { index, target } => show(ctx, &target.multisig, index).await,
        TxCommands::All {
            target,
            index,
            proposer,
            executor,
        } => {
            let multisig = ctx.multisig(&target.multisig)?;
            let mut filter = TransactionFilter::new(multisig);
            filter.index = index;
            filter.proposer = proposer;
            filter.executor = executor;
            all(ctx, &multisig, &filter).await
        }
        TxCommands::Delete { index, target } => {
            let multisig = ctx.multisig(&target.multisig)?;
            let tx = ctx.client.close_transaction(&multisig, index)?;
            ctx.submit(&format!("close_transaction(index={index})"), tx)
                .await?;
            Ok(())
        }
    }
}

async fn load_multisig(ctx: &Context, multisig: &Pubkey) -> Result<Multisig> {
    ctx.client
        .fetch_multisig(multisig)
        .await?
        .ok_or_else(|| anyhow!("multisig {multisig} not found"))
}

async fn show(ctx: &Context, base: &str, index: u32) -> Result<()> {
    let address = ctx.multisig(base)?;
    let multisig = load_multisig(ctx, &address).await?;
    let tx = ctx
        .client
        .get_transaction(&address, index)
        .await?
        .ok_or_else(|| anyhow!("no transaction {index} on multisig {address}"))?;
    let instructions = tx.to_instructions();
    let inspection = inspect_message(&instructions, &ctx.client.payer(), &ctx.config.cluster);
    log::info!("{}", serde_json::to_string_pretty(&summary(&multisig, &tx))?);
    log::info!("instructions: {}", instructions_to_json(&instructions)?);
    log::info!("inspect: {}", inspection.url);
    Ok(())
}

async fn all(ctx: &Context, multisig: &Pubkey, filter: &TransactionFilter) -> Result<()> {
    let current = load_multisig(ctx, multisig).await?;
    let transactions = ctx.client.find_transactions(filter).await?;
    for (_, tx) in &transactions {
        log::info!("{}", serde_json::to_string(&summary(&current, tx))?);
    }
    log::info!("found {} transactions", transactions.len());
    Ok(())
}

fn summary(multisig: &Multisig, tx: &Transaction) -> serde_json::Value {
    serde_json::json!({
        "index": tx.index,
        "proposer": tx.proposer.to_string(),
        "approvals": tx.sig_count(),
        "threshold": multisig.threshold,
        "approvedBy": format_keys(&tx.approved_by(multisig)),
        "stale": tx.owner_set_seqno != multisig.owner_set_seqno,
        "executed": tx.executed_at.map(format_timestamp),
        "executor": tx.is_executed().then(|| tx.executor.to_string()),
        "created": format_timestamp(tx.created_at),
        "instructions": tx.instructions.len(),
    })
}
