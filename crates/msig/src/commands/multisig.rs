use {
    super::format_keys,
    anyhow::{anyhow, Result},
    msig::{cli::MultisigCommands, context::Context},
    multisig_sdk::{client::CreateMultisigArgs, state::Multisig},
    solana_sdk::pubkey::Pubkey,
};

pub async fn process(ctx: &Context, command: MultisigCommands) -> Result<()> {
    match command {
        MultisigCommands::New {
            keys,
            threshold,
            base,
        } => new_multisig(ctx, keys, threshold, base).await,
        MultisigCommands::Show { base } => show(ctx, &base).await,
        MultisigCommands::Owned => owned(ctx).await,
        MultisigCommands::SetOwners { target, keys } => {
            let multisig = ctx.multisig(&target.multisig)?;
            let handle = ctx.client.set_owners(&multisig, keys).await?;
            ctx.submit(
                &format!("set_owners proposal (index={})", handle.index),
                handle.transaction,
            )
            .await?;
            Ok(())
        }
        MultisigCommands::ChangeThreshold { target, threshold } => {
            let multisig = ctx.multisig(&target.multisig)?;
            let handle = ctx.client.change_threshold(&multisig, threshold).await?;
            ctx.submit(
                &format!("change_threshold proposal (index={})", handle.index),
                handle.transaction,
            )
            .await?;
            Ok(())
        }
    }
}

async fn new_multisig(
    ctx: &Context,
    owners: Vec<Pubkey>,
    threshold: u8,
    base: Option<String>,
) -> Result<()> {
    let created = ctx.client.create_multisig(CreateMultisigArgs {
        owners,
        threshold,
        base,
    })?;
    ctx.submit("create_multisig", created.transaction).await?;
    log::info!(
        "created multisig {} with base {}, signer {}",
        created.address,
        created.base,
        created.signer
    );
    Ok(())
}

async fn show(ctx: &Context, base: &str) -> Result<()> {
    let address = ctx.multisig(base)?;
    let multisig = ctx
        .client
        .fetch_multisig(&address)
        .await?
        .ok_or_else(|| anyhow!("no multisig with base {base}"))?;
    log::info!("{}", describe(ctx, &address, &multisig)?);
    Ok(())
}

async fn owned(ctx: &Context) -> Result<()> {
    let owner = ctx.client.payer();
    let owned = ctx.client.find_owned_multisigs(&owner).await?;
    for (address, multisig) in &owned {
        log::info!("{}", describe(ctx, address, multisig)?);
    }
    log::info!("{owner} owns {} multisigs", owned.len());
    Ok(())
}

fn describe(ctx: &Context, address: &Pubkey, multisig: &Multisig) -> Result<String> {
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "address": address.to_string(),
        "base": multisig.base_string(),
        "signer": ctx.client.signer_address(address)?.to_string(),
        "owners": format_keys(&multisig.owners),
        "threshold": multisig.threshold,
        "transactionCount": multisig.transaction_count,
        "ownerSetSeqno": multisig.owner_set_seqno,
    }))?)
}
