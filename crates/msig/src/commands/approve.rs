use {
    anyhow::Result,
    msig::context::Context,
    multisig_sdk::{inspect::inspect_transaction, provider::Submitter},
    solana_sdk::pubkey::Pubkey,
};

pub async fn approve(ctx: &Context, base: &str, index: u32, owner: Option<Pubkey>) -> Result<()> {
    let multisig = ctx.multisig(base)?;
    let request = ctx.client.approve_transaction(&multisig, index, owner)?;
    if request.needs_external_signer(&ctx.submitter.identity()) {
        // the configured keypair cannot sign for another owner
        let inspection = inspect_transaction(&request.transaction, &ctx.config.cluster);
        log::info!(
            "approval of {} by {} needs that owner's signature, unsigned message: {}",
            request.address,
            request.owner,
            inspection.message
        );
        log::info!("inspect: {}", inspection.url);
        return Ok(());
    }
    ctx.submit(
        &format!("approve(index={index}, owner={})", request.owner),
        request.transaction,
    )
    .await?;
    Ok(())
}

/// Approves every pending transaction still missing the keypair's approval, failures
/// are logged and skipped.
pub async fn approve_all(ctx: &Context, base: &str) -> Result<()> {
    let multisig = ctx.multisig(base)?;
    let approved = ctx.client.approve_all(&multisig, &ctx.submitter).await?;
    log::info!("Total approved: {approved}");
    Ok(())
}
