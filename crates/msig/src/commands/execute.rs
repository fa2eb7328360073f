use {anyhow::Result, msig::context::Context};

pub async fn execute(ctx: &Context, base: &str, index: u32) -> Result<()> {
    let multisig = ctx.multisig(base)?;
    let request = ctx.client.execute_transaction(&multisig, index).await?;
    log::debug!(
        "executing {} with {} remaining accounts",
        request.address,
        request.remaining_accounts.len()
    );
    ctx.submit(&format!("execute(index={index})"), request.transaction)
        .await?;
    Ok(())
}
