use {
    super::propose,
    anyhow::Result,
    msig::{cli::ActionCommands, context::Context},
    multisig_sdk::actions,
};

pub async fn process(ctx: &Context, command: ActionCommands) -> Result<()> {
    match command {
        ActionCommands::TransferSol {
            target,
            to,
            lamports,
            index,
        } => {
            let authority = ctx.client.signer_address(&ctx.multisig(&target.multisig)?)?;
            let ix = actions::transfer_sol(&authority, &to, lamports);
            propose(ctx, &target.multisig, vec![ix], index).await
        }
        ActionCommands::SetUpgradeAuthority {
            program,
            target,
            new_authority,
            index,
        } => {
            let authority = ctx.client.signer_address(&ctx.multisig(&target.multisig)?)?;
            let ix = actions::set_upgrade_authority(&program, &authority, &new_authority);
            propose(ctx, &target.multisig, vec![ix], index).await
        }
        ActionCommands::UpgradeProgram {
            target,
            program,
            buffer,
            index,
        } => {
            let authority = ctx.client.signer_address(&ctx.multisig(&target.multisig)?)?;
            // leftover buffer lamports go back to whoever proposed the upgrade
            let ix = actions::upgrade_program(&program, &buffer, &authority, &ctx.client.payer());
            propose(ctx, &target.multisig, vec![ix], index).await
        }
    }
}
