//! seams between the client and the chain: reading accounts and submitting transactions

use {
    crate::filter::AccountFilter,
    anyhow::{Context, Result},
    solana_account_decoder::UiAccountEncoding,
    solana_client::{
        nonblocking::rpc_client::RpcClient,
        rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
        rpc_filter::RpcFilterType,
    },
    solana_sdk::{
        pubkey::Pubkey,
        signature::{Keypair, Signature},
        signer::Signer,
        transaction::Transaction,
    },
    std::sync::Arc,
};

/// Read access to program owned accounts
#[allow(async_fn_in_trait)]
pub trait AccountProvider {
    /// `Ok(None)` when the account does not exist
    async fn fetch_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// all accounts owned by `program_id` matching every filter
    async fn fetch_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>>;
}

/// Signs and sends a request built by the client.
///
/// Implementations must hand back rejections as they received them, the client
/// passes them through to its caller unchanged.
#[allow(async_fn_in_trait)]
pub trait Submitter {
    /// key the submitter signs with
    fn identity(&self) -> Pubkey;

    async fn send(&self, transaction: Transaction) -> Result<Signature>;
}

impl AccountProvider for RpcClient {
    async fn fetch_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self
            .get_account_with_commitment(address, self.commitment())
            .await
            .with_context(|| format!("failed to fetch account {address}"))?
            .value
            .map(|account| account.data))
    }

    async fn fetch_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        Ok(self
            .get_program_accounts_with_config(
                program_id,
                RpcProgramAccountsConfig {
                    filters: Some(filters.iter().map(RpcFilterType::from).collect()),
                    account_config: RpcAccountInfoConfig {
                        encoding: Some(UiAccountEncoding::Base64),
                        commitment: Some(self.commitment()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("failed to load accounts owned by {program_id}"))?
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }
}

impl<T: AccountProvider> AccountProvider for Arc<T> {
    async fn fetch_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        (**self).fetch_account_data(address).await
    }

    async fn fetch_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        (**self).fetch_program_accounts(program_id, filters).await
    }
}

/// Signs with a local keypair and sends through json rpc, waiting for confirmation
pub struct RpcSubmitter {
    rpc: Arc<RpcClient>,
    signer: Keypair,
}

impl RpcSubmitter {
    pub fn new(rpc: Arc<RpcClient>, signer: Keypair) -> Self {
        Self { rpc, signer }
    }
}

impl Submitter for RpcSubmitter {
    fn identity(&self) -> Pubkey {
        self.signer.pubkey()
    }

    async fn send(&self, mut transaction: Transaction) -> Result<Signature> {
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .with_context(|| "failed to fetch latest blockhash")?;
        transaction.try_sign(&[&self.signer], blockhash)?;
        Ok(self.rpc.send_and_confirm_transaction(&transaction).await?)
    }
}
