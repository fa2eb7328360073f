use {
    crate::config::Config,
    anyhow::{anyhow, Result},
    multisig_sdk::{
        provider::{RpcSubmitter, Submitter},
        MultisigClient,
    },
    solana_client::nonblocking::rpc_client::RpcClient,
    solana_sdk::{
        pubkey::Pubkey,
        signature::{read_keypair_file, Signature},
        signer::Signer,
        transaction::Transaction,
    },
    std::sync::Arc,
};

/// Everything a command needs, built once from the config
pub struct Context {
    pub config: Config,
    pub client: MultisigClient<Arc<RpcClient>>,
    pub submitter: RpcSubmitter,
}

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        let keypair_path = config.keypair_path();
        let keypair = read_keypair_file(&keypair_path)
            .map_err(|err| anyhow!("failed to read keypair {keypair_path}: {err}"))?;
        let rpc = Arc::new(RpcClient::new_with_commitment(
            config.rpc_url.clone(),
            config.commitment()?,
        ));
        let client = MultisigClient::new(rpc.clone(), config.program_id()?, keypair.pubkey());
        log::debug!(
            "using rpc {}, program {}, payer {}",
            config.rpc_url,
            client.program_id(),
            client.payer()
        );
        Ok(Self {
            config,
            client,
            submitter: RpcSubmitter::new(rpc, keypair),
        })
    }

    pub fn multisig(&self, base: &str) -> Result<Pubkey> {
        self.client.multisig_address(base)
    }

    /// Signs and sends `tx`, a rejection is logged and returned as is.
    pub async fn submit(&self, what: &str, tx: Transaction) -> Result<Signature> {
        match self.submitter.send(tx).await {
            Ok(sig) => {
                log::info!("{what} confirmed, signature {sig}");
                Ok(sig)
            }
            Err(err) => {
                log::error!("{what} failed {err:#}");
                Err(err)
            }
        }
    }
}
