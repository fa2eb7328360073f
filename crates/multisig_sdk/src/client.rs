use {
    crate::{
        encoding::{encode_base, random_base},
        error::MultisigError,
        execute::remaining_accounts,
        filter::{AccountFilter, TransactionFilter},
        instruction, pda,
        provider::{AccountProvider, Submitter},
        state::{Multisig, ProgramAccount, Transaction, TxInstruction},
    },
    anyhow::{anyhow, Result},
    solana_sdk::{
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        transaction::Transaction as SolanaTransaction,
    },
    std::collections::HashSet,
};

/// Builds requests against one deployment of the multisig program.
///
/// The client keeps no record state, every operation that depends on on-chain data
/// fetches it again through the provider. `payer` pays fees and is the implicit
/// proposer, approver and executor unless told otherwise.
pub struct MultisigClient<P> {
    provider: P,
    program_id: Pubkey,
    payer: Pubkey,
}

#[derive(Clone, Debug, Default)]
pub struct CreateMultisigArgs {
    pub owners: Vec<Pubkey>,
    pub threshold: u8,
    /// random base when `None`
    pub base: Option<String>,
}

#[derive(Debug)]
pub struct CreatedMultisig {
    pub base: String,
    pub address: Pubkey,
    pub signer: Pubkey,
    pub transaction: SolanaTransaction,
}

#[derive(Debug)]
pub struct ProposalHandle {
    pub address: Pubkey,
    pub index: u32,
    pub transaction: SolanaTransaction,
}

#[derive(Debug)]
pub struct ApprovalRequest {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub transaction: SolanaTransaction,
}

impl ApprovalRequest {
    /// true when the approving owner is not the key `identity` signs with, the request
    /// then needs a second signature from elsewhere
    pub fn needs_external_signer(&self, identity: &Pubkey) -> bool {
        self.owner != *identity
    }
}

#[derive(Debug)]
pub struct ExecutionRequest {
    pub address: Pubkey,
    pub remaining_accounts: Vec<AccountMeta>,
    pub transaction: SolanaTransaction,
}

impl<P: AccountProvider> MultisigClient<P> {
    pub fn new(provider: P, program_id: Pubkey, payer: Pubkey) -> Self {
        Self {
            provider,
            program_id,
            payer,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn payer(&self) -> Pubkey {
        self.payer
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn multisig_address(&self, base: &str) -> Result<Pubkey> {
        Ok(pda::multisig_address(&self.program_id, &encode_base(base)?)?.0)
    }

    pub fn signer_address(&self, multisig: &Pubkey) -> Result<Pubkey> {
        Ok(pda::signer_address(&self.program_id, multisig)?.0)
    }

    pub fn transaction_address(&self, multisig: &Pubkey, index: u32) -> Result<Pubkey> {
        Ok(pda::transaction_address(&self.program_id, multisig, index)?.0)
    }

    fn request(&self, ix: Instruction) -> SolanaTransaction {
        SolanaTransaction::new_with_payer(&[ix], Some(&self.payer))
    }

    /// Builds the create request, validating owners and threshold the same way the
    /// program would so obviously bad input never costs a round trip.
    pub fn create_multisig(&self, args: CreateMultisigArgs) -> Result<CreatedMultisig> {
        validate_owners(&args.owners)?;
        if args.threshold == 0 || usize::from(args.threshold) > args.owners.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold: args.threshold,
                owners: args.owners.len(),
            }
            .into());
        }
        let base = match args.base {
            Some(base) if base.is_empty() => return Err(MultisigError::EmptyBase.into()),
            Some(base) => base,
            None => random_base(),
        };
        let encoded = encode_base(&base)?;
        let (address, _) = pda::multisig_address(&self.program_id, &encoded)?;
        let (signer, _) = pda::signer_address(&self.program_id, &address)?;
        let ix = instruction::create_multisig(
            &self.program_id,
            &address,
            &self.payer,
            encoded,
            args.owners,
            args.threshold,
        )?;
        log::debug!("prepared create_multisig(base={base}, address={address})");
        Ok(CreatedMultisig {
            base,
            address,
            signer,
            transaction: self.request(ix),
        })
    }

    pub async fn fetch_multisig(&self, address: &Pubkey) -> Result<Option<Multisig>> {
        self.fetch_record(address).await
    }

    /// looks up a multisig by its base, `None` when it was never created
    pub async fn get_multisig(&self, base: &str) -> Result<Option<Multisig>> {
        self.fetch_multisig(&self.multisig_address(base)?).await
    }

    /// Scans every multisig and keeps those listing `owner`.
    ///
    /// There is no server side index on owners, so this is a full scan.
    pub async fn find_owned_multisigs(&self, owner: &Pubkey) -> Result<Vec<(Pubkey, Multisig)>> {
        Ok(self
            .provider
            .fetch_program_accounts(
                &self.program_id,
                &[AccountFilter::discriminator::<Multisig>()],
            )
            .await?
            .into_iter()
            .filter_map(|(address, data)| {
                Some((address, Multisig::try_from_account_data(&address, &data).ok()?))
            })
            .filter(|(_, multisig)| multisig.owner_index(owner).is_some())
            .collect())
    }

    /// Builds the request creating a transaction at `index`, or at the multisig's
    /// current `transaction_count` when no index is given.
    ///
    /// Reading the counter and submitting are not atomic. Two proposers racing on the
    /// same multisig derive the same address and the program accepts only the first.
    pub async fn create_transaction(
        &self,
        multisig: &Pubkey,
        instructions: Vec<Instruction>,
        index: Option<u32>,
    ) -> Result<ProposalHandle> {
        if instructions.is_empty() {
            return Err(MultisigError::EmptyInstructions.into());
        }
        let index = match index {
            Some(index) => index,
            None => {
                self.fetch_multisig(multisig)
                    .await?
                    .ok_or(MultisigError::UnknownMultisig(*multisig))?
                    .transaction_count
            }
        };
        let address = self.transaction_address(multisig, index)?;
        let ix = instruction::create_transaction(
            &self.program_id,
            multisig,
            &address,
            &self.payer,
            instructions.into_iter().map(TxInstruction::from).collect(),
        )?;
        log::debug!("prepared create_transaction(multisig={multisig}, index={index}, address={address})");
        Ok(ProposalHandle {
            address,
            index,
            transaction: self.request(ix),
        })
    }

    pub async fn fetch_transaction(&self, address: &Pubkey) -> Result<Option<Transaction>> {
        self.fetch_record(address).await
    }

    /// `None` when no transaction exists at `index`
    pub async fn get_transaction(&self, multisig: &Pubkey, index: u32) -> Result<Option<Transaction>> {
        self.fetch_transaction(&self.transaction_address(multisig, index)?)
            .await
    }

    /// transactions matching every predicate of `filter`, ordered by index
    pub async fn find_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<(Pubkey, Transaction)>> {
        let mut transactions = self
            .provider
            .fetch_program_accounts(&self.program_id, &filter.to_filters())
            .await?
            .into_iter()
            .filter_map(|(address, data)| {
                Some((
                    address,
                    Transaction::try_from_account_data(&address, &data).ok()?,
                ))
            })
            .collect::<Vec<_>>();
        transactions.sort_by_key(|(_, tx)| tx.index);
        Ok(transactions)
    }

    /// Approval by `owner`, or by the payer when `None`. Approving twice is rejected
    /// by the program, not here.
    pub fn approve_transaction(
        &self,
        multisig: &Pubkey,
        index: u32,
        owner: Option<Pubkey>,
    ) -> Result<ApprovalRequest> {
        let owner = owner.unwrap_or(self.payer);
        let address = self.transaction_address(multisig, index)?;
        let ix = instruction::approve(&self.program_id, multisig, &address, &owner)?;
        Ok(ApprovalRequest {
            address,
            owner,
            transaction: self.request(ix),
        })
    }

    /// Approves, through `submitter`, every transaction of `multisig` that is neither
    /// executed, stale nor already approved by the payer. A failed approval is logged
    /// and skipped. Returns how many approvals went through.
    pub async fn approve_all<S: Submitter>(&self, multisig: &Pubkey, submitter: &S) -> Result<usize> {
        let current = self
            .fetch_multisig(multisig)
            .await?
            .ok_or(MultisigError::UnknownMultisig(*multisig))?;
        let owner_index = current
            .owner_index(&self.payer)
            .ok_or_else(|| anyhow!("{} is not an owner of {multisig}", self.payer))?;

        let pending = self
            .find_transactions(&TransactionFilter::new(*multisig))
            .await?
            .into_iter()
            .filter(|(_, tx)| {
                !tx.is_executed()
                    && tx.owner_set_seqno == current.owner_set_seqno
                    && !tx.signers.get(owner_index).copied().unwrap_or(false)
            })
            .collect::<Vec<_>>();
        log::info!("{} transactions awaiting approval on {multisig}", pending.len());

        let mut approved = 0;
        for (address, tx) in pending {
            let request = match self.approve_transaction(multisig, tx.index, None) {
                Ok(request) => request,
                Err(err) => {
                    log::error!("failed to build approval for {address} {err:#}");
                    continue;
                }
            };
            match submitter.send(request.transaction).await {
                Ok(sig) => {
                    log::info!("approved transaction {} ({sig})", tx.index);
                    approved += 1;
                }
                Err(err) => log::error!("failed to approve {address} {err:#}"),
            }
        }
        Ok(approved)
    }

    /// Builds the execute request for the transaction at `index`.
    ///
    /// The threshold is not checked here, an under-approved transaction is rejected
    /// by the program when submitted.
    pub async fn execute_transaction(&self, multisig: &Pubkey, index: u32) -> Result<ExecutionRequest> {
        let address = self.transaction_address(multisig, index)?;
        let tx = self
            .fetch_transaction(&address)
            .await?
            .ok_or(MultisigError::UnknownProposal {
                multisig: *multisig,
                index,
            })?;
        let authority = self.signer_address(multisig)?;
        let remaining = remaining_accounts(&tx.instructions, &authority);
        let ix = instruction::execute_transaction(
            &self.program_id,
            multisig,
            &address,
            &self.payer,
            remaining.clone(),
        )?;
        log::debug!(
            "prepared execute_transaction(multisig={multisig}, index={index}, remaining_accounts={})",
            remaining.len()
        );
        Ok(ExecutionRequest {
            address,
            remaining_accounts: remaining,
            transaction: self.request(ix),
        })
    }

    /// Proposes replacing the owner set. Takes effect only once the proposal executes,
    /// and voids approvals on every transaction created before that.
    pub async fn set_owners(&self, multisig: &Pubkey, owners: Vec<Pubkey>) -> Result<ProposalHandle> {
        validate_owners(&owners)?;
        let signer = self.signer_address(multisig)?;
        let ix = instruction::set_owners(&self.program_id, multisig, &signer, owners)?;
        self.create_transaction(multisig, vec![ix], None).await
    }

    /// Proposes a new threshold, the upper bound is checked by the program on execution
    pub async fn change_threshold(&self, multisig: &Pubkey, threshold: u8) -> Result<ProposalHandle> {
        if threshold == 0 {
            return Err(MultisigError::InvalidThreshold {
                threshold,
                owners: 0,
            }
            .into());
        }
        let signer = self.signer_address(multisig)?;
        let ix = instruction::change_threshold(&self.program_id, multisig, &signer, threshold)?;
        self.create_transaction(multisig, vec![ix], None).await
    }

    /// closes the transaction at `index`, returning its rent to the payer
    pub fn close_transaction(&self, multisig: &Pubkey, index: u32) -> Result<SolanaTransaction> {
        let address = self.transaction_address(multisig, index)?;
        let ix = instruction::close_transaction(&self.program_id, multisig, &address, &self.payer)?;
        Ok(self.request(ix))
    }

    async fn fetch_record<T: ProgramAccount>(&self, address: &Pubkey) -> Result<Option<T>> {
        match self.provider.fetch_account_data(address).await? {
            Some(data) => Ok(Some(T::try_from_account_data(address, &data)?)),
            None => Ok(None),
        }
    }
}

fn validate_owners(owners: &[Pubkey]) -> Result<(), MultisigError> {
    if owners.is_empty() {
        return Err(MultisigError::EmptyOwners);
    }
    let mut seen = HashSet::with_capacity(owners.len());
    for owner in owners {
        if !seen.insert(owner) {
            return Err(MultisigError::DuplicateOwner(*owner));
        }
    }
    Ok(())
}
