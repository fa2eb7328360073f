//! In-memory stand-in for the multisig program.
//!
//! Applies the program's rules (owner checks, approval bookkeeping, threshold,
//! single execution, owner set sequencing) to submitted transactions so client flows
//! can be exercised without a validator. Rejections are plain `anyhow` errors named
//! after the program's error codes.

use {
    crate::{
        filter::AccountFilter,
        instruction::MultisigInstruction,
        pda,
        provider::{AccountProvider, Submitter},
        state::{Multisig, ProgramAccount, Transaction},
    },
    anyhow::{anyhow, bail, Result},
    solana_sdk::{
        instruction::Instruction,
        pubkey::Pubkey,
        signature::Signature,
        transaction::Transaction as SolanaTransaction,
    },
    std::{
        collections::{HashMap, HashSet},
        sync::{Arc, Mutex, MutexGuard},
    },
};

pub struct TestLedger {
    program_id: Pubkey,
    state: Mutex<LedgerState>,
}

#[derive(Clone, Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, Vec<u8>>,
    clock: i64,
    /// instructions for other programs run by executed transactions
    invoked: Vec<Instruction>,
}

/// an account as seen by one instruction
#[derive(Clone, Copy)]
struct Account {
    pubkey: Pubkey,
    is_signer: bool,
}

/// Submits to a [`TestLedger`] holding only `identity`'s signature
pub struct LedgerSubmitter {
    ledger: Arc<TestLedger>,
    identity: Pubkey,
}

fn program_error(code: &str) -> anyhow::Error {
    anyhow!("program error: {code}")
}

impl TestLedger {
    pub fn new(program_id: Pubkey) -> Arc<Self> {
        Arc::new(Self {
            program_id,
            state: Mutex::new(LedgerState::default()),
        })
    }

    pub fn submitter(self: &Arc<Self>, identity: Pubkey) -> LedgerSubmitter {
        LedgerSubmitter {
            ledger: self.clone(),
            identity,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("ledger state poisoned"))
    }

    pub fn account<T: ProgramAccount>(&self, address: &Pubkey) -> Option<T> {
        let state = self.lock().ok()?;
        T::try_from_account_data(address, state.accounts.get(address)?).ok()
    }

    /// overwrites raw account data, bypassing the program rules
    pub fn set_account(&self, address: Pubkey, data: Vec<u8>) -> Result<()> {
        self.lock()?.accounts.insert(address, data);
        Ok(())
    }

    pub fn invoked(&self) -> Vec<Instruction> {
        self.lock()
            .map(|state| state.invoked.clone())
            .unwrap_or_default()
    }

    /// Applies every instruction of `transaction` atomically, `signers` being the keys
    /// that actually signed it.
    pub fn process(&self, transaction: &SolanaTransaction, signers: &[Pubkey]) -> Result<Signature> {
        let message = &transaction.message;
        let required = usize::from(message.header.num_required_signatures);
        for key in message.account_keys.iter().take(required) {
            if !signers.contains(key) {
                bail!("signature verification failed: missing signature for {key}");
            }
        }

        let mut state = self.lock()?;
        let mut pending = state.clone();
        pending.clock += 1;
        for compiled in &message.instructions {
            let program_id = *message
                .account_keys
                .get(usize::from(compiled.program_id_index))
                .ok_or_else(|| anyhow!("invalid program id index"))?;
            if program_id != self.program_id {
                continue;
            }
            let accounts = compiled
                .accounts
                .iter()
                .map(|idx| {
                    let idx = usize::from(*idx);
                    Ok(Account {
                        pubkey: *message
                            .account_keys
                            .get(idx)
                            .ok_or_else(|| anyhow!("invalid account index"))?,
                        is_signer: idx < required,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let ix = MultisigInstruction::unpack(&compiled.data)
                .ok_or_else(|| program_error("InstructionFallbackNotFound"))?;
            self.apply(&mut pending, ix, &accounts)?;
        }
        *state = pending;
        Ok(Signature::new_unique())
    }

    fn apply(&self, state: &mut LedgerState, ix: MultisigInstruction, accounts: &[Account]) -> Result<()> {
        match ix {
            MultisigInstruction::CreateMultisig {
                base,
                owners,
                threshold,
            } => {
                let (multisig, payer) = (account(accounts, 0)?, account(accounts, 1)?);
                require_signer(payer)?;
                let (expected, bump) = pda::multisig_address(&self.program_id, &base)?;
                if multisig.pubkey != expected {
                    return Err(program_error("ConstraintSeeds"));
                }
                if state.accounts.contains_key(&expected) {
                    bail!("account {expected} already in use");
                }
                check_owners(&owners)?;
                if threshold == 0 || usize::from(threshold) > owners.len() {
                    return Err(program_error("InvalidThreshold"));
                }
                let (_, signer_bump) = pda::signer_address(&self.program_id, &expected)?;
                store(
                    state,
                    expected,
                    &Multisig {
                        base,
                        owners,
                        threshold,
                        transaction_count: 0,
                        owner_set_seqno: 0,
                        bump,
                        signer_bump,
                    },
                )
            }
            MultisigInstruction::CreateTransaction { instructions } => {
                let (multisig_acct, tx_acct, proposer) = (
                    account(accounts, 0)?,
                    account(accounts, 1)?,
                    account(accounts, 2)?,
                );
                require_signer(proposer)?;
                let mut multisig: Multisig = load(state, &multisig_acct.pubkey)?;
                let owner_index = multisig
                    .owner_index(&proposer.pubkey)
                    .ok_or_else(|| program_error("InvalidOwner"))?;
                let (expected, bump) = pda::transaction_address(
                    &self.program_id,
                    &multisig_acct.pubkey,
                    multisig.transaction_count,
                )?;
                if state.accounts.contains_key(&tx_acct.pubkey) {
                    bail!("account {} already in use", tx_acct.pubkey);
                }
                if tx_acct.pubkey != expected {
                    return Err(program_error("ConstraintSeeds"));
                }
                let mut signers = vec![false; multisig.owners.len()];
                signers[owner_index] = true;
                let tx = Transaction {
                    multisig: multisig_acct.pubkey,
                    index: multisig.transaction_count,
                    proposer: proposer.pubkey,
                    executor: Pubkey::default(),
                    instructions,
                    signers,
                    owner_set_seqno: multisig.owner_set_seqno,
                    executed_at: None,
                    created_at: state.clock,
                    bump,
                };
                multisig.transaction_count = multisig.transaction_count.saturating_add(1);
                store(state, expected, &tx)?;
                store(state, multisig_acct.pubkey, &multisig)
            }
            MultisigInstruction::Approve => {
                let (multisig_acct, tx_acct, owner) = (
                    account(accounts, 0)?,
                    account(accounts, 1)?,
                    account(accounts, 2)?,
                );
                require_signer(owner)?;
                let multisig: Multisig = load(state, &multisig_acct.pubkey)?;
                let mut tx: Transaction = load(state, &tx_acct.pubkey)?;
                check_membership(&multisig, &multisig_acct.pubkey, &tx)?;
                let owner_index = multisig
                    .owner_index(&owner.pubkey)
                    .ok_or_else(|| program_error("InvalidOwner"))?;
                let approval = tx
                    .signers
                    .get_mut(owner_index)
                    .ok_or_else(|| program_error("InvalidOwner"))?;
                if *approval {
                    return Err(program_error("AlreadyApproved"));
                }
                *approval = true;
                store(state, tx_acct.pubkey, &tx)
            }
            MultisigInstruction::ExecuteTransaction => {
                let (multisig_acct, tx_acct, executor) = (
                    account(accounts, 0)?,
                    account(accounts, 1)?,
                    account(accounts, 2)?,
                );
                require_signer(executor)?;
                let multisig: Multisig = load(state, &multisig_acct.pubkey)?;
                let mut tx: Transaction = load(state, &tx_acct.pubkey)?;
                check_membership(&multisig, &multisig_acct.pubkey, &tx)?;
                if tx.is_executed() {
                    return Err(program_error("AlreadyExecuted"));
                }
                if tx.sig_count() < usize::from(multisig.threshold) {
                    return Err(program_error("NotEnoughSigners"));
                }
                let (authority, _) = pda::signer_address(&self.program_id, &multisig_acct.pubkey)?;
                let remaining = &accounts[3..];
                for sub_ix in tx.to_instructions() {
                    if !remaining.iter().any(|acct| acct.pubkey == sub_ix.program_id) {
                        bail!("missing program account {}", sub_ix.program_id);
                    }
                    for meta in &sub_ix.accounts {
                        let provided = remaining
                            .iter()
                            .find(|acct| acct.pubkey == meta.pubkey)
                            .ok_or_else(|| anyhow!("missing account {}", meta.pubkey))?;
                        if meta.is_signer && meta.pubkey != authority && !provided.is_signer {
                            return Err(program_error("MissingRequiredSignature"));
                        }
                    }
                    if sub_ix.program_id == self.program_id {
                        self.invoke_signed(state, &sub_ix, &multisig_acct.pubkey, &authority)?;
                    } else {
                        state.invoked.push(sub_ix);
                    }
                }
                tx.executor = executor.pubkey;
                tx.executed_at = Some(state.clock);
                store(state, tx_acct.pubkey, &tx)
            }
            MultisigInstruction::SetOwners { .. } | MultisigInstruction::ChangeThreshold { .. } => {
                // only reachable with the multisig signer's signature, which no
                // outside caller can produce
                let signer = account(accounts, 1)?;
                require_signer(signer)?;
                Err(program_error("ConstraintSeeds"))
            }
            MultisigInstruction::CloseTransaction => {
                let (multisig_acct, tx_acct, owner) = (
                    account(accounts, 0)?,
                    account(accounts, 1)?,
                    account(accounts, 2)?,
                );
                require_signer(owner)?;
                let multisig: Multisig = load(state, &multisig_acct.pubkey)?;
                let tx: Transaction = load(state, &tx_acct.pubkey)?;
                if tx.multisig != multisig_acct.pubkey {
                    return Err(program_error("ConstraintHasOne"));
                }
                if multisig.owner_index(&owner.pubkey).is_none() {
                    return Err(program_error("InvalidOwner"));
                }
                state.accounts.remove(&tx_acct.pubkey);
                Ok(())
            }
        }
    }

    /// a transaction calling back into the program, signed by the multisig signer
    fn invoke_signed(
        &self,
        state: &mut LedgerState,
        ix: &Instruction,
        multisig_address: &Pubkey,
        authority: &Pubkey,
    ) -> Result<()> {
        let targets_self = ix.accounts.first().map(|meta| meta.pubkey) == Some(*multisig_address)
            && ix.accounts.get(1).map(|meta| meta.pubkey) == Some(*authority);
        if !targets_self {
            return Err(program_error("ConstraintSeeds"));
        }
        let mut multisig: Multisig = load(state, multisig_address)?;
        match MultisigInstruction::unpack(&ix.data) {
            Some(MultisigInstruction::SetOwners { owners }) => {
                check_owners(&owners)?;
                if owners.len() < usize::from(multisig.threshold) {
                    multisig.threshold = owners.len() as u8;
                }
                multisig.owners = owners;
                multisig.owner_set_seqno += 1;
            }
            Some(MultisigInstruction::ChangeThreshold { threshold }) => {
                if threshold == 0 || usize::from(threshold) > multisig.owners.len() {
                    return Err(program_error("InvalidThreshold"));
                }
                multisig.threshold = threshold;
            }
            _ => bail!("unsupported instruction invoked by transaction"),
        }
        store(state, *multisig_address, &multisig)
    }
}

fn account(accounts: &[Account], idx: usize) -> Result<Account> {
    accounts
        .get(idx)
        .copied()
        .ok_or_else(|| program_error("NotEnoughAccountKeys"))
}

fn require_signer(account: Account) -> Result<()> {
    if !account.is_signer {
        return Err(program_error("AccountNotSigner"));
    }
    Ok(())
}

fn check_owners(owners: &[Pubkey]) -> Result<()> {
    if owners.is_empty() {
        return Err(program_error("EmptyOwners"));
    }
    let unique = owners.iter().collect::<HashSet<_>>();
    if unique.len() != owners.len() {
        return Err(program_error("UniqueOwners"));
    }
    Ok(())
}

fn check_membership(multisig: &Multisig, address: &Pubkey, tx: &Transaction) -> Result<()> {
    if tx.multisig != *address {
        return Err(program_error("ConstraintHasOne"));
    }
    if tx.owner_set_seqno != multisig.owner_set_seqno {
        return Err(program_error("ConstraintRaw"));
    }
    Ok(())
}

fn load<T: ProgramAccount>(state: &LedgerState, address: &Pubkey) -> Result<T> {
    let data = state
        .accounts
        .get(address)
        .ok_or_else(|| program_error("AccountNotInitialized"))?;
    Ok(T::try_from_account_data(address, data)?)
}

fn store<T: ProgramAccount>(state: &mut LedgerState, address: Pubkey, record: &T) -> Result<()> {
    state.accounts.insert(address, record.to_account_data()?);
    Ok(())
}

impl AccountProvider for TestLedger {
    async fn fetch_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.accounts.get(address).cloned())
    }

    async fn fetch_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        if *program_id != self.program_id {
            return Ok(vec![]);
        }
        Ok(self
            .lock()?
            .accounts
            .iter()
            .filter(|(_, data)| filters.iter().all(|filter| filter.matches(data)))
            .map(|(address, data)| (*address, data.clone()))
            .collect())
    }
}

impl Submitter for LedgerSubmitter {
    fn identity(&self) -> Pubkey {
        self.identity
    }

    async fn send(&self, transaction: SolanaTransaction) -> Result<Signature> {
        self.ledger.process(&transaction, &[self.identity])
    }
}
