//! account layouts owned by the multisig program

use {
    crate::{encoding::decode_base, error::MultisigError},
    borsh::{BorshDeserialize, BorshSerialize},
    solana_sdk::{
        hash::hashv,
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
    },
};

/// first 8 bytes of `sha256("account:<name>")`
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let hash = hashv(&[b"account:".as_ref(), name.as_bytes()]);
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash.to_bytes()[..8]);
    discriminator
}

/// A borsh record stored behind an 8 byte discriminator
pub trait ProgramAccount: BorshSerialize + BorshDeserialize {
    const NAME: &'static str;

    fn discriminator() -> [u8; 8] {
        account_discriminator(Self::NAME)
    }

    /// trailing bytes past the record are ignored, accounts are allocated with slack
    fn try_from_account_data(address: &Pubkey, data: &[u8]) -> Result<Self, MultisigError> {
        let err = || MultisigError::AccountDecode {
            address: *address,
            kind: Self::NAME,
        };
        if data.len() < 8 || data[..8] != Self::discriminator() {
            return Err(err());
        }
        Self::deserialize(&mut &data[8..]).map_err(|_| err())
    }

    fn to_account_data(&self) -> std::io::Result<Vec<u8>> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Multisig {
    /// Zero padded string used to seed the multisig address.
    pub base: [u8; 32],
    /// Keys allowed to propose and approve transactions.
    pub owners: Vec<Pubkey>,
    /// Minimum number of owner approvals needed to execute a [Transaction].
    pub threshold: u8,
    /// Number of transactions created so far, also the index of the next one.
    pub transaction_count: u32,
    /// Bumped whenever the owner set changes, approvals from an older set are void.
    pub owner_set_seqno: u32,
    pub bump: u8,
    pub signer_bump: u8,
}

impl ProgramAccount for Multisig {
    const NAME: &'static str = "Multisig";
}

impl Multisig {
    pub fn owner_index(&self, key: &Pubkey) -> Option<usize> {
        self.owners.iter().position(|owner| owner == key)
    }

    pub fn base_string(&self) -> String {
        decode_base(&self.base)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub multisig: Pubkey,
    pub index: u32,
    pub proposer: Pubkey,
    /// default key until executed
    pub executor: Pubkey,
    pub instructions: Vec<TxInstruction>,
    /// `signers[i]` is true once `multisig.owners[i]` approved
    pub signers: Vec<bool>,
    /// owner set sequence of the multisig when this was created
    pub owner_set_seqno: u32,
    pub executed_at: Option<i64>,
    pub created_at: i64,
    pub bump: u8,
}

impl ProgramAccount for Transaction {
    const NAME: &'static str = "Transaction";
}

impl Transaction {
    /// number of approvals
    pub fn sig_count(&self) -> usize {
        self.signers.iter().filter(|did_sign| **did_sign).count()
    }

    pub fn is_executed(&self) -> bool {
        self.executed_at.is_some()
    }

    /// Owners that approved, resolved against the multisig's current owner list.
    ///
    /// Positions past the end of `owners` are skipped, which only happens once the
    /// owner set changed and the approvals are stale anyway.
    pub fn approved_by(&self, multisig: &Multisig) -> Vec<Pubkey> {
        self.signers
            .iter()
            .zip(multisig.owners.iter())
            .filter_map(|(did_sign, owner)| did_sign.then_some(*owner))
            .collect()
    }

    pub fn to_instructions(&self) -> Vec<Instruction> {
        self.instructions.iter().map(Instruction::from).collect()
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxInstruction {
    pub program_id: Pubkey,
    pub keys: Vec<TxAccountMeta>,
    pub data: Vec<u8>,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxAccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl From<Instruction> for TxInstruction {
    fn from(ix: Instruction) -> Self {
        Self {
            program_id: ix.program_id,
            keys: ix.accounts.into_iter().map(Into::into).collect(),
            data: ix.data,
        }
    }
}

impl From<&TxInstruction> for Instruction {
    fn from(ix: &TxInstruction) -> Self {
        Self {
            program_id: ix.program_id,
            accounts: ix.keys.iter().copied().map(Into::into).collect(),
            data: ix.data.clone(),
        }
    }
}

impl From<AccountMeta> for TxAccountMeta {
    fn from(meta: AccountMeta) -> Self {
        Self {
            pubkey: meta.pubkey,
            is_signer: meta.is_signer,
            is_writable: meta.is_writable,
        }
    }
}

impl From<TxAccountMeta> for AccountMeta {
    fn from(meta: TxAccountMeta) -> Self {
        Self {
            pubkey: meta.pubkey,
            is_signer: meta.is_signer,
            is_writable: meta.is_writable,
        }
    }
}
