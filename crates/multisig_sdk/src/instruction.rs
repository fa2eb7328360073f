//! instruction payloads and account lists understood by the multisig program

use {
    crate::state::TxInstruction,
    borsh::{BorshDeserialize, BorshSerialize},
    solana_sdk::{
        hash::hashv,
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_program,
    },
};

/// first 8 bytes of `sha256("global:<name>")`
pub fn sighash(name: &str) -> [u8; 8] {
    let hash = hashv(&[b"global:".as_ref(), name.as_bytes()]);
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash.to_bytes()[..8]);
    discriminator
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultisigInstruction {
    CreateMultisig {
        base: [u8; 32],
        owners: Vec<Pubkey>,
        threshold: u8,
    },
    CreateTransaction {
        instructions: Vec<TxInstruction>,
    },
    Approve,
    ExecuteTransaction,
    /// only callable by the multisig signer, i.e. from an executed transaction
    SetOwners {
        owners: Vec<Pubkey>,
    },
    /// only callable by the multisig signer, i.e. from an executed transaction
    ChangeThreshold {
        threshold: u8,
    },
    CloseTransaction,
}

impl MultisigInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateMultisig { .. } => "create_multisig",
            Self::CreateTransaction { .. } => "create_transaction",
            Self::Approve => "approve",
            Self::ExecuteTransaction => "execute_transaction",
            Self::SetOwners { .. } => "set_owners",
            Self::ChangeThreshold { .. } => "change_threshold",
            Self::CloseTransaction => "close_transaction",
        }
    }

    /// sighash followed by the borsh encoded arguments
    pub fn data(&self) -> std::io::Result<Vec<u8>> {
        let mut data = sighash(self.name()).to_vec();
        match self {
            Self::CreateMultisig {
                base,
                owners,
                threshold,
            } => {
                base.serialize(&mut data)?;
                owners.serialize(&mut data)?;
                threshold.serialize(&mut data)?;
            }
            Self::CreateTransaction { instructions } => instructions.serialize(&mut data)?,
            Self::SetOwners { owners } => owners.serialize(&mut data)?,
            Self::ChangeThreshold { threshold } => threshold.serialize(&mut data)?,
            Self::Approve | Self::ExecuteTransaction | Self::CloseTransaction => {}
        }
        Ok(data)
    }

    /// Decodes instruction data produced by [`MultisigInstruction::data`], `None` for
    /// unknown discriminators or malformed arguments.
    pub fn unpack(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        let (discriminator, mut args) = data.split_at(8);
        let ix = match discriminator {
            d if d == sighash("create_multisig") => Self::CreateMultisig {
                base: BorshDeserialize::deserialize(&mut args).ok()?,
                owners: BorshDeserialize::deserialize(&mut args).ok()?,
                threshold: BorshDeserialize::deserialize(&mut args).ok()?,
            },
            d if d == sighash("create_transaction") => Self::CreateTransaction {
                instructions: BorshDeserialize::deserialize(&mut args).ok()?,
            },
            d if d == sighash("approve") => Self::Approve,
            d if d == sighash("execute_transaction") => Self::ExecuteTransaction,
            d if d == sighash("set_owners") => Self::SetOwners {
                owners: BorshDeserialize::deserialize(&mut args).ok()?,
            },
            d if d == sighash("change_threshold") => Self::ChangeThreshold {
                threshold: BorshDeserialize::deserialize(&mut args).ok()?,
            },
            d if d == sighash("close_transaction") => Self::CloseTransaction,
            _ => return None,
        };
        Some(ix)
    }
}

pub fn create_multisig(
    program_id: &Pubkey,
    multisig: &Pubkey,
    payer: &Pubkey,
    base: [u8; 32],
    owners: Vec<Pubkey>,
    threshold: u8,
) -> std::io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*multisig, false),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: MultisigInstruction::CreateMultisig {
            base,
            owners,
            threshold,
        }
        .data()?,
    })
}

pub fn create_transaction(
    program_id: &Pubkey,
    multisig: &Pubkey,
    transaction: &Pubkey,
    proposer: &Pubkey,
    instructions: Vec<TxInstruction>,
) -> std::io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*multisig, false),
            AccountMeta::new(*transaction, false),
            AccountMeta::new(*proposer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: MultisigInstruction::CreateTransaction { instructions }.data()?,
    })
}

pub fn approve(
    program_id: &Pubkey,
    multisig: &Pubkey,
    transaction: &Pubkey,
    owner: &Pubkey,
) -> std::io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*multisig, false),
            AccountMeta::new(*transaction, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: MultisigInstruction::Approve.data()?,
    })
}

/// `remaining_accounts` are appended after the fixed accounts in the given order
pub fn execute_transaction(
    program_id: &Pubkey,
    multisig: &Pubkey,
    transaction: &Pubkey,
    executor: &Pubkey,
    remaining_accounts: Vec<AccountMeta>,
) -> std::io::Result<Instruction> {
    let mut accounts = vec![
        AccountMeta::new_readonly(*multisig, false),
        AccountMeta::new(*transaction, false),
        AccountMeta::new_readonly(*executor, true),
    ];
    accounts.extend(remaining_accounts);
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: MultisigInstruction::ExecuteTransaction.data()?,
    })
}

/// Instruction meant to be wrapped in a transaction, the multisig signer is
/// flagged as signer and gets its signature from the program at execution.
pub fn set_owners(
    program_id: &Pubkey,
    multisig: &Pubkey,
    multisig_signer: &Pubkey,
    owners: Vec<Pubkey>,
) -> std::io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*multisig, false),
            AccountMeta::new_readonly(*multisig_signer, true),
        ],
        data: MultisigInstruction::SetOwners { owners }.data()?,
    })
}

/// see [`set_owners`]
pub fn change_threshold(
    program_id: &Pubkey,
    multisig: &Pubkey,
    multisig_signer: &Pubkey,
    threshold: u8,
) -> std::io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*multisig, false),
            AccountMeta::new_readonly(*multisig_signer, true),
        ],
        data: MultisigInstruction::ChangeThreshold { threshold }.data()?,
    })
}

/// rent of the closed transaction goes back to `owner`
pub fn close_transaction(
    program_id: &Pubkey,
    multisig: &Pubkey,
    transaction: &Pubkey,
    owner: &Pubkey,
) -> std::io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*multisig, false),
            AccountMeta::new(*transaction, false),
            AccountMeta::new(*owner, true),
        ],
        data: MultisigInstruction::CloseTransaction.data()?,
    })
}
