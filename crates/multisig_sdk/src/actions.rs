//! Canned instructions for common multisig proposals, plus the json format used for
//! instruction files.

use {
    anyhow::{Context, Result},
    serde::{Deserialize, Serialize},
    solana_sdk::{
        bpf_loader_upgradeable,
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_instruction,
    },
    std::str::FromStr,
};

/// moves `lamports` out of the multisig signer
pub fn transfer_sol(authority: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    system_instruction::transfer(authority, to, lamports)
}

/// hands the upgrade authority of `program` from the multisig signer to `new_authority`
pub fn set_upgrade_authority(program: &Pubkey, authority: &Pubkey, new_authority: &Pubkey) -> Instruction {
    bpf_loader_upgradeable::set_upgrade_authority(program, authority, Some(new_authority))
}

/// Upgrades `program` from `buffer`, the multisig signer being the upgrade authority.
/// Lamports left in the buffer go to `spill`.
pub fn upgrade_program(program: &Pubkey, buffer: &Pubkey, authority: &Pubkey, spill: &Pubkey) -> Instruction {
    bpf_loader_upgradeable::upgrade(program, buffer, authority, spill)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstructionJson {
    pub program_id: String,
    pub keys: Vec<AccountMetaJson>,
    #[serde(default)]
    pub data: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountMetaJson {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl TryFrom<InstructionJson> for Instruction {
    type Error = anyhow::Error;

    fn try_from(ix: InstructionJson) -> Result<Self> {
        Ok(Instruction {
            program_id: Pubkey::from_str(&ix.program_id)
                .with_context(|| format!("invalid program id {}", ix.program_id))?,
            accounts: ix
                .keys
                .into_iter()
                .map(|key| {
                    Ok(AccountMeta {
                        pubkey: Pubkey::from_str(&key.pubkey)
                            .with_context(|| format!("invalid account {}", key.pubkey))?,
                        is_signer: key.is_signer,
                        is_writable: key.is_writable,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            data: ix.data,
        })
    }
}

impl From<&Instruction> for InstructionJson {
    fn from(ix: &Instruction) -> Self {
        Self {
            program_id: ix.program_id.to_string(),
            keys: ix
                .accounts
                .iter()
                .map(|meta| AccountMetaJson {
                    pubkey: meta.pubkey.to_string(),
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                })
                .collect(),
            data: ix.data.clone(),
        }
    }
}

/// parses a json array of instructions
pub fn parse_instructions(json: &str) -> Result<Vec<Instruction>> {
    serde_json::from_str::<Vec<InstructionJson>>(json)
        .with_context(|| "failed to deserialize instructions")?
        .into_iter()
        .map(Instruction::try_from)
        .collect()
}

pub fn instructions_to_json(instructions: &[Instruction]) -> Result<String> {
    serde_json::to_string_pretty(
        &instructions
            .iter()
            .map(InstructionJson::from)
            .collect::<Vec<_>>(),
    )
    .with_context(|| "failed to serialize instructions")
}
