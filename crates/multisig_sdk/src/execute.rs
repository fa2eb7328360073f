use {
    crate::state::TxInstruction,
    solana_sdk::{instruction::AccountMeta, pubkey::Pubkey},
};

/// Builds the accounts appended to an execute request.
///
/// Every account of every stored instruction comes first, in order, with the signer
/// flag cleared wherever the account is the multisig signer `authority` (the program
/// signs for it during execution). Then one readonly entry per instruction for its
/// program id, in instruction order and without de-duplication, since the program
/// resolves them by position.
pub fn remaining_accounts(instructions: &[TxInstruction], authority: &Pubkey) -> Vec<AccountMeta> {
    let mut accounts = instructions
        .iter()
        .flat_map(|ix| ix.keys.iter())
        .map(|key| AccountMeta {
            pubkey: key.pubkey,
            is_signer: key.is_signer && key.pubkey != *authority,
            is_writable: key.is_writable,
        })
        .collect::<Vec<_>>();
    accounts.extend(
        instructions
            .iter()
            .map(|ix| AccountMeta::new_readonly(ix.program_id, false)),
    );
    accounts
}

#[cfg(test)]
mod test {
    use {super::*, crate::state::TxAccountMeta};

    #[test]
    fn test_remaining_accounts() {
        let authority = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let spill = Pubkey::new_unique();
        let system = solana_sdk::system_program::id();
        let loader = Pubkey::new_unique();
        let ixs = vec![
            TxInstruction {
                program_id: system,
                keys: vec![
                    TxAccountMeta {
                        pubkey: authority,
                        is_signer: true,
                        is_writable: true,
                    },
                    TxAccountMeta {
                        pubkey: recipient,
                        is_signer: false,
                        is_writable: true,
                    },
                ],
                data: vec![2, 0, 0, 0],
            },
            TxInstruction {
                program_id: loader,
                keys: vec![TxAccountMeta {
                    pubkey: spill,
                    is_signer: true,
                    is_writable: true,
                }],
                data: vec![3, 0, 0, 0],
            },
            TxInstruction {
                program_id: system,
                keys: vec![TxAccountMeta {
                    pubkey: authority,
                    is_signer: true,
                    is_writable: false,
                }],
                data: vec![],
            },
        ];
        let accounts = remaining_accounts(&ixs, &authority);
        assert_eq!(
            accounts,
            vec![
                AccountMeta::new(authority, false),
                AccountMeta::new(recipient, false),
                // only the multisig signer loses its flag
                AccountMeta::new(spill, true),
                AccountMeta::new_readonly(authority, false),
                AccountMeta::new_readonly(system, false),
                AccountMeta::new_readonly(loader, false),
                AccountMeta::new_readonly(system, false),
            ]
        );
    }

    #[test]
    fn test_remaining_accounts_empty() {
        assert!(remaining_accounts(&[], &Pubkey::new_unique()).is_empty());
    }
}
