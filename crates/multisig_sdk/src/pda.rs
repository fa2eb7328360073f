use {
    crate::{
        encoding::{index_bytes, BASE_LIMIT},
        error::MultisigError,
    },
    solana_sdk::{bpf_loader_upgradeable, pubkey::Pubkey},
};

pub const MULTISIG_SEED: &str = "multisig";
pub const TRANSACTION_SEED: &str = "transaction";

/// Derives a program address from `namespace` followed by `seeds`, in that order.
///
/// An empty namespace adds no tag, which is how the multisig signer is derived.
/// Running out of bump values is fatal, callers should not retry with other seeds.
pub fn derive(
    program_id: &Pubkey,
    namespace: &str,
    seeds: &[&[u8]],
) -> Result<(Pubkey, u8), MultisigError> {
    let mut all_seeds: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
    if !namespace.is_empty() {
        all_seeds.push(namespace.as_bytes());
    }
    all_seeds.extend_from_slice(seeds);
    Pubkey::try_find_program_address(&all_seeds, program_id).ok_or_else(|| {
        MultisigError::AddressDerivation {
            namespace: if namespace.is_empty() {
                "signer".to_string()
            } else {
                namespace.to_string()
            },
        }
    })
}

pub fn multisig_address(
    program_id: &Pubkey,
    base: &[u8; BASE_LIMIT],
) -> Result<(Pubkey, u8), MultisigError> {
    derive(program_id, MULTISIG_SEED, &[base])
}

/// The key the program signs with on behalf of `multisig`, nobody holds its private key
pub fn signer_address(
    program_id: &Pubkey,
    multisig: &Pubkey,
) -> Result<(Pubkey, u8), MultisigError> {
    derive(program_id, "", &[multisig.as_ref()])
}

pub fn transaction_address(
    program_id: &Pubkey,
    multisig: &Pubkey,
    index: u32,
) -> Result<(Pubkey, u8), MultisigError> {
    derive(
        program_id,
        TRANSACTION_SEED,
        &[multisig.as_ref(), &index_bytes(index)],
    )
}

/// programdata account of an upgradeable program
pub fn program_data_address(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[program_id.as_ref()], &bpf_loader_upgradeable::id()).0
}

#[cfg(test)]
mod test {
    use {super::*, crate::encoding::encode_base};

    #[test]
    fn test_derive_is_stable() {
        let base = encode_base("treasury").unwrap();
        let first = multisig_address(&crate::ID, &base).unwrap();
        for _ in 0..5 {
            assert_eq!(multisig_address(&crate::ID, &base).unwrap(), first);
        }
        let expected = Pubkey::find_program_address(&[b"multisig", &base], &crate::ID);
        assert_eq!(first, expected);

        let other = multisig_address(&crate::ID, &encode_base("treasury2").unwrap()).unwrap();
        assert_ne!(first.0, other.0);
        // same seeds, different program
        let foreign = multisig_address(&Pubkey::new_unique(), &base).unwrap();
        assert_ne!(first.0, foreign.0);
    }

    #[test]
    fn test_signer_address_has_no_tag() {
        let multisig = Pubkey::new_unique();
        let (signer, bump) = signer_address(&crate::ID, &multisig).unwrap();
        assert_eq!(
            (signer, bump),
            Pubkey::find_program_address(&[multisig.as_ref()], &crate::ID)
        );
        assert!(!signer.is_on_curve());
    }

    #[test]
    fn test_transaction_address() {
        let multisig = Pubkey::new_unique();
        let (tx0, _) = transaction_address(&crate::ID, &multisig, 0).unwrap();
        let (tx1, _) = transaction_address(&crate::ID, &multisig, 1).unwrap();
        assert_ne!(tx0, tx1);
        assert_eq!(
            tx1,
            Pubkey::find_program_address(
                &[b"transaction", multisig.as_ref(), &1u32.to_le_bytes()],
                &crate::ID
            )
            .0
        );
        // big endian seeds land somewhere else
        let (be, _) = Pubkey::find_program_address(
            &[b"transaction", multisig.as_ref(), &1u32.to_be_bytes()],
            &crate::ID,
        );
        assert_ne!(tx1, be);
    }

    #[test]
    fn test_derive_rejects_oversized_seed() {
        let oversized = [7u8; 33];
        assert_eq!(
            derive(&crate::ID, MULTISIG_SEED, &[&oversized]).unwrap_err(),
            MultisigError::AddressDerivation {
                namespace: MULTISIG_SEED.to_string()
            }
        );
    }

    #[test]
    fn test_program_data_address() {
        assert_eq!(
            "4Ec7ZxZS6Sbdg5UGSLHbAnM7GQHp2eFd4KYWRexAipQT",
            program_data_address(
                &"JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4"
                    .parse()
                    .unwrap()
            )
            .to_string()
        );
    }
}
