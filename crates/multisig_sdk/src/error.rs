use solana_sdk::pubkey::Pubkey;

/// Errors detected while building a request, before anything reaches the network.
///
/// Rejections coming back from the program are not represented here, they are
/// handed to the caller exactly as the submitter reported them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MultisigError {
    #[error("no instructions supplied")]
    EmptyInstructions,
    #[error("multisig base is empty")]
    EmptyBase,
    #[error("multisig base is {len} bytes, the limit is {limit}")]
    BaseTooLong { len: usize, limit: usize },
    #[error("no valid bump found while deriving the {namespace} address")]
    AddressDerivation { namespace: String },
    #[error("owners list is empty")]
    EmptyOwners,
    #[error("owner {0} is listed more than once")]
    DuplicateOwner(Pubkey),
    #[error("threshold {threshold} must be between 1 and the owner count ({owners})")]
    InvalidThreshold { threshold: u8, owners: usize },
    #[error("unknown multisig {0}")]
    UnknownMultisig(Pubkey),
    #[error("unknown transaction #{index} for multisig {multisig}")]
    UnknownProposal { multisig: Pubkey, index: u32 },
    #[error("account {address} does not hold a {kind} record")]
    AccountDecode { address: Pubkey, kind: &'static str },
}
