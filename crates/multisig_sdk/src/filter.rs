//! memcmp predicates over the program's account layouts

use {
    crate::{encoding::index_bytes, state::ProgramAccount},
    solana_client::rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType},
    solana_sdk::pubkey::Pubkey,
};

// byte offsets into a transaction account, after the 8 byte discriminator
pub const MULTISIG_OFFSET: usize = 8;
pub const INDEX_OFFSET: usize = MULTISIG_OFFSET + 32;
pub const PROPOSER_OFFSET: usize = INDEX_OFFSET + 4;
pub const EXECUTOR_OFFSET: usize = PROPOSER_OFFSET + 32;

/// matches accounts whose data contains `bytes` at `offset`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl AccountFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }

    /// restricts a scan to records of type `T`
    pub fn discriminator<T: ProgramAccount>() -> Self {
        Self::new(0, T::discriminator())
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        match data.get(self.offset..self.offset + self.bytes.len()) {
            Some(window) => window == self.bytes.as_slice(),
            None => false,
        }
    }
}

impl From<&AccountFilter> for RpcFilterType {
    fn from(filter: &AccountFilter) -> Self {
        RpcFilterType::Memcmp(Memcmp::new(
            filter.offset,
            MemcmpEncodedBytes::Bytes(filter.bytes.clone()),
        ))
    }
}

/// Attribute predicates for transaction scans, every field that is set must match
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub multisig: Pubkey,
    pub index: Option<u32>,
    pub proposer: Option<Pubkey>,
    pub executor: Option<Pubkey>,
}

impl TransactionFilter {
    pub fn new(multisig: Pubkey) -> Self {
        Self {
            multisig,
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_proposer(mut self, proposer: Pubkey) -> Self {
        self.proposer = Some(proposer);
        self
    }

    pub fn with_executor(mut self, executor: Pubkey) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn to_filters(&self) -> Vec<AccountFilter> {
        let mut filters = vec![
            AccountFilter::discriminator::<crate::state::Transaction>(),
            AccountFilter::new(MULTISIG_OFFSET, self.multisig.to_bytes()),
        ];
        if let Some(index) = self.index {
            filters.push(AccountFilter::new(INDEX_OFFSET, index_bytes(index)));
        }
        if let Some(proposer) = self.proposer {
            filters.push(AccountFilter::new(PROPOSER_OFFSET, proposer.to_bytes()));
        }
        if let Some(executor) = self.executor {
            filters.push(AccountFilter::new(EXECUTOR_OFFSET, executor.to_bytes()));
        }
        filters
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        self.to_filters().iter().all(|filter| filter.matches(data))
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{pda, state::Transaction},
    };

    fn transaction(multisig: Pubkey, index: u32, proposer: Pubkey) -> Vec<u8> {
        Transaction {
            multisig,
            index,
            proposer,
            executor: Pubkey::default(),
            instructions: vec![],
            signers: vec![true],
            owner_set_seqno: 0,
            executed_at: None,
            created_at: 0,
            bump: 255,
        }
        .to_account_data()
        .unwrap()
    }

    #[test]
    fn test_filters_compose() {
        let multisig = Pubkey::new_unique();
        let proposer = Pubkey::new_unique();
        let data = transaction(multisig, 3, proposer);

        assert!(TransactionFilter::new(multisig).matches(&data));
        assert!(TransactionFilter::new(multisig).with_index(3).matches(&data));
        assert!(TransactionFilter::new(multisig)
            .with_index(3)
            .with_proposer(proposer)
            .matches(&data));
        assert!(!TransactionFilter::new(multisig).with_index(4).matches(&data));
        assert!(!TransactionFilter::new(Pubkey::new_unique()).matches(&data));
        assert!(!TransactionFilter::new(multisig)
            .with_index(3)
            .with_proposer(Pubkey::new_unique())
            .matches(&data));
        assert!(!TransactionFilter::new(multisig)
            .with_executor(proposer)
            .matches(&data));
    }

    #[test]
    fn test_index_filter_matches_seed_bytes() {
        let multisig = Pubkey::new_unique();
        let filters = TransactionFilter::new(multisig).with_index(258).to_filters();
        let index_filter = filters
            .iter()
            .find(|filter| filter.offset == INDEX_OFFSET)
            .unwrap();
        // the bytes used for the index seed are the bytes the filter compares
        assert_eq!(index_filter.bytes, index_bytes(258).to_vec());
        let seeded = pda::transaction_address(&crate::ID, &multisig, 258).unwrap();
        let manual = Pubkey::find_program_address(
            &[b"transaction", multisig.as_ref(), &index_filter.bytes],
            &crate::ID,
        );
        assert_eq!(seeded, manual);
    }

    #[test]
    fn test_filter_out_of_bounds() {
        let filter = AccountFilter::new(6, vec![1, 2, 3]);
        assert!(!filter.matches(&[0u8; 8]));
        assert!(filter.matches(&[0, 0, 0, 0, 0, 0, 1, 2, 3]));
    }
}
