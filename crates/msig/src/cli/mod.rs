use {
    clap::{Args, Parser, Subcommand},
    solana_sdk::pubkey::Pubkey,
};

#[derive(Parser)]
#[command(name = "msig", about = "propose, approve and execute multisig transactions")]
pub struct Cli {
    #[arg(long, default_value = "info", help = "log verbosity to use")]
    pub log_level: String,

    #[arg(long, default_value = "", help = "optionally output logs to this file")]
    pub log_file: String,

    #[arg(long, default_value = "msig.yaml")]
    pub config: String,

    #[arg(long, global = true, help = "keypair to sign and pay with, overrides the config")]
    pub keypair: Option<String>,

    #[arg(long, global = true, help = "rpc endpoint, overrides the config")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "initialize a new config file")]
    NewConfig,

    #[command(about = "multisig account management")]
    Multisig {
        #[command(subcommand)]
        command: MultisigCommands,
    },

    #[command(about = "multisig transaction management")]
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },

    #[command(about = "approve a transaction")]
    Approve {
        index: u32,

        #[command(flatten)]
        target: MultisigArg,

        #[arg(
            long,
            help = "owner approving, defaults to the keypair",
            long_help = "owner approving, defaults to the keypair. For any other owner the \
                         unsigned request is printed for that owner to sign instead of being sent"
        )]
        owner: Option<Pubkey>,
    },

    #[command(about = "approve every pending transaction not yet approved by the keypair")]
    ApproveAll {
        #[command(flatten)]
        target: MultisigArg,
    },

    #[command(about = "execute an approved transaction")]
    Execute {
        index: u32,

        #[command(flatten)]
        target: MultisigArg,
    },

    #[command(about = "propose common multisig actions")]
    Action {
        #[command(subcommand)]
        command: ActionCommands,
    },
}

#[derive(Args, Clone, Debug)]
pub struct MultisigArg {
    #[arg(long, help = "base the multisig was created with")]
    pub multisig: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum MultisigCommands {
    #[command(about = "create a new multisig")]
    New {
        #[arg(long, value_delimiter = ',', required = true, help = "comma separated owners")]
        keys: Vec<Pubkey>,

        #[arg(long)]
        threshold: u8,

        #[arg(long, help = "seed for the multisig address, random when omitted")]
        base: Option<String>,
    },

    #[command(about = "show a multisig")]
    Show { base: String },

    #[command(about = "list multisigs the keypair is an owner of")]
    Owned,

    #[command(about = "propose a new owner set")]
    SetOwners {
        #[command(flatten)]
        target: MultisigArg,

        #[arg(long, value_delimiter = ',', required = true, help = "comma separated owners")]
        keys: Vec<Pubkey>,
    },

    #[command(about = "propose a new threshold")]
    ChangeThreshold {
        #[command(flatten)]
        target: MultisigArg,

        #[arg(long)]
        threshold: u8,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum TxCommands {
    #[command(about = "propose the instructions stored in a json file")]
    New {
        file: String,

        #[command(flatten)]
        target: MultisigArg,

        #[arg(long, help = "transaction index, defaults to the next free one")]
        index: Option<u32>,
    },

    #[command(about = "show a transaction")]
    Show {
        index: u32,

        #[command(flatten)]
        target: MultisigArg,
    },

    #[command(about = "list transactions of a multisig")]
    All {
        #[command(flatten)]
        target: MultisigArg,

        #[arg(long)]
        index: Option<u32>,

        #[arg(long)]
        proposer: Option<Pubkey>,

        #[arg(long)]
        executor: Option<Pubkey>,
    },

    #[command(about = "close a transaction, reclaiming its rent")]
    Delete {
        index: u32,

        #[command(flatten)]
        target: MultisigArg,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum ActionCommands {
    #[command(about = "propose a sol transfer out of the multisig signer")]
    TransferSol {
        #[command(flatten)]
        target: MultisigArg,

        #[arg(long)]
        to: Pubkey,

        #[arg(long)]
        lamports: u64,

        #[arg(long)]
        index: Option<u32>,
    },

    #[command(about = "propose handing over a program's upgrade authority")]
    SetUpgradeAuthority {
        program: Pubkey,

        #[command(flatten)]
        target: MultisigArg,

        #[arg(long)]
        new_authority: Pubkey,

        #[arg(long)]
        index: Option<u32>,
    },

    #[command(about = "propose a program upgrade from a buffer")]
    UpgradeProgram {
        #[command(flatten)]
        target: MultisigArg,

        #[arg(long)]
        program: Pubkey,

        #[arg(long)]
        buffer: Pubkey,

        #[arg(long)]
        index: Option<u32>,
    },
}
