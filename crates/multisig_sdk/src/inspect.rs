use {
    base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine},
    solana_sdk::{
        hash::Hash, instruction::Instruction, message::Message, pubkey::Pubkey,
        transaction::Transaction,
    },
};

pub struct Inspection {
    /// base64 of the serialized message
    pub message: String,
    /// explorer inspector link for the message
    pub url: String,
}

/// Encodes `instructions` as a message with a default blockhash, so the contents of a
/// stored transaction can be reviewed in an explorer before approving it.
pub fn inspect_message(instructions: &[Instruction], fee_payer: &Pubkey, cluster: &str) -> Inspection {
    let message = Message::new_with_blockhash(instructions, Some(fee_payer), &Hash::default());
    encode(&message, cluster)
}

/// Encodes the message of an unsigned request so it can be handed to the other signers
pub fn inspect_transaction(transaction: &Transaction, cluster: &str) -> Inspection {
    encode(&transaction.message, cluster)
}

fn encode(message: &Message, cluster: &str) -> Inspection {
    let encoded = BASE64_STANDARD.encode(message.serialize());
    let url = format!(
        "https://explorer.solana.com/tx/inspector?cluster={cluster}&message={}",
        encode_uri_component(&encoded)
    );
    Inspection {
        message: encoded,
        url,
    }
}

// base64 only needs these three escaped
fn encode_uri_component(value: &str) -> String {
    value
        .replace('+', "%2B")
        .replace('/', "%2F")
        .replace('=', "%3D")
}
