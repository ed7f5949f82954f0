use wasm_bindgen::prelude::*;
use js_sys::{Promise, Reflect, Uint8Array};

use crate::bid::{WriteError, SIMULATION_ERROR};
use crate::{RPC_URL, TROVE2_MINT};
use super::rpc::{
    associated_token_pda, auction_pda, bid_book_pda, escrow_pda, stake_pda, RpcRequest,
    RpcResponse, TOKEN_PROGRAM,
};

pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

// Instruction discriminators (program instruction.rs)
const BID_DISCRIMINATOR: u8 = 1;
const STAKE_DISCRIMINATOR: u8 = 2;

/// JSON-RPC error code Solana returns when preflight simulation fails.
const SIMULATION_ERROR_CODE: i64 = -32002;

/// Place a bid on an auction via Phantom.
#[cfg(feature = "web")]
pub async fn bid_transaction(
    authority: &str,
    auction_id: u64,
    amount: u64,
) -> Result<String, WriteError> {
    let auction = auction_pda(auction_id);
    let bid_book = bid_book_pda(auction_id);
    let escrow = escrow_pda();
    let bidder_tokens = associated_token_pda(authority, TROVE2_MINT);

    let ix_data = bid_instruction_data(auction_id, amount);
    let blockhash = fetch_recent_blockhash(RPC_URL).await.map_err(infra_error)?;

    // Accounts in program order:
    // 0: signer (writable, signer)
    // 1: auction (writable)
    // 2: bid book (writable)
    // 3: bidder token account (writable)
    // 4: escrow authority (readonly)
    // 5: system_program (readonly)
    // 6: token_program (readonly)
    let accounts = vec![
        (authority, true, true),
        (&auction as &str, true, false),
        (&bid_book as &str, true, false),
        (&bidder_tokens as &str, true, false),
        (&escrow as &str, false, false),
        (SYSTEM_PROGRAM, false, false),
        (TOKEN_PROGRAM, false, false),
    ];

    let tx_bytes = build_transaction_bytes(
        authority,
        &accounts,
        crate::PROGRAM_ID,
        &ix_data,
        &blockhash,
    )
    .map_err(infra_error)?;

    send_transaction_phantom(&tx_bytes).await
}

/// Lock tokens until `unlock_at` via Phantom.
#[cfg(feature = "web")]
pub async fn stake_transaction(
    authority: &str,
    amount: u64,
    unlock_at: i64,
) -> Result<String, WriteError> {
    let stake = stake_pda(authority);
    let escrow = escrow_pda();
    let staker_tokens = associated_token_pda(authority, TROVE2_MINT);

    let ix_data = stake_instruction_data(amount, unlock_at);
    let blockhash = fetch_recent_blockhash(RPC_URL).await.map_err(infra_error)?;

    // Accounts in program order:
    // 0: signer (writable, signer)
    // 1: stake (writable)
    // 2: staker token account (writable)
    // 3: escrow authority (readonly)
    // 4: system_program (readonly)
    // 5: token_program (readonly)
    let accounts = vec![
        (authority, true, true),
        (&stake as &str, true, false),
        (&staker_tokens as &str, true, false),
        (&escrow as &str, false, false),
        (SYSTEM_PROGRAM, false, false),
        (TOKEN_PROGRAM, false, false),
    ];

    let tx_bytes = build_transaction_bytes(
        authority,
        &accounts,
        crate::PROGRAM_ID,
        &ix_data,
        &blockhash,
    )
    .map_err(infra_error)?;

    send_transaction_phantom(&tx_bytes).await
}

// Instruction data: [discriminator] [auction_id (8 bytes)] [amount (8 bytes)]
fn bid_instruction_data(auction_id: u64, amount: u64) -> Vec<u8> {
    let mut ix_data = vec![BID_DISCRIMINATOR];
    ix_data.extend_from_slice(&auction_id.to_le_bytes());
    ix_data.extend_from_slice(&amount.to_le_bytes());
    ix_data
}

// Instruction data: [discriminator] [amount (8 bytes)] [unlock_at (8 bytes)]
fn stake_instruction_data(amount: u64, unlock_at: i64) -> Vec<u8> {
    let mut ix_data = vec![STAKE_DISCRIMINATOR];
    ix_data.extend_from_slice(&amount.to_le_bytes());
    ix_data.extend_from_slice(&unlock_at.to_le_bytes());
    ix_data
}

fn infra_error(message: String) -> WriteError {
    WriteError {
        name: "TransactionError".to_string(),
        message,
    }
}

/// Map a wallet/RPC rejection to the structured error the bid flow inspects.
/// Only the preflight-simulation code gets the simulation name; everything
/// else stays generic.
fn classify_write_error(code: Option<i64>, message: String) -> WriteError {
    let name = if code == Some(SIMULATION_ERROR_CODE) {
        SIMULATION_ERROR.to_string()
    } else {
        "TransactionError".to_string()
    };
    WriteError { name, message }
}

async fn fetch_recent_blockhash(rpc_url: &str) -> Result<String, String> {
    let client = reqwest::Client::new();

    let request = RpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method: "getLatestBlockhash",
        params: vec![],
    };

    let response = client
        .post(rpc_url)
        .json(&request)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    #[derive(serde::Deserialize)]
    struct BlockhashResult {
        value: BlockhashValue,
    }

    #[derive(serde::Deserialize)]
    struct BlockhashValue {
        blockhash: String,
    }

    let rpc_response: RpcResponse<BlockhashResult> = response
        .json()
        .await
        .map_err(|e| e.to_string())?;

    if let Some(error) = rpc_response.error {
        return Err(error.message);
    }

    rpc_response
        .result
        .map(|r| r.value.blockhash)
        .ok_or_else(|| "No blockhash returned".to_string())
}

/// Send a serialized transaction via Phantom's `signAndSendTransaction`.
#[cfg(feature = "web")]
async fn send_transaction_phantom(tx_bytes: &[u8]) -> Result<String, WriteError> {
    let window = web_sys::window().ok_or_else(|| infra_error("No window".to_string()))?;

    let solana = Reflect::get(&window, &JsValue::from_str("solana"))
        .map_err(|_| infra_error("Phantom not found".to_string()))?;

    if solana.is_undefined() {
        return Err(infra_error("Phantom wallet not connected".to_string()));
    }

    let tx_array = Uint8Array::new_with_length(tx_bytes.len() as u32);
    tx_array.copy_from(tx_bytes);

    let sign_fn = Reflect::get(&solana, &JsValue::from_str("signAndSendTransaction"))
        .map_err(|_| infra_error("No signAndSendTransaction method".to_string()))?;

    let sign_fn: js_sys::Function = sign_fn
        .dyn_into()
        .map_err(|_| infra_error("signAndSendTransaction is not a function".to_string()))?;

    let promise = sign_fn
        .call1(&solana, &tx_array.into())
        .map_err(|e| infra_error(format!("Sign call failed: {:?}", e)))?;

    let promise: Promise = promise
        .dyn_into()
        .map_err(|_| infra_error("Not a promise".to_string()))?;

    let result = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(|e| write_error_from_js(&e))?;

    let signature = Reflect::get(&result, &JsValue::from_str("signature"))
        .ok()
        .and_then(|s| s.as_string())
        .ok_or_else(|| infra_error("No signature in response".to_string()))?;

    Ok(signature)
}

/// Pull `code`/`message` out of a rejected Phantom promise. Phantom surfaces
/// the RPC error object, so a failed preflight arrives here with -32002.
#[cfg(feature = "web")]
fn write_error_from_js(err: &JsValue) -> WriteError {
    let code = Reflect::get(err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);
    let message = Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("Transaction rejected: {:?}", err));
    classify_write_error(code, message)
}

/// Build a legacy Solana transaction as raw bytes.
/// Returns the unsigned transaction (Phantom signs and prepends).
fn build_transaction_bytes(
    fee_payer: &str,
    accounts: &[(&str, bool, bool)], // (pubkey, writable, signer)
    program_id: &str,
    ix_data: &[u8],
    blockhash: &str,
) -> Result<Vec<u8>, String> {
    // Legacy transaction format:
    // Message header: [num_required_signatures, num_readonly_signed, num_readonly_unsigned]
    // Account addresses: [compact-u16 count][...32-byte pubkeys]
    // Recent blockhash: [32 bytes]
    // Instructions: [compact-u16 count][...instructions]
    // Each instruction: [program_id_index][compact-u16 account_count][...account_indices][compact-u16 data_len][...data]

    // Deduplicate accounts and build lookup
    let mut unique_accounts: Vec<String> = Vec::new();
    let mut account_metas: Vec<(usize, bool, bool)> = Vec::new(); // (index, writable, signer)

    // Fee payer is always first and signer
    unique_accounts.push(fee_payer.to_string());

    for (pubkey, writable, signer) in accounts {
        if let Some(idx) = unique_accounts.iter().position(|a| a == *pubkey) {
            account_metas.push((idx, *writable, *signer));
        } else {
            account_metas.push((unique_accounts.len(), *writable, *signer));
            unique_accounts.push(pubkey.to_string());
        }
    }

    // Add program ID
    let program_idx = if let Some(idx) = unique_accounts.iter().position(|a| a == program_id) {
        idx
    } else {
        let idx = unique_accounts.len();
        unique_accounts.push(program_id.to_string());
        idx
    };

    // Header counts
    let num_signers = 1u8; // Only the fee payer/authority signs
    let num_readonly_signed = 0u8;
    let num_readonly_unsigned = unique_accounts
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            *i > 0 && !account_metas.iter().any(|(idx, w, s)| *idx == *i && (*w || *s))
        })
        .count() as u8;

    let mut message = Vec::new();

    message.push(num_signers);
    message.push(num_readonly_signed);
    message.push(num_readonly_unsigned);

    // Account addresses (compact array)
    message.extend(compact_u16(unique_accounts.len() as u16));
    for account in &unique_accounts {
        let bytes = bs58::decode(account).into_vec().map_err(|e| e.to_string())?;
        if bytes.len() != 32 {
            return Err(format!("Invalid pubkey length: {} for {}", bytes.len(), account));
        }
        message.extend(&bytes);
    }

    // Recent blockhash
    let blockhash_bytes = bs58::decode(blockhash).into_vec().map_err(|e| e.to_string())?;
    if blockhash_bytes.len() != 32 {
        return Err("Invalid blockhash length".to_string());
    }
    message.extend(&blockhash_bytes);

    // Instructions (1 instruction)
    message.extend(compact_u16(1));

    message.push(program_idx as u8);

    let ix_account_indices: Vec<u8> = account_metas.iter().map(|(idx, _, _)| *idx as u8).collect();
    message.extend(compact_u16(ix_account_indices.len() as u16));
    message.extend(&ix_account_indices);

    message.extend(compact_u16(ix_data.len() as u16));
    message.extend(ix_data);

    // For unsigned transaction, prepend empty signature count
    let mut tx = Vec::new();
    tx.push(0u8); // 0 signatures (wallet will add)
    tx.extend(&message);

    Ok(tx)
}

/// Encode u16 as Solana compact-u16 format
fn compact_u16(val: u16) -> Vec<u8> {
    if val < 0x80 {
        vec![val as u8]
    } else if val < 0x4000 {
        vec![(val & 0x7f) as u8 | 0x80, (val >> 7) as u8]
    } else {
        vec![
            (val & 0x7f) as u8 | 0x80,
            ((val >> 7) & 0x7f) as u8 | 0x80,
            (val >> 14) as u8,
        ]
    }
}

#[cfg(not(feature = "web"))]
pub async fn bid_transaction(
    _authority: &str,
    _auction_id: u64,
    _amount: u64,
) -> Result<String, WriteError> {
    Err(infra_error("Bidding only available in web mode".to_string()))
}

#[cfg(not(feature = "web"))]
pub async fn stake_transaction(
    _authority: &str,
    _amount: u64,
    _unlock_at: i64,
) -> Result<String, WriteError> {
    Err(infra_error("Staking only available in web mode".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_u16_switches_width_at_the_boundaries() {
        assert_eq!(compact_u16(0), vec![0]);
        assert_eq!(compact_u16(0x7f), vec![0x7f]);
        assert_eq!(compact_u16(0x80), vec![0x80, 0x01]);
        assert_eq!(compact_u16(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(compact_u16(0x4000), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn bid_instruction_data_lays_out_id_then_amount() {
        let data = bid_instruction_data(7, 1_500);
        assert_eq!(data.len(), 17);
        assert_eq!(data[0], BID_DISCRIMINATOR);
        assert_eq!(data[1..9], 7u64.to_le_bytes());
        assert_eq!(data[9..17], 1_500u64.to_le_bytes());
    }

    #[test]
    fn stake_instruction_data_lays_out_amount_then_unlock() {
        let data = stake_instruction_data(2_000, -5);
        assert_eq!(data.len(), 17);
        assert_eq!(data[0], STAKE_DISCRIMINATOR);
        assert_eq!(data[1..9], 2_000u64.to_le_bytes());
        assert_eq!(data[9..17], (-5i64).to_le_bytes());
    }

    #[test]
    fn transaction_message_dedups_accounts_and_counts_readonly() {
        let payer = bs58::encode([1u8; 32]).into_string();
        let state = bs58::encode([2u8; 32]).into_string();
        let program = bs58::encode([3u8; 32]).into_string();
        let blockhash = bs58::encode([4u8; 32]).into_string();

        let accounts = vec![
            (payer.as_str(), true, true),
            (state.as_str(), true, false),
            (state.as_str(), false, false), // repeat must reuse the index
            (SYSTEM_PROGRAM, false, false),
        ];

        let tx = build_transaction_bytes(&payer, &accounts, &program, &[9, 9], &blockhash).unwrap();

        assert_eq!(tx[0], 0); // unsigned, wallet appends signatures
        assert_eq!(tx[1], 1); // fee payer signs
        assert_eq!(tx[2], 0);
        assert_eq!(tx[3], 2); // system program and the trove program are readonly
        assert_eq!(tx[4], 4); // payer, state, system, program
        assert_eq!(&tx[5..37], &[1u8; 32]); // fee payer first
        assert_eq!(&tx[133..165], &[4u8; 32]); // blockhash after the accounts
        assert_eq!(tx[165], 1); // one instruction
        assert_eq!(tx[166], 3); // program index
        assert_eq!(&tx[168..172], &[0, 1, 1, 2]); // state appears once, referenced twice
        assert_eq!(&tx[173..175], &[9, 9]);
        assert_eq!(tx.len(), 175);
    }

    #[test]
    fn only_the_preflight_code_maps_to_a_simulation_error() {
        let err = classify_write_error(Some(-32002), "custom program error: 0x1".to_string());
        assert_eq!(err.name, SIMULATION_ERROR);
        assert!(err.is_simulation());

        let err = classify_write_error(Some(4001), "User rejected the request".to_string());
        assert_eq!(err.name, "TransactionError");
        assert!(!err.is_simulation());

        assert!(!classify_write_error(None, "timeout".to_string()).is_simulation());
    }

    #[test]
    fn malformed_pubkeys_are_rejected_before_send() {
        let payer = bs58::encode([1u8; 32]).into_string();
        let program = bs58::encode([3u8; 32]).into_string();
        let blockhash = bs58::encode([4u8; 32]).into_string();
        let accounts = vec![(payer.as_str(), true, true), ("short", true, false)];

        let result = build_transaction_bytes(&payer, &accounts, &program, &[1], &blockhash);
        assert!(result.is_err());
    }
}
