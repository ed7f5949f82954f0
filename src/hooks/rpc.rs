use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::bid::{AuctionParams, BidEntry};
use crate::{AUCTION_SEED, BIDS_SEED, ESCROW_SEED, PROGRAM_ID, STAKE_SEED};

#[derive(Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: Vec<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Deserialize, Debug)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct AccountInfo {
    pub data: (String, String), // (base64 data, encoding)
    pub lamports: u64,
    pub owner: String,
}

#[derive(Deserialize, Debug)]
pub struct AccountResult {
    pub value: Option<AccountInfo>,
}

pub async fn fetch_account(rpc_url: &str, pubkey: &str) -> Result<Option<Vec<u8>>, String> {
    let client = reqwest::Client::new();

    let request = RpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method: "getAccountInfo",
        params: vec![
            serde_json::json!(pubkey),
            serde_json::json!({
                "encoding": "base64"
            }),
        ],
    };

    let response = client
        .post(rpc_url)
        .json(&request)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let rpc_response: RpcResponse<AccountResult> = response
        .json()
        .await
        .map_err(|e| e.to_string())?;

    if let Some(error) = rpc_response.error {
        return Err(error.message);
    }

    if let Some(result) = rpc_response.result {
        if let Some(account) = result.value {
            let data = base64::engine::general_purpose::STANDARD
                .decode(&account.data.0)
                .map_err(|e| e.to_string())?;
            return Ok(Some(data));
        }
    }

    Ok(None)
}

pub async fn fetch_slot(rpc_url: &str) -> Result<u64, String> {
    let client = reqwest::Client::new();

    let request = RpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method: "getSlot",
        params: vec![],
    };

    let response = client
        .post(rpc_url)
        .json(&request)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let rpc_response: RpcResponse<u64> = response
        .json()
        .await
        .map_err(|e| e.to_string())?;

    if let Some(error) = rpc_response.error {
        return Err(error.message);
    }

    rpc_response.result.ok_or_else(|| "No slot returned".to_string())
}

/// Unix time of a slot, used as the authoritative auction clock.
pub async fn fetch_block_time(rpc_url: &str, slot: u64) -> Result<i64, String> {
    let client = reqwest::Client::new();

    let request = RpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method: "getBlockTime",
        params: vec![serde_json::json!(slot)],
    };

    let response = client
        .post(rpc_url)
        .json(&request)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let rpc_response: RpcResponse<i64> = response
        .json()
        .await
        .map_err(|e| e.to_string())?;

    if let Some(error) = rpc_response.error {
        return Err(error.message);
    }

    rpc_response.result.ok_or_else(|| "No block time returned".to_string())
}

// PDA derivation (simplified - matches Solana's find_program_address)
pub fn derive_pda(seeds: &[&[u8]], program_id: &str) -> String {
    use sha2::{Digest, Sha256};

    let program_bytes = bs58::decode(program_id).into_vec().unwrap_or_default();

    for bump in (0..=255u8).rev() {
        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update(&[bump]);
        hasher.update(&program_bytes);
        hasher.update(b"ProgramDerivedAddress");

        let hash = hasher.finalize();

        // Off-curve check, simplified
        if hash[31] & 0x80 == 0 {
            return bs58::encode(&hash[..32]).into_string();
        }
    }

    String::new()
}

pub fn auction_pda(auction_id: u64) -> String {
    derive_pda(&[AUCTION_SEED, &auction_id.to_le_bytes()], PROGRAM_ID)
}

pub fn bid_book_pda(auction_id: u64) -> String {
    derive_pda(&[BIDS_SEED, &auction_id.to_le_bytes()], PROGRAM_ID)
}

/// Authority the program expects as the token delegate; bids only clear
/// through an allowance granted to it.
pub fn escrow_pda() -> String {
    derive_pda(&[ESCROW_SEED], PROGRAM_ID)
}

pub fn stake_pda(authority: &str) -> String {
    let auth_bytes = bs58::decode(authority).into_vec().unwrap_or_default();
    derive_pda(&[STAKE_SEED, &auth_bytes], PROGRAM_ID)
}

pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const ASSOCIATED_TOKEN_PROGRAM: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// The wallet's token account for a mint.
pub fn associated_token_pda(owner: &str, mint: &str) -> String {
    let owner_bytes = bs58::decode(owner).into_vec().unwrap_or_default();
    let mint_bytes = bs58::decode(mint).into_vec().unwrap_or_default();
    let token_program_bytes = bs58::decode(TOKEN_PROGRAM).into_vec().unwrap_or_default();

    derive_pda(
        &[&owner_bytes, &token_program_bytes, &mint_bytes],
        ASSOCIATED_TOKEN_PROGRAM,
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuctionAccount {
    pub params: AuctionParams,
    pub winner: Option<String>,
    pub uri: String,
}

pub fn parse_auction(bytes: &[u8]) -> Option<AuctionAccount> {
    // Auction account layout (after the 8-byte discriminator):
    // id: u64                - offset 8
    // start: i64             - offset 16
    // duration: u64          - offset 24
    // start_price: u64       - offset 32
    // buyout_price: u64      - offset 40
    // minimum_increment: u64 - offset 48
    // decimals: u8           - offset 56
    // _padding: [u8; 7]      - offset 57
    // winner: Pubkey         - offset 64 (all zeros until settled)
    // uri: [u8; 128]         - offset 96
    if bytes.len() < 224 {
        return None;
    }

    let params = AuctionParams {
        start: i64::from_le_bytes(bytes[16..24].try_into().unwrap_or_default()),
        duration: u64::from_le_bytes(bytes[24..32].try_into().unwrap_or_default()),
        start_price: u64::from_le_bytes(bytes[32..40].try_into().unwrap_or_default()) as u128,
        buyout_price: u64::from_le_bytes(bytes[40..48].try_into().unwrap_or_default()) as u128,
        minimum_increment: u64::from_le_bytes(bytes[48..56].try_into().unwrap_or_default())
            as u128,
        decimals: bytes[56],
    };

    let winner_bytes = &bytes[64..96];
    let winner = if winner_bytes.iter().all(|b| *b == 0) {
        None
    } else {
        Some(bs58::encode(winner_bytes).into_string())
    };

    let uri_bytes = &bytes[96..224];
    let uri_len = uri_bytes.iter().position(|b| *b == 0).unwrap_or(128);
    let uri = String::from_utf8_lossy(&uri_bytes[..uri_len]).into_owned();

    Some(AuctionAccount { params, winner, uri })
}

pub fn parse_bid_book(bytes: &[u8]) -> Vec<BidEntry> {
    // Bid book layout (after the 8-byte discriminator):
    // count: u64            - offset 8
    // entries               - offset 16, stride 48:
    //   bidder: Pubkey      - +0
    //   amount: u64         - +32
    //   claimed: u8         - +40
    //   _padding: [u8; 7]   - +41
    if bytes.len() < 16 {
        return Vec::new();
    }

    let count = u64::from_le_bytes(bytes[8..16].try_into().unwrap_or_default()) as usize;
    let capacity = (bytes.len() - 16) / 48;
    let mut entries = Vec::with_capacity(count.min(capacity));

    for i in 0..count.min(capacity) {
        let offset = 16 + i * 48;
        entries.push(BidEntry {
            bidder: bs58::encode(&bytes[offset..offset + 32]).into_string(),
            amount: u64::from_le_bytes(
                bytes[offset + 32..offset + 40].try_into().unwrap_or_default(),
            ) as u128,
            claimed: bytes[offset + 40] != 0,
        });
    }

    entries
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenAccount {
    pub amount: u64,
    pub delegate: Option<String>,
    pub delegated_amount: u64,
}

pub fn parse_token_account(bytes: &[u8]) -> Option<TokenAccount> {
    // SPL token account layout:
    // mint: Pubkey                     - offset 0
    // owner: Pubkey                    - offset 32
    // amount: u64                      - offset 64
    // delegate: COption<Pubkey>        - offset 72 (4-byte tag + 32)
    // state: u8                        - offset 108
    // is_native: COption<u64>          - offset 109
    // delegated_amount: u64            - offset 121
    // close_authority: COption<Pubkey> - offset 129
    if bytes.len() < 165 {
        return None;
    }

    let amount = u64::from_le_bytes(bytes[64..72].try_into().unwrap_or_default());
    let delegate_tag = u32::from_le_bytes(bytes[72..76].try_into().unwrap_or_default());
    let delegate = if delegate_tag == 1 {
        Some(bs58::encode(&bytes[76..108]).into_string())
    } else {
        None
    };
    let delegated_amount = u64::from_le_bytes(bytes[121..129].try_into().unwrap_or_default());

    Some(TokenAccount {
        amount,
        delegate,
        delegated_amount,
    })
}

pub fn parse_mint_decimals(bytes: &[u8]) -> Option<u8> {
    // SPL mint layout: mint_authority COption<Pubkey> (36) + supply u64 (8),
    // decimals at offset 44
    if bytes.len() < 82 {
        return None;
    }
    Some(bytes[44])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_u64(buf: &mut [u8], offset: usize, value: u64) {
        buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
    }

    fn auction_fixture() -> Vec<u8> {
        let mut buf = vec![0u8; 224];
        put_u64(&mut buf, 8, 3); // id
        put_u64(&mut buf, 16, 1_700_000_000); // start
        put_u64(&mut buf, 24, 86_400); // duration
        put_u64(&mut buf, 32, 1_000); // start price
        put_u64(&mut buf, 40, 50_000); // buyout
        put_u64(&mut buf, 48, 250); // increment
        buf[56] = 9; // decimals
        buf[96..101].copy_from_slice(b"ipfs:");
        buf
    }

    #[test]
    fn auction_account_parses_at_fixed_offsets() {
        let account = parse_auction(&auction_fixture()).unwrap();
        assert_eq!(account.params.start, 1_700_000_000);
        assert_eq!(account.params.duration, 86_400);
        assert_eq!(account.params.start_price, 1_000);
        assert_eq!(account.params.buyout_price, 50_000);
        assert_eq!(account.params.minimum_increment, 250);
        assert_eq!(account.params.decimals, 9);
        assert_eq!(account.winner, None);
        assert_eq!(account.uri, "ipfs:");

        assert_eq!(parse_auction(&[0u8; 100]), None);
    }

    #[test]
    fn settled_auction_exposes_the_winner() {
        let mut buf = auction_fixture();
        buf[64..96].copy_from_slice(&[7u8; 32]);
        let account = parse_auction(&buf).unwrap();
        assert_eq!(account.winner, Some(bs58::encode([7u8; 32]).into_string()));
    }

    #[test]
    fn bid_book_parses_entries_in_order() {
        let mut buf = vec![0u8; 16 + 2 * 48];
        put_u64(&mut buf, 8, 2);
        buf[16..48].copy_from_slice(&[1u8; 32]);
        put_u64(&mut buf, 48, 500);
        buf[64..96].copy_from_slice(&[2u8; 32]);
        put_u64(&mut buf, 96, 750);
        buf[104] = 1; // claimed

        let entries = parse_bid_book(&buf);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, 500);
        assert!(!entries[0].claimed);
        assert_eq!(entries[0].bidder, bs58::encode([1u8; 32]).into_string());
        assert_eq!(entries[1].amount, 750);
        assert!(entries[1].claimed);
    }

    #[test]
    fn bid_book_count_is_capped_by_account_size() {
        let mut buf = vec![0u8; 16 + 48];
        put_u64(&mut buf, 8, 40); // count lies about the data
        put_u64(&mut buf, 48, 123);
        assert_eq!(parse_bid_book(&buf).len(), 1);
        assert!(parse_bid_book(&[0u8; 4]).is_empty());
    }

    #[test]
    fn token_account_reads_amount_and_delegation() {
        let mut buf = vec![0u8; 165];
        put_u64(&mut buf, 64, 12_345);
        buf[72..76].copy_from_slice(&1u32.to_le_bytes());
        buf[76..108].copy_from_slice(&[9u8; 32]);
        put_u64(&mut buf, 121, 600);

        let account = parse_token_account(&buf).unwrap();
        assert_eq!(account.amount, 12_345);
        assert_eq!(account.delegate, Some(bs58::encode([9u8; 32]).into_string()));
        assert_eq!(account.delegated_amount, 600);
    }

    #[test]
    fn undelegated_token_account_has_no_delegate() {
        let mut buf = vec![0u8; 165];
        put_u64(&mut buf, 64, 1);
        put_u64(&mut buf, 121, 600); // stale residue without a delegate
        let account = parse_token_account(&buf).unwrap();
        assert_eq!(account.delegate, None);

        assert_eq!(parse_token_account(&[0u8; 30]), None);
    }

    #[test]
    fn mint_decimals_sit_behind_authority_and_supply() {
        let mut buf = vec![0u8; 82];
        buf[44] = 9;
        assert_eq!(parse_mint_decimals(&buf), Some(9));
        assert_eq!(parse_mint_decimals(&[0u8; 10]), None);
    }
}
