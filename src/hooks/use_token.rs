use dioxus::prelude::*;

use crate::{RpcHealth, WalletState, RPC_URL, TROVE2_MINT};
use super::rpc::{
    associated_token_pda, escrow_pda, fetch_account, parse_mint_decimals, parse_token_account,
};

const TOKEN_POLL_MS: u32 = 2_000;

/// The wallet's TRV2 position. `None` means not fetched yet; the bid flow
/// refuses to validate against unknown figures.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenState {
    pub balance: Option<u128>,
    pub allowance: Option<u128>,
    pub decimals: u8,
    pub loading: bool,
}

impl Default for TokenState {
    fn default() -> Self {
        Self {
            balance: None,
            allowance: None,
            decimals: 0,
            loading: true,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct TokenHandle {
    pub state: Signal<TokenState>,
    tick: Signal<u32>,
}

impl TokenHandle {
    pub fn refresh(&self) {
        let mut tick = self.tick;
        *tick.write() += 1;
    }
}

pub fn use_token() -> TokenHandle {
    let mut state = use_signal(TokenState::default);
    let mut tick = use_signal(|| 0u32);
    let wallet = use_context::<Signal<WalletState>>();
    let mut health = use_context::<Signal<RpcHealth>>();

    // Pubkey as a memo so the resource re-keys on connect/disconnect
    let wallet_pubkey = use_memo(move || wallet.read().pubkey.clone());

    let _resource = use_resource(move || async move {
        let _ = tick();
        let authority = match wallet_pubkey() {
            Some(authority) => authority,
            None => {
                let mut s = state.write();
                s.balance = None;
                s.allowance = None;
                s.loading = false;
                return;
            }
        };

        match fetch_token_data(&authority).await {
            Ok(data) => {
                health.write().degraded = false;
                let mut s = state.write();
                s.balance = data.balance;
                s.allowance = data.allowance;
                s.decimals = data.decimals;
                s.loading = false;
            }
            Err(e) => {
                tracing::error!("Failed to fetch token account: {}", e);
                health.write().degraded = true;
                state.write().loading = false;
            }
        }
    });

    use_future(move || async move {
        loop {
            gloo_timers::future::TimeoutFuture::new(TOKEN_POLL_MS).await;
            *tick.write() += 1;
        }
    });

    TokenHandle { state, tick }
}

#[derive(Default)]
struct TokenData {
    balance: Option<u128>,
    allowance: Option<u128>,
    decimals: u8,
}

async fn fetch_token_data(authority: &str) -> Result<TokenData, String> {
    let mut data = TokenData::default();

    if let Some(bytes) = fetch_account(RPC_URL, TROVE2_MINT).await? {
        if let Some(decimals) = parse_mint_decimals(&bytes) {
            data.decimals = decimals;
        }
    }

    let ata = associated_token_pda(authority, TROVE2_MINT);
    match fetch_account(RPC_URL, &ata).await? {
        Some(bytes) => {
            if let Some(account) = parse_token_account(&bytes) {
                data.balance = Some(account.amount as u128);
                // Delegation to anyone but the escrow authority spends
                // nothing here
                let escrow = escrow_pda();
                let delegated = account.delegate.as_deref() == Some(escrow.as_str());
                data.allowance = Some(if delegated {
                    account.delegated_amount as u128
                } else {
                    0
                });
            }
        }
        // A wallet without a token account simply holds zero
        None => {
            data.balance = Some(0);
            data.allowance = Some(0);
        }
    }

    Ok(data)
}
