#![allow(non_snake_case)]

mod bid;
mod clock;
mod components;
mod hooks;
mod loading;
mod pages;
mod route;

use dioxus::prelude::*;
use route::Route;

use components::Toasts;

// Configuration
pub const PROGRAM_ID: &str = "9TrvAuc7JH2PkWq5mLxgR4dNeZsYB3tUuFDVhaKj6wEp";
pub const RPC_URL: &str = "https://api.devnet.solana.com";
pub const TROVE2_MINT: &str = "5TRV2mWnYqKx8gJcLdPeHbZaUuS4NhFt7DkRv3sM9yEw";

// PDA seeds (matching the trove program)
pub const AUCTION_SEED: &[u8] = b"auction";
pub const BIDS_SEED: &[u8] = b"bids";
pub const ESCROW_SEED: &[u8] = b"escrow";
pub const STAKE_SEED: &[u8] = b"stake";

fn main() {
    #[cfg(feature = "web")]
    {
        tracing_wasm::set_as_global_default();
        dioxus::launch(App);
    }

    #[cfg(feature = "desktop")]
    {
        dioxus::launch(App);
    }
}

#[component]
fn App() -> Element {
    // Global state providers
    use_context_provider(|| Signal::new(WalletState::default()));
    use_context_provider(|| Signal::new(RpcHealth::default()));
    use_context_provider(|| Signal::new(Toasts::default()));

    components::use_eager_reconnect();

    rsx! {
        Router::<Route> {}
    }
}

// Global state types
#[derive(Clone, Default, Debug)]
pub struct WalletState {
    pub connected: bool,
    pub pubkey: Option<String>,
}

/// Set when auction polling stops getting answers from the RPC node.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct RpcHealth {
    pub degraded: bool,
}
