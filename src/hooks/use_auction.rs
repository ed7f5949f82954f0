use dioxus::prelude::*;

use crate::bid::{current_bid, AuctionParams, BidEntry};
use crate::{RpcHealth, RPC_URL};
use super::rpc::{
    auction_pda, bid_book_pda, fetch_account, fetch_block_time, fetch_slot, parse_auction,
    parse_bid_book,
};

const AUCTION_POLL_MS: u32 = 3_000;

/// Highest auction id probed when discovering the open lots.
const MAX_AUCTION_SCAN: u64 = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct AuctionState {
    pub params: Option<AuctionParams>,
    pub winner: Option<String>,
    pub uri: String,
    pub bids: Vec<BidEntry>,
    pub now: i64,
    pub loading: bool,
}

impl Default for AuctionState {
    fn default() -> Self {
        Self {
            params: None,
            winner: None,
            uri: String::new(),
            bids: Vec::new(),
            now: 0,
            loading: true,
        }
    }
}

/// Live view of one auction plus an imperative refetch for the post-write
/// refreshes.
#[derive(Clone, Copy, PartialEq)]
pub struct AuctionHandle {
    pub state: Signal<AuctionState>,
    tick: Signal<u32>,
}

impl AuctionHandle {
    pub fn refresh(&self) {
        let mut tick = self.tick;
        *tick.write() += 1;
    }
}

pub fn use_auction(auction_id: u64) -> AuctionHandle {
    let mut state = use_signal(AuctionState::default);
    let mut tick = use_signal(|| 0u32);
    let mut health = use_context::<Signal<RpcHealth>>();

    // Drop the previous lot's data when the route swaps ids, so the page
    // reports busy instead of showing the old auction
    let mut last_id = use_signal(|| auction_id);
    if *last_id.peek() != auction_id {
        last_id.set(auction_id);
        state.set(AuctionState::default());
    }

    // Refetches when the tick bumps (poll loop below, refresh()) and when the
    // route hands over a different auction id.
    let _resource = use_resource(use_reactive!(|(auction_id,)| async move {
        let _ = tick();
        match fetch_auction_data(auction_id).await {
            Ok(data) => {
                health.write().degraded = false;
                let mut s = state.write();
                s.params = data.params;
                s.winner = data.winner;
                s.uri = data.uri;
                s.bids = data.bids;
                s.now = data.now;
                s.loading = false;
            }
            Err(e) => {
                tracing::error!("Failed to fetch auction {}: {}", auction_id, e);
                health.write().degraded = true;
                state.write().loading = false;
            }
        }
    }));

    use_future(move || async move {
        loop {
            gloo_timers::future::TimeoutFuture::new(AUCTION_POLL_MS).await;
            *tick.write() += 1;
        }
    });

    AuctionHandle { state, tick }
}

#[derive(Default)]
struct AuctionData {
    params: Option<AuctionParams>,
    winner: Option<String>,
    uri: String,
    bids: Vec<BidEntry>,
    now: i64,
}

async fn fetch_auction_data(auction_id: u64) -> Result<AuctionData, String> {
    let mut data = AuctionData::default();

    // A missing account renders as "not found" rather than an RPC fault
    let auction_bytes = match fetch_account(RPC_URL, &auction_pda(auction_id)).await? {
        Some(bytes) => bytes,
        None => return Ok(data),
    };
    if let Some(account) = parse_auction(&auction_bytes) {
        data.params = Some(account.params);
        data.winner = account.winner;
        data.uri = account.uri;
    }

    if let Ok(Some(book_bytes)) = fetch_account(RPC_URL, &bid_book_pda(auction_id)).await {
        data.bids = parse_bid_book(&book_bytes);
    }

    // The countdown runs on chain time, not the local clock
    let slot = fetch_slot(RPC_URL).await?;
    data.now = fetch_block_time(RPC_URL, slot).await?;

    Ok(data)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuctionSummary {
    pub id: u64,
    pub params: AuctionParams,
    pub winner: Option<String>,
    pub uri: String,
    pub top_bid: u128,
}

#[derive(Clone, Default)]
pub struct AuctionListState {
    pub auctions: Vec<AuctionSummary>,
    pub loading: bool,
}

pub fn use_auction_list() -> Signal<AuctionListState> {
    let mut state = use_signal(|| AuctionListState {
        auctions: Vec::new(),
        loading: true,
    });
    let mut health = use_context::<Signal<RpcHealth>>();

    let _resource = use_resource(move || async move {
        match fetch_auction_list().await {
            Ok(auctions) => {
                health.write().degraded = false;
                let mut s = state.write();
                s.auctions = auctions;
                s.loading = false;
            }
            Err(e) => {
                tracing::error!("Failed to fetch auction list: {}", e);
                health.write().degraded = true;
                state.write().loading = false;
            }
        }
    });

    state
}

/// Auction ids are allocated sequentially from 1, so probe upward until the
/// first missing account.
async fn fetch_auction_list() -> Result<Vec<AuctionSummary>, String> {
    let mut auctions = Vec::new();

    for id in 1..=MAX_AUCTION_SCAN {
        let bytes = match fetch_account(RPC_URL, &auction_pda(id)).await? {
            Some(bytes) => bytes,
            None => break,
        };
        let account = match parse_auction(&bytes) {
            Some(account) => account,
            None => break,
        };

        let bids = match fetch_account(RPC_URL, &bid_book_pda(id)).await? {
            Some(book) => parse_bid_book(&book),
            None => Vec::new(),
        };

        auctions.push(AuctionSummary {
            id,
            params: account.params,
            winner: account.winner,
            uri: account.uri,
            top_bid: current_bid(&bids),
        });
    }

    Ok(auctions)
}
