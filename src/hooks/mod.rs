mod use_auction;
mod use_token;
mod tx;
mod rpc;

pub use use_auction::{
    use_auction, use_auction_list, AuctionHandle, AuctionListState, AuctionState, AuctionSummary,
};
pub use use_token::{use_token, TokenHandle, TokenState};
pub use tx::{bid_transaction, stake_transaction};
pub use rpc::*;
