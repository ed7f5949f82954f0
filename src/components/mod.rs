mod layout;
mod auction_card;
mod bid_form;
mod stats;
mod tilt_card;
mod time_picker;
mod toast;
mod wallet_button;

pub use layout::Layout;
pub use auction_card::AuctionCard;
pub use bid_form::BidForm;
pub use stats::{StatCard, StatRow};
pub use tilt_card::TiltCard;
pub use time_picker::TimePicker;
pub use toast::{push_notice, Toaster, Toasts};
pub use wallet_button::WalletButton;
pub use wallet_button::{request_connect, use_eager_reconnect};
