mod auction;
mod auctions;
mod home;
mod stake;

pub use auction::Auction;
pub use auctions::Auctions;
pub use home::Home;
pub use stake::Stake;
