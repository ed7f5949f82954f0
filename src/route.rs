use dioxus::prelude::*;

use crate::components::Layout;
use crate::pages::{Auction, Auctions, Home, Stake};

#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
    #[route("/")]
    Home {},
    #[route("/auctions")]
    Auctions {},
    #[route("/auction/:id")]
    Auction { id: u64 },
    #[route("/stake")]
    Stake {},
}
