use dioxus::prelude::*;

use crate::components::{AuctionCard, TiltCard};
use crate::hooks::use_auction_list;

#[component]
pub fn Auctions() -> Element {
    let list = use_auction_list();
    let list_read = list.read();

    rsx! {
        div { class: "space-y-8",
            div {
                h1 { class: "text-3xl font-bold", "Live Auctions" }
                p { class: "text-gray-400 mt-1", "Every open lot, straight from the chain." }
            }

            if list_read.loading {
                div { class: "grid gap-6 md:grid-cols-2 lg:grid-cols-3",
                    for i in 0..6 {
                        div { key: "{i}", class: "card h-44 animate-pulse" }
                    }
                }
            } else if list_read.auctions.is_empty() {
                div { class: "card p-12 text-center text-gray-400",
                    "No auctions are running right now. Check back soon."
                }
            } else {
                div { class: "grid gap-6 md:grid-cols-2 lg:grid-cols-3",
                    for auction in list_read.auctions.iter().cloned() {
                        TiltCard { key: "{auction.id}",
                            AuctionCard { auction }
                        }
                    }
                }
            }
        }
    }
}
