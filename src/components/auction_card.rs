use dioxus::prelude::*;

use crate::bid::format_units;
use crate::hooks::AuctionSummary;
use crate::route::Route;

/// Grid tile for one lot, linking through to its auction page.
#[component]
pub fn AuctionCard(auction: AuctionSummary) -> Element {
    let decimals = auction.params.decimals;
    let top_bid = format_units(auction.top_bid, decimals);
    let buyout = format_units(auction.params.buyout_price, decimals);
    let (status, status_class) = if auction.winner.is_some() {
        ("Settled", "text-gray-500 border-gray-600")
    } else {
        ("Open", "text-amber-400 border-amber-500/50")
    };

    rsx! {
        Link { to: Route::Auction { id: auction.id },
            div { class: "card p-5 space-y-3 transition-colors hover:border-amber-500/50",
                div { class: "flex items-center justify-between",
                    h3 { class: "text-lg font-bold", "Auction #{auction.id}" }
                    span { class: "rounded-full border px-2 py-0.5 text-xs {status_class}",
                        "{status}"
                    }
                }
                p { class: "truncate font-mono text-xs text-gray-500", "{auction.uri}" }
                div { class: "flex justify-between text-sm",
                    span { class: "text-gray-500", "Top bid" }
                    span { class: "font-mono text-gray-300", "{top_bid} TRV2" }
                }
                div { class: "flex justify-between text-sm",
                    span { class: "text-gray-500", "Buyout" }
                    span { class: "font-mono text-gray-300", "{buyout} TRV2" }
                }
            }
        }
    }
}
