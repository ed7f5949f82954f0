use dioxus::prelude::*;
use crate::route::Route;

#[component]
pub fn Home() -> Element {
    rsx! {
        div { class: "max-w-4xl mx-auto text-center py-16",
            // Hero
            h1 { class: "text-5xl font-bold mb-6",
                span { class: "text-amber-400", "TROVE" }
                span { class: "text-gray-100", " Auctions" }
            }

            p { class: "text-xl text-gray-400 mb-8 max-w-2xl mx-auto",
                "On-chain auctions for relic NFTs. Outbid the room, "
                "buy a lot outright, or stake your TRV2 while you wait."
            }

            // CTA buttons
            div { class: "flex justify-center gap-4 mb-16",
                Link {
                    to: Route::Auctions {},
                    class: "btn btn-primary text-lg px-8 py-3",
                    "Browse Auctions"
                }
                Link {
                    to: Route::Stake {},
                    class: "btn btn-secondary text-lg px-8 py-3",
                    "Stake TRV2"
                }
            }

            // How it works
            div { class: "grid md:grid-cols-3 gap-8 mt-16",
                FeatureCard {
                    title: "Bid",
                    description: "Beat the top bid by the lot's minimum increment before the clock runs out.",
                    icon: "🏺",
                }
                FeatureCard {
                    title: "Win",
                    description: "Hold the top bid at close, or pay the buyout price to end the auction instantly.",
                    icon: "🏆",
                }
                FeatureCard {
                    title: "Stake",
                    description: "Lock TRV2 until a time you pick and collect emissions while it sits.",
                    icon: "⏳",
                }
            }

            // Bidding rules
            div { class: "mt-16 card max-w-xl mx-auto",
                h3 { class: "text-xl font-semibold text-amber-400 mb-4", "House Rules" }
                div { class: "text-left space-y-2 text-gray-300",
                    p {
                        span { class: "text-gray-500", "Opening bid: " }
                        "the lot's start price"
                    }
                    p {
                        span { class: "text-gray-500", "Raises: " }
                        "top bid plus the minimum increment, or more"
                    }
                    p {
                        span { class: "text-gray-500", "Buyout: " }
                        "bids are capped at the buyout price; hitting it wins on the spot"
                    }
                    p {
                        span { class: "text-gray-500", "Funds: " }
                        span { class: "text-amber-400 font-semibold",
                            "bids settle in TRV2 approved to the auction escrow"
                        }
                    }
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct FeatureCardProps {
    title: &'static str,
    description: &'static str,
    icon: &'static str,
}

#[component]
fn FeatureCard(props: FeatureCardProps) -> Element {
    rsx! {
        div { class: "card text-center",
            div { class: "text-4xl mb-4", "{props.icon}" }
            h3 { class: "text-lg font-semibold text-amber-400 mb-2", "{props.title}" }
            p { class: "text-gray-400", "{props.description}" }
        }
    }
}
