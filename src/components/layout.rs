use dioxus::prelude::*;
use crate::components::{Toaster, WalletButton};
use crate::route::Route;
use crate::RpcHealth;

#[component]
pub fn Layout() -> Element {
    let health = use_context::<Signal<RpcHealth>>();
    let mut banner_dismissed = use_signal(|| false);

    // Re-arm the banner once the RPC recovers
    use_effect(move || {
        if !health.read().degraded {
            banner_dismissed.set(false);
        }
    });

    let show_banner = health.read().degraded && !banner_dismissed();

    rsx! {
        div { class: "min-h-screen",
            style: "background-color: var(--surface-base);",
            // Navigation
            nav { class: "border-b elevated-border backdrop-blur sticky top-0 z-50",
                style: "background-color: var(--surface-base);",
                div { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8",
                    div { class: "flex justify-between h-16",
                        div { class: "flex items-center",
                            Link { to: Route::Home {}, class: "flex items-center space-x-2",
                                span { class: "text-2xl font-bold text-amber-400", "TROVE" }
                            }
                        }

                        div { class: "hidden sm:flex sm:items-center sm:space-x-8",
                            NavLink { to: Route::Auctions {}, label: "Auctions" }
                            NavLink { to: Route::Stake {}, label: "Stake" }
                        }

                        div { class: "flex items-center",
                            WalletButton {}
                        }
                    }
                }
            }

            if show_banner {
                div { class: "border-b border-red-500/30 bg-red-500/10",
                    div { class: "max-w-7xl mx-auto flex items-center justify-between px-4 py-2",
                        p { class: "text-sm text-red-300",
                            "Chain data is not refreshing; figures may be stale."
                        }
                        button {
                            class: "text-sm text-red-300 hover:text-white",
                            onclick: move |_| banner_dismissed.set(true),
                            "Dismiss"
                        }
                    }
                }
            }

            // Main content
            main { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8",
                Outlet::<Route> {}
            }

            // Footer
            footer { class: "border-t elevated-border py-8 mt-auto",
                div { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 text-center text-low",
                    p { "TROVE - NFT Auctions on Solana" }
                    p { class: "text-sm mt-2",
                        "Program: "
                        code { class: "text-gold", "{crate::PROGRAM_ID}" }
                    }
                }
            }

            Toaster {}
        }
    }
}

#[component]
fn NavLink(to: Route, label: &'static str) -> Element {
    rsx! {
        Link {
            to: to,
            class: "text-mid hover:text-gold px-3 py-2 text-sm font-medium transition-colors",
            "{label}"
        }
    }
}
