use dioxus::core::Task;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::bid::{current_bid, format_units};
use crate::components::{BidForm, StatCard, StatRow};
use crate::hooks::{use_auction, use_token};
use crate::loading::{GateTimer, LoadingGate, SHOW_DELAY_MS};

#[derive(Clone, Copy, Debug, PartialEq)]
enum LotStatus {
    Active,
    Ended,
    Sold,
    Passed,
}

/// Sold takes priority over the clock: a buyout settles a lot before its
/// scheduled end.
fn lot_status(now: i64, ends_at: i64, has_winner: bool, has_bids: bool) -> LotStatus {
    if has_winner {
        LotStatus::Sold
    } else if now < ends_at {
        LotStatus::Active
    } else if has_bids {
        LotStatus::Ended
    } else {
        LotStatus::Passed
    }
}

fn countdown(remaining: i64) -> String {
    let remaining = remaining.max(0);
    let hours = remaining / 3_600;
    let minutes = (remaining % 3_600) / 60;
    let seconds = remaining % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn short_address(address: &str) -> String {
    if address.len() > 8 {
        format!("{}...{}", &address[..4], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

#[component]
pub fn Auction(id: u64) -> Element {
    let auction = use_auction(id);
    let token = use_token();

    let mut gate = use_signal(LoadingGate::default);
    let mut gate_task: Signal<Option<Task>> = use_signal(|| None);

    // Drive the spinner gate from the fetch state; a load that resolves
    // inside the delay never shows a spinner at all
    use_effect(move || {
        let busy = auction.state.read().loading;
        let action = gate.write().on_navigation(busy);
        match action {
            Some(GateTimer::Start) => {
                let handle = spawn(async move {
                    TimeoutFuture::new(SHOW_DELAY_MS).await;
                    gate.write().on_timer();
                    gate_task.set(None);
                });
                gate_task.set(Some(handle));
            }
            Some(GateTimer::Cancel) => {
                if let Some(task) = *gate_task.peek() {
                    task.cancel();
                }
                gate_task.set(None);
            }
            None => {}
        }
    });

    let state = auction.state.read();

    if state.loading {
        let showing = gate.read().is_showing();
        return rsx! {
            if showing {
                div { class: "flex justify-center py-24",
                    div { class: "h-10 w-10 animate-spin rounded-full border-2 border-amber-500 border-t-transparent" }
                }
            }
        };
    }

    let params = match &state.params {
        Some(params) => params.clone(),
        None => {
            return rsx! {
                div { class: "card p-12 text-center text-gray-400",
                    "Auction #{id} does not exist."
                }
            };
        }
    };

    let decimals = params.decimals;
    let ends_at = params.ends_at();
    let status = lot_status(state.now, ends_at, state.winner.is_some(), !state.bids.is_empty());
    let top = current_bid(&state.bids);
    let top_label = if top == 0 {
        format!("{} (floor)", format_units(params.start_price, decimals))
    } else {
        format_units(top, decimals).to_string()
    };
    let remaining = countdown(ends_at - state.now);
    let (status_label, status_class) = match status {
        LotStatus::Active => ("Active", "text-green-400 border-green-500/40"),
        LotStatus::Ended => ("Ended, awaiting settlement", "text-amber-400 border-amber-500/40"),
        LotStatus::Sold => ("Sold", "text-gray-400 border-gray-600"),
        LotStatus::Passed => ("Passed, no bids", "text-gray-400 border-gray-600"),
    };

    let history_rows: Vec<(String, String, bool)> = state
        .bids
        .iter()
        .rev()
        .map(|bid| {
            (
                short_address(&bid.bidder),
                format!("{} TRV2", format_units(bid.amount, decimals)),
                bid.claimed,
            )
        })
        .collect();

    rsx! {
        div { class: "grid gap-8 lg:grid-cols-3",
            div { class: "space-y-6 lg:col-span-2",
                div { class: "flex items-center justify-between",
                    h1 { class: "text-3xl font-bold", "Auction #{id}" }
                    span { class: "rounded-full border px-3 py-1 text-sm {status_class}",
                        "{status_label}"
                    }
                }
                p { class: "font-mono text-xs text-gray-500", "{state.uri}" }

                div { class: "grid grid-cols-2 gap-4 md:grid-cols-4",
                    StatCard { label: "Top bid", value: "{top_label} TRV2" }
                    StatCard { label: "Time left", value: remaining }
                    StatCard {
                        label: "Min raise",
                        value: format!("{} TRV2", format_units(params.minimum_increment, decimals)),
                    }
                    StatCard {
                        label: "Buyout",
                        value: format!("{} TRV2", format_units(params.buyout_price, decimals)),
                    }
                }

                if let Some(winner) = state.winner.clone() {
                    div { class: "card p-4",
                        StatRow {
                            label: "Winner",
                            value: short_address(&winner),
                            highlight: true,
                        }
                    }
                }

                div { class: "card p-6",
                    h3 { class: "text-lg font-bold mb-4", "Bid history" }
                    if history_rows.is_empty() {
                        p { class: "text-gray-500", "No bids yet. The start price is the floor." }
                    } else {
                        div { class: "space-y-2",
                            for (i, (bidder, amount, claimed)) in history_rows.iter().enumerate() {
                                div { key: "{i}", class: "flex items-center justify-between text-sm",
                                    span { class: "font-mono text-gray-400", "{bidder}" }
                                    div { class: "flex items-center gap-2",
                                        if *claimed {
                                            span { class: "text-xs text-gray-600", "reclaimed" }
                                        }
                                        span { class: "font-mono", "{amount}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            div {
                if status == LotStatus::Active {
                    BidForm {
                        key: "{id}",
                        auction_id: id,
                        params: params.clone(),
                        bids: state.bids.clone(),
                        auction,
                        token,
                    }
                } else {
                    div { class: "card p-6 text-center text-gray-400",
                        "Bidding is closed for this lot."
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_winner_clock_and_bids() {
        assert_eq!(lot_status(100, 200, false, false), LotStatus::Active);
        assert_eq!(lot_status(100, 200, false, true), LotStatus::Active);
        assert_eq!(lot_status(200, 200, false, true), LotStatus::Ended);
        assert_eq!(lot_status(300, 200, false, false), LotStatus::Passed);
        // A buyout can settle before the clock runs out
        assert_eq!(lot_status(100, 200, true, true), LotStatus::Sold);
    }

    #[test]
    fn countdown_renders_clamped_hms() {
        assert_eq!(countdown(0), "00:00:00");
        assert_eq!(countdown(-5), "00:00:00");
        assert_eq!(countdown(59), "00:00:59");
        assert_eq!(countdown(3_661), "01:01:01");
        assert_eq!(countdown(90_000), "25:00:00");
    }

    #[test]
    fn long_addresses_are_shortened_for_display() {
        assert_eq!(short_address("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(short_address("short"), "short");
    }
}
