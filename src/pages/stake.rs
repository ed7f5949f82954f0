use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::bid::{format_units, to_base_units, WriteError};
use crate::clock::ClockTime;
use crate::components::{StatCard, TimePicker};
use crate::hooks::{fetch_block_time, fetch_slot, stake_transaction, use_token};
use crate::{WalletState, RPC_URL};

const SECONDS_PER_DAY: i64 = 86_400;
const CHAIN_TIME_POLL_MS: u32 = 10_000;

/// Next occurrence (UTC) of the picked wall-clock time, strictly after `now`.
/// Picking a time already behind the clock locks until tomorrow.
fn unlock_timestamp(now: i64, time: ClockTime) -> i64 {
    let day_start = now - now.rem_euclid(SECONDS_PER_DAY);
    let candidate = day_start + time.seconds_of_day() as i64;
    if candidate <= now {
        candidate + SECONDS_PER_DAY
    } else {
        candidate
    }
}

fn duration_label(seconds: i64) -> String {
    let hours = seconds / 3_600;
    let minutes = (seconds % 3_600) / 60;
    format!("{hours}h {minutes:02}m")
}

#[component]
pub fn Stake() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let token = use_token();

    let mut amount = use_signal(|| 0.0_f64);
    let unlock_time = use_signal(|| ClockTime {
        hour: 12,
        minute: 0,
        second: 0,
    });
    let mut submitting = use_signal(|| false);
    let mut tx_result = use_signal(|| None::<Result<String, WriteError>>);

    // The unlock preview runs on chain time like the auction clocks
    let mut now = use_signal(|| 0i64);
    use_future(move || async move {
        loop {
            if let Ok(slot) = fetch_slot(RPC_URL).await {
                if let Ok(time) = fetch_block_time(RPC_URL, slot).await {
                    now.set(time);
                }
            }
            TimeoutFuture::new(CHAIN_TIME_POLL_MS).await;
        }
    });

    let wallet_pubkey = use_memo(move || wallet.read().pubkey.clone());

    let token_state = token.state.read();
    let decimals = token_state.decimals;
    let balance_label = match token_state.balance {
        Some(balance) => format!("{} TRV2", format_units(balance, decimals)),
        None => "—".to_string(),
    };
    let allowance_label = match token_state.allowance {
        Some(allowance) => format!("{} TRV2", format_units(allowance, decimals)),
        None => "—".to_string(),
    };
    let balance_ui = token_state.balance.map(|b| format_units(b, decimals));

    let preview = if now() > 0 {
        let unlock_at = unlock_timestamp(now(), *unlock_time.read());
        format!(
            "Unlocks in {} (unix {})",
            duration_label(unlock_at - now()),
            unlock_at
        )
    } else {
        "Fetching chain time...".to_string()
    };

    let connected = wallet.read().connected;
    let disabled = !connected || submitting() || amount() <= 0.0 || now() == 0;
    let label = if !connected {
        "Connect wallet to stake"
    } else if submitting() {
        "Staking..."
    } else {
        "Stake TRV2"
    };

    let on_submit = move |_| {
        let pubkey = wallet_pubkey();
        if let Some(authority) = pubkey {
            let base_amount = to_base_units(amount(), token.state.peek().decimals);
            let base_amount = u64::try_from(base_amount).unwrap_or(u64::MAX);
            let unlock_at = unlock_timestamp(*now.peek(), *unlock_time.peek());

            submitting.set(true);
            tx_result.set(None);

            spawn(async move {
                let result = stake_transaction(&authority, base_amount, unlock_at).await;
                if let Ok(signature) = &result {
                    tracing::info!("Stake submitted: {}", signature);
                }
                tx_result.set(Some(result));
                submitting.set(false);
            });
        }
    };

    let tx_node = tx_result.read().as_ref().map(|result| match result {
        Ok(sig) => rsx! {
            div { class: "mt-3 p-2 bg-green-500/10 border border-green-500/30 rounded text-sm",
                a {
                    href: "https://explorer.solana.com/tx/{sig}?cluster=devnet",
                    target: "_blank",
                    class: "text-green-400 underline",
                    "View transaction"
                }
            }
        },
        Err(err) => rsx! {
            div { class: "mt-3 p-2 bg-red-500/10 border border-red-500/30 rounded text-sm",
                p { class: "text-red-400", "{err.message}" }
            }
        },
    });

    rsx! {
        div { class: "max-w-2xl mx-auto space-y-8",
            div {
                h1 { class: "text-3xl font-bold", "Stake TRV2" }
                p { class: "text-gray-400 mt-1",
                    "Lock tokens until a time you pick. Locked TRV2 earns emissions until it unlocks."
                }
            }

            div { class: "grid grid-cols-2 gap-4",
                StatCard { label: "Wallet balance", value: balance_label }
                StatCard { label: "Escrow allowance", value: allowance_label }
            }

            div { class: "card p-6 space-y-5",
                div {
                    p { class: "text-low text-sm mb-2", "Amount" }
                    div { class: "flex gap-2 mb-2",
                        button {
                            class: "elevated-control px-3 py-1.5 rounded text-sm font-mono",
                            onclick: move |_| {
                                if let Some(balance) = balance_ui {
                                    amount.set(balance * 0.25);
                                }
                            },
                            "25%"
                        }
                        button {
                            class: "elevated-control px-3 py-1.5 rounded text-sm font-mono",
                            onclick: move |_| {
                                if let Some(balance) = balance_ui {
                                    amount.set(balance * 0.5);
                                }
                            },
                            "50%"
                        }
                        button {
                            class: "elevated-control px-3 py-1.5 rounded text-sm font-mono",
                            onclick: move |_| {
                                if let Some(balance) = balance_ui {
                                    amount.set(balance);
                                }
                            },
                            "Max"
                        }
                    }
                    input {
                        r#type: "number",
                        step: "0.01",
                        min: "0",
                        class: "input w-full font-mono",
                        value: "{amount}",
                        oninput: move |e| {
                            if let Ok(val) = e.value().parse::<f64>() {
                                amount.set(val);
                            }
                        },
                    }
                }

                div {
                    p { class: "text-low text-sm mb-2", "Unlock time (UTC)" }
                    TimePicker { value: unlock_time }
                    p { class: "text-xs text-gray-500 mt-2", "{preview}" }
                }

                button {
                    class: "btn btn-primary w-full",
                    disabled,
                    onclick: on_submit,
                    "{label}"
                }

                {tx_node}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u8, minute: u8, second: u8) -> ClockTime {
        ClockTime {
            hour,
            minute,
            second,
        }
    }

    // 1_700_000_000 is 80_000 seconds (22:13:20) into its UTC day.
    const NOW: i64 = 1_700_000_000;
    const DAY_START: i64 = 1_699_920_000;

    #[test]
    fn future_time_today_stays_today() {
        assert_eq!(unlock_timestamp(NOW, at(23, 0, 0)), DAY_START + 82_800);
    }

    #[test]
    fn past_time_rolls_to_tomorrow() {
        assert_eq!(
            unlock_timestamp(NOW, at(12, 0, 0)),
            DAY_START + 43_200 + SECONDS_PER_DAY
        );
    }

    #[test]
    fn the_exact_current_second_rolls_over_too() {
        assert_eq!(
            unlock_timestamp(NOW, at(22, 13, 20)),
            NOW + SECONDS_PER_DAY
        );
    }

    #[test]
    fn durations_render_as_hours_and_minutes() {
        assert_eq!(duration_label(2_800), "0h 46m");
        assert_eq!(duration_label(86_400), "24h 00m");
        assert_eq!(duration_label(59), "0h 00m");
    }
}
