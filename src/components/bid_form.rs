use dioxus::core::Task;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::bid::{
    format_units, sanitize_amount, AuctionParams, BidController, BidEntry, BidGateway, BidPreset,
    Notice, Notifier, SubmitOutcome, WriteError, ERROR_CLEAR_MS,
};
use crate::components::{push_notice, request_connect, Toasts};
use crate::hooks::{bid_transaction, AuctionHandle, TokenHandle};
use crate::WalletState;

/// Chain collaborators handed to the controller: live wallet and token
/// signals on the read side, the Phantom write path on the write side.
#[derive(Clone, Copy)]
struct FormGateway {
    auction_id: u64,
    wallet: Signal<WalletState>,
    token: TokenHandle,
    auction: AuctionHandle,
}

impl BidGateway for FormGateway {
    fn wallet(&self) -> Option<String> {
        self.wallet.peek().pubkey.clone()
    }

    fn balance(&self) -> Option<u128> {
        self.token.state.peek().balance
    }

    fn allowance(&self) -> Option<u128> {
        self.token.state.peek().allowance
    }

    fn prompt_connect(&self) {
        request_connect(self.wallet);
    }

    async fn place_bid(&self, amount: u128) -> Result<String, WriteError> {
        let authority = self.wallet.peek().pubkey.clone().unwrap_or_default();
        // The wire format is u64; amounts are validated against a u64 balance
        // so the cast cannot truncate in practice
        let amount = u64::try_from(amount).unwrap_or(u64::MAX);
        bid_transaction(&authority, self.auction_id, amount).await
    }

    fn refresh_bids(&self) {
        self.auction.refresh();
    }

    fn refresh_balance(&self) {
        self.token.refresh();
    }

    fn refresh_allowance(&self) {
        self.token.refresh();
    }
}

#[derive(Clone, Copy)]
struct ToastNotifier {
    toasts: Signal<Toasts>,
}

impl Notifier for ToastNotifier {
    fn notify(&self, notice: Notice) {
        push_notice(self.toasts, notice);
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct BidFormProps {
    pub auction_id: u64,
    pub params: AuctionParams,
    pub bids: Vec<BidEntry>,
    pub auction: AuctionHandle,
    pub token: TokenHandle,
}

#[component]
pub fn BidForm(props: BidFormProps) -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let toasts = use_context::<Signal<Toasts>>();

    let params = props.params.clone();
    let mut controller = use_signal(move || BidController::new(props.auction_id, params));
    let mut amount_text = use_signal(String::new);
    let mut submitting = use_signal(|| false);
    let mut error_task: Signal<Option<Task>> = use_signal(|| None);

    let gateway = FormGateway {
        auction_id: props.auction_id,
        wallet,
        token: props.token,
        auction: props.auction,
    };
    let notifier = ToastNotifier { toasts };

    let candidate = controller.read().candidate();
    let buyout = controller.read().params().buyout_ui();
    let presets = controller.read().presets(&props.bids);
    let last_error = controller.read().last_error().map(|s| s.to_string());
    let decimals = props.params.decimals;

    let balance_label = match props.token.state.read().balance {
        Some(balance) => format!("{} TRV2", format_units(balance, decimals)),
        None => "—".to_string(),
    };

    let connected = wallet.read().connected;
    let label = if !connected {
        "Connect wallet to bid"
    } else if submitting() {
        "Placing bid..."
    } else {
        "Place bid"
    };

    let bids_min = props.bids.clone();
    let bids_double = props.bids.clone();
    let bids_buyout = props.bids.clone();
    let bids_submit = props.bids.clone();

    let on_submit = move |_| {
        let bids = bids_submit.clone();
        spawn(async move {
            submitting.set(true);
            let mut ctl = controller.peek().clone();
            let outcome = ctl.submit(&gateway, &notifier, &bids).await;
            controller.set(ctl);
            submitting.set(false);

            match outcome {
                SubmitOutcome::Submitted(signature) => {
                    tracing::info!("Bid submitted: {}", signature);
                    amount_text.set(String::new());
                }
                SubmitOutcome::WriteFailed { .. } => {
                    // Restart the 5 s hold if an earlier one is still ticking
                    let old: Option<Task> = *error_task.peek();
                    if let Some(task) = old {
                        task.cancel();
                    }
                    let handle = spawn(async move {
                        TimeoutFuture::new(ERROR_CLEAR_MS).await;
                        controller.write().clear_error();
                        error_task.set(None);
                    });
                    error_task.set(Some(handle));
                }
                _ => {}
            }
        });
    };

    rsx! {
        div { class: "card p-6 space-y-4",
            div { class: "flex items-center justify-between",
                h3 { class: "text-lg font-bold", "Place a bid" }
                span { class: "text-sm text-gray-400", "Balance: {balance_label}" }
            }

            input {
                r#type: "range",
                class: "w-full accent-amber-500",
                min: "0",
                max: "{buyout}",
                step: "any",
                value: "{candidate}",
                oninput: move |evt| {
                    if let Ok(value) = evt.value().parse::<f64>() {
                        controller.write().set_from_slider(value);
                        amount_text.set(controller.peek().candidate().to_string());
                    }
                },
            }

            div { class: "flex items-center gap-2",
                input {
                    r#type: "text",
                    class: "input flex-1 font-mono",
                    inputmode: "decimal",
                    placeholder: "0.0",
                    value: "{amount_text}",
                    oninput: move |evt| {
                        let clean = sanitize_amount(&evt.value());
                        controller.write().set_from_text(&clean);
                        // Mirror the cleaned text unless the ceiling clamped it
                        let candidate = controller.peek().candidate();
                        if clean.parse::<f64>().unwrap_or(0.0) > candidate {
                            amount_text.set(candidate.to_string());
                        } else {
                            amount_text.set(clean);
                        }
                    },
                }
                span { class: "text-sm text-gray-400", "TRV2" }
            }

            div { class: "grid grid-cols-3 gap-2",
                button {
                    class: "btn btn-secondary text-sm",
                    onclick: move |_| {
                        controller.write().apply_preset(BidPreset::Minimum, &bids_min);
                        amount_text.set(controller.peek().candidate().to_string());
                    },
                    "Min ({presets.minimum})"
                }
                button {
                    class: "btn btn-secondary text-sm",
                    onclick: move |_| {
                        controller.write().apply_preset(BidPreset::DoubleMinimum, &bids_double);
                        amount_text.set(controller.peek().candidate().to_string());
                    },
                    "Double ({presets.double_minimum})"
                }
                button {
                    class: "btn btn-secondary text-sm",
                    onclick: move |_| {
                        controller.write().apply_preset(BidPreset::Buyout, &bids_buyout);
                        amount_text.set(controller.peek().candidate().to_string());
                    },
                    "Buyout ({presets.buyout})"
                }
            }

            button {
                class: "btn btn-primary w-full",
                disabled: last_error.is_some(),
                onclick: on_submit,
                "{label}"
            }

            if let Some(ref error) = last_error {
                div { class: "rounded-lg border border-red-500/40 bg-red-500/10 p-3",
                    p { class: "text-sm font-semibold text-red-400", "{error}" }
                    p { class: "text-xs text-red-300",
                        "The bid transaction will most likely be reverted."
                    }
                }
            }
        }
    }
}
