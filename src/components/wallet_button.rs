use dioxus::prelude::*;
use futures::StreamExt;
use crate::WalletState;

#[cfg(feature = "web")]
use gloo_storage::{LocalStorage, Storage};

#[cfg(feature = "web")]
const WALLET_STORAGE_KEY: &str = "trove.wallet";

#[derive(Clone)]
enum WalletAction {
    Connect,
}

#[component]
pub fn WalletButton() -> Element {
    let mut wallet = use_context::<Signal<WalletState>>();

    // Coroutine keeps the connect future tied to this scope
    let wallet_coro = use_coroutine(move |mut rx: UnboundedReceiver<WalletAction>| {
        async move {
            while let Some(action) = rx.next().await {
                match action {
                    WalletAction::Connect => {
                        connect_and_store(wallet, false).await;
                    }
                }
            }
        }
    });

    let connect_wallet = move |_| {
        wallet_coro.send(WalletAction::Connect);
    };

    let disconnect_wallet = move |_| {
        forget_wallet();
        wallet.write().connected = false;
        wallet.write().pubkey = None;
    };

    let wallet_read = wallet.read();

    if wallet_read.connected {
        let pubkey = wallet_read.pubkey.clone().unwrap_or_default();
        let short_pubkey = if pubkey.len() > 8 {
            format!("{}...{}", &pubkey[..4], &pubkey[pubkey.len() - 4..])
        } else {
            pubkey.clone()
        };

        rsx! {
            div { class: "flex items-center space-x-2",
                span { class: "text-sm text-gray-400 font-mono", "{short_pubkey}" }
                button {
                    class: "btn btn-secondary text-sm",
                    onclick: disconnect_wallet,
                    "Disconnect"
                }
            }
        }
    } else {
        rsx! {
            button {
                class: "btn btn-primary",
                onclick: connect_wallet,
                "Connect Wallet"
            }
        }
    }
}

/// Reconnects a previously-approved wallet on app start without prompting.
pub fn use_eager_reconnect() {
    let wallet = use_context::<Signal<WalletState>>();

    use_future(move || async move {
        if stored_wallet().is_some() {
            connect_and_store(wallet, true).await;
        }
    });
}

/// Starts the connect flow from surfaces other than the wallet button,
/// e.g. a bid submitted with no wallet attached.
pub fn request_connect(wallet: Signal<WalletState>) {
    spawn(async move {
        connect_and_store(wallet, false).await;
    });
}

async fn connect_and_store(mut wallet: Signal<WalletState>, only_if_trusted: bool) {
    match connect_phantom(only_if_trusted).await {
        Ok(pubkey) => {
            remember_wallet(&pubkey);
            wallet.write().connected = true;
            wallet.write().pubkey = Some(pubkey);
        }
        Err(e) => {
            if only_if_trusted {
                // Expected when the stored approval was revoked
                tracing::debug!("Eager reconnect skipped: {}", e);
            } else {
                tracing::error!("Wallet connection failed: {}", e);
            }
        }
    }
}

#[cfg(feature = "web")]
fn remember_wallet(pubkey: &str) {
    let _ = LocalStorage::set(WALLET_STORAGE_KEY, pubkey);
}

#[cfg(feature = "web")]
fn forget_wallet() {
    LocalStorage::delete(WALLET_STORAGE_KEY);
}

#[cfg(feature = "web")]
fn stored_wallet() -> Option<String> {
    LocalStorage::get(WALLET_STORAGE_KEY).ok()
}

#[cfg(feature = "web")]
async fn connect_phantom(only_if_trusted: bool) -> Result<String, String> {
    use wasm_bindgen::prelude::*;
    use js_sys::{Object, Reflect, Promise};

    let window = web_sys::window().ok_or("No window")?;

    let solana = Reflect::get(&window, &JsValue::from_str("solana"))
        .map_err(|_| "Phantom not found")?;

    if solana.is_undefined() {
        if only_if_trusted {
            return Err("Phantom not installed".to_string());
        }
        // Open Phantom install page
        let _ = window.open_with_url("https://phantom.app/");
        return Err("Phantom not installed. Please install it and refresh.".to_string());
    }

    let is_phantom = Reflect::get(&solana, &JsValue::from_str("isPhantom"))
        .map_err(|_| "Not Phantom")?;

    if !is_phantom.as_bool().unwrap_or(false) {
        return Err("Please use Phantom wallet".to_string());
    }

    let connect_fn = Reflect::get(&solana, &JsValue::from_str("connect"))
        .map_err(|_| "No connect method")?;

    let connect_fn: js_sys::Function = connect_fn.dyn_into()
        .map_err(|_| "connect is not a function")?;

    // connect({ onlyIfTrusted: true }) resolves silently for approved sites
    let promise = if only_if_trusted {
        let opts = Object::new();
        Reflect::set(&opts, &JsValue::from_str("onlyIfTrusted"), &JsValue::TRUE)
            .map_err(|_| "Failed to set onlyIfTrusted")?;
        connect_fn.call1(&solana, &opts.into())
    } else {
        connect_fn.call0(&solana)
    }
    .map_err(|e| format!("Connect call failed: {:?}", e))?;

    let promise: Promise = promise.dyn_into()
        .map_err(|_| "Not a promise")?;

    let result = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(|e| format!("Connection rejected: {:?}", e))?;

    let public_key = Reflect::get(&result, &JsValue::from_str("publicKey"))
        .map_err(|_| "No publicKey in response")?;

    let to_string_fn = Reflect::get(&public_key, &JsValue::from_str("toString"))
        .map_err(|_| "No toString method")?;

    let to_string_fn: js_sys::Function = to_string_fn.dyn_into()
        .map_err(|_| "toString is not a function")?;

    let pubkey_str = to_string_fn.call0(&public_key)
        .map_err(|e| format!("toString failed: {:?}", e))?;

    pubkey_str.as_string().ok_or("Public key not a string".to_string())
}

#[cfg(not(feature = "web"))]
fn remember_wallet(_pubkey: &str) {}

#[cfg(not(feature = "web"))]
fn forget_wallet() {}

#[cfg(not(feature = "web"))]
fn stored_wallet() -> Option<String> {
    None
}

#[cfg(not(feature = "web"))]
async fn connect_phantom(_only_if_trusted: bool) -> Result<String, String> {
    Err("Phantom wallet only available in web mode".to_string())
}
