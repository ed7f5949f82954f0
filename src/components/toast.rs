use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::bid::{Notice, Severity};

const TOAST_DISMISS_MS: u32 = 6_000;

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

/// App-wide notification queue, provided from the root.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Toasts {
    items: Vec<Toast>,
    next_id: u64,
}

impl Toasts {
    pub fn push(&mut self, notice: Notice) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Toast { id, notice });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }
}

/// Show a notice and schedule its auto-dismiss.
pub fn push_notice(mut toasts: Signal<Toasts>, notice: Notice) {
    let id = toasts.write().push(notice);
    spawn(async move {
        TimeoutFuture::new(TOAST_DISMISS_MS).await;
        toasts.write().dismiss(id);
    });
}

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "toast-success",
        Severity::Error => "toast-error",
    }
}

#[component]
pub fn Toaster() -> Element {
    let mut toasts = use_context::<Signal<Toasts>>();

    let items: Vec<(Toast, &'static str)> = toasts
        .read()
        .items()
        .iter()
        .map(|t| (t.clone(), severity_class(t.notice.severity)))
        .collect();

    rsx! {
        div { class: "fixed bottom-4 right-4 z-50 flex flex-col gap-2",
            for (toast, tone) in items {
                div {
                    key: "{toast.id}",
                    class: "toast {tone} flex items-start gap-3 rounded-lg px-4 py-3 shadow-lg",
                    div { class: "flex-1",
                        p { class: "font-semibold text-sm", "{toast.notice.title}" }
                        p { class: "text-sm text-gray-300", "{toast.notice.body}" }
                    }
                    button {
                        class: "text-gray-400 hover:text-white",
                        onclick: move |_| toasts.write().dismiss(toast.id),
                        "✕"
                    }
                }
            }
        }
    }
}
