use std::rc::Rc;

use dioxus::core::Task;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::clock::{
    ClockTime, FieldKey, FieldKind, KeyOutcome, TimeFieldState, TimerAction, DIGIT_RESET_MS,
};

const FIELDS: [FieldKind; 4] = [
    FieldKind::Hours12,
    FieldKind::Minutes,
    FieldKind::Seconds,
    FieldKind::Period,
];

/// Segmented hh:mm:ss + AM/PM editor over a shared [`ClockTime`] signal.
/// Each segment owns its digit-entry machine; arrows step, digits compose,
/// Tab keeps native traversal.
#[component]
pub fn TimePicker(value: Signal<ClockTime>) -> Element {
    let refs: Signal<Vec<Option<Rc<MountedData>>>> = use_signal(|| vec![None; FIELDS.len()]);

    rsx! {
        div { class: "flex items-end gap-2",
            for (index, kind) in FIELDS.into_iter().enumerate() {
                TimeFieldInput {
                    key: "{index}",
                    kind,
                    index,
                    value,
                    refs,
                }
            }
        }
    }
}

fn field_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Hours24 | FieldKind::Hours12 => "HH",
        FieldKind::Minutes => "MM",
        FieldKind::Seconds => "SS",
        FieldKind::Period => "AM/PM",
    }
}

fn map_key(key: &Key) -> FieldKey {
    match key {
        Key::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => FieldKey::Digit(c),
                _ => FieldKey::Other,
            }
        }
        Key::ArrowUp => FieldKey::ArrowUp,
        Key::ArrowDown => FieldKey::ArrowDown,
        Key::ArrowLeft => FieldKey::ArrowLeft,
        Key::ArrowRight => FieldKey::ArrowRight,
        Key::Tab => FieldKey::Tab,
        _ => FieldKey::Other,
    }
}

fn focus_field(refs: Signal<Vec<Option<Rc<MountedData>>>>, index: usize) {
    // Out of range (ArrowRight on the last segment) is a no-op
    let target = refs.peek().get(index).cloned().flatten();
    if let Some(node) = target {
        spawn(async move {
            let _ = node.set_focus(true).await;
        });
    }
}

#[derive(Props, Clone, PartialEq)]
struct TimeFieldProps {
    kind: FieldKind,
    index: usize,
    value: Signal<ClockTime>,
    refs: Signal<Vec<Option<Rc<MountedData>>>>,
}

#[component]
fn TimeFieldInput(props: TimeFieldProps) -> Element {
    let TimeFieldProps {
        kind,
        index,
        mut value,
        mut refs,
    } = props;

    let mut field = use_signal(move || TimeFieldState::new(kind));
    let mut reset_task: Signal<Option<Task>> = use_signal(|| None);

    let shown = value.read().read(kind);

    let onkeydown = move |evt: KeyboardEvent| {
        let outcome = field.write().on_key(map_key(&evt.key()), *value.peek());

        // Tab must keep the browser's own focus traversal
        if outcome == KeyOutcome::PassThrough {
            return;
        }
        evt.prevent_default();

        match outcome {
            KeyOutcome::Update {
                time,
                timer,
                advance,
            } => {
                value.set(time);
                if let Some(task) = *reset_task.peek() {
                    task.cancel();
                }
                reset_task.set(None);
                if timer == TimerAction::Restart {
                    let handle = spawn(async move {
                        TimeoutFuture::new(DIGIT_RESET_MS).await;
                        field.write().on_timeout();
                        reset_task.set(None);
                    });
                    reset_task.set(Some(handle));
                }
                if advance {
                    focus_field(refs, index + 1);
                }
            }
            KeyOutcome::FocusLeft => {
                if index > 0 {
                    focus_field(refs, index - 1);
                }
            }
            KeyOutcome::FocusRight => focus_field(refs, index + 1),
            KeyOutcome::PassThrough | KeyOutcome::Suppressed => {}
        }
    };

    rsx! {
        div { class: "flex flex-col items-center gap-1",
            span { class: "text-xs text-gray-500", "{field_label(kind)}" }
            input {
                r#type: "text",
                class: "input w-14 text-center font-mono",
                value: "{shown}",
                onkeydown,
                onmounted: move |evt| {
                    refs.write()[index] = Some(evt.data());
                },
            }
        }
    }
}
