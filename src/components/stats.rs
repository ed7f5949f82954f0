use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct StatRowProps {
    pub label: &'static str,
    pub value: String,
    #[props(default = false)]
    pub highlight: bool,
}

#[component]
pub fn StatRow(props: StatRowProps) -> Element {
    let value_class = if props.highlight {
        "text-amber-400 font-semibold"
    } else {
        "text-gray-300"
    };

    rsx! {
        div { class: "flex justify-between items-center",
            span { class: "text-gray-500", "{props.label}" }
            span { class: "{value_class} font-mono", "{props.value}" }
        }
    }
}

#[component]
pub fn StatCard(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "card p-4 text-center",
            p { class: "text-xs uppercase tracking-wide text-gray-500", "{label}" }
            p { class: "text-xl font-bold font-mono", "{value}" }
        }
    }
}
