use dioxus::prelude::*;

const TILT_DIVISOR: f64 = 25.0;

/// Rotation pair (rotateY, rotateX) in degrees for a pointer at
/// (client_x, client_y) over a card with the given client rect. A centered
/// pointer is level; the tilt grows linearly toward the edges.
pub fn tilt(
    client_x: f64,
    client_y: f64,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> (f64, f64) {
    let dx = client_x - (left + width / 2.0);
    let dy = client_y - (top + height / 2.0);
    (dx / TILT_DIVISOR, -dy / TILT_DIVISOR)
}

/// Card that tilts toward the pointer. The client rect is captured once on
/// mount; scrolling mid-hover skews the math slightly until the next mount.
#[component]
pub fn TiltCard(children: Element) -> Element {
    let mut rect = use_signal(|| None::<(f64, f64, f64, f64)>);
    let mut rotate = use_signal(|| (0.0f64, 0.0f64));

    let (ry, rx) = rotate();
    let style = format!("transform: perspective(800px) rotateY({ry}deg) rotateX({rx}deg);");

    rsx! {
        div {
            class: "transition-transform duration-100 will-change-transform",
            style: "{style}",
            onmounted: move |evt| {
                let data = evt.data();
                spawn(async move {
                    if let Ok(bounds) = data.get_client_rect().await {
                        rect.set(Some((
                            bounds.origin.x,
                            bounds.origin.y,
                            bounds.size.width,
                            bounds.size.height,
                        )));
                    }
                });
            },
            onmousemove: move |evt| {
                if let Some((left, top, width, height)) = rect() {
                    let point = evt.client_coordinates();
                    rotate.set(tilt(point.x, point.y, left, top, width, height));
                }
            },
            onmouseleave: move |_| rotate.set((0.0, 0.0)),
            {children}
        }
    }
}
