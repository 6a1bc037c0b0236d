//! Counter Example - function component with hook state.
//!
//! A stateful counter driven through the in-memory host's event dispatch:
//! each simulated click queues a state update and wakes the renderer, and
//! the next work-loop slice re-renders the tree from the committed root.
//!
//! Run with: cargo run --example counter

use cinder::{
    Element, EventCallback, MemoryHost, Props, RenderError, Renderer, Scope,
};

fn counter(scope: &mut Scope<'_>, _props: &Props) -> Result<Vec<Element>, RenderError> {
    let (count, dispatch) = scope.use_state(0i64)?;

    let on_click = EventCallback::new({
        let dispatch = dispatch.clone();
        move || dispatch.update(|n| n + 1)
    });

    Ok(vec![Element::host(
        "button",
        Props::new().with("onClick", on_click),
        vec![Element::text(format!("count: {count}"))],
    )])
}

fn main() {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut renderer = Renderer::new(host);

    renderer.render(Element::component(counter, Props::new()), container);
    while renderer.needs_render() {
        renderer.run_work_loop(|| true).expect("render failed");
    }
    println!("{}", renderer.host().tree_string(container));

    for _ in 0..3 {
        let button = renderer
            .host()
            .find_by_tag("button")
            .expect("button is mounted");
        renderer.host().emit(button, "click");

        while renderer.needs_render() {
            renderer.run_work_loop(|| true).expect("render failed");
        }
        println!("{}", renderer.host().tree_string(container));
    }
}
