//! Basic Example - render a static tree and re-render with a change.
//!
//! Demonstrates the two-phase pipeline against the in-memory host: the
//! first pass places every node, the second pass diffs and only touches
//! what changed.
//!
//! Run with: cargo run --example basic

use cinder::{Element, MemoryHost, Props, Renderer};

fn view(subtitle: &str) -> Element {
    Element::host(
        "panel",
        Props::new().with("id", "demo"),
        vec![
            Element::host("title", Props::new(), vec![Element::text("cinder")]),
            Element::host("subtitle", Props::new(), vec![Element::text(subtitle)]),
        ],
    )
}

fn main() {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut renderer = Renderer::new(host);

    renderer.render(view("first pass"), container);
    while renderer.needs_render() {
        renderer.run_work_loop(|| true).expect("render failed");
    }
    println!("after first pass:  {}", renderer.host().tree_string(container));
    println!("mutations: {}", renderer.host_mut().take_log().len());

    renderer.render(view("second pass"), container);
    while renderer.needs_render() {
        renderer.run_work_loop(|| true).expect("render failed");
    }
    println!("after second pass: {}", renderer.host().tree_string(container));
    // Only the changed text node is touched.
    for mutation in renderer.host().log() {
        println!("  {mutation:?}");
    }
}
