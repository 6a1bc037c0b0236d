//! End-to-end render pipeline tests against the in-memory host.
//!
//! These exercise the contract of the whole pipeline: scheduling, the
//! resumable work loop, positional reconciliation, atomic commit, and hook
//! state, observed through the host mutation log.

use cinder::{
    Element, EventCallback, MemoryHost, MemoryNodeId, Mutation, Props, RenderError, Renderer,
    Scope, WorkStatus,
};

fn new_renderer() -> (Renderer<MemoryHost>, MemoryNodeId) {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    (Renderer::new(host), container)
}

/// Drive the loop to completion with an unlimited budget.
fn drive(renderer: &mut Renderer<MemoryHost>) -> WorkStatus {
    let mut status = WorkStatus::Idle;
    while renderer.needs_render() {
        status = renderer.run_work_loop(|| true).expect("render failed");
    }
    status
}

/// Drive the loop granting exactly one unit of work per invocation.
fn drive_single_stepped(renderer: &mut Renderer<MemoryHost>) {
    while renderer.needs_render() {
        let mut granted = false;
        renderer
            .run_work_loop(|| {
                let first = !granted;
                granted = true;
                first
            })
            .expect("render failed");
    }
}

// =============================================================================
// Basic rendering
// =============================================================================

#[test]
fn renders_host_tree_into_container() {
    let (mut renderer, container) = new_renderer();
    renderer.render(
        Element::host(
            "list",
            Props::new().with("id", "fruit"),
            vec![
                Element::host("item", Props::new(), vec![Element::text("apple")]),
                Element::host("item", Props::new(), vec![Element::text("pear")]),
            ],
        ),
        container,
    );

    assert_eq!(drive(&mut renderer), WorkStatus::Committed);
    assert_eq!(
        renderer.host().tree_string(container),
        "root(list(item(\"apple\"), item(\"pear\")))"
    );
}

#[test]
fn rendering_identical_tree_twice_issues_no_mutations() {
    let tree = || {
        Element::host(
            "box",
            Props::new().with("id", "stable").with("rows", 2),
            vec![Element::text("same")],
        )
    };

    let (mut renderer, container) = new_renderer();
    renderer.render(tree(), container);
    drive(&mut renderer);
    renderer.host_mut().take_log();

    renderer.render(tree(), container);
    drive(&mut renderer);
    assert!(renderer.host().log().is_empty());
}

// =============================================================================
// Positional diff
// =============================================================================

#[test]
fn positional_diff_updates_places_and_deletes() {
    let (mut renderer, container) = new_renderer();
    renderer.render(
        Element::host(
            "list",
            Props::new(),
            vec![
                Element::host("a", Props::new().with("id", "old"), vec![]),
                Element::host("b", Props::new(), vec![]),
                Element::host("c", Props::new(), vec![]),
            ],
        ),
        container,
    );
    drive(&mut renderer);
    let a_node = renderer.host().find_by_tag("a").expect("a committed");
    let b_node = renderer.host().find_by_tag("b").expect("b committed");
    let c_node = renderer.host().find_by_tag("c").expect("c committed");
    renderer.host_mut().take_log();

    renderer.render(
        Element::host(
            "list",
            Props::new(),
            vec![
                Element::host("a", Props::new().with("id", "new"), vec![]),
                Element::host("x", Props::new(), vec![]),
            ],
        ),
        container,
    );
    drive(&mut renderer);

    let log = renderer.host_mut().take_log();
    // b and c are removed, a is updated in place, x is placed fresh.
    assert!(log.iter().any(|m| matches!(
        m,
        Mutation::RemoveChild { child, .. } if *child == b_node
    )));
    assert!(log.iter().any(|m| matches!(
        m,
        Mutation::RemoveChild { child, .. } if *child == c_node
    )));
    assert!(log.iter().any(|m| matches!(
        m,
        Mutation::SetProperty { node, key, .. } if *node == a_node && key == "id"
    )));
    assert!(log.iter().any(|m| matches!(
        m,
        Mutation::CreateNode { tag, .. } if tag == "x"
    )));
    // No node was created for the kept position.
    assert!(!log.iter().any(|m| matches!(
        m,
        Mutation::CreateNode { tag, .. } if tag == "a"
    )));
    assert_eq!(renderer.host().tree_string(container), "root(list(a, x))");
}

#[test]
fn moved_element_is_recreated_not_moved() {
    // Positional diffing treats a reorder as kind mismatches at both
    // positions; the moved node is torn down and rebuilt.
    let (mut renderer, container) = new_renderer();
    renderer.render(
        Element::host(
            "list",
            Props::new(),
            vec![
                Element::host("a", Props::new(), vec![]),
                Element::host("b", Props::new(), vec![]),
            ],
        ),
        container,
    );
    drive(&mut renderer);
    renderer.host_mut().take_log();

    renderer.render(
        Element::host(
            "list",
            Props::new(),
            vec![
                Element::host("b", Props::new(), vec![]),
                Element::host("a", Props::new(), vec![]),
            ],
        ),
        container,
    );
    drive(&mut renderer);

    let log = renderer.host().log();
    let creations = log
        .iter()
        .filter(|m| matches!(m, Mutation::CreateNode { .. }))
        .count();
    let removals = log
        .iter()
        .filter(|m| matches!(m, Mutation::RemoveChild { .. }))
        .count();
    assert_eq!(creations, 2);
    assert_eq!(removals, 2);
    assert_eq!(renderer.host().tree_string(container), "root(list(b, a))");
}

// =============================================================================
// Function components and hooks
// =============================================================================

fn stepper(scope: &mut Scope<'_>, props: &Props) -> Result<Vec<Element>, RenderError> {
    let start = props.get("start").and_then(|v| v.as_int()).unwrap_or(0);
    let (value, dispatch) = scope.use_state(start)?;

    let increment = EventCallback::new({
        let dispatch = dispatch.clone();
        move || dispatch.update(|n| n + 1)
    });
    let double = EventCallback::new({
        let dispatch = dispatch.clone();
        move || dispatch.update(|n| n * 2)
    });

    Ok(vec![
        Element::host("value", Props::new().with("n", value), vec![]),
        Element::host("increment", Props::new().with("onPress", increment), vec![]),
        Element::host("double", Props::new().with("onPress", double), vec![]),
    ])
}

fn value_of(renderer: &Renderer<MemoryHost>) -> i64 {
    let node = renderer.host().find_by_tag("value").expect("value node");
    renderer
        .host()
        .node(node)
        .and_then(|n| n.props.get("n"))
        .and_then(|v| v.as_int())
        .expect("value prop")
}

#[test]
fn component_state_survives_renders_and_folds_in_dispatch_order() {
    let (mut renderer, container) = new_renderer();
    renderer.render(Element::component(stepper, Props::new()), container);
    drive(&mut renderer);
    assert_eq!(value_of(&renderer), 0);

    // Two updates queued before the next pass fold in call order:
    // (0 + 1) * 2 = 2, not 1.
    let inc = renderer.host().find_by_tag("increment").unwrap();
    let dbl = renderer.host().find_by_tag("double").unwrap();
    assert_eq!(renderer.host().emit(inc, "press"), 1);
    assert_eq!(renderer.host().emit(dbl, "press"), 1);

    assert!(renderer.needs_render());
    drive(&mut renderer);
    assert_eq!(value_of(&renderer), 2);
}

#[test]
fn dispatch_triggers_full_pass_from_committed_root() {
    let (mut renderer, container) = new_renderer();
    renderer.render(Element::component(stepper, Props::new()), container);
    drive(&mut renderer);
    renderer.host_mut().take_log();

    let inc = renderer.host().find_by_tag("increment").unwrap();
    renderer.host().emit(inc, "press");
    drive(&mut renderer);

    assert_eq!(value_of(&renderer), 1);
    // The value node was updated in place, not recreated.
    assert!(!renderer
        .host()
        .log()
        .iter()
        .any(|m| matches!(m, Mutation::CreateNode { tag, .. } if tag == "value")));
}

fn wrapper(_scope: &mut Scope<'_>, props: &Props) -> Result<Vec<Element>, RenderError> {
    let label = props
        .get("label")
        .and_then(|v| v.as_text())
        .unwrap_or("?")
        .to_string();
    Ok(vec![
        Element::host("first", Props::new(), vec![Element::text(label)]),
        Element::host("second", Props::new(), vec![]),
    ])
}

#[test]
fn component_children_mount_under_nearest_host_ancestor() {
    let (mut renderer, container) = new_renderer();
    renderer.render(
        Element::host(
            "panel",
            Props::new(),
            vec![Element::component(
                wrapper,
                Props::new().with("label", "inner"),
            )],
        ),
        container,
    );
    drive(&mut renderer);

    // The component fiber owns no node; both its children land directly
    // under the panel.
    assert_eq!(
        renderer.host().tree_string(container),
        "root(panel(first(\"inner\"), second))"
    );
}

#[test]
fn deleting_component_removes_all_its_host_children() {
    let (mut renderer, container) = new_renderer();
    renderer.render(
        Element::host(
            "panel",
            Props::new(),
            vec![Element::component(wrapper, Props::new().with("label", "x"))],
        ),
        container,
    );
    drive(&mut renderer);

    renderer.render(
        Element::host(
            "panel",
            Props::new(),
            vec![Element::host("plain", Props::new(), vec![])],
        ),
        container,
    );
    drive(&mut renderer);

    assert_eq!(
        renderer.host().tree_string(container),
        "root(panel(plain))"
    );
    assert!(renderer.host().find_by_tag("first").is_none());
    assert!(renderer.host().find_by_tag("second").is_none());
}

// =============================================================================
// Resumability
// =============================================================================

fn sample_app(scope: &mut Scope<'_>, _props: &Props) -> Result<Vec<Element>, RenderError> {
    let (title, _) = scope.use_state("resumable".to_string())?;
    Ok(vec![Element::host(
        "section",
        Props::new().with("title", title),
        vec![
            Element::host("row", Props::new(), vec![Element::text("one")]),
            Element::host("row", Props::new(), vec![Element::text("two")]),
            Element::host("row", Props::new(), vec![Element::text("three")]),
        ],
    )])
}

#[test]
fn split_traversal_matches_uninterrupted_run() {
    let build = || {
        Element::host(
            "app",
            Props::new(),
            vec![Element::component(sample_app, Props::new())],
        )
    };

    let (mut uninterrupted, container_a) = new_renderer();
    uninterrupted.render(build(), container_a);
    drive(&mut uninterrupted);

    let (mut stepped, container_b) = new_renderer();
    stepped.render(build(), container_b);
    drive_single_stepped(&mut stepped);

    assert_eq!(
        uninterrupted.host().tree_string(container_a),
        stepped.host().tree_string(container_b)
    );

    // Node ids line up pairwise across hosts, so the logs must be equal.
    assert_eq!(uninterrupted.host().log(), stepped.host().log());
}

#[test]
fn yielded_pass_commits_nothing_until_finished() {
    let (mut renderer, container) = new_renderer();
    renderer.render(
        Element::host(
            "box",
            Props::new(),
            vec![Element::text("a"), Element::text("b")],
        ),
        container,
    );

    let status = renderer
        .run_work_loop({
            let mut grants = 2;
            move || {
                if grants == 0 {
                    false
                } else {
                    grants -= 1;
                    true
                }
            }
        })
        .unwrap();
    assert_eq!(status, WorkStatus::Yielded);
    assert!(renderer.host().log().is_empty());
    assert!(renderer.host().children(container).is_empty());

    drive(&mut renderer);
    assert_eq!(
        renderer.host().tree_string(container),
        "root(box(\"a\", \"b\"))"
    );
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn failed_commit_keeps_previous_tree_and_recovers() {
    let (mut renderer, container) = new_renderer();
    renderer.render(
        Element::host("box", Props::new(), vec![Element::text("v1")]),
        container,
    );
    drive(&mut renderer);
    let before = renderer.host().tree_string(container);

    // Every mutation of the next commit fails immediately.
    renderer.host_mut().fail_after(0);
    renderer.render(
        Element::host("box", Props::new(), vec![Element::text("v2")]),
        container,
    );
    let error = renderer.run_work_loop(|| true).unwrap_err();
    assert!(matches!(error, RenderError::HostMutation(_)));
    assert_eq!(renderer.host().tree_string(container), before);
    assert!(renderer.is_idle());

    // The session keeps working once the host recovers.
    renderer.host_mut().clear_failure();
    renderer.render(
        Element::host("box", Props::new(), vec![Element::text("v3")]),
        container,
    );
    drive(&mut renderer);
    assert_eq!(
        renderer.host().tree_string(container),
        "root(box(\"v3\"))"
    );
}

fn broken(_scope: &mut Scope<'_>, _props: &Props) -> Result<Vec<Element>, RenderError> {
    Err(RenderError::InvalidElement("broken component".to_string()))
}

#[test]
fn failing_component_abandons_pass_but_not_session() {
    let (mut renderer, container) = new_renderer();
    renderer.render(
        Element::host("box", Props::new(), vec![Element::text("stable")]),
        container,
    );
    drive(&mut renderer);

    renderer.render(Element::component(broken, Props::new()), container);
    assert!(renderer.run_work_loop(|| true).is_err());
    assert!(renderer.is_idle());
    // Nothing reached the host from the failed pass.
    assert_eq!(
        renderer.host().tree_string(container),
        "root(box(\"stable\"))"
    );

    renderer.render(
        Element::host("box", Props::new(), vec![Element::text("after")]),
        container,
    );
    drive(&mut renderer);
    assert_eq!(
        renderer.host().tree_string(container),
        "root(box(\"after\"))"
    );
}
