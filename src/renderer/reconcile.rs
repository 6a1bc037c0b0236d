//! Positional reconciliation.
//!
//! New child elements are walked by index in lockstep with the previous
//! children (the alternate's child chain). Matching kinds at a position
//! update in place; anything else is a placement plus, when an old fiber
//! occupied the position, a deletion. Strictly positional by design: there
//! is no keying, so a same-kind element that merely moved position diffs
//! as a mismatch at both positions.

use tracing::trace;

use crate::element::Element;
use crate::fiber::{EffectTag, Fiber, FiberId};
use crate::host::HostBackend;

use super::Renderer;

impl<H: HostBackend> Renderer<H> {
    /// Diff `elements` against the previous children of `parent` and link
    /// the resulting fibers into the in-progress tree.
    pub(crate) fn reconcile_children(&mut self, parent: FiberId, elements: &[Element]) {
        let mut old_fiber = self.arena[parent]
            .alternate
            .and_then(|alternate| self.arena.get(alternate))
            .and_then(|alternate| alternate.child);
        let mut index = 0;
        let mut prev_sibling: Option<FiberId> = None;

        while index < elements.len() || old_fiber.is_some() {
            let element = elements.get(index);

            let new_fiber = match (old_fiber, element) {
                (Some(old_id), Some(element)) if self.arena[old_id].kind == element.kind => {
                    // Position kept its kind: reuse the host node, diff
                    // props at commit.
                    let old = &self.arena[old_id];
                    let mut fiber = Fiber::new(old.kind.clone(), element.props.clone());
                    fiber.host_node = old.host_node.clone();
                    fiber.parent = Some(parent);
                    fiber.alternate = Some(old_id);
                    fiber.effect = EffectTag::Update;
                    fiber.element_children = element.children.clone();
                    Some(self.arena.insert(fiber))
                }
                (old, element) => {
                    if let Some(old_id) = old {
                        // Old fiber with no matching element: leaves the tree.
                        self.arena[old_id].effect = EffectTag::Deletion;
                        self.deletions.push(old_id);
                        trace!(index, "marked deletion");
                    }
                    element.map(|element| {
                        let mut fiber = Fiber::new(element.kind.clone(), element.props.clone());
                        fiber.parent = Some(parent);
                        fiber.effect = EffectTag::Placement;
                        fiber.element_children = element.children.clone();
                        self.arena.insert(fiber)
                    })
                }
            };

            if let Some(id) = new_fiber {
                match prev_sibling {
                    Some(previous) => self.arena[previous].sibling = Some(id),
                    None => self.arena[parent].child = Some(id),
                }
                prev_sibling = Some(id);
            }

            old_fiber = old_fiber.and_then(|old| self.arena[old].sibling);
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::host::memory::MemoryHost;
    use crate::renderer::WorkStatus;
    use crate::types::Props;

    fn committed_renderer(children: Vec<Element>) -> Renderer<MemoryHost> {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        let mut renderer = Renderer::new(host);
        renderer.render(Element::host("list", Props::new(), children), container);
        assert_eq!(renderer.run_work_loop(|| true).unwrap(), WorkStatus::Committed);
        renderer
    }

    /// Walk effect tags of the list fiber's children after a re-render is
    /// fully traversed but not yet committed.
    fn child_effects(renderer: &Renderer<MemoryHost>) -> Vec<EffectTag> {
        let wip = renderer.wip_root.expect("pass in progress");
        let root_child = renderer.arena[wip].child.expect("list fiber");
        let mut effects = Vec::new();
        let mut cursor = renderer.arena[root_child].child;
        while let Some(id) = cursor {
            effects.push(renderer.arena[id].effect);
            cursor = renderer.arena[id].sibling;
        }
        effects
    }

    #[test]
    fn test_positional_diff_update_placement_deletion() {
        // Previous children [a, b, c]; new children [a', x].
        let mut renderer = committed_renderer(vec![
            Element::host("a", Props::new().with("id", "old"), vec![]),
            Element::host("b", Props::new(), vec![]),
            Element::host("c", Props::new(), vec![]),
        ]);
        let container = renderer.host().find_by_tag("root").unwrap();

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
        // Traverse without committing: yield once the cursor is exhausted.
        while renderer.next_unit.is_some() {
            let unit = renderer.next_unit.unwrap();
            renderer.next_unit = renderer.perform_unit(unit).unwrap();
        }

        assert_eq!(
            child_effects(&renderer),
            [EffectTag::Update, EffectTag::Placement]
        );
        // Both leftovers are in the deletion list, not in the new tree.
        let deleted: Vec<ElementKind> = renderer
            .deletions
            .iter()
            .map(|id| renderer.arena[*id].kind.clone())
            .collect();
        assert_eq!(
            deleted,
            [
                ElementKind::Host("b".to_string()),
                ElementKind::Host("c".to_string())
            ]
        );
    }

    #[test]
    fn test_update_reuses_host_node() {
        let mut renderer = committed_renderer(vec![Element::host(
            "a",
            Props::new().with("id", "one"),
            vec![],
        )]);
        let container = renderer.host().find_by_tag("root").unwrap();
        let committed = renderer.committed_root.unwrap();
        let list = renderer.arena[committed].child.unwrap();
        let old_node = renderer.arena[renderer.arena[list].child.unwrap()]
            .host_node
            .expect("committed host fiber owns a node");

        renderer.render(
            Element::host(
                "list",
                Props::new(),
                vec![Element::host("a", Props::new().with("id", "two"), vec![])],
            ),
            container,
        );
        while renderer.next_unit.is_some() {
            let unit = renderer.next_unit.unwrap();
            renderer.next_unit = renderer.perform_unit(unit).unwrap();
        }

        let wip = renderer.wip_root.unwrap();
        let new_list = renderer.arena[wip].child.unwrap();
        let new_a = renderer.arena[new_list].child.unwrap();
        assert_eq!(renderer.arena[new_a].effect, EffectTag::Update);
        assert_eq!(renderer.arena[new_a].host_node, Some(old_node));
    }

    #[test]
    fn test_kind_change_at_position_is_delete_plus_recreate() {
        let mut renderer =
            committed_renderer(vec![Element::host("a", Props::new(), vec![])]);
        let container = renderer.host().find_by_tag("root").unwrap();

        renderer.render(
            Element::host(
                "list",
                Props::new(),
                vec![Element::host("b", Props::new(), vec![])],
            ),
            container,
        );
        while renderer.next_unit.is_some() {
            let unit = renderer.next_unit.unwrap();
            renderer.next_unit = renderer.perform_unit(unit).unwrap();
        }

        assert_eq!(child_effects(&renderer), [EffectTag::Placement]);
        assert_eq!(renderer.deletions.len(), 1);
    }

    #[test]
    fn test_shrinking_to_empty_leaves_clean_chain() {
        let mut renderer = committed_renderer(vec![
            Element::host("a", Props::new(), vec![]),
            Element::host("b", Props::new(), vec![]),
        ]);
        let container = renderer.host().find_by_tag("root").unwrap();

        renderer.render(Element::host("list", Props::new(), vec![]), container);
        while renderer.next_unit.is_some() {
            let unit = renderer.next_unit.unwrap();
            renderer.next_unit = renderer.perform_unit(unit).unwrap();
        }

        assert!(child_effects(&renderer).is_empty());
        assert_eq!(renderer.deletions.len(), 2);
    }
}
