//! Element model - the immutable "what should exist" description.
//!
//! Elements are plain values: a kind, a prop map, and ordered children.
//! They carry no behavior beyond construction; the renderer consumes them
//! during reconciliation and never mutates them.

use std::fmt;

use crate::error::RenderError;
use crate::hooks::Scope;
use crate::types::Props;

/// Prop key that carries the content of a text element.
pub const TEXT_PROP: &str = "text";

/// A function component.
///
/// Invoked with a hook scope and the props for its tree position; returns
/// the child elements to reconcile at that position. Plain function
/// pointers keep component identity comparable, which the positional diff
/// relies on.
pub type ComponentFn = fn(&mut Scope<'_>, &Props) -> Result<Vec<Element>, RenderError>;

// =============================================================================
// Element Kind
// =============================================================================

/// Discriminant of an element: a host surface tag, the reserved text kind,
/// or a function component.
#[derive(Clone)]
pub enum ElementKind {
    /// A node the host surface knows how to create by tag.
    Host(String),
    /// Reserved text kind; content lives in the [`TEXT_PROP`] prop.
    Text,
    /// A function component evaluated during the render phase.
    Component(ComponentFn),
}

impl ElementKind {
    /// Whether fibers of this kind own a host node.
    pub fn is_host(&self) -> bool {
        matches!(self, ElementKind::Host(_) | ElementKind::Text)
    }
}

impl PartialEq for ElementKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ElementKind::Host(a), ElementKind::Host(b)) => a == b,
            (ElementKind::Text, ElementKind::Text) => true,
            (ElementKind::Component(a), ElementKind::Component(b)) => {
                std::ptr::fn_addr_eq(*a, *b)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Host(tag) => write!(f, "Host({tag:?})"),
            ElementKind::Text => f.write_str("Text"),
            ElementKind::Component(func) => write!(f, "Component({:p})", *func as *const ()),
        }
    }
}

// =============================================================================
// Element
// =============================================================================

/// Immutable description of one position in the desired tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Host tag, text, or component discriminant.
    pub kind: ElementKind,
    /// Properties for this position.
    pub props: Props,
    /// Ordered children.
    pub children: Vec<Element>,
}

impl Element {
    /// A host element with the given tag, props, and children.
    pub fn host(tag: impl Into<String>, props: Props, children: Vec<Element>) -> Self {
        Self {
            kind: ElementKind::Host(tag.into()),
            props,
            children,
        }
    }

    /// A component element. Children come from evaluating the component,
    /// not from the element itself.
    pub fn component(component: ComponentFn, props: Props) -> Self {
        Self {
            kind: ElementKind::Component(component),
            props,
            children: Vec::new(),
        }
    }

    /// A text element; shorthand for [`create_text_element`].
    pub fn text(value: impl fmt::Display) -> Self {
        create_text_element(value)
    }
}

// =============================================================================
// Construction
// =============================================================================

/// A child argument to [`create_element`]: either an element, or a plain
/// value coerced into a text element.
pub enum ChildValue {
    /// Pass an element through unchanged.
    Element(Element),
    /// Wrap a plain value's string form in a text element.
    Value(String),
}

impl From<Element> for ChildValue {
    fn from(element: Element) -> Self {
        ChildValue::Element(element)
    }
}

impl From<&str> for ChildValue {
    fn from(value: &str) -> Self {
        ChildValue::Value(value.to_string())
    }
}

impl From<String> for ChildValue {
    fn from(value: String) -> Self {
        ChildValue::Value(value)
    }
}

impl From<i64> for ChildValue {
    fn from(value: i64) -> Self {
        ChildValue::Value(value.to_string())
    }
}

impl From<f64> for ChildValue {
    fn from(value: f64) -> Self {
        ChildValue::Value(value.to_string())
    }
}

impl From<bool> for ChildValue {
    fn from(value: bool) -> Self {
        ChildValue::Value(value.to_string())
    }
}

/// Build an element from a kind, props, and child values.
///
/// Non-element children are coerced through [`create_text_element`]; no
/// other validation happens here. An unusable host tag is rejected by the
/// work loop the first time the element is evaluated.
///
/// # Example
///
/// ```
/// use cinder::{create_element, Element, ElementKind, Props};
///
/// let list = create_element(
///     ElementKind::Host("list".to_string()),
///     Props::new().with("id", "fruit"),
///     [Element::host("item", Props::new(), vec![]).into(), "plain text".into()],
/// );
/// assert_eq!(list.children.len(), 2);
/// ```
pub fn create_element(
    kind: ElementKind,
    props: Props,
    children: impl IntoIterator<Item = ChildValue>,
) -> Element {
    let children = children
        .into_iter()
        .map(|child| match child {
            ChildValue::Element(element) => element,
            ChildValue::Value(value) => create_text_element(value),
        })
        .collect();

    Element {
        kind,
        props,
        children,
    }
}

/// Wrap a plain value in a text element carrying the value's string form
/// as its single [`TEXT_PROP`] prop.
pub fn create_text_element(value: impl fmt::Display) -> Element {
    Element {
        kind: ElementKind::Text,
        props: Props::new().with(TEXT_PROP, value.to_string()),
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn null_component(_scope: &mut Scope<'_>, _props: &Props) -> Result<Vec<Element>, RenderError> {
        Ok(Vec::new())
    }

    fn other_component(
        _scope: &mut Scope<'_>,
        _props: &Props,
    ) -> Result<Vec<Element>, RenderError> {
        Ok(Vec::new())
    }

    #[test]
    fn test_child_count_matches_arguments() {
        let element = create_element(
            ElementKind::Host("row".to_string()),
            Props::new(),
            [
                Element::host("cell", Props::new(), vec![]).into(),
                "hello".into(),
                ChildValue::from(42i64),
            ],
        );
        assert_eq!(element.children.len(), 3);
    }

    #[test]
    fn test_plain_children_become_text_elements() {
        let element = create_element(
            ElementKind::Host("row".to_string()),
            Props::new(),
            [ChildValue::from(42i64), ChildValue::from("abc")],
        );

        for (child, expected) in element.children.iter().zip(["42", "abc"]) {
            assert_eq!(child.kind, ElementKind::Text);
            assert_eq!(
                child.props.get(TEXT_PROP).and_then(|v| v.as_text()),
                Some(expected)
            );
            assert!(child.children.is_empty());
        }
    }

    #[test]
    fn test_kind_equality() {
        assert_eq!(
            ElementKind::Host("box".to_string()),
            ElementKind::Host("box".to_string())
        );
        assert_ne!(
            ElementKind::Host("box".to_string()),
            ElementKind::Host("list".to_string())
        );
        assert_ne!(ElementKind::Host("text".to_string()), ElementKind::Text);
        assert_eq!(
            ElementKind::Component(null_component),
            ElementKind::Component(null_component)
        );
        assert_ne!(
            ElementKind::Component(null_component),
            ElementKind::Component(other_component)
        );
    }
}
