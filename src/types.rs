//! Core types for cinder.
//!
//! These types define the foundation that everything builds on.
//! They flow from element construction through reconciliation and are the
//! currency of the host mutation interface.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

// =============================================================================
// Event Callback
// =============================================================================

/// Event handler attached to a host node through an `"on*"` prop.
///
/// Using Rc<dyn Fn> instead of Box<dyn Fn> allows cloning callbacks
/// into closures without ownership issues. Equality is pointer identity,
/// which is what makes handler props diffable: a handler prop changed if
/// and only if it holds a different closure allocation.
#[derive(Clone)]
pub struct EventCallback(Rc<dyn Fn()>);

impl EventCallback {
    /// Wrap a closure as an event callback.
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invoke the callback.
    pub fn call(&self) {
        (self.0)()
    }
}

impl PartialEq for EventCallback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventCallback({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// Prop Value
// =============================================================================

/// A single property value on an element.
///
/// Host properties are plain data plus event handlers; anything richer
/// belongs on the host side of the mutation interface.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// Text value (also carries the content of text elements).
    Text(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Event handler, bound through the listener half of the host interface.
    Handler(EventCallback),
}

impl PropValue {
    /// Borrow the text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// The integer content, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The boolean content, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Borrow the handler, if this is an event handler value.
    pub fn as_handler(&self) -> Option<&EventCallback> {
        match self {
            PropValue::Handler(callback) => Some(callback),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(value) => f.write_str(value),
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<EventCallback> for PropValue {
    fn from(value: EventCallback) -> Self {
        PropValue::Handler(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Ordered property map for one element position.
///
/// Insertion order is preserved so prop diffs walk both sides in a stable
/// order and the commit-time mutation sequence is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: IndexMap<String, PropValue>,
}

impl Props {
    /// Create an empty prop map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// # Example
    ///
    /// ```
    /// use cinder::Props;
    ///
    /// let props = Props::new().with("id", "title").with("rows", 3);
    /// assert_eq!(props.len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a property, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a property by key.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
