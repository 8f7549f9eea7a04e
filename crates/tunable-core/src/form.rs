//! Form-control contract for GUI hosts
//!
//! The interceptor describes each visible tunable as a [`FormControl`]. A
//! host toolkit implements [`FormRenderer`] and routes edits back through
//! [`Interceptor::apply_form_change`](crate::Interceptor::apply_form_change).

use crate::interceptor::HandlerDescriptor;
use crate::value::ValueKind;

/// Widget kind a host should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    /// Integer spinner
    Integer,
    /// Numeric input
    Float,
    /// Checkbox
    Toggle,
    /// Text input
    Text,
    /// Drop-down over the candidates
    Choice(Vec<String>),
}

/// Description of one form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    /// External key, passed back on change
    pub key: String,
    /// Label text, taken from the declaration's description
    pub label: String,
    /// Optional grouping
    pub group: Option<String>,
    /// Widget kind
    pub widget: Widget,
    /// Current value, `None` if it cannot be read
    pub current: Option<String>,
}

impl FormControl {
    /// Build a control from a handler snapshot
    #[must_use]
    pub fn from_descriptor(descriptor: &HandlerDescriptor) -> Self {
        let widget = match descriptor.kind {
            ValueKind::Integer => Widget::Integer,
            ValueKind::Float => Widget::Float,
            ValueKind::Boolean => Widget::Toggle,
            ValueKind::Text => Widget::Text,
            ValueKind::Choice => Widget::Choice(descriptor.possible_values.clone().unwrap_or_default()),
        };
        Self {
            key: descriptor.key.clone(),
            label: descriptor.meta.description.clone(),
            group: descriptor.meta.group.clone(),
            widget,
            current: descriptor.current.clone(),
        }
    }
}

/// Implemented by GUI hosts to draw controls
///
/// `on_change` applies a new value and reports whether it was accepted.
pub trait FormRenderer {
    /// Render one control
    fn render(&mut self, control: &FormControl, on_change: &dyn Fn(&str) -> bool);
}
