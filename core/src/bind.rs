//! Applies value runs to descriptors through a coercion service.

use tracing::debug;

use crate::coerce::Coerce;
use crate::schema::ArgumentSchema;
use crate::tokenize::Segment;
use crate::value::{ScalarType, Value, ValueType};

/// Per-instance parse state, indexed by descriptor position.
///
/// The explicit-set flags only ever flip to `true` during binding; a fresh
/// state is the only way to clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseState {
    explicitly_set: Vec<bool>,
    last_error: Vec<Option<String>>,
}

impl ParseState {
    pub fn new(len: usize) -> Self {
        Self {
            explicitly_set: vec![false; len],
            last_error: vec![None; len],
        }
    }

    /// Whether the descriptor at `index` received a value.
    pub fn was_set(&self, index: usize) -> bool {
        self.explicitly_set.get(index).copied().unwrap_or(false)
    }

    /// The recorded binding error for the descriptor at `index`.
    pub fn last_error(&self, index: usize) -> Option<&str> {
        self.last_error.get(index).and_then(|e| e.as_deref())
    }

    pub(crate) fn mark_set(&mut self, index: usize) {
        if let Some(flag) = self.explicitly_set.get_mut(index) {
            *flag = true;
        }
        if let Some(error) = self.last_error.get_mut(index) {
            *error = None;
        }
    }

    pub(crate) fn record_error(&mut self, index: usize, message: impl Into<String>) {
        if let Some(error) = self.last_error.get_mut(index) {
            *error = Some(message.into());
        }
    }
}

/// Writes segments into a target through descriptor setters.
#[derive(Debug)]
pub struct ValueBinder<'a, C: ?Sized> {
    coercer: &'a C,
}

impl<'a, C: Coerce + ?Sized> ValueBinder<'a, C> {
    pub fn new(coercer: &'a C) -> Self {
        Self { coercer }
    }

    /// Binds one segment. Failures are recorded in `state`, never returned.
    ///
    /// - arrays coerce every token; a failure leaves the field unchanged
    /// - scalars coerce the first token; an empty run does nothing
    /// - booleans are `true` when bare or unparseable, `false` when negated
    pub fn bind<T>(
        &self,
        schema: &ArgumentSchema<T>,
        segment: &Segment,
        target: &mut T,
        state: &mut ParseState,
    ) {
        let index = segment.descriptor;
        let Some(descriptor) = schema.descriptor(index) else {
            return;
        };

        let value = match &descriptor.value_type {
            ValueType::Array(element) => match self.coercer.coerce_array(&segment.values, element) {
                Ok(value) => value,
                Err(err) => {
                    debug!(field = %descriptor.name, error = %err, "Array coercion failed");
                    state.record_error(index, err.to_string());
                    return;
                }
            },
            ValueType::Scalar(ScalarType::Bool) => {
                if segment.negated {
                    Value::Bool(false)
                } else {
                    match segment.values.first() {
                        None => Value::Bool(true),
                        Some(raw) => self
                            .coercer
                            .coerce(raw, &ScalarType::Bool)
                            .unwrap_or_else(|err| {
                                debug!(field = %descriptor.name, error = %err, "Treating unparseable boolean as present");
                                Value::Bool(true)
                            }),
                    }
                }
            }
            ValueType::Scalar(scalar) => {
                let Some(raw) = segment.values.first() else {
                    return;
                };
                match self.coercer.coerce(raw, scalar) {
                    Ok(value) => value,
                    Err(err) => {
                        debug!(field = %descriptor.name, error = %err, "Coercion failed");
                        state.record_error(index, err.to_string());
                        return;
                    }
                }
            }
        };

        match descriptor.set(target, value) {
            Ok(()) => state.mark_set(index),
            Err(err) => state.record_error(index, err.to_string()),
        }
    }
}
