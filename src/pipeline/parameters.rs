//! Per-stage parameter stacks with last-value reuse

/// Stack of scalar stage parameters consumed from the end
///
/// Each matching stage takes the last remaining value. Once the stack runs
/// dry, the most recently taken value is handed out again for every later
/// occurrence, so `[1, 2]` yields `2, 1, 1, 1, ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStack {
    name: &'static str,
    remaining: Vec<f64>,
    last: Option<f64>,
}

impl ParameterStack {
    /// Create a stack; `values` are consumed last-to-first
    pub const fn new(name: &'static str, values: Vec<f64>) -> Self {
        Self {
            name,
            remaining: values,
            last: None,
        }
    }

    /// Parameter name used in error messages
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Take the next value, reusing the previous one once exhausted
    ///
    /// Returns `None` only if the stack was empty from the start.
    pub fn next_value(&mut self) -> Option<f64> {
        if let Some(value) = self.remaining.pop() {
            self.last = Some(value);
        }
        self.last
    }

    /// Values not yet consumed
    pub fn remaining(&self) -> &[f64] {
        &self.remaining
    }

    /// Most recently consumed value
    pub const fn last(&self) -> Option<f64> {
        self.last
    }
}
