//! Binding configuration.

/// Debounce windows used by an instance.
///
/// Both default to 0 ms: work is deferred to the next timer turn, which is
/// enough to coalesce changes made within one synchronous burst.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindingConfig {
    /// Window for skip-condition changes, per query key
    pub skip_debounce_ms: u32,
    /// Window for variable changes, per query key
    pub variable_debounce_ms: u32,
}

impl BindingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_debounce(mut self, ms: u32) -> Self {
        self.skip_debounce_ms = ms;
        self
    }

    pub fn with_variable_debounce(mut self, ms: u32) -> Self {
        self.variable_debounce_ms = ms;
        self
    }
}
