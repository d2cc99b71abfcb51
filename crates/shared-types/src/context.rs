//! Run-wide settings threaded through calls by reference.

/// Explicit run context replacing process-wide switches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Emit per-step diagnostics.
    pub verbose: bool,
}

impl RunContext {
    /// Create a quiet context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verbose flag.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Default log filter directive for this context.
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
