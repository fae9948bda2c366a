/// Limits for a single parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum live GLR heads after each token (default: 6).
    pub(crate) max_heads: usize,
    /// Maximum consecutive zero-width insertions during recovery (default: 3).
    pub(crate) max_insertions: u32,
    /// Maximum parser actions, unlimited when `None` (default).
    pub(crate) exec_fuel: Option<u32>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_heads: 6,
            max_insertions: 3,
            exec_fuel: None,
        }
    }
}

impl ParseOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the head cap. Values below 1 are raised to 1.
    pub fn max_heads(mut self, heads: usize) -> Self {
        self.max_heads = heads.max(1);
        self
    }

    /// Set the consecutive insertion limit.
    pub fn max_insertions(mut self, insertions: u32) -> Self {
        self.max_insertions = insertions;
        self
    }

    /// Set the step budget.
    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.exec_fuel = Some(fuel);
        self
    }

    pub fn get_max_heads(&self) -> usize {
        self.max_heads
    }

    pub fn get_max_insertions(&self) -> u32 {
        self.max_insertions
    }

    pub fn get_exec_fuel(&self) -> Option<u32> {
        self.exec_fuel
    }
}
