use crate::fd::MAX_DESC_COUNT;

/// Filesystem parameters fixed at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of descriptor slots in the pool.
    pub max_descriptors: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_descriptors: MAX_DESC_COUNT,
        }
    }
}
