//! Execution configuration for the pooling kernel.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Output cell count at which [`ExecutionStrategy::Auto`] switches to the
/// parallel path.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// How the kernel walks the output cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "snake_case"))]
pub enum ExecutionStrategy {
    /// Sequential single-threaded execution
    Sequential,
    /// One rayon task per region on the global pool
    Parallel,
    /// Parallel once the output reaches `parallel_threshold` cells
    #[default]
    Auto,
}

/// Configuration for ROI pooling execution
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct RoiPoolConfig {
    pub execution: ExecutionStrategy,
    /// Minimum number of output cells for `Auto` to go parallel
    pub parallel_threshold: usize,
}

impl Default for RoiPoolConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionStrategy::Auto,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl RoiPoolConfig {
    pub fn sequential() -> Self {
        Self::default().with_execution(ExecutionStrategy::Sequential)
    }

    pub fn parallel() -> Self {
        Self::default().with_execution(ExecutionStrategy::Parallel)
    }

    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Whether a kernel producing `output_cells` cells should run in parallel.
    ///
    /// Always `false` when the crate is built without the `parallel` feature.
    pub fn use_parallel(&self, output_cells: usize) -> bool {
        if !cfg!(feature = "parallel") {
            return false;
        }
        match self.execution {
            ExecutionStrategy::Sequential => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => output_cells >= self.parallel_threshold,
        }
    }
}
