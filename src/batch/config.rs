use crate::config::ConfigError;

pub const DEFAULT_CHUNK_SIZE: usize = 64;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Chunking and concurrency limits for batch ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Documents per store write.
    pub chunk_size: usize,
    /// Chunk writes allowed in flight at once.
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl BatchConfig {
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroValue {
                name: "batch chunk_size",
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroValue {
                name: "batch max_concurrency",
            });
        }
        Ok(())
    }
}
