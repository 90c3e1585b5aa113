use thiserror::Error;

use crate::chunk::Address;

pub type AllocResult<T> = Result<T, AllocError>;

/// Failures reported by [`AllocationEngine`](crate::AllocationEngine).
///
/// None of these are fatal. The engine is left in a consistent state and
/// the caller decides what to do.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  #[error("invalid allocation size: requests must be at least one byte")]
  InvalidSize,

  #[error("out of memory: heap could not grow by {requested} bytes")]
  OutOfMemory { requested: usize },

  #[error("address {0} is not currently allocated")]
  NotFound(Address),

  #[error("no fit strategy configured")]
  StrategyUnset,
}

/// The heap backend refused to grow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("heap exhausted while growing by {requested} bytes")]
pub struct HeapExhausted {
  pub requested: usize,
}

impl From<HeapExhausted> for AllocError {
  fn from(
    err: HeapExhausted,
  ) -> Self {
    AllocError::OutOfMemory {
      requested: err.requested,
    }
  }
}
