//! # fitalloc - A Free-List Memory Allocator
//!
//! This crate provides a user-space allocator that keeps a record of every
//! chunk it has ever handed out and reuses freed chunks before asking the OS
//! for more memory with `sbrk`.
//!
//! ## Overview
//!
//! ```text
//!   Free-List Allocator Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌─────┬─────┬─────┬─────┬───────────────────────────────────────┐  │
//!   │   │ A1  │ F1  │ A2  │ F2  │          Not yet grown                │  │
//!   │   └─────┴─────┴─────┴─────┴───────────────────────────────────────┘  │
//!   │                           ▲                                          │
//!   │                           │                                          │
//!   │                     Program Break                                    │
//!   │                                                                      │
//!   │   occupied: [A1, A2]      free: [F1, F2]                             │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   A request is served from the free list when a chunk is large enough,
//!   otherwise the break is pushed forward.
//! ```
//!
//! Which free chunk is used is decided by a [`FitStrategy`]:
//!
//! ```text
//!   free: [ 10 ][ 5 ][ 8 ]        request: 6
//!
//!   first-fit ──► [ 10 ]   first chunk that is large enough
//!   best-fit  ──► [ 8 ]    chunk leaving the least unused space
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   fitalloc
//!   ├── align      - Word alignment macro (align!)
//!   ├── chunk      - Address handle and chunk record
//!   ├── registry   - Free and occupied chunk sets
//!   ├── strategy   - FitStrategy trait, FirstFit, BestFit
//!   ├── heap       - HeapGrowth trait, SbrkHeap, SimulatedHeap
//!   ├── stats      - Allocation counters
//!   ├── engine     - AllocationEngine
//!   └── shell      - Line command driver and report
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitalloc::{AllocationEngine, SimulatedHeap, Strategy};
//!
//! let mut engine = AllocationEngine::with_strategy(SimulatedHeap::new(4096), Strategy::BestFit);
//!
//! let address = engine.allocate(64).unwrap();
//! engine.deallocate(address).unwrap();
//!
//! // Served from the free list, the heap does not grow.
//! assert_eq!(engine.allocate(64).unwrap(), address);
//! assert_eq!(engine.stats_snapshot().num_allocations, 2);
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: every operation takes `&mut self`
//! - **No splitting or coalescing**: a large free chunk serving a small
//!   request wastes the remainder
//! - **No reclamation**: memory is never handed back to the OS
//! - **Unix-only**: `SbrkHeap` requires `libc` and `sbrk` (POSIX systems)

pub mod align;
pub mod chunk;
pub mod engine;
pub mod error;
pub mod heap;
pub mod registry;
pub mod shell;
pub mod stats;
pub mod strategy;

pub use chunk::{Address, Chunk};
pub use engine::AllocationEngine;
pub use error::{AllocError, AllocResult, HeapExhausted};
pub use heap::{HeapGrowth, SbrkHeap, SimulatedHeap, program_break};
pub use registry::ChunkRegistry;
pub use shell::{Command, CommandError, Report, Session};
pub use stats::{Stats, StatsCollector};
pub use strategy::{BestFit, FirstFit, FitStrategy, Strategy, UnknownStrategy};
