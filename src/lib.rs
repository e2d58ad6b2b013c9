//! # oscar
//!
//! An embeddable mark-and-sweep object pool for fixed-size cells.
//!
//! `oscar` hands out stable [`PoolId`] handles to cells of a caller-chosen
//! byte size, and reclaims unreferenced cells with a tracing collector
//! driven by a caller-supplied root-marking callback. Two storage modes
//! are supported: a growable [`Pool`] backed by a [`MemoryProvider`], and a
//! fixed pool backed by a pre-allocated byte region the caller continues
//! to own.
//!
//! ## Design
//!
//! 1. **No runtime.** `alloc`, `get`, `force_gc` are plain synchronous
//!    methods; there is nothing here to schedule or await.
//! 2. **No moving collector.** Sweep reclaims cells in place; it never
//!    compacts or relocates live cells.
//! 3. **Callback-driven roots.** The pool has no notion of a root set of
//!    its own — the caller supplies a mark callback that walks whatever
//!    roots it understands and calls [`MarkCtx::mark`] for each reachable
//!    id.
//!
//! ## Example
//!
//! ```
//! use oscar::{Pool, GenericMemoryProvider};
//!
//! let mut pool = Pool::new_growable(
//!     8,
//!     4,
//!     Box::new(GenericMemoryProvider::default()),
//!     Box::new(|_ctx| 0), // no roots: everything is garbage
//!     Box::new(|_id, _payload| {}),
//! ).unwrap();
//!
//! let id = pool.alloc();
//! assert!(pool.get(id).is_some());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod error;
mod id;
mod mark;
mod pool;
mod provider;

pub use error::PoolError;
pub use id::PoolId;
pub use mark::MarkCtx;
pub use pool::Pool;
pub use provider::{GenericMemoryProvider, MemoryProvider};
