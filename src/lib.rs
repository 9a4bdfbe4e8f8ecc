//! # Threadsync - Chat Thread Sync Client
//!
//! A terminal client core for rooms-and-conversations chat backends.
//! The library keeps a locally held, paginated message list consistent
//! with a REST backend that is the sole source of truth, under four
//! concurrent update paths: initial load, backward pagination ("load
//! older"), a periodic page-1 refresh, and optimistic insertion of the
//! viewer's own sends.
//!
//! ## Architecture Overview
//!
//! The crate is organized around the Elm architecture pattern:
//!
//! - **Model** (`core::state`): the thread view state and merge engine
//! - **Message** (`core::msg`): events that can change the state
//! - **Update** (`core::update`): the pure transition function
//! - **Command** (`core::cmd`): side effects (fetches, sends)
//! - **Runtime** (`infrastructure::runtime`): executes commands and
//!   feeds results back as messages
//!
//! ## Example Usage
//!
//! ```rust
//! use threadsync::core::msg::SyncMsg;
//! use threadsync::core::state::SyncState;
//! use threadsync::core::update::update;
//! use threadsync::domain::{Liveness, ThreadId};
//!
//! // A fresh view of room 7; nothing is loaded and the driver is idle.
//! let state = SyncState::new(ThreadId::Room(7));
//!
//! // The viewer joins and the room is active: the view becomes
//! // pollable and immediately asks for page 1.
//! let (state, cmds) = update(
//!     SyncMsg::LivenessChanged(Liveness::new(true, true)),
//!     state,
//! );
//!
//! assert!(state.should_poll());
//! assert!(!cmds.is_empty());
//! ```
//!
//! ## Key Guarantees
//!
//! - **No duplicate ids**: every merge deduplicates by message id
//! - **Refresh idempotence**: re-applying a page-1 payload is a no-op
//! - **No fatal paths**: malformed pagination metadata is derived, not
//!   rejected; fetch failures leave state untouched and retry naturally
//!
//! ## Modules
//!
//! - [`core`] - state, messages, update function, send validation
//! - [`domain`] - message and thread types
//! - [`infrastructure`] - REST client, poller, runtime, configuration
//! - [`cli`] - command line interface
//! - [`utils`] - logging, panic handling, path discovery

#![allow(dead_code)]

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod utils;

#[doc(hidden)]
pub mod test_helpers;

// Re-exports for convenience
pub use crate::core::cmd::SyncCmd;
pub use crate::core::msg::SyncMsg;
pub use crate::core::state::SyncState;
pub use crate::core::update::update;
pub use crate::domain::{Message, ThreadId};

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
