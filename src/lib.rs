//! This crate provides lazily constructed, process-wide shared instances that
//! are safe to obtain from any number of threads concurrently, together with a
//! shared log sink built on top of them and a pair of bounded containers.
//!
//! # Shared Instances
//!
//! A [`Holder`] is a slot for a single instance, which is constructed by the
//! first caller and handed out as a shared reference to everyone else.
//! Construction follows a double-checked locking protocol:
//!
//! 1. the ready flag is loaded (acquire) without any lock; if the instance
//!    exists, it is returned immediately,
//! 2. otherwise the construction lock is acquired (the only blocking point),
//! 3. the flag is checked again, since another thread may have finished
//!    construction while this thread was waiting,
//! 4. if there is still no instance, it is constructed and published with a
//!    release store before the lock is released.
//!
//! Once published, obtaining the instance never touches the lock again.
//! Failing or panicking constructors leave the slot unconstructed, so that the
//! construction can be retried; a [`Holder`] is never poisoned.
//!
//! A [`Coordinator`] pairs a [`Holder`] with its constructor and is the
//! single entry point through which callers obtain the instance, either as a
//! `static` or injected into its users through an [`Arc`](std::sync::Arc).
//!
//! Both types are generic over the exclusion primitive guarding construction.
//! The types exported at the crate root park waiting threads, the types in the
//! [`spin`] module spin instead.
//!
//! # Shared Log Sink
//!
//! The [`logger`] module provides the process-wide [`Logger`](logger::Logger),
//! obtained through [`logger::get_shared`].
//! Every record is emitted under the logger's own lock, which is independent
//! of the construction lock.
//!
//! # Bounded Containers
//!
//! The [`bounded`] module provides a fixed-capacity stack and a fixed-capacity
//! circular queue, which report full and empty conditions as errors.

#![deny(missing_docs)]
#![forbid(clippy::undocumented_unsafe_blocks)]

#[cfg(test)]
#[macro_use]
mod tests;

pub mod bounded;
pub mod logger;
pub mod ownership;
pub mod spin;

/// Re-exports of internal generic types for the purpose of accessing their
/// documentation.
pub mod doc {
    pub use crate::coordinator::Coordinator;
    pub use crate::holder::Holder;
}

mod coordinator;
mod gate;
mod holder;
mod park;
mod state;

pub use crate::gate::RawLock;
pub use crate::holder::{ConstructError, TimeoutError, UninitError};
pub use crate::park::{Coordinator, Holder, ParkLock, TryCoordinator};

mod internal {
    /// Prevents implementations of [`RawLock`](crate::RawLock) outside of
    /// this crate.
    pub trait Sealed {}
}
