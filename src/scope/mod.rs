//! Hierarchical cancellation scopes.
//!
//! A [`Scope`] is a node in a cancellation tree. It carries a one-shot done
//! signal, a terminal [`CancelCause`](crate::CancelCause), an optional
//! deadline, and immutable key/value bindings looked up through the parent
//! chain.
//!
//! ## Wiring
//! ```text
//! Scope::root()
//!    ├─ with_cancel()   ──► child + CancelHandle (explicit cancellation)
//!    ├─ with_timeout(d) ──► child + CancelHandle (auto-expires)
//!    ├─ with_deadline(t)──► child + CancelHandle (auto-expires)
//!    └─ with_value(k,v) ──► child carrying one extra binding
//!
//! parent transition ──► broadcast ──► every live descendant transitions
//!                                      with the same cause, synchronously
//! ```
//!
//! ## Rules
//! - The done state is **monotonic**: once set, the cause never changes.
//! - Parent→child propagation happens during the transition itself, not
//!   lazily on the next query.
//! - Deriving a child from an already-done parent yields an immediately
//!   done child with the same cause.
//! - Parents hold only weak registrations to children; children keep their
//!   parent alive for lookup and propagation. No strong cycles.

mod inner;
mod scope;

pub use scope::{CancelHandle, Scope};
