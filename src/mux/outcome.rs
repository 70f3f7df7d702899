//! Tagged result of a multiplexed wait.

use crate::error::CancelCause;

/// Which source of a [`Mux`](crate::Mux) wait fired, plus the carried value.
///
/// `source` is the zero-based registration order of the source on the
/// builder. Exactly one outcome is produced per wait.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// A data source (channel receive or queue take) resolved.
    ///
    /// `value` is `None` only when the source was a
    /// [`BoundedChannel`](crate::BoundedChannel) that is closed and drained.
    Recv {
        /// Registration index of the source that fired.
        source: usize,
        /// The received value, if any.
        value: Option<T>,
    },

    /// A timer source elapsed.
    Elapsed {
        /// Registration index of the source that fired.
        source: usize,
    },

    /// A scope's done signal fired.
    Done {
        /// Registration index of the source that fired.
        source: usize,
        /// Why the scope became done.
        cause: CancelCause,
    },

    /// Nothing was ready and the default case was requested.
    Default,
}

impl<T> Outcome<T> {
    /// Registration index of the source that fired, if not the default case.
    pub fn source(&self) -> Option<usize> {
        match self {
            Outcome::Recv { source, .. }
            | Outcome::Elapsed { source }
            | Outcome::Done { source, .. } => Some(*source),
            Outcome::Default => None,
        }
    }

    /// `true` for a cancellation outcome.
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done { .. })
    }
}
