//! Error and status types returned by channel and select operations.
//!
//! These mirror the status-code taxonomy of a bounded channel: `Closed` and
//! `WouldBlock` are expected, recoverable outcomes a caller matches on in the
//! common path; `OtherError`/`DestroyError` mark programmer errors (bad
//! arguments, misuse of the lifecycle API).

use std::fmt;
use thiserror::Error;

/// Returned by [`crate::Sender::send`]. The channel was closed, so `value`
/// was never placed on the channel and is handed back to the caller.
#[derive(Error)]
#[error("send on closed channel")]
pub struct SendError<T>(pub T);

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendError").finish_non_exhaustive()
    }
}

/// Returned by [`crate::Sender::try_send`].
#[derive(Error)]
pub enum TrySendError<T> {
    /// The channel buffer was full; `value` is handed back unsent.
    #[error("send would block")]
    WouldBlock(T),
    /// The channel is closed; `value` is handed back unsent.
    #[error("send on closed channel")]
    Closed(T),
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::WouldBlock(_) => f.debug_tuple("WouldBlock").finish(),
            TrySendError::Closed(_) => f.debug_tuple("Closed").finish(),
        }
    }
}

impl<T> TrySendError<T> {
    /// Recover the value that failed to send.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::WouldBlock(v) => v,
            TrySendError::Closed(v) => v,
        }
    }
}

/// Returned by [`crate::Receiver::recv`]. The channel is closed and empty.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("recv on closed channel")]
pub struct RecvError;

/// Returned by [`crate::Receiver::try_recv`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// The channel buffer was empty.
    #[error("recv would block")]
    WouldBlock,
    /// The channel is closed and empty.
    #[error("recv on closed channel")]
    Closed,
}

/// Returned by `close` when the channel was already closed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("channel already closed")]
pub struct CloseError;

/// Returned by an explicit `destroy` call on a channel that is still open.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("destroy called on an open channel")]
pub struct DestroyError;

/// Status returned by [`crate::select`] and [`crate::select_timeout`].
#[derive(Error, Debug)]
pub enum SelectError {
    /// The operation selected was on a closed channel.
    #[error("select entry {0} was on a closed channel")]
    Closed(usize),
    /// No entry became feasible before the deadline.
    #[error("select timed out")]
    Timeout,
    /// The entries slice was empty.
    #[error("select called with no entries")]
    Empty,
}
