//! The channel core: a core mutex, two condition variables, a bounded
//! buffer, a closed flag, and the two waiter registries a [`crate::select`]
//! call registers into.
//!
//! This is a from-scratch replacement for the crate's original lock-free
//! `cnt`/`steals`-based packet, chosen because a select operator needs a
//! registry of cross-channel wakeup tokens to post into, and that is far
//! simpler to reason about with one mutex guarding buffer-and-closed-flag
//! than with an atomic refcount and a "drain on disconnect" dance.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, TryLockError};

use log::{debug, trace};

use crate::buffer::BoundedBuffer;
use crate::error::{CloseError, DestroyError, RecvError, SendError, TryRecvError, TrySendError};
use crate::registry::Registry;

struct State<T> {
    buffer: BoundedBuffer<T>,
    closed: bool,
}

pub(crate) struct ChannelInner<T> {
    state: Mutex<State<T>>,
    send_cv: Condvar,
    recv_cv: Condvar,
    pub(crate) send_registry: Registry,
    pub(crate) recv_registry: Registry,
}

impl<T> ChannelInner<T> {
    fn new(capacity: usize) -> ChannelInner<T> {
        ChannelInner {
            state: Mutex::new(State {
                buffer: BoundedBuffer::new(capacity),
                closed: false,
            }),
            send_cv: Condvar::new(),
            recv_cv: Condvar::new(),
            send_registry: Registry::new(),
            recv_registry: Registry::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().expect("channel core mutex poisoned")
    }

    fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// The sending half of a bounded channel. Cloneable: any number of senders
/// may share one channel.
pub struct Sender<T> {
    pub(crate) inner: Arc<ChannelInner<T>>,
}

/// The receiving half of a bounded channel. Cloneable: any number of
/// receivers may share one channel.
pub struct Receiver<T> {
    pub(crate) inner: Arc<ChannelInner<T>>,
}

/// Create a bounded channel of the given capacity.
///
/// Capacity zero is accepted; it behaves like a channel that can never hold
/// a value without a receiver already waiting, so sends on it block until
/// either a receiver drains them immediately or the channel closes.
pub fn channel<T: Send>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let inner = Arc::new(ChannelInner::new(capacity));
    trace!("channel created with capacity {}", capacity);
    (
        Sender {
            inner: inner.clone(),
        },
        Receiver { inner },
    )
}

impl<T: Send> Sender<T> {
    /// Send `value`, blocking until there is room, the channel closes, or
    /// (implementation detail of std condvars) a spurious wake requires a
    /// re-check of the predicate.
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        let mut guard = self.inner.lock();
        loop {
            if guard.closed {
                return Err(SendError(value));
            }
            if !guard.buffer.is_full() {
                break;
            }
            guard = self
                .inner
                .send_cv
                .wait(guard)
                .expect("channel core mutex poisoned");
        }
        guard.buffer.push(value);
        self.inner.recv_cv.notify_one();
        drop(guard);
        self.inner.recv_registry.post_all();
        trace!("send completed");
        Ok(())
    }

    /// Send `value` without blocking.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let mut guard = match self.inner.state.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(TrySendError::WouldBlock(value)),
            Err(TryLockError::Poisoned(_)) => panic!("channel core mutex poisoned"),
        };
        if guard.closed {
            return Err(TrySendError::Closed(value));
        }
        if guard.buffer.is_full() {
            return Err(TrySendError::WouldBlock(value));
        }
        guard.buffer.push(value);
        self.inner.recv_cv.notify_one();
        drop(guard);
        self.inner.recv_registry.post_all();
        Ok(())
    }

    /// Close the channel. Every blocked and future send/receive fails with
    /// a closed-channel error.
    pub fn close(&self) -> Result<(), CloseError> {
        close(&self.inner)
    }
}

impl<T: Send> Receiver<T> {
    /// Receive a value, blocking until one is available or the channel
    /// closes.
    pub fn recv(&self) -> Result<T, RecvError> {
        let mut guard = self.inner.lock();
        loop {
            if !guard.buffer.is_empty() {
                break;
            }
            if guard.closed {
                return Err(RecvError);
            }
            guard = self
                .inner
                .recv_cv
                .wait(guard)
                .expect("channel core mutex poisoned");
        }
        let value = guard.buffer.pop();
        self.inner.send_cv.notify_one();
        drop(guard);
        self.inner.send_registry.post_all();
        trace!("recv completed");
        Ok(value)
    }

    /// Receive a value without blocking.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut guard = match self.inner.state.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(TryRecvError::WouldBlock),
            Err(TryLockError::Poisoned(_)) => panic!("channel core mutex poisoned"),
        };
        if !guard.buffer.is_empty() {
            let value = guard.buffer.pop();
            self.inner.send_cv.notify_one();
            drop(guard);
            self.inner.send_registry.post_all();
            return Ok(value);
        }
        if guard.closed {
            return Err(TryRecvError::Closed);
        }
        Err(TryRecvError::WouldBlock)
    }

    /// Close the channel. Every blocked and future send/receive fails with
    /// a closed-channel error.
    pub fn close(&self) -> Result<(), CloseError> {
        close(&self.inner)
    }
}

fn close<T>(inner: &Arc<ChannelInner<T>>) -> Result<(), CloseError> {
    {
        let mut guard = inner.lock();
        if guard.closed {
            return Err(CloseError);
        }
        guard.closed = true;
    }
    inner.send_cv.notify_all();
    inner.recv_cv.notify_all();
    inner.send_registry.post_all();
    inner.recv_registry.post_all();
    debug!("channel closed");
    Ok(())
}

impl<T: Send> Clone for Sender<T> {
    fn clone(&self) -> Sender<T> {
        Sender {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send> Clone for Receiver<T> {
    fn clone(&self) -> Receiver<T> {
        Receiver {
            inner: self.inner.clone(),
        }
    }
}

/// Check that a channel is closed, mirroring the source contract that
/// destroy is only legal on an already-closed channel.
///
/// In safe Rust the buffer and mutexes are freed regardless, the moment the
/// last `Arc` clone drops; this entry point exists only for callers that
/// model channel lifetime as an explicit state machine and want the same
/// "destroy before close is an error" guarantee the channel core specifies.
/// Unlike the source, a failed call leaves the channel untouched and fully
/// usable, since no ownership is consumed here.
pub fn destroy<T: Send>(sender: &Sender<T>, receiver: &Receiver<T>) -> Result<(), DestroyError> {
    debug_assert!(Arc::ptr_eq(&sender.inner, &receiver.inner));
    if !sender.inner.is_closed() {
        return Err(DestroyError);
    }
    Ok(())
}
