//! Cross-channel select: block on a heterogeneous set of pending send and
//! receive operations and complete exactly one.
//!
//! Phase 1 registers a private wakeup token into every entry's relevant
//! registry. Phase 2 probes every entry non-blocking, in order, and waits on
//! the token only once every entry has returned `WouldBlock`. Phase 3
//! deregisters the token everywhere it was inserted, via an RAII guard so a
//! panic mid-probe still cleans up.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::trace;

use crate::channel::{Receiver, Sender};
use crate::error::{SelectError, TryRecvError, TrySendError};
use crate::registry::{Registry, Token};


enum Op<'a, T> {
    Send(&'a Sender<T>, Option<T>),
    Recv(&'a Receiver<T>),
}

/// One entry in a [`select`] call: either a send with its pending payload or
/// a receive. Build with [`SelectOp::send`] / [`SelectOp::recv`].
pub struct SelectOp<'a, T> {
    op: Op<'a, T>,
}

impl<'a, T> SelectOp<'a, T> {
    /// An entry attempting to send `value` on `sender`.
    pub fn send(sender: &'a Sender<T>, value: T) -> SelectOp<'a, T> {
        SelectOp {
            op: Op::Send(sender, Some(value)),
        }
    }

    /// An entry attempting to receive a value from `receiver`.
    pub fn recv(receiver: &'a Receiver<T>) -> SelectOp<'a, T> {
        SelectOp {
            op: Op::Recv(receiver),
        }
    }

    fn registry(&self) -> &'a Registry {
        match &self.op {
            // A send becomes feasible when a slot frees up, which a recv
            // signals by posting send_registry (channel.rs recv/try_recv);
            // symmetrically a recv becomes feasible when a value is
            // deposited, which a send signals by posting recv_registry
            // (channel.rs send/try_send). Each op therefore waits on the
            // registry the *other* direction posts into.
            Op::Send(sender, _) => &sender.inner.send_registry,
            Op::Recv(receiver) => &receiver.inner.recv_registry,
        }
    }
}

/// What completed when [`select`] or [`select_timeout`] returns successfully.
pub enum SelectOutcome<T> {
    /// The send at the selected index completed.
    Sent,
    /// The recv at the selected index completed with this value.
    Received(T),
}

enum ProbeResult<T> {
    WouldBlock,
    Done(Result<SelectOutcome<T>, ()>),
}

fn probe_entry<T: Send>(entry: &mut SelectOp<'_, T>) -> ProbeResult<T> {
    match &mut entry.op {
        Op::Send(sender, pending) => {
            let value = pending.take().expect("select entry probed twice concurrently");
            match sender.try_send(value) {
                Ok(()) => ProbeResult::Done(Ok(SelectOutcome::Sent)),
                Err(TrySendError::WouldBlock(v)) => {
                    *pending = Some(v);
                    ProbeResult::WouldBlock
                }
                Err(TrySendError::Closed(v)) => {
                    *pending = Some(v);
                    ProbeResult::Done(Err(()))
                }
            }
        }
        Op::Recv(receiver) => match receiver.try_recv() {
            Ok(v) => ProbeResult::Done(Ok(SelectOutcome::Received(v))),
            Err(TryRecvError::WouldBlock) => ProbeResult::WouldBlock,
            Err(TryRecvError::Closed) => ProbeResult::Done(Err(())),
        },
    }
}

struct SelectGuard<'a> {
    token: Arc<Token>,
    registries: Vec<&'a Registry>,
}

impl<'a> Drop for SelectGuard<'a> {
    fn drop(&mut self) {
        for registry in &self.registries {
            registry.remove(&self.token);
        }
        trace!(
            "select token deregistered from {} entries",
            self.registries.len()
        );
    }
}

fn register_all<T>(token: &Arc<Token>, ops: &[SelectOp<'_, T>]) {
    for entry in ops {
        entry.registry().insert(token);
    }
}

fn collect_registries<'a, T>(ops: &[SelectOp<'a, T>]) -> Vec<&'a Registry> {
    ops.iter().map(|entry| entry.registry()).collect()
}

/// Block until any one of `ops` becomes feasible, then perform exactly that
/// one and return its index alongside the outcome.
pub fn select<T: Send>(
    ops: &mut [SelectOp<'_, T>],
) -> Result<(usize, SelectOutcome<T>), SelectError> {
    if ops.is_empty() {
        return Err(SelectError::Empty);
    }

    let token = Token::new();
    register_all(&token, ops);
    let _guard = SelectGuard {
        token: token.clone(),
        registries: collect_registries(ops),
    };

    loop {
        for (index, entry) in ops.iter_mut().enumerate() {
            match probe_entry(entry) {
                ProbeResult::Done(Ok(outcome)) => return Ok((index, outcome)),
                ProbeResult::Done(Err(())) => return Err(SelectError::Closed(index)),
                ProbeResult::WouldBlock => continue,
            }
        }
        token.wait();
    }
}

/// Like [`select`], but give up and return [`SelectError::Timeout`] if no
/// entry becomes feasible before `timeout` elapses.
pub fn select_timeout<T: Send>(
    ops: &mut [SelectOp<'_, T>],
    timeout: Duration,
) -> Result<(usize, SelectOutcome<T>), SelectError> {
    if ops.is_empty() {
        return Err(SelectError::Empty);
    }

    let token = Token::new();
    register_all(&token, ops);
    let _guard = SelectGuard {
        token: token.clone(),
        registries: collect_registries(ops),
    };

    let deadline = Instant::now() + timeout;
    loop {
        for (index, entry) in ops.iter_mut().enumerate() {
            match probe_entry(entry) {
                ProbeResult::Done(Ok(outcome)) => return Ok((index, outcome)),
                ProbeResult::Done(Err(())) => return Err(SelectError::Closed(index)),
                ProbeResult::WouldBlock => continue,
            }
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(SelectError::Timeout);
        }
        token.wait_timeout(deadline - now);
    }
}
