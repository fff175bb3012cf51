//! ### Canal
//!
//! A bounded, typed, multi-producer/multi-consumer channel with a
//! cross-channel [`select`] operator.
//!
//! The three moving parts are a mutex-guarded bounded buffer per channel
//! ([`buffer`]), a per-direction registry of wakeup tokens that select calls
//! register into ([`registry`]), and the protocol binding them together
//! ([`channel`], [`select`]): a send deposits a value, signals the
//! in-channel receive condvar, then posts every token in the recv-side
//! registry so any blocked `select` notices too.
//!
//! ```
//! use canal::{channel, SelectOp, select};
//!
//! let (tx, rx) = channel::<u8>(1);
//! tx.send(7).unwrap();
//! let (index, outcome) = select(&mut [SelectOp::recv(&rx)]).unwrap();
//! assert_eq!(index, 0);
//! ```

pub mod buffer;
pub mod channel;
pub mod error;
pub mod registry;
pub mod select;

pub use channel::{channel, destroy, Receiver, Sender};
pub use error::{
    CloseError, DestroyError, RecvError, SelectError, SendError, TryRecvError, TrySendError,
};
pub use select::{select, select_timeout, SelectOp, SelectOutcome};
