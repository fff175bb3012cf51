//! Wakeup tokens and the per-channel, per-direction registries that hold them.
//!
//! A [`Token`] is a counting semaphore private to one [`crate::select`] call,
//! created on that call's stack and shared into zero or more registries as an
//! `Arc` clone for the duration of the call. Registries compare tokens by
//! pointer identity (`Arc::ptr_eq`), never by value, matching the intrusive
//! list this module replaces: identity is the only thing a registry is
//! allowed to know about a token.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// A counting semaphore, initialized to zero, posted by any channel
/// operation that might unblock the select call that owns it.
pub struct Token {
    count: Mutex<usize>,
    cv: Condvar,
}

impl Token {
    /// Create a new token with its count at zero.
    pub fn new() -> Arc<Token> {
        Arc::new(Token {
            count: Mutex::new(0),
            cv: Condvar::new(),
        })
    }

    /// Increment the token's count and wake one waiter, if any.
    ///
    /// Safe to call from any thread, any number of times; posts are not lost
    /// even if nobody is currently waiting (the next `wait` observes them).
    pub fn post(&self) {
        let mut count = self.count.lock().expect("token mutex poisoned");
        *count += 1;
        self.cv.notify_one();
    }

    /// Block until the token has been posted at least once since the last
    /// successful `wait`, then consume one post.
    pub fn wait(&self) {
        let mut count = self.count.lock().expect("token mutex poisoned");
        while *count == 0 {
            count = self.cv.wait(count).expect("token mutex poisoned");
        }
        *count -= 1;
    }

    /// Like [`Token::wait`], but give up after `timeout` has elapsed with no
    /// post observed. Returns whether a post was consumed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut count = self.count.lock().expect("token mutex poisoned");
        while *count == 0 {
            let now = std::time::Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, result) = self
                .cv
                .wait_timeout(count, deadline - now)
                .expect("token mutex poisoned");
            count = guard;
            if *count == 0 && result.timed_out() {
                return false;
            }
        }
        *count -= 1;
        true
    }
}

/// A set of wakeup tokens for one (channel, direction) pair.
///
/// Tokens are borrowed: the registry never constructs or destroys one, it
/// only remembers that a particular select call is interested, and forgets
/// it again on deregistration. The registry is its own leaf lock: nothing may
/// be acquired while its internal mutex is held, and it never acquires
/// anything else.
pub struct Registry {
    tokens: Mutex<Vec<Arc<Token>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Registry {
        Registry {
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Insert `token` if it is not already present (by identity).
    pub fn insert(&self, token: &Arc<Token>) {
        let mut tokens = self.tokens.lock().expect("registry mutex poisoned");
        if !tokens.iter().any(|t| Arc::ptr_eq(t, token)) {
            tokens.push(token.clone());
        }
    }

    /// Whether `token` is currently registered (by identity).
    pub fn contains(&self, token: &Arc<Token>) -> bool {
        let tokens = self.tokens.lock().expect("registry mutex poisoned");
        tokens.iter().any(|t| Arc::ptr_eq(t, token))
    }

    /// Remove `token` if present (by identity). Returns whether it was found.
    pub fn remove(&self, token: &Arc<Token>) -> bool {
        let mut tokens = self.tokens.lock().expect("registry mutex poisoned");
        let before = tokens.len();
        tokens.retain(|t| !Arc::ptr_eq(t, token));
        tokens.len() != before
    }

    /// Post every token currently registered.
    pub fn post_all(&self) {
        let tokens = self.tokens.lock().expect("registry mutex poisoned");
        for token in tokens.iter() {
            token.post();
        }
    }

    /// Number of tokens currently registered. Used by tests and diagnostics.
    pub fn len(&self) -> usize {
        self.tokens.lock().expect("registry mutex poisoned").len()
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}
