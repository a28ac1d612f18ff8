//! Racing an operation against a deadline.
//!
//! An operation is anything that eventually sends its result into a channel.
//! The race waits for whichever comes first, the result or the deadline.
//! The operation itself is never interrupted: if it loses, it may keep running
//! on its worker thread and whatever it sends later is dropped together with
//! the receiver.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, select};

use crate::error::Error;

/// A fixed point in time shared by every wait of one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.at
    }
}

/// Wait for the next value of `operation`, or fail once `deadline` passes.
///
/// A disconnected operation never settles, it only loses against the deadline.
/// The timer channel lives for the duration of this call only, so a deadline
/// that lost the race cannot fire afterwards.
pub fn race<T>(operation: &Receiver<T>, deadline: Deadline) -> Result<T, Error> {
    let timer = crossbeam_channel::at(deadline.at);
    select! {
        recv(operation) -> settled => match settled {
            Ok(value) => Ok(value),
            Err(_) => {
                let _ = timer.recv();
                Err(Error::timeout(deadline.timeout))
            }
        },
        recv(timer) -> _ => Err(Error::timeout(deadline.timeout)),
    }
}

/// Run `op` on its own thread and race its result against `timeout`.
pub fn with_timeout<T, F>(timeout: Duration, op: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        // The receiver is gone if the deadline won, nobody cares anymore.
        let _ = tx.send(op());
    });
    race(&rx, Deadline::after(timeout))
}
