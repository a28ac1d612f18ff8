//! Test and hook bodies.
//!
//! A body settles in one of two ways:
//!
//! - [`Body::new`]: the body settles when it returns
//! - [`Body::with_done`]: the body receives a [`Done`] handle and settles once
//!   it returned *and* the handle was invoked
//!
//! Both are normalized into one stream of [`Settle`] messages that is raced
//! against the deadline, see [`timeout::race`](crate::timeout::race).

use std::{
    any::Any,
    fmt::{self, Debug, Display},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::Sender;

use crate::{
    error::Error,
    timeout::{Deadline, race},
};

/// What a body returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyResult(pub Result<(), String>);

impl From<()> for BodyResult {
    fn from(_: ()) -> Self {
        Self(Ok(()))
    }
}

impl<E: Display> From<Result<(), E>> for BodyResult {
    fn from(v: Result<(), E>) -> Self {
        BodyResult(v.map_err(|e| e.to_string()))
    }
}

type ReturningFn<A> = dyn Fn(&A) -> BodyResult + Send + Sync;
type CallbackFn<A> = dyn Fn(&A, Done) -> BodyResult + Send + Sync;

#[non_exhaustive]
pub enum Body<A> {
    Returning(Arc<ReturningFn<A>>),
    Callback(Arc<CallbackFn<A>>),
}

impl<A> Clone for Body<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Returning(f) => Self::Returning(Arc::clone(f)),
            Self::Callback(f) => Self::Callback(Arc::clone(f)),
        }
    }
}

impl<A> Debug for Body<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Returning(_) => write!(f, "Returning(...)"),
            Self::Callback(_) => write!(f, "Callback(...)"),
        }
    }
}

#[derive(Debug)]
pub(crate) enum Settle {
    Returned(Result<(), Error>),
    Done(Result<(), Error>),
}

impl<A: Send + 'static> Body<A> {
    pub fn new<F, T>(f: F) -> Self
    where
        F: Fn(&A) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        Self::Returning(Arc::new(move |api: &A| f(api).into()))
    }

    pub fn with_done<F, T>(f: F) -> Self
    where
        F: Fn(&A, Done) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        Self::Callback(Arc::new(move |api: &A, done| f(api, done).into()))
    }

    pub fn expects_done(&self) -> bool {
        matches!(self, Self::Callback(_))
    }

    /// Start the body on a worker thread and wait until it settles or
    /// `timeout` elapses.
    pub(crate) fn run(&self, api: A, timeout: Duration) -> Result<(), Error> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let body = self.clone();
        thread::Builder::new()
            .spawn(move || body.settle(api, tx))
            .map_err(|err| Error::body(format!("failed to spawn body thread: {err}")))?;

        let deadline = Deadline::after(timeout);
        let mut returned = false;
        let mut done = !self.expects_done();
        while !(returned && done) {
            match race(&rx, deadline)? {
                Settle::Returned(result) => {
                    result?;
                    returned = true;
                }
                Settle::Done(result) => {
                    result?;
                    done = true;
                }
            }
        }
        Ok(())
    }

    fn settle(&self, api: A, tx: Sender<Settle>) {
        let returned = match self {
            Self::Returning(f) => catch_unwind(AssertUnwindSafe(|| f(&api))),
            Self::Callback(f) => {
                let done = Done::new(tx.clone());
                catch_unwind(AssertUnwindSafe(|| f(&api, done)))
            }
        };

        let result = match returned {
            Ok(BodyResult(result)) => result.map_err(Error::body),
            Err(payload) => Err(Error::body(panic_message(payload))),
        };

        // A closed channel means the deadline already won.
        let _ = tx.send(Settle::Returned(result));
    }
}

/// The explicit completion handle of a [`Body::with_done`] body.
///
/// Invoking it more than once fails the body with [`Error::DoubleDone`].
#[derive(Debug, Clone)]
pub struct Done {
    tx: Sender<Settle>,
    called: Arc<AtomicBool>,
}

impl Done {
    fn new(tx: Sender<Settle>) -> Self {
        Self {
            tx,
            called: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn ok(&self) {
        self.complete(());
    }

    pub fn fail(&self, err: impl Display) {
        self.complete(Err::<(), _>(err));
    }

    pub fn complete(&self, result: impl Into<BodyResult>) {
        let BodyResult(result) = result.into();
        let result = match self.called.swap(true, Ordering::AcqRel) {
            false => result.map_err(Error::body),
            true => Err(Error::DoubleDone),
        };
        let _ = self.tx.send(Settle::Done(result));
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    payload
        .downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|payload| payload.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("non-string panic payload"))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::error::ErrorKind;

    const LONG: Duration = Duration::from_millis(2000);

    #[test]
    fn returning_body_passes() {
        let body = Body::<()>::new(|_| ());
        assert_eq!(body.run((), LONG), Ok(()));
    }

    #[test]
    fn returning_body_reports_error_message() {
        let body = Body::<()>::new(|_| Err::<(), _>("Oh Noes!"));
        assert_eq!(body.run((), LONG), Err(Error::body("Oh Noes!")));
    }

    #[test]
    fn panicking_body_fails() {
        let body = Body::<()>::new(|_| -> () { panic!("boom") });
        assert_eq!(body.run((), LONG), Err(Error::body("boom")));
    }

    #[test]
    fn done_body_waits_for_done() {
        let body = Body::<()>::with_done(|_, done| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                done.ok();
            });
        });
        let started = Instant::now();
        assert_eq!(body.run((), LONG), Ok(()));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn done_body_fails_through_done() {
        let body = Body::<()>::with_done(|_, done| done.fail("Oh Noes!"));
        assert_eq!(body.run((), LONG), Err(Error::body("Oh Noes!")));
    }

    #[test]
    fn done_called_twice_fails() {
        let body = Body::<()>::with_done(|_, done| {
            done.ok();
            done.ok();
        });
        let err = body.run((), LONG).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DoubleDone);
        assert_eq!(err.to_string(), "done already called");
    }

    #[test]
    fn unused_done_times_out() {
        let body = Body::<()>::with_done(|_, _done| ());
        let err = body.run((), Duration::from_millis(50)).unwrap_err();
        assert_eq!(err.to_string(), "Timed out after 50ms");
    }

    #[test]
    fn error_returned_before_done_fails_immediately() {
        let body = Body::<()>::with_done(|_, _done| Err::<(), _>("early"));
        let started = Instant::now();
        assert_eq!(body.run((), LONG), Err(Error::body("early")));
        assert!(started.elapsed() < LONG);
    }
}
