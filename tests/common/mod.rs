#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use suitest::{Settings, Test, api::TestableApi};

/// Route `tracing` output of the current thread into the test output.
///
/// Set `RUST_LOG=suitest=debug` to see it.
pub fn subscribe() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

pub fn passing(name: &'static str) -> Test {
    Test::new(name, |_| ())
}

pub fn failing(name: &'static str) -> Test {
    Test::new(name, |_| Err::<(), _>("Oh Noes!"))
}

pub fn exclusive(test: Test) -> Test {
    test.with_settings(Settings::new().with_exclusive(true))
}

/// A test body that never settles within a short timeout.
pub fn slow(name: &'static str, timeout_ms: u64) -> Test {
    Test::new(name, move |_| thread::sleep(Duration::from_millis(timeout_ms * 4)))
        .with_settings(Settings::new().with_timeout_ms(timeout_ms))
}

/// Counts how many bodies ran.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn test(&self, name: &'static str) -> Test {
        let counter = self.clone();
        Test::new(name, move |_| counter.bump())
    }

    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records the order in which bodies and hooks ran.
#[derive(Debug, Clone, Default)]
pub struct Trail(Arc<Mutex<Vec<String>>>);

impl Trail {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn test(&self, name: &'static str) -> Test {
        let trail = self.clone();
        Test::new(name, move |api: &TestableApi| trail.push(api.description()))
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
