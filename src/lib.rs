//! A hierarchical suite and test runner.
//!
//! Suites and tests form a tree. A [`Harness`] finalizes the tree, runs it
//! sequentially under layered [`options`], with hooks, timeouts, skipping,
//! exclusivity and abort, and returns the result graph as a [`Report`].

pub mod api;
pub mod body;
pub mod error;
pub mod graph;
pub mod hook;
pub mod options;
pub mod reporter;
pub mod syntax;
pub mod testable;
pub mod timeout;

mod harness;
pub use harness::*;

mod suite;
pub use suite::*;

pub use test::Test;

pub use error::Error;
pub use hook::Hook;
pub use options::Settings;
pub use testable::{Outcome, Testable};

/// Shorthand for [`Harness::new`].
pub fn harness(root: impl Into<Node>) -> Harness {
    Harness::new(root)
}

#[cfg(test)]
mod test_support;
