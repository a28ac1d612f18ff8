//! Observing a run.
//!
//! A reporter is asked about every suite and test right before it starts and
//! then receives that testable's lifecycle events. For a suite it hands out
//! the reporter to use for the suite's children, so per depth state like an
//! indentation level lives in the returned reporter instead of a shared
//! counter.

use crate::{
    Harness, Report, Suite, Test,
    testable::{Event, Testable},
};

mod graph;
mod multi;
mod null;
mod trace;

pub use graph::GraphReporter;
pub use multi::MultiReporter;
pub use null::NullReporter;
pub use trace::TracingReporter;

pub trait Reporter {
    /// Called once before the run starts.
    fn with_harness(&mut self, harness: &Harness) {
        let _ = harness;
    }

    /// Called when `suite` starts, returns the reporter for its children.
    fn with_suite(&mut self, suite: &Suite) -> Box<dyn Reporter>;

    /// Called when `test` starts.
    fn with_test(&mut self, test: &Test) -> Box<dyn Reporter> {
        let _ = test;
        Box::new(NullReporter)
    }

    /// A lifecycle event of a testable this reporter was asked about.
    fn on_event(&mut self, testable: &dyn Testable, event: Event);

    /// Called once with the complete report after the run.
    fn on_report(&mut self, report: &Report) {
        let _ = report;
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn with_harness(&mut self, harness: &Harness) {
        (**self).with_harness(harness)
    }

    fn with_suite(&mut self, suite: &Suite) -> Box<dyn Reporter> {
        (**self).with_suite(suite)
    }

    fn with_test(&mut self, test: &Test) -> Box<dyn Reporter> {
        (**self).with_test(test)
    }

    fn on_event(&mut self, testable: &dyn Testable, event: Event) {
        (**self).on_event(testable, event)
    }

    fn on_report(&mut self, report: &Report) {
        (**self).on_report(report)
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn with_harness(&mut self, harness: &Harness) {
        (**self).with_harness(harness)
    }

    fn with_suite(&mut self, suite: &Suite) -> Box<dyn Reporter> {
        (**self).with_suite(suite)
    }

    fn with_test(&mut self, test: &Test) -> Box<dyn Reporter> {
        (**self).with_test(test)
    }

    fn on_event(&mut self, testable: &dyn Testable, event: Event) {
        (**self).on_event(testable, event)
    }

    fn on_report(&mut self, report: &Report) {
        (**self).on_report(report)
    }
}
