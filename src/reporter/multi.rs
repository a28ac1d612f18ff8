use crate::{
    Harness, Report, Suite, Test,
    reporter::Reporter,
    testable::{Event, Testable},
};

/// Fans every call out to several reporters, in insertion order.
#[derive(Default)]
pub struct MultiReporter<'r> {
    reporters: Vec<Box<dyn Reporter + 'r>>,
}

impl<'r> MultiReporter<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: impl Reporter + 'r) -> Self {
        self.push(reporter);
        self
    }

    pub fn push(&mut self, reporter: impl Reporter + 'r) {
        self.reporters.push(Box::new(reporter));
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl Reporter for MultiReporter<'_> {
    fn with_harness(&mut self, harness: &Harness) {
        for reporter in &mut self.reporters {
            reporter.with_harness(harness);
        }
    }

    fn with_suite(&mut self, suite: &Suite) -> Box<dyn Reporter> {
        let reporters = self
            .reporters
            .iter_mut()
            .map(|reporter| reporter.with_suite(suite))
            .collect();
        Box::new(MultiReporter { reporters })
    }

    fn with_test(&mut self, test: &Test) -> Box<dyn Reporter> {
        let reporters = self
            .reporters
            .iter_mut()
            .map(|reporter| reporter.with_test(test))
            .collect();
        Box::new(MultiReporter { reporters })
    }

    fn on_event(&mut self, testable: &dyn Testable, event: Event) {
        for reporter in &mut self.reporters {
            reporter.on_event(testable, event);
        }
    }

    fn on_report(&mut self, report: &Report) {
        for reporter in &mut self.reporters {
            reporter.on_report(report);
        }
    }
}

impl std::fmt::Debug for MultiReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiReporter")
            .field("reporters", &self.reporters.len())
            .finish()
    }
}
