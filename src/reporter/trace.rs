use tracing::{debug, info, warn};

use crate::{
    Harness, Report, Suite,
    reporter::Reporter,
    testable::{Event, Testable},
};

/// Turns every lifecycle event into a `tracing` event.
///
/// `depth` is the nesting level of the reported testables, the root is at 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter {
    depth: usize,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for TracingReporter {
    fn with_harness(&mut self, harness: &Harness) {
        info!(tests = harness.number_of_tests(), "starting run");
    }

    fn with_suite(&mut self, _: &Suite) -> Box<dyn Reporter> {
        Box::new(TracingReporter {
            depth: self.depth + 1,
        })
    }

    fn on_event(&mut self, testable: &dyn Testable, event: Event) {
        let depth = self.depth;
        let kind = testable.kind();
        let description = testable.description();
        let point = testable.point();
        match event {
            Event::Started => debug!(depth, ?kind, description, ?point, "started"),
            Event::Passed => info!(depth, ?kind, description, ?point, "passed"),
            Event::Failed => warn!(
                depth,
                ?kind,
                description,
                ?point,
                errors = ?testable.errors(),
                "failed"
            ),
            Event::Skipped => info!(
                depth,
                ?kind,
                description,
                ?point,
                reason = ?testable.reason(),
                "skipped"
            ),
            Event::Finished => debug!(
                depth,
                ?kind,
                description,
                outcome = ?testable.result(),
                duration = ?testable.duration(),
                "finished"
            ),
        }
    }

    fn on_report(&mut self, report: &Report) {
        let stats = report.stats();
        info!(
            result = ?report.result(),
            tests = stats.tests_total,
            passed = stats.passed,
            failed = stats.failed,
            skipped = stats.skipped,
            incomplete = report.incomplete(),
            duration = ?report.duration,
            "run finished"
        );
    }
}
