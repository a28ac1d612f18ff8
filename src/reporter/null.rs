use crate::{
    Suite,
    reporter::Reporter,
    testable::{Event, Testable},
};

/// A reporter that discards every event.
///
/// Useful when only the returned [`Report`](crate::Report) matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn with_suite(&mut self, _: &Suite) -> Box<dyn Reporter> {
        Box::new(NullReporter)
    }

    fn on_event(&mut self, _: &dyn Testable, _: Event) {}
}
