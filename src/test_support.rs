use std::{borrow::Cow, cell::RefCell, rc::Rc};

use crate::{
    Suite, Test,
    options::{Options, Settings},
    reporter::{NullReporter, Reporter},
    suite::Node,
    testable::{Event, Testable},
};

pub fn passing_test(name: impl Into<Cow<'static, str>>) -> Test {
    Test::new(name, |_| ())
}

pub fn failing_test(name: impl Into<Cow<'static, str>>) -> Test {
    Test::new(name, |_| Err::<(), _>("Oh Noes!"))
}

pub fn skipped_test(name: impl Into<Cow<'static, str>>) -> Test {
    passing_test(name).with_settings(Settings::new().with_skip(true))
}

pub fn exclusive_test(name: impl Into<Cow<'static, str>>) -> Test {
    passing_test(name).with_settings(Settings::new().with_exclusive(true))
}

pub fn run_test(mut test: Test) -> Test {
    test.run(&mut NullReporter, &Settings::default(), &Options::default());
    test
}

/// Run a suite like a harness would, without finalizing it.
pub fn run_suite(suite: Suite) -> Node {
    let mut node = Node::from(suite);
    let force = !node.has_exclusive_descendant();
    node.run(&mut NullReporter, &Settings::default(), &Options::default(), force);
    node
}

/// Records `(description, event)` pairs of everything it reports on.
#[derive(Debug, Clone, Default)]
pub struct EventLog(pub Rc<RefCell<Vec<(String, Event)>>>);

impl Reporter for EventLog {
    fn with_suite(&mut self, _: &Suite) -> Box<dyn Reporter> {
        Box::new(self.clone())
    }

    fn on_event(&mut self, testable: &dyn Testable, event: Event) {
        self.0
            .borrow_mut()
            .push((testable.description().to_string(), event));
    }
}
