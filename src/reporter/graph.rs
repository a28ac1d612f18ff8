use std::{cell::RefCell, rc::Rc};

use crate::{
    Suite, Test,
    graph::GraphNode,
    reporter::Reporter,
    testable::{Event, Testable},
};

/// Builds the [`GraphNode`] tree of a run.
///
/// All reporters handed out for suites and tests share the same builder, so
/// the one kept by the caller sees the whole graph once the run finished.
#[derive(Debug, Clone, Default)]
pub struct GraphReporter {
    builder: Rc<RefCell<GraphBuilder>>,
}

#[derive(Debug, Default)]
struct GraphBuilder {
    // children collected so far, one level per started testable
    open: Vec<Vec<GraphNode>>,
    root: Option<GraphNode>,
}

impl GraphReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished graph, `None` until the outermost testable finished.
    pub fn graph(&self) -> Option<GraphNode> {
        self.builder.borrow().root.clone()
    }
}

impl Reporter for GraphReporter {
    fn with_suite(&mut self, _: &Suite) -> Box<dyn Reporter> {
        Box::new(self.clone())
    }

    fn with_test(&mut self, _: &Test) -> Box<dyn Reporter> {
        Box::new(self.clone())
    }

    fn on_event(&mut self, testable: &dyn Testable, event: Event) {
        let mut builder = self.builder.borrow_mut();
        match event {
            Event::Started => builder.open.push(Vec::new()),
            Event::Finished => {
                let children = builder.open.pop().unwrap_or_default();
                let node = GraphNode::new(testable, children);
                match builder.open.last_mut() {
                    Some(siblings) => siblings.push(node),
                    None => builder.root = Some(node),
                }
            }
            _ => (),
        }
    }
}
