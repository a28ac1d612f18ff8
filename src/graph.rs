//! The result graph.
//!
//! One node per suite and test of a finalized tree, in the same order. The
//! graph is plain data, it can be serialized and handed to external
//! renderers after the run.

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    suite::Node,
    testable::{Kind, Outcome, Stats, Testable, as_millis},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    #[serde(rename = "type")]
    pub kind: Kind,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<usize>,
    pub result: Outcome,
    #[serde(default)]
    pub errors: Vec<Error>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub stats: Stats,
    /// Wall clock time of this node in milliseconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub children: Vec<GraphNode>,
}

impl GraphNode {
    pub fn new(testable: &dyn Testable, children: Vec<GraphNode>) -> Self {
        Self {
            kind: testable.kind(),
            name: testable.name().to_string(),
            description: testable.description().to_string(),
            point: testable.point(),
            result: testable.result(),
            errors: testable.errors().to_vec(),
            reason: testable.reason().map(String::from),
            stats: testable.stats(),
            duration: testable.duration().map(as_millis),
            children,
        }
    }

    pub fn child(&self, index: usize) -> Option<&GraphNode> {
        self.children.get(index)
    }

    /// Walk down by child indices, an empty path is the node itself.
    pub fn resolve(&self, path: &[usize]) -> Option<&GraphNode> {
        path.iter().try_fold(self, |node, &index| node.child(index))
    }

    /// All tests below this node, depth first, which is point order.
    pub fn tests(&self) -> Vec<&GraphNode> {
        match self.kind {
            Kind::Test => vec![self],
            Kind::Suite => self.children.iter().flat_map(GraphNode::tests).collect(),
        }
    }

    pub fn incomplete(&self) -> bool {
        self.stats.incomplete()
    }
}

impl From<&Node> for GraphNode {
    fn from(node: &Node) -> Self {
        let children = node.children().iter().map(GraphNode::from).collect();
        GraphNode::new(node, children)
    }
}
