use std::{
    process::{ExitCode, Termination},
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::{
    graph::GraphNode,
    options::{Options, Settings},
    reporter::{GraphReporter, MultiReporter, NullReporter, Reporter},
    suite::Node,
    testable::{Outcome, Stats, Testable},
};

/// Drives a whole tree.
///
/// The authored tree is never run itself. Each run works on a finalized copy:
/// tests are numbered and the `before_each`/`after_each` templates of their
/// suites are bound to them.
#[derive(Debug, Clone)]
pub struct Harness {
    root: Node,
    settings: Settings,
    finalized: Option<Node>,
    report: Option<Report>,
}

impl Harness {
    pub fn new(root: impl Into<Node>) -> Self {
        Self {
            root: root.into(),
            settings: Settings::default(),
            finalized: None,
            report: None,
        }
    }

    /// Settings every testable inherits, the root's own settings win.
    pub fn with_settings(self, settings: Settings) -> Self {
        Self { settings, ..self }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The tree of the last run, or the authored tree before any run.
    pub fn root(&self) -> &Node {
        self.finalized.as_ref().unwrap_or(&self.root)
    }

    pub fn number_of_tests(&self) -> usize {
        self.root().number_of_tests()
    }

    /// The report of the last run.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// A runnable copy of the authored tree.
    ///
    /// Tests get points 1 to N in depth first order and descriptions built from
    /// their suites' names.
    pub fn finalize(&self) -> Node {
        let mut points = 0;
        self.root.finalized(None, &[], &mut points)
    }

    /// Finalize and run the tree.
    ///
    /// Never fails, every outcome ends up in the returned report. `reporter`
    /// observes the run next to the internal graph reporter.
    pub fn run(&mut self, reporter: &mut dyn Reporter, runtime: Settings) -> Report {
        let graph = GraphReporter::new();
        let mut reporters = MultiReporter::new().with(graph.clone()).with(reporter);
        reporters.with_harness(self);

        let started = Instant::now();
        let mut root = self.finalize();
        let force = !root.has_exclusive_descendant();
        let inherited = Options::new(self.settings.clone());
        tracing::debug!(tests = root.number_of_tests(), force, "running harness");

        root.run(&mut reporters, &runtime, &inherited, force);

        let report = Report {
            graph: graph.graph().unwrap_or_else(|| GraphNode::from(&root)),
            duration: started.elapsed(),
        };
        reporters.on_report(&report);

        self.finalized = Some(root);
        self.report = Some(report.clone());
        report
    }

    /// [`run`](Self::run) without an extra reporter and runtime settings.
    pub fn run_quiet(&mut self) -> Report {
        self.run(&mut NullReporter, Settings::default())
    }
}

/// The outcome of a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Report {
    pub graph: GraphNode,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl Report {
    pub fn result(&self) -> Outcome {
        self.graph.result
    }

    pub fn stats(&self) -> Stats {
        self.graph.stats
    }

    pub fn passed(&self) -> bool {
        self.graph.result.is_passed()
    }

    pub fn failed(&self) -> bool {
        self.graph.result.is_failed()
    }

    /// Not every test passed or failed, something was skipped or never ran.
    pub fn incomplete(&self) -> bool {
        self.graph.incomplete()
    }

    /// Success unless the run failed.
    pub fn exit_code(&self) -> ExitCode {
        match self.failed() {
            true => ExitCode::FAILURE,
            false => ExitCode::SUCCESS,
        }
    }
}

impl Termination for Report {
    fn report(self) -> ExitCode {
        self.exit_code()
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::testable::as_millis;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(as_millis(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
