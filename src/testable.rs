//! The contract shared by suites and tests.

use std::{
    borrow::Cow,
    iter::Sum,
    ops::{Add, AddAssign},
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::{error::Error, options::Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Suite,
    Test,
}

/// The result of a testable.
///
/// Every testable starts as [`Outcome::Pending`] and is resolved exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Pending,
    Passed,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    pub fn is_skipped(self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// The lifecycle event announcing this outcome.
    pub fn event(self) -> Option<Event> {
        match self {
            Self::Pending => None,
            Self::Passed => Some(Event::Passed),
            Self::Failed => Some(Event::Failed),
            Self::Skipped => Some(Event::Skipped),
        }
    }
}

/// Lifecycle events of a testable.
///
/// Every run emits exactly one `Started`, then exactly one of `Passed`,
/// `Failed` or `Skipped`, then exactly one `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Event {
    Started,
    Passed,
    Failed,
    Skipped,
    Finished,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub tests_total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl Stats {
    /// Stats of a single test with the given outcome.
    pub fn of_test(outcome: Outcome, duration: Option<Duration>) -> Self {
        Self {
            tests_total: 1,
            passed: usize::from(outcome.is_passed()),
            failed: usize::from(outcome.is_failed()),
            skipped: usize::from(outcome.is_skipped()),
            duration_ms: duration.map(as_millis).unwrap_or_default(),
        }
    }

    /// More tests exist than passed or failed, something was skipped or never ran.
    pub fn incomplete(&self) -> bool {
        self.tests_total != self.passed + self.failed
    }
}

impl Add for Stats {
    type Output = Stats;

    fn add(mut self, rhs: Stats) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for Stats {
    fn add_assign(&mut self, rhs: Stats) {
        self.tests_total += rhs.tests_total;
        self.passed += rhs.passed;
        self.failed += rhs.failed;
        self.skipped += rhs.skipped;
        self.duration_ms += rhs.duration_ms;
    }
}

impl Sum for Stats {
    fn sum<I: Iterator<Item = Stats>>(iter: I) -> Self {
        iter.fold(Stats::default(), Add::add)
    }
}

pub(crate) fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// State every testable carries.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub(crate) name: Cow<'static, str>,
    pub(crate) description: Cow<'static, str>,
    pub(crate) settings: Settings,
    pub(crate) result: Outcome,
    pub(crate) reason: Option<Cow<'static, str>>,
    pub(crate) errors: Vec<Error>,
    pub(crate) started: Option<Instant>,
    pub(crate) duration: Option<Duration>,
}

impl Fixture {
    pub(crate) fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            settings: Settings::default(),
            result: Outcome::Pending,
            reason: None,
            errors: Vec::new(),
            started: None,
            duration: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The options declared by the author.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn result(&self) -> Outcome {
        self.result
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Same declaration under a new description, with no run state.
    pub(crate) fn finalized(&self, description: Cow<'static, str>) -> Self {
        Self {
            description,
            settings: self.settings.clone(),
            ..Self::new(self.name.clone())
        }
    }

    pub(crate) fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Settle the result. Errors only survive a failure.
    pub(crate) fn resolve(
        &mut self,
        outcome: Outcome,
        reason: Option<Cow<'static, str>>,
        errors: Vec<Error>,
    ) -> Option<Event> {
        if !self.result.is_pending() {
            tracing::warn!(
                description = %self.description,
                result = ?self.result,
                "testable already resolved, ignoring {outcome:?}"
            );
            return None;
        }

        match outcome {
            Outcome::Failed => self.errors = errors,
            _ if !errors.is_empty() => tracing::warn!(
                description = %self.description,
                ?outcome,
                ?errors,
                "discarding errors of a testable that did not fail"
            ),
            _ => (),
        }

        self.result = outcome;
        if outcome.is_skipped() {
            self.reason = reason;
        }
        self.duration = self.started.map(|started| started.elapsed());
        outcome.event()
    }

    /// Declared exclusive and not declared skipped.
    pub(crate) fn is_exclusive(&self) -> bool {
        self.settings.exclusive == Some(true) && self.settings.skip != Some(true)
    }

    pub(crate) fn is_skip_declared(&self) -> bool {
        self.settings.skip == Some(true)
    }
}

/// Read access to a suite or a test.
///
/// This is what reporters get to see. All accessors reflect the current
/// state, so they are only meaningful after the respective lifecycle event.
pub trait Testable {
    fn kind(&self) -> Kind;

    fn fixture(&self) -> &Fixture;

    /// Aggregated counts, always the sum over all tests below.
    fn stats(&self) -> Stats;

    fn number_of_tests(&self) -> usize;

    /// Whether any non skipped exclusive testable lives below this one.
    fn has_exclusive_descendant(&self) -> bool;

    /// The test point, only tests of a finalized tree have one.
    fn point(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str {
        self.fixture().name()
    }

    fn description(&self) -> &str {
        self.fixture().description()
    }

    fn result(&self) -> Outcome {
        self.fixture().result()
    }

    fn reason(&self) -> Option<&str> {
        self.fixture().reason()
    }

    fn errors(&self) -> &[Error] {
        self.fixture().errors()
    }

    fn duration(&self) -> Option<Duration> {
        self.fixture().duration()
    }

    fn is_exclusive(&self) -> bool {
        self.fixture().is_exclusive()
    }
}
