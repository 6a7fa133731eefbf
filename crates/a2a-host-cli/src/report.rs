use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed { detail: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub outcome: Outcome,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Passed {
                detail: detail.into(),
            },
        }
    }

    pub fn fail(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed { .. })
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Passed { detail } => write!(f, "PASS - {}: {detail}", self.name),
            Outcome::Failed { reason } => write!(f, "FAIL - {}: {reason}", self.name),
        }
    }
}

/// Results of one suite run.
#[derive(Debug, Default)]
pub struct Report {
    results: Vec<CheckResult>,
    aborted: Option<String>,
}

impl Report {
    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    /// Mark the run as stopped early.
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.aborted = Some(reason.into());
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.passed() == self.total()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(50))?;
        writeln!(out, "Check results")?;
        writeln!(out, "{}", "=".repeat(50))?;
        for result in &self.results {
            writeln!(out, "{result}")?;
        }
        if let Some(reason) = &self.aborted {
            writeln!(out, "Stopped early: {reason}")?;
        }
        writeln!(out, "\nOverall: {}/{} checks passed", self.passed(), self.total())
    }
}
