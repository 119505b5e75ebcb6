//! Skill contract: precondition -> execute -> postcondition, timed and counted.
//!
//! A skill is one linear content operation. "Agents" are only grouping labels
//! reported in logs and metrics; nothing is scheduled.

use crate::domain::DomainError;
use crate::usecases::metrics::SkillMetrics;
use std::fmt;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillKind {
    Generate,
    Summarize,
    Moderate,
    Seo,
    Recommend,
    Chat,
}

impl SkillKind {
    pub const ALL: [SkillKind; 6] = [
        SkillKind::Generate,
        SkillKind::Summarize,
        SkillKind::Moderate,
        SkillKind::Seo,
        SkillKind::Recommend,
        SkillKind::Chat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkillKind::Generate => "generate",
            SkillKind::Summarize => "summarize",
            SkillKind::Moderate => "moderate",
            SkillKind::Seo => "seo",
            SkillKind::Recommend => "recommend",
            SkillKind::Chat => "chat",
        }
    }

    /// Conceptual agent the skill belongs to.
    pub fn agent(self) -> &'static str {
        match self {
            SkillKind::Generate | SkillKind::Summarize => "writer",
            SkillKind::Moderate => "guardian",
            SkillKind::Seo | SkillKind::Recommend => "analyst",
            SkillKind::Chat => "assistant",
        }
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-purpose content operation with input/output predicates.
#[async_trait::async_trait]
pub trait Skill: Send + Sync {
    type Input: Clone + Send + Sync + 'static;
    type Output: Send + 'static;

    fn kind(&self) -> SkillKind;

    /// Reject bad input before any work is done. Failures are client errors.
    fn check_pre(&self, input: &Self::Input) -> Result<(), DomainError>;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, DomainError>;

    /// Validate the produced output against the input.
    fn check_post(&self, input: &Self::Input, output: &Self::Output) -> Result<(), DomainError>;
}

/// Run a skill end to end and record the outcome in `metrics`.
pub async fn run<S: Skill>(
    skill: &S,
    input: S::Input,
    metrics: &SkillMetrics,
) -> Result<S::Output, DomainError> {
    let kind = skill.kind();
    let started = Instant::now();

    let result: Result<S::Output, DomainError> = async {
        skill.check_pre(&input)?;
        let output = skill.execute(input.clone()).await?;
        skill.check_post(&input, &output)?;
        Ok(output)
    }
    .await;

    let elapsed = started.elapsed();
    metrics.record(kind, elapsed, result.is_ok());
    let elapsed_ms = elapsed.as_millis() as u64;

    match &result {
        Ok(_) => info!(skill = %kind, agent = kind.agent(), elapsed_ms, "skill completed"),
        Err(e) if e.is_client_error() => warn!(
            skill = %kind,
            code = e.code(),
            error = %e,
            "skill rejected input"
        ),
        Err(e) => error!(
            skill = %kind,
            agent = kind.agent(),
            code = e.code(),
            error = %e,
            elapsed_ms,
            "skill failed"
        ),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Doubles a number; rejects negatives; "fails" its postcondition above 100.
    struct Doubler {
        executed: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Skill for Doubler {
        type Input = i64;
        type Output = i64;

        fn kind(&self) -> SkillKind {
            SkillKind::Seo
        }

        fn check_pre(&self, input: &i64) -> Result<(), DomainError> {
            if *input < 0 {
                return Err(DomainError::validation("NEGATIVE", "input must be >= 0"));
            }
            Ok(())
        }

        async fn execute(&self, input: i64) -> Result<i64, DomainError> {
            self.executed.fetch_add(1, Ordering::SeqCst);
            Ok(input * 2)
        }

        fn check_post(&self, _input: &i64, output: &i64) -> Result<(), DomainError> {
            if *output > 100 {
                return Err(DomainError::postcondition("doubler", "too big"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_checks_and_records() {
        let skill = Doubler {
            executed: AtomicUsize::new(0),
        };
        let metrics = SkillMetrics::new();

        assert_eq!(run(&skill, 21, &metrics).await.unwrap(), 42);

        let err = run(&skill, -1, &metrics).await.unwrap_err();
        assert_eq!(err.code(), "NEGATIVE");
        // precondition failure never reaches execute
        assert_eq!(skill.executed.load(Ordering::SeqCst), 1);

        let err = run(&skill, 60, &metrics).await.unwrap_err();
        assert_eq!(err.code(), "POSTCONDITION_FAILED");

        let snap = metrics.snapshot();
        let seo = &snap.skills["seo"];
        assert_eq!(seo.invocations, 3);
        assert_eq!(seo.failures, 2);
    }

    #[test]
    fn test_agent_labels() {
        assert_eq!(SkillKind::Generate.agent(), "writer");
        assert_eq!(SkillKind::Moderate.agent(), "guardian");
        assert_eq!(SkillKind::Recommend.agent(), "analyst");
        assert_eq!(SkillKind::Chat.to_string(), "chat");
    }
}
