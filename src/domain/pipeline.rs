//! Ingest state machine.
//!
//! `Received -> Staged -> Classified -> Remuxed -> Published -> Committed`, with
//! `Failed(stage, cause)` reachable from every non-terminal stage. The failure
//! payload is [`crate::error::IngestFailure`]; `stage` there is the last stage
//! that was reached.

use crate::error::{IngestError, IngestFailure};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Staged,
    Classified,
    Remuxed,
    Published,
    Committed,
}

impl Stage {
    /// The only stage that may follow this one; `None` for the terminal stage.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Received => Some(Stage::Staged),
            Stage::Staged => Some(Stage::Classified),
            Stage::Classified => Some(Stage::Remuxed),
            Stage::Remuxed => Some(Stage::Published),
            Stage::Published => Some(Stage::Committed),
            Stage::Committed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Staged => "staged",
            Stage::Classified => "classified",
            Stage::Remuxed => "remuxed",
            Stage::Published => "published",
            Stage::Committed => "committed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single pipeline run. Stages only move forward, one at a time.
#[derive(Debug)]
pub struct IngestRun {
    video_id: Uuid,
    stage: Stage,
    history: Vec<Stage>,
}

impl IngestRun {
    pub fn new(video_id: Uuid) -> Self {
        Self {
            video_id,
            stage: Stage::Received,
            history: vec![Stage::Received],
        }
    }

    pub fn video_id(&self) -> Uuid {
        self.video_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Move to `to`, which must be the successor of the current stage.
    pub fn advance(&mut self, to: Stage) -> Result<(), IngestError> {
        if self.stage.next() != Some(to) {
            return Err(IngestError::InvalidTransition {
                from: self.stage,
                to,
            });
        }

        tracing::debug!(
            video_id = %self.video_id,
            from = %self.stage,
            to = %to,
            "ingest transition"
        );
        self.stage = to;
        self.history.push(to);
        Ok(())
    }

    /// Abort the run from its current stage.
    pub fn fail(self, cause: IngestError) -> IngestFailure {
        IngestFailure {
            video_id: self.video_id,
            stage: self.stage,
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [Stage; 6] = [
        Stage::Received,
        Stage::Staged,
        Stage::Classified,
        Stage::Remuxed,
        Stage::Published,
        Stage::Committed,
    ];

    #[test]
    fn test_stages_form_a_line() {
        for pair in ORDER.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0] < pair[1]);
        }
        assert!(Stage::Committed.is_terminal());
        assert_eq!(ORDER.iter().filter(|s| s.is_terminal()).count(), 1);
    }

    #[test]
    fn test_full_run_records_history() {
        let mut run = IngestRun::new(Uuid::new_v4());
        for stage in &ORDER[1..] {
            run.advance(*stage).unwrap();
        }
        assert_eq!(run.stage(), Stage::Committed);
        assert_eq!(run.history(), &ORDER);
    }

    #[test]
    fn test_stages_cannot_be_skipped_or_revisited() {
        let mut run = IngestRun::new(Uuid::new_v4());
        assert!(run.advance(Stage::Classified).is_err());
        run.advance(Stage::Staged).unwrap();
        assert!(run.advance(Stage::Staged).is_err());
        assert!(run.advance(Stage::Received).is_err());
        assert_eq!(run.stage(), Stage::Staged);
    }

    #[test]
    fn test_fail_keeps_last_stage() {
        let video_id = Uuid::new_v4();
        let mut run = IngestRun::new(video_id);
        run.advance(Stage::Staged).unwrap();

        let failure = run.fail(IngestError::NoVideoStream);
        assert_eq!(failure.video_id, video_id);
        assert_eq!(failure.stage, Stage::Staged);
        assert!(matches!(failure.cause, IngestError::NoVideoStream));
    }
}
