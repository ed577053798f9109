use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::artifact::ImageArtifact;

pub const ANALYSIS_LATENCY: Duration = Duration::from_millis(1200);

pub const MIN_SCORE: u32 = 35;
pub const MAX_SCORE: u32 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyCondition {
    Lean,
    Moderate,
    Good,
}

impl BodyCondition {
    pub fn label(self) -> &'static str {
        match self {
            BodyCondition::Lean => "Lean",
            BodyCondition::Moderate => "Moderate",
            BodyCondition::Good => "Good",
        }
    }

    fn from_score(score: u32) -> BodyCondition {
        if score > 70 {
            BodyCondition::Good
        } else if score > 55 {
            BodyCondition::Moderate
        } else {
            BodyCondition::Lean
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisResult {
    pub height_cm: u32,
    pub length_cm: u32,
    pub girth_cm: u32,
    pub body_condition: BodyCondition,
    pub score: u32,
}

/// Derived measurements are exact functions of the clamped score; any
/// replacement estimator must keep producing these for the same score.
pub fn result_from_base(base: u32) -> AnalysisResult {
    let score = base.clamp(MIN_SCORE, MAX_SCORE);
    AnalysisResult {
        height_cm: 120 + score % 10,
        length_cm: 150 + (score + 7) % 12,
        girth_cm: 160 + (score + 13) % 15,
        body_condition: BodyCondition::from_score(score),
        score,
    }
}

pub fn estimate_traits(artifact: &ImageArtifact) -> AnalysisResult {
    // Size-keyed stand-in; a real estimator would look at the pixels.
    let base = if artifact.byte_size() > 0 {
        (artifact.byte_size() % 100) as u32
    } else {
        rand::rng().random_range(0..100)
    };
    result_from_base(base)
}

pub type AnalysisMessage = (u64, Result<AnalysisResult, String>);

pub fn spawn_analysis(artifact: ImageArtifact, token: u64) -> Receiver<AnalysisMessage> {
    let (tx, rx) = mpsc::channel::<AnalysisMessage>();
    thread::spawn(move || {
        thread::sleep(ANALYSIS_LATENCY);
        let result = estimate_traits(&artifact);
        let _ = tx.send((token, Ok(result)));
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_of_size(size: usize) -> ImageArtifact {
        ImageArtifact {
            name: "fixture.webp".to_string(),
            mime: "image/webp".to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn score_42_measurements() {
        let result = result_from_base(42);
        assert_eq!(result.score, 42);
        assert_eq!(result.height_cm, 122);
        assert_eq!(result.length_cm, 151);
        assert_eq!(result.girth_cm, 170);
        assert_eq!(result.body_condition, BodyCondition::Lean);
    }

    #[test]
    fn score_80_measurements() {
        let result = result_from_base(80);
        assert_eq!(result.score, 80);
        assert_eq!(result.height_cm, 120);
        assert_eq!(result.length_cm, 153);
        assert_eq!(result.girth_cm, 163);
        assert_eq!(result.body_condition, BodyCondition::Good);
    }

    #[test]
    fn base_is_clamped_into_score_range() {
        assert_eq!(result_from_base(0).score, MIN_SCORE);
        assert_eq!(result_from_base(10).score, MIN_SCORE);
        assert_eq!(result_from_base(35).score, 35);
        assert_eq!(result_from_base(95).score, 95);
        assert_eq!(result_from_base(99).score, MAX_SCORE);
        assert_eq!(result_from_base(180).score, MAX_SCORE);
    }

    #[test]
    fn body_condition_boundaries() {
        assert_eq!(result_from_base(55).body_condition, BodyCondition::Lean);
        assert_eq!(result_from_base(56).body_condition, BodyCondition::Moderate);
        assert_eq!(result_from_base(70).body_condition, BodyCondition::Moderate);
        assert_eq!(result_from_base(71).body_condition, BodyCondition::Good);
    }

    #[test]
    fn estimate_is_deterministic_for_known_sizes() {
        let artifact = artifact_of_size(142);
        assert_eq!(estimate_traits(&artifact), result_from_base(42));
        assert_eq!(estimate_traits(&artifact), estimate_traits(&artifact));
    }

    #[test]
    fn zero_byte_artifact_still_scores_in_range() {
        let artifact = artifact_of_size(0);
        for _ in 0..50 {
            let result = estimate_traits(&artifact);
            assert!((MIN_SCORE..=MAX_SCORE).contains(&result.score));
        }
    }

    #[test]
    fn spawned_analysis_reports_its_token() {
        let receiver = spawn_analysis(artifact_of_size(280), 7);
        let (token, result) = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should complete");
        assert_eq!(token, 7);
        assert_eq!(result.expect("stand-in never fails"), result_from_base(80));
    }
}
