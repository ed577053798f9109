use crate::analysis::AnalysisResult;
use crate::artifact::ImageArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Empty,
    Ready,
    Analyzing,
    Complete,
    Failed,
}

// State data lives in the variant so combinations like "analyzing with no
// artifact" cannot be represented.
#[derive(Debug, Clone)]
enum Phase {
    Empty,
    Ready {
        artifact: ImageArtifact,
    },
    Analyzing {
        artifact: ImageArtifact,
        token: u64,
    },
    Complete {
        artifact: ImageArtifact,
        result: AnalysisResult,
    },
    Failed {
        artifact: ImageArtifact,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub artifact: ImageArtifact,
    pub token: u64,
}

#[derive(Debug)]
pub struct AnalysisWorkflow {
    phase: Phase,
    next_token: u64,
}

impl Default for AnalysisWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisWorkflow {
    pub fn new() -> Self {
        AnalysisWorkflow {
            phase: Phase::Empty,
            next_token: 0,
        }
    }

    pub fn state(&self) -> WorkflowState {
        match self.phase {
            Phase::Empty => WorkflowState::Empty,
            Phase::Ready { .. } => WorkflowState::Ready,
            Phase::Analyzing { .. } => WorkflowState::Analyzing,
            Phase::Complete { .. } => WorkflowState::Complete,
            Phase::Failed { .. } => WorkflowState::Failed,
        }
    }

    pub fn artifact(&self) -> Option<&ImageArtifact> {
        match &self.phase {
            Phase::Empty => None,
            Phase::Ready { artifact }
            | Phase::Analyzing { artifact, .. }
            | Phase::Complete { artifact, .. }
            | Phase::Failed { artifact, .. } => Some(artifact),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.phase {
            Phase::Complete { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.phase, Phase::Analyzing { .. })
    }

    pub fn in_flight_token(&self) -> Option<u64> {
        match self.phase {
            Phase::Analyzing { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn can_analyze(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. } | Phase::Failed { .. })
    }

    pub fn can_reset(&self) -> bool {
        !matches!(self.phase, Phase::Empty)
    }

    /// Valid from any state; an in-flight run is not cancelled, but its
    /// token becomes stale so its completion will be discarded.
    pub fn select_artifact(&mut self, artifact: ImageArtifact) {
        self.phase = Phase::Ready { artifact };
    }

    /// No-op outside `Ready`/`Failed`; `Failed` re-entry is the retry path.
    pub fn begin_analysis(&mut self) -> Option<AnalysisRequest> {
        let artifact = match &self.phase {
            Phase::Ready { artifact } | Phase::Failed { artifact, .. } => artifact.clone(),
            _ => return None,
        };

        self.next_token += 1;
        let token = self.next_token;
        self.phase = Phase::Analyzing {
            artifact: artifact.clone(),
            token,
        };
        Some(AnalysisRequest { artifact, token })
    }

    pub fn finish_analysis(&mut self, token: u64, result: AnalysisResult) -> bool {
        match &self.phase {
            Phase::Analyzing {
                artifact,
                token: current,
            } if *current == token => {
                self.phase = Phase::Complete {
                    artifact: artifact.clone(),
                    result,
                };
                true
            }
            _ => false,
        }
    }

    pub fn fail_analysis(&mut self, token: u64, message: String) -> bool {
        match &self.phase {
            Phase::Analyzing {
                artifact,
                token: current,
            } if *current == token => {
                self.phase = Phase::Failed {
                    artifact: artifact.clone(),
                    message,
                };
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Empty;
    }
}
