use std::fmt;

/// Lifecycle of a single pipeline run. Transitions are strictly linear;
/// any failure moves the run to [`PipelineState::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Extracted,
    Filtered,
    Normalized,
    Aggregated,
    Ranked,
    Published,
    Error,
}

impl PipelineState {
    /// The state that follows this one on success, if any.
    pub fn next(&self) -> Option<PipelineState> {
        match self {
            PipelineState::Idle => Some(PipelineState::Extracted),
            PipelineState::Extracted => Some(PipelineState::Filtered),
            PipelineState::Filtered => Some(PipelineState::Normalized),
            PipelineState::Normalized => Some(PipelineState::Aggregated),
            PipelineState::Aggregated => Some(PipelineState::Ranked),
            PipelineState::Ranked => Some(PipelineState::Published),
            PipelineState::Published | PipelineState::Error => None,
        }
    }

    /// True for states a run cannot leave.
    #[inline] pub fn is_terminal(&self) -> bool { self.next().is_none() }

    pub fn to_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Extracted => "extracted",
            PipelineState::Filtered => "filtered",
            PipelineState::Normalized => "normalized",
            PipelineState::Aggregated => "aggregated",
            PipelineState::Ranked => "ranked",
            PipelineState::Published => "published",
            PipelineState::Error => "error",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.to_str()) }
}
