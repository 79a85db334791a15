use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Human and AI confidence scores for a memory block, each clamped to
/// `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfidenceScore {
    pub human: Option<f32>,
    pub ai: Option<f32>,
}

impl ConfidenceScore {
    pub fn new(human: Option<f32>, ai: Option<f32>) -> Self {
        Self {
            human: human.map(|v| v.clamp(0.0, 1.0)),
            ai: ai.map(|v| v.clamp(0.0, 1.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_scores_are_clamped() {
        let score = ConfidenceScore::new(Some(1.5), Some(-0.2));
        assert_eq!(score.human, Some(1.0));
        assert_eq!(score.ai, Some(0.0));
    }
}
