use serde::{Deserialize, Serialize};

use crate::quiz::models::PLAYED_QUESTIONS;

/// Upper bound of the displayed grade scale.
pub const GRADE_SCALE: f64 = 20.0;

/// Scales a correct-answer count to the 0-20 grade, rounded to two decimals
/// for display.
pub fn grade_for_score(score: u32) -> f64 {
    let raw = (score as f64 / PLAYED_QUESTIONS as f64) * GRADE_SCALE;
    (raw * 100.0).round() / 100.0
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Excellent,
    Solid,
    NeedsReview,
    KeepPracticing,
}

impl FeedbackTier {
    /// Tier thresholds are checked top down, first match wins.
    pub fn for_grade(grade: f64) -> Self {
        if grade >= 18.0 {
            FeedbackTier::Excellent
        } else if grade >= 14.0 {
            FeedbackTier::Solid
        } else if grade >= 10.0 {
            FeedbackTier::NeedsReview
        } else {
            FeedbackTier::KeepPracticing
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Excellent => {
                "¡Excelente! Tienes un dominio impresionante de los conceptos."
            }
            FeedbackTier::Solid => "¡Muy bien! Tienes una base sólida, sigue así.",
            FeedbackTier::NeedsReview => {
                "¡Buen esfuerzo! Hay algunos conceptos que puedes repasar para fortalecer tu conocimiento."
            }
            FeedbackTier::KeepPracticing => {
                "No te desanimes. El álgebra lineal es un desafío. ¡Sigue practicando y verás cómo mejoras!"
            }
        }
    }

    pub fn celebrate(&self) -> bool {
        matches!(self, FeedbackTier::Excellent)
    }
}
