use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fixed probability cutoff separating Healthy from Diseased.
pub const CLASSIFIER_THRESHOLD: f32 = 0.5;

/// Binary health status assigned to a detected animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum HealthLabel {
    Healthy,
    LumpySkinDisease,
}

impl HealthLabel {
    /// Human-readable label drawn onto the frame.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLabel::Healthy => "Healthy",
            HealthLabel::LumpySkinDisease => "Lumpy Skin Disease",
        }
    }
}

impl std::fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running the disease classifier on one cropped animal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: HealthLabel,
    /// Confidence as a percentage in [0, 100].
    pub confidence: f32,
}

impl Classification {
    /// Apply the fixed decision rule to a classifier probability.
    ///
    /// p > 0.5 reads as Healthy with confidence p*100; anything else,
    /// including exactly 0.5, reads as Lumpy Skin Disease with confidence
    /// (1 - p)*100. The comparison is strict; threshold and rule are not
    /// configurable.
    pub fn from_probability(p: f32) -> Self {
        if p > CLASSIFIER_THRESHOLD {
            Self {
                label: HealthLabel::Healthy,
                confidence: p * 100.0,
            }
        } else {
            Self {
                label: HealthLabel::LumpySkinDisease,
                confidence: (1.0 - p) * 100.0,
            }
        }
    }

    /// Label text as drawn on the frame: `"{label} ({confidence:.2}%)"`.
    pub fn annotation_text(&self) -> String {
        format!("{} ({:.2}%)", self.label, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_probability_is_healthy() {
        let c = Classification::from_probability(0.9);
        assert_eq!(c.label, HealthLabel::Healthy);
        assert!((c.confidence - 90.0).abs() < 1e-4);
    }

    #[test]
    fn low_probability_is_diseased() {
        let c = Classification::from_probability(0.1);
        assert_eq!(c.label, HealthLabel::LumpySkinDisease);
        assert!((c.confidence - 90.0).abs() < 1e-4);
    }

    #[test]
    fn boundary_exactly_half_routes_to_diseased() {
        // The rule is a strict "> 0.5": 0.5 itself fails the comparison.
        let c = Classification::from_probability(0.5);
        assert_eq!(c.label, HealthLabel::LumpySkinDisease);
        assert!((c.confidence - 50.0).abs() < 1e-4);
    }

    #[test]
    fn confidence_always_within_percentage_range() {
        for p in [0.0f32, 0.25, 0.5, 0.500001, 0.75, 1.0] {
            let c = Classification::from_probability(p);
            assert!(c.confidence >= 0.0 && c.confidence <= 100.0, "p={p}");
            let expected = match c.label {
                HealthLabel::Healthy => p * 100.0,
                HealthLabel::LumpySkinDisease => (1.0 - p) * 100.0,
            };
            assert!((c.confidence - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn annotation_text_has_two_decimals() {
        let c = Classification::from_probability(0.875);
        assert_eq!(c.annotation_text(), "Healthy (87.50%)");
    }
}
