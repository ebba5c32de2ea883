use serde::Serialize;

/// Reference (F1, F2) location of one vowel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VowelPrototype {
    pub label: &'static str,
    pub f1: f64,
    pub f2: f64,
}

impl VowelPrototype {
    pub const fn new(label: &'static str, f1: f64, f2: f64) -> Self {
        Self { label, f1, f2 }
    }
}

/// French oral vowels, ordered by chart row (close to open) then front to back.
pub const FRENCH_VOWELS: [VowelPrototype; 10] = [
    VowelPrototype::new("i", 306.0, 2456.0),
    VowelPrototype::new("y", 305.0, 2046.0),
    VowelPrototype::new("u", 311.0, 804.0),
    VowelPrototype::new("e", 405.0, 2553.0),
    VowelPrototype::new("ø", 409.0, 1599.0),
    VowelPrototype::new("o", 415.0, 842.0),
    VowelPrototype::new("ɛ", 614.0, 2306.0),
    VowelPrototype::new("œ", 599.0, 1678.0),
    VowelPrototype::new("ɔ", 595.0, 1144.0),
    VowelPrototype::new("a", 830.0, 1438.0),
];

pub fn find(prototypes: &[VowelPrototype], label: &str) -> Option<usize> {
    prototypes.iter().position(|p| p.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EstimatorConfig;

    #[test]
    fn labels_are_unique() {
        for (i, v) in FRENCH_VOWELS.iter().enumerate() {
            assert_eq!(find(&FRENCH_VOWELS, v.label), Some(i));
        }
    }

    #[test]
    fn every_vowel_sits_inside_the_search_bands() {
        for v in FRENCH_VOWELS.iter() {
            assert!(EstimatorConfig::F1_BAND.contains(v.f1), "{}", v.label);
            assert!(EstimatorConfig::F2_BAND.contains(v.f2), "{}", v.label);
        }
    }
}
