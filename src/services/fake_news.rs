// src/services/fake_news.rs
//! Placeholder classifier. It performs no inference: the label and confidence
//! are random and carry no meaning. Swap in a real model behind the trait.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FakeNewsLabel {
    Fake,
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FakeNewsVerdict {
    pub label: FakeNewsLabel,
    /// In `[0, 1]`.
    pub confidence: f64,
}

pub trait FakeNewsDetector: Send + Sync {
    fn classify(&self, text: &str) -> FakeNewsVerdict;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomDetector;

impl FakeNewsDetector for RandomDetector {
    fn classify(&self, _text: &str) -> FakeNewsVerdict {
        let label = if rand::random::<bool>() {
            FakeNewsLabel::Fake
        } else {
            FakeNewsLabel::Real
        };
        FakeNewsVerdict {
            label,
            confidence: rand::random::<f64>(),
        }
    }
}
