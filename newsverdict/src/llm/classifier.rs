use anyhow::Result;
use tracing::info;

use super::Classifier;
use crate::sessions::{FakeNewsLabel, FakeNewsVerdict};

/// Run the fake-news classifier on a summary and map its label.
///
/// Only an exact `fake_label` match counts as fake; every other label reads as real.
pub async fn classify_summary<C: Classifier + ?Sized>(
    classifier: &C,
    summary: &str,
    fake_label: &str,
) -> Result<FakeNewsVerdict> {
    let prediction = classifier.classify(summary).await?;
    info!(label = %prediction.label, score = prediction.score, "classification done");

    let label = if prediction.label == fake_label {
        FakeNewsLabel::Fake
    } else {
        FakeNewsLabel::Real
    };

    Ok(FakeNewsVerdict {
        label,
        confidence: prediction.score.clamp(0.0, 1.0),
    })
}
