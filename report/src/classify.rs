use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound of the Possible Match tier.
pub const POSSIBLE_MATCH_THRESHOLD: f64 = 0.60;

/// Lower bound of the Strong Match tier. Numerically the same value the
/// verification backend uses for its binary same/different decision.
pub const STRONG_MATCH_THRESHOLD: f64 = 0.80;

/// Ordinal confidence tier derived from a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Voices likely belong to different speakers (score < 0.60).
    NoMatch,
    /// Voices are somewhat similar, inconclusive (0.60 <= score < 0.80).
    PossibleMatch,
    /// High confidence both voices belong to the same speaker (score >= 0.80).
    StrongMatch,
}

impl MatchTier {
    /// Human-readable tier label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoMatch => "No Match",
            Self::PossibleMatch => "Possible Match",
            Self::StrongMatch => "Strong Match",
        }
    }

    /// Banner color token for the presentation layer.
    pub fn color_token(&self) -> &'static str {
        match self {
            Self::NoMatch => "red",
            Self::PossibleMatch => "orange",
            Self::StrongMatch => "green",
        }
    }

    /// One-sentence interpretation used in the report's INTERPRETATION block.
    pub fn interpretation(&self) -> &'static str {
        match self {
            Self::NoMatch => "No Match: Likely different speakers",
            Self::PossibleMatch => "Possible Match: Inconclusive, more data needed",
            Self::StrongMatch => "Strong Match: High confidence same speaker",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier plus its presentation metadata. Pure function of the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: MatchTier,
    pub label: String,
    pub color_token: String,
}

/// Classifies a similarity score into one of three confidence tiers.
///
/// The partition is total and non-overlapping: every f64 maps to exactly one
/// tier, with tier boundaries inclusive on the lower bound (0.60 classifies
/// as Possible Match, 0.80 as Strong Match).
///
/// The score is deliberately not clamped or rejected. Negative scores and
/// scores above 1.0 pass through the same comparisons, so backend quirks
/// remain visible to the caller instead of being silently normalized.
/// NaN fails both comparisons and classifies as No Match.
pub fn classify(score: f64) -> Classification {
    let tier = if score >= STRONG_MATCH_THRESHOLD {
        MatchTier::StrongMatch
    } else if score >= POSSIBLE_MATCH_THRESHOLD {
        MatchTier::PossibleMatch
    } else {
        MatchTier::NoMatch
    };
    Classification {
        tier,
        label: tier.label().to_string(),
        color_token: tier.color_token().to_string(),
    }
}
