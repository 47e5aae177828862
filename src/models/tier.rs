use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality tier derived from a POI's rating and review volume.
///
/// Variants are declared lowest-to-highest so the derived `Ord` ranks
/// `Diamond` above everything else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    None,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

/// Classify a POI into a quality tier. First-match cascade, top down.
///
/// This is the single classification implementation in the crate: marker
/// tagging and tier-filter predicates both go through it, so a POI's rendered
/// tier and its filter membership cannot diverge.
///
/// Total over the whole input domain; a NaN rating fails every threshold and
/// lands on `None`.
pub fn classify(rating: f64, review_count: u32) -> QualityTier {
    if rating >= 4.8 && review_count >= 1000 {
        QualityTier::Diamond
    } else if rating >= 4.8 && review_count >= 500 {
        QualityTier::Platinum
    } else if rating >= 4.8 && review_count >= 200 {
        QualityTier::Gold
    } else if rating >= 4.7 && review_count >= 100 {
        QualityTier::Silver
    } else if rating >= 4.7 {
        QualityTier::Bronze
    } else {
        QualityTier::None
    }
}

impl QualityTier {
    /// Filter predicate shared by list filtering and rendering.
    pub fn at_least(&self, min: QualityTier) -> bool {
        *self >= min
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityTier::None => "none",
            QualityTier::Bronze => "bronze",
            QualityTier::Silver => "silver",
            QualityTier::Gold => "gold",
            QualityTier::Platinum => "platinum",
            QualityTier::Diamond => "diamond",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(QualityTier::None),
            "bronze" => Ok(QualityTier::Bronze),
            "silver" => Ok(QualityTier::Silver),
            "gold" => Ok(QualityTier::Gold),
            "platinum" => Ok(QualityTier::Platinum),
            "diamond" => Ok(QualityTier::Diamond),
            _ => Err(format!("Invalid quality tier: '{}'", s)),
        }
    }
}
