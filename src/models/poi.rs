use crate::models::tier::{classify, QualityTier};
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PoiCategory {
    Monument,
    Viewpoint,
    Park,
    Museum,
    Restaurant,
    Cafe,
    Hotel,
    Beach,
    Historic,
    Cultural,
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoiCategory::Monument => "monument",
            PoiCategory::Viewpoint => "viewpoint",
            PoiCategory::Park => "park",
            PoiCategory::Museum => "museum",
            PoiCategory::Restaurant => "restaurant",
            PoiCategory::Cafe => "cafe",
            PoiCategory::Hotel => "hotel",
            PoiCategory::Beach => "beach",
            PoiCategory::Historic => "historic",
            PoiCategory::Cultural => "cultural",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PoiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monument" => Ok(PoiCategory::Monument),
            "viewpoint" => Ok(PoiCategory::Viewpoint),
            "park" => Ok(PoiCategory::Park),
            "museum" => Ok(PoiCategory::Museum),
            "restaurant" => Ok(PoiCategory::Restaurant),
            "cafe" => Ok(PoiCategory::Cafe),
            "hotel" => Ok(PoiCategory::Hotel),
            "beach" => Ok(PoiCategory::Beach),
            "historic" => Ok(PoiCategory::Historic),
            "cultural" => Ok(PoiCategory::Cultural),
            _ => Err(format!("Invalid POI category: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: Uuid,
    pub name: String,
    pub category: PoiCategory,
    pub coordinates: Coordinates,
    /// Average rating on a 0..=5 scale.
    pub rating: f64,
    pub review_count: u32,
    pub description: Option<String>,
}

impl PointOfInterest {
    pub fn new(
        name: String,
        category: PoiCategory,
        coordinates: Coordinates,
        rating: f64,
        review_count: u32,
    ) -> Self {
        PointOfInterest {
            id: Uuid::new_v4(),
            name,
            category,
            coordinates,
            rating: rating.clamp(0.0, 5.0),
            review_count,
            description: None,
        }
    }

    /// Quality tier of this POI. Delegates to the shared classifier.
    pub fn tier(&self) -> QualityTier {
        classify(self.rating, self.review_count)
    }
}

/// A POI tagged with its computed tier, as returned to presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieredPoi {
    #[serde(flatten)]
    pub poi: PointOfInterest,
    pub tier: QualityTier,
}

impl From<PointOfInterest> for TieredPoi {
    fn from(poi: PointOfInterest) -> Self {
        let tier = poi.tier();
        TieredPoi { poi, tier }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poi_category_parsing() {
        assert_eq!(
            "monument".parse::<PoiCategory>().unwrap(),
            PoiCategory::Monument
        );
        assert_eq!(
            "VIEWPOINT".parse::<PoiCategory>().unwrap(),
            PoiCategory::Viewpoint
        );
        assert!("invalid".parse::<PoiCategory>().is_err());
    }

    #[test]
    fn test_rating_clamped() {
        let poi = PointOfInterest::new(
            "Overrated".to_string(),
            PoiCategory::Restaurant,
            Coordinates::new(39.47, -0.38).unwrap(),
            7.5,
            10,
        );
        assert_eq!(poi.rating, 5.0);
    }

    #[test]
    fn test_tier_delegates_to_classifier() {
        let poi = PointOfInterest::new(
            "Ciudad de las Artes".to_string(),
            PoiCategory::Cultural,
            Coordinates::new(39.4700, -0.3800).unwrap(),
            4.9,
            1200,
        );
        assert_eq!(poi.tier(), QualityTier::Diamond);

        let tagged: TieredPoi = poi.into();
        assert_eq!(tagged.tier, QualityTier::Diamond);
    }
}
