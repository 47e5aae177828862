pub mod coordinates;
pub mod poi;
pub mod route;
pub mod snapshot;
pub mod tier;

pub use coordinates::{Coordinates, LatLngBounds};
pub use poi::{PoiCategory, PointOfInterest, TieredPoi};
pub use route::{RouteLeg, RoutePoint, RouteRequest, RouteResult, RouteStep, TravelMode};
pub use snapshot::RouteSnapshot;
pub use tier::{classify, QualityTier};
