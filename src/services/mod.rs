pub mod directions;
pub mod geocoding;
pub mod poi_dataset;
pub mod proximity;
pub mod route_planner;
