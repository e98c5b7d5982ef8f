// Domain layer - Balloon positions, insights and dashboard views
pub mod dashboard;
pub mod insight;
pub mod position;
