pub mod placement;
pub mod shape;
