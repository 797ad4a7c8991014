// Pooling layers organized by type

pub mod roi;

pub use roi::RoiPool2D;
