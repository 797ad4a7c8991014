pub mod pooling;

pub use pooling::RoiPool2D;
