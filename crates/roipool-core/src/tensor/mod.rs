//! Tensor Module
//!
//! - **core**: tensor structure and property accessors
//! - **creation**: constructors

pub mod core;
pub mod creation;

pub use self::core::Tensor;
