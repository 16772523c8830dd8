//! Volume indicators: volume-price relationship

pub mod volume_price;

pub use volume_price::*;
