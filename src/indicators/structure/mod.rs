//! Structure indicators: fractals, market structure

pub mod fractal;
pub mod market_structure;

pub use fractal::*;
pub use market_structure::*;
