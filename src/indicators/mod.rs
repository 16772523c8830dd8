pub mod policy;

pub mod momentum;
pub mod structure;
pub mod trend;
pub mod volume;

pub use policy::MatchPolicy;
