pub mod algorithm;
pub mod analysis;
pub mod cube;
