mod percentile;

pub use percentile::*;
