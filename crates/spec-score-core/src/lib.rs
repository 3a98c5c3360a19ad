pub mod score;
pub mod tier;

pub use score::*;
pub use tier::*;
