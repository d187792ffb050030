pub mod generator;
pub mod groq;

pub use generator::*;
pub use groq::*;
