pub mod actions;
pub mod config;
pub mod reducer;
pub mod state;
pub mod wrap;

pub use actions::*;
pub use config::*;
pub use reducer::*;
pub use state::*;

pub use wrap::*;
