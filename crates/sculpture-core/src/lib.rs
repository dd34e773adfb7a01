pub mod accumulator;
pub mod beat;
pub mod constants;
pub mod error;
pub mod pattern;
pub mod sculpture;
pub mod show;
pub mod spectrum;
pub mod state;

pub use accumulator::*;
pub use beat::*;
pub use constants::*;
pub use error::*;
pub use pattern::*;
pub use sculpture::*;
pub use show::*;
pub use spectrum::*;
pub use state::*;
