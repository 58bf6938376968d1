pub mod config;
pub mod error;
pub mod state_machine;
pub mod traits;

pub use config::*;
pub use error::*;
pub use state_machine::*;
pub use traits::*;
