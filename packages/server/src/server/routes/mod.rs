// HTTP routes
pub mod error;
pub mod events;
pub mod health;
pub mod scheduler;

pub use error::*;
pub use events::*;
pub use health::*;
pub use scheduler::*;
