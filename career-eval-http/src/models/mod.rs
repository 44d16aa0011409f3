pub mod error;
pub mod evaluate;
pub mod session;
pub mod system;

// Re-export all models for easier imports
pub use error::*;
pub use evaluate::*;
pub use session::*;
pub use system::*;
