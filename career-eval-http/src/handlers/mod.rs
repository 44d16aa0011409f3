pub mod evaluate;
pub mod session;
pub mod system;
pub mod test_helpers;

// Re-export all handlers for easier imports
pub use evaluate::*;
pub use session::*;
pub use system::*;
