//! State Management
//!
//! Global application state and token persistence.

pub mod global;
pub mod session;

pub use global::provide_global_state;
