pub mod extract;

// Re-export command functions for convenience
pub use extract::extract;
