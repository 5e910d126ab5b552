pub mod health;
pub mod payhere;
pub mod plans;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
