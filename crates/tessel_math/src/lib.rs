// Re-export glam for convenience
pub use glam::*;

// Tessel math types
mod ray;
mod tolerance;
pub use ray::Ray;
pub use tolerance::{is_greater_equal, EPS};
