pub mod aggregate;
pub mod escape;
pub mod inline_diff;
pub mod keys;
pub mod monitoring;
pub mod reconcile;
pub mod render;
pub mod session;
