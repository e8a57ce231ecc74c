//! Application - Event handling use cases

pub mod controller;

pub use controller::ConsistencyController;
