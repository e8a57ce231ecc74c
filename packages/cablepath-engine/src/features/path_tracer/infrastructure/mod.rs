//! Infrastructure - Tracer implementation

pub mod tracer;

pub use tracer::PathTracer;
