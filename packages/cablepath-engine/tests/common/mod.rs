//! Common test utilities for cablepath-engine
//!
//! Site builders that keep a topology and a controller in step, plus
//! assertions over the resulting path index.

#![allow(dead_code)]

mod assertions;
mod builders;

pub use assertions::*;
pub use builders::*;
