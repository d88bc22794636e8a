//! Filter operations
//!
//! This module provides the convolution kernels and the uniform and spatially
//! varying convolution engines.

mod adaptive;
pub use adaptive::*;

mod config;
pub use config::*;

/// Uniform convolution and the per pixel kernel selection engine
mod convolution;
pub use convolution::*;

mod dispatch;
pub use dispatch::*;

mod error;
pub use error::FilterError;

mod factory;
pub use factory::*;

/// Kernel model
mod kernel;
pub use kernel::*;

mod planar;
pub use planar::*;
