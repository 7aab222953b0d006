//! Physical parameters of the linear shallow water system.
//!
//! The linearised equations about a resting state of depth h̄ are
//!
//! ```text
//! ∂h/∂t = −h̄ (∂u/∂x + ∂v/∂y)
//! ∂u/∂t = −g ∂h/∂x + f₀ v
//! ∂v/∂t = −g ∂h/∂y − f₀ u
//! ```
//!
//! on a doubly periodic f-plane. [`GlobalConfig`] carries every parameter
//! of this operator together with the parallel layout.

pub mod config;

pub use config::{GRAVITY, GlobalConfig, GlobalConfigBuilder};
