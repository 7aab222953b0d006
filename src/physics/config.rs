//! Immutable simulation configuration.
//!
//! All physical and parallel-layout parameters are collected in one
//! [`GlobalConfig`] value that is passed explicitly into every constructor.
//! A configuration never changes while an engine is alive; a different
//! layout or parameter set means building a new engine.

use crate::error::{Result, RexiError};
use crate::types::{DomainSize, Resolution2D};

/// Standard gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

// =============================================================================
// GlobalConfig
// =============================================================================

/// Physical and parallel parameters of one simulation.
///
/// # Example
///
/// ```
/// use rexi_rs::physics::GlobalConfig;
/// use rexi_rs::types::{DomainSize, Resolution2D};
///
/// let config = GlobalConfig::builder(Resolution2D::square(32), DomainSize::square(1.0e6))
///     .with_coriolis(1.0e-4)
///     .with_mean_depth(100.0)
///     .with_threads_per_process(4)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.num_global_workers(), 4);
/// assert!(config.has_coriolis());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalConfig {
    resolution: Resolution2D,
    domain: DomainSize,
    f0: f64,
    gravity: f64,
    mean_depth: f64,
    num_processes: usize,
    threads_per_process: usize,
}

impl GlobalConfig {
    /// Start building a configuration for the given grid.
    pub fn builder(resolution: Resolution2D, domain: DomainSize) -> GlobalConfigBuilder {
        GlobalConfigBuilder::new(resolution, domain)
    }

    /// Single-process, single-thread f-plane configuration.
    pub fn f_plane(
        resolution: Resolution2D,
        domain: DomainSize,
        f0: f64,
        gravity: f64,
        mean_depth: f64,
    ) -> Result<Self> {
        Self::builder(resolution, domain)
            .with_coriolis(f0)
            .with_gravity(gravity)
            .with_mean_depth(mean_depth)
            .build()
    }

    /// Copy of this configuration with a different parallel layout.
    pub fn with_layout(&self, num_processes: usize, threads_per_process: usize) -> Result<Self> {
        GlobalConfigBuilder::from(*self)
            .with_processes(num_processes)
            .with_threads_per_process(threads_per_process)
            .build()
    }

    /// Grid resolution.
    #[inline]
    pub fn resolution(&self) -> Resolution2D {
        self.resolution
    }

    /// Domain size.
    #[inline]
    pub fn domain(&self) -> DomainSize {
        self.domain
    }

    /// Coriolis parameter f₀ (s⁻¹).
    #[inline]
    pub fn f0(&self) -> f64 {
        self.f0
    }

    /// Gravitational acceleration g (m/s²).
    #[inline]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Reference (mean) depth h̄ (m).
    #[inline]
    pub fn mean_depth(&self) -> f64 {
        self.mean_depth
    }

    /// Number of cooperating processes.
    #[inline]
    pub fn num_processes(&self) -> usize {
        self.num_processes
    }

    /// Worker threads inside each process.
    #[inline]
    pub fn threads_per_process(&self) -> usize {
        self.threads_per_process
    }

    /// Total number of workers across all processes.
    #[inline]
    pub fn num_global_workers(&self) -> usize {
        self.threads_per_process * self.num_processes
    }

    /// Whether rotation is active (f₀ ≠ 0).
    #[inline]
    pub fn has_coriolis(&self) -> bool {
        self.f0 != 0.0
    }

    /// Gravity wave speed c = sqrt(g h̄).
    #[inline]
    pub fn wave_speed(&self) -> f64 {
        (self.gravity * self.mean_depth).sqrt()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`GlobalConfig`].
///
/// Defaults: no rotation, g = 9.81, h̄ = 1000 m, one process with one thread.
#[derive(Clone, Debug)]
pub struct GlobalConfigBuilder {
    resolution: Resolution2D,
    domain: DomainSize,
    f0: f64,
    gravity: f64,
    mean_depth: f64,
    num_processes: usize,
    threads_per_process: usize,
}

impl GlobalConfigBuilder {
    /// Create a builder with default physics for the given grid.
    pub fn new(resolution: Resolution2D, domain: DomainSize) -> Self {
        Self {
            resolution,
            domain,
            f0: 0.0,
            gravity: GRAVITY,
            mean_depth: 1000.0,
            num_processes: 1,
            threads_per_process: 1,
        }
    }

    /// Set the Coriolis parameter f₀.
    pub fn with_coriolis(mut self, f0: f64) -> Self {
        self.f0 = f0;
        self
    }

    /// Set the gravitational acceleration.
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the reference depth h̄.
    pub fn with_mean_depth(mut self, mean_depth: f64) -> Self {
        self.mean_depth = mean_depth;
        self
    }

    /// Set the number of cooperating processes.
    pub fn with_processes(mut self, num_processes: usize) -> Self {
        self.num_processes = num_processes;
        self
    }

    /// Set the number of worker threads per process.
    pub fn with_threads_per_process(mut self, threads: usize) -> Self {
        self.threads_per_process = threads;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<GlobalConfig> {
        self.domain.validate()?;
        if self.threads_per_process == 0 {
            return Err(RexiError::configuration(
                "threads_per_process must be at least 1",
            ));
        }
        if self.num_processes == 0 {
            return Err(RexiError::configuration("num_processes must be at least 1"));
        }
        if !self.f0.is_finite() {
            return Err(RexiError::configuration(format!(
                "Coriolis parameter must be finite, got {}",
                self.f0
            )));
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(RexiError::configuration(format!(
                "gravity must be positive, got {}",
                self.gravity
            )));
        }
        if !(self.mean_depth.is_finite() && self.mean_depth > 0.0) {
            return Err(RexiError::configuration(format!(
                "mean depth must be positive, got {}",
                self.mean_depth
            )));
        }

        Ok(GlobalConfig {
            resolution: self.resolution,
            domain: self.domain,
            f0: self.f0,
            gravity: self.gravity,
            mean_depth: self.mean_depth,
            num_processes: self.num_processes,
            threads_per_process: self.threads_per_process,
        })
    }
}

impl From<GlobalConfig> for GlobalConfigBuilder {
    fn from(config: GlobalConfig) -> Self {
        Self {
            resolution: config.resolution,
            domain: config.domain,
            f0: config.f0,
            gravity: config.gravity,
            mean_depth: config.mean_depth,
            num_processes: config.num_processes,
            threads_per_process: config.threads_per_process,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> (Resolution2D, DomainSize) {
        (Resolution2D::square(8), DomainSize::square(1000.0))
    }

    #[test]
    fn test_defaults() {
        let (res, dom) = grid();
        let config = GlobalConfig::builder(res, dom).build().unwrap();
        assert_eq!(config.f0(), 0.0);
        assert_eq!(config.gravity(), GRAVITY);
        assert_eq!(config.mean_depth(), 1000.0);
        assert_eq!(config.num_global_workers(), 1);
        assert!(!config.has_coriolis());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let (res, dom) = grid();
        let err = GlobalConfig::builder(res, dom)
            .with_threads_per_process(0)
            .build()
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_invalid_physics_rejected() {
        let (res, dom) = grid();
        assert!(GlobalConfig::builder(res, dom).with_gravity(0.0).build().is_err());
        assert!(GlobalConfig::builder(res, dom).with_mean_depth(-1.0).build().is_err());
        assert!(
            GlobalConfig::builder(res, dom)
                .with_coriolis(f64::NAN)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_degenerate_domain_rejected() {
        let res = Resolution2D::square(8);
        for domain in [
            DomainSize { sx: 0.0, sy: 1000.0 },
            DomainSize { sx: 1000.0, sy: f64::NAN },
        ] {
            let err = GlobalConfig::builder(res, domain).build().unwrap_err();
            assert!(matches!(err, RexiError::Configuration(_)));
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn test_with_layout_keeps_physics() {
        let (res, dom) = grid();
        let config = GlobalConfig::f_plane(res, dom, 1e-4, 9.81, 500.0).unwrap();
        let wide = config.with_layout(3, 4).unwrap();
        assert_eq!(wide.num_global_workers(), 12);
        assert_eq!(wide.f0(), 1e-4);
        assert_eq!(wide.mean_depth(), 500.0);
        assert_eq!(config.num_global_workers(), 1);
    }

    #[test]
    fn test_wave_speed() {
        let (res, dom) = grid();
        let config = GlobalConfig::f_plane(res, dom, 0.0, 10.0, 10.0).unwrap();
        assert!((config.wave_speed() - 10.0).abs() < 1e-14);
    }
}
