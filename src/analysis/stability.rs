//! Stability monitoring for plane shallow-water runs.
//!
//! # Example
//!
//! ```
//! use rexi_rs::analysis::{StabilityMonitor, StabilityThresholds};
//! use rexi_rs::solver::PlaneState;
//! use rexi_rs::types::Resolution2D;
//!
//! let mut monitor = StabilityMonitor::new(StabilityThresholds::default());
//! let state = PlaneState::at_rest(Resolution2D::square(8), 1000.0);
//! let status = monitor.check(&state, 1000.0);
//! assert!(status.is_stable);
//! assert!(!monitor.should_stop());
//! ```

/// Thresholds for stability monitoring.
#[derive(Debug, Clone, Copy)]
pub struct StabilityThresholds {
    /// Maximum allowed `|h − h̄|` (m).
    pub max_depth_anomaly: f64,
    /// Minimum allowed total depth (m).
    pub min_depth: f64,
    /// Maximum velocity magnitude (m/s).
    pub max_velocity: f64,
    /// Maximum consecutive warnings before recommending stop.
    pub max_consecutive_warnings: usize,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            max_depth_anomaly: 1.0e4,
            min_depth: 0.0,
            max_velocity: 500.0,
            max_consecutive_warnings: 10,
        }
    }
}

impl StabilityThresholds {
    /// Thresholds that only catch catastrophic blow-up.
    pub fn relaxed() -> Self {
        Self {
            max_depth_anomaly: 1.0e8,
            min_depth: f64::NEG_INFINITY,
            max_velocity: 1.0e6,
            max_consecutive_warnings: 100,
        }
    }

    pub fn with_max_depth_anomaly(mut self, value: f64) -> Self {
        self.max_depth_anomaly = value;
        self
    }

    pub fn with_min_depth(mut self, value: f64) -> Self {
        self.min_depth = value;
        self
    }

    pub fn with_max_velocity(mut self, value: f64) -> Self {
        self.max_velocity = value;
        self
    }

    pub fn with_max_consecutive_warnings(mut self, count: usize) -> Self {
        self.max_consecutive_warnings = count;
        self
    }
}

/// Types of stability warnings, located by grid index `(i, j)`.
#[derive(Debug, Clone, PartialEq)]
pub enum StabilityWarning {
    DepthAnomalyExceedsMax {
        i: usize,
        j: usize,
        value: f64,
        threshold: f64,
    },
    DepthBelowMin {
        i: usize,
        j: usize,
        value: f64,
        threshold: f64,
    },
    VelocityExceedsMax {
        i: usize,
        j: usize,
        value: f64,
        threshold: f64,
    },
    /// NaN or infinity in any field.
    NonFiniteValue { i: usize, j: usize },
    SolutionBlowUp,
}

impl std::fmt::Display for StabilityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DepthAnomalyExceedsMax {
                i,
                j,
                value,
                threshold,
            } => write!(
                f,
                "Depth anomaly exceeds max: |h - H|={value:.2}m > {threshold:.2}m at ({i}, {j})"
            ),
            Self::DepthBelowMin {
                i,
                j,
                value,
                threshold,
            } => write!(
                f,
                "Depth below min: h={value:.6}m < {threshold:.6}m at ({i}, {j})"
            ),
            Self::VelocityExceedsMax {
                i,
                j,
                value,
                threshold,
            } => write!(
                f,
                "Velocity exceeds max: |u|={value:.2}m/s > {threshold:.2}m/s at ({i}, {j})"
            ),
            Self::NonFiniteValue { i, j } => write!(f, "Non-finite value at ({i}, {j})"),
            Self::SolutionBlowUp => write!(f, "SOLUTION BLOW-UP DETECTED"),
        }
    }
}

/// Result of one stability check.
#[derive(Debug, Clone)]
pub struct StabilityStatus {
    /// Depth range (min, max) over finite points.
    pub h_range: (f64, f64),
    pub max_velocity: f64,
    pub is_stable: bool,
    pub warnings: Vec<StabilityWarning>,
}

impl StabilityStatus {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Blow-up or non-finite values.
    pub fn has_critical_warnings(&self) -> bool {
        self.warnings.iter().any(|w| {
            matches!(
                w,
                StabilityWarning::SolutionBlowUp | StabilityWarning::NonFiniteValue { .. }
            )
        })
    }
}

/// Tracks stability over a run.
#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    thresholds: StabilityThresholds,
    consecutive_warnings: usize,
    total_checks: usize,
    total_warnings: usize,
    last_status: Option<StabilityStatus>,
}

impl StabilityMonitor {
    pub fn new(thresholds: StabilityThresholds) -> Self {
        Self {
            thresholds,
            consecutive_warnings: 0,
            total_checks: 0,
            total_warnings: 0,
            last_status: None,
        }
    }

    pub fn thresholds(&self) -> &StabilityThresholds {
        &self.thresholds
    }

    pub fn consecutive_warnings(&self) -> usize {
        self.consecutive_warnings
    }

    pub fn total_checks(&self) -> usize {
        self.total_checks
    }

    pub fn total_warnings(&self) -> usize {
        self.total_warnings
    }

    pub fn last_status(&self) -> Option<&StabilityStatus> {
        self.last_status.as_ref()
    }

    /// Scan `state` (valid physical data) around the mean depth.
    pub fn check(&mut self, state: &crate::solver::PlaneState, mean_depth: f64) -> StabilityStatus {
        self.total_checks += 1;

        let nx = state.resolution().nx();
        let t = self.thresholds;
        let mut warnings = Vec::new();
        let mut max_h = f64::NEG_INFINITY;
        let mut min_h = f64::INFINITY;
        let mut max_vel = 0.0_f64;
        let mut found_blow_up = false;

        let h = state.h.physical();
        let u = state.u.physical();
        let v = state.v.physical();
        for k in 0..h.len() {
            let (i, j) = (k % nx, k / nx);
            if !(h[k].is_finite() && u[k].is_finite() && v[k].is_finite()) {
                warnings.push(StabilityWarning::NonFiniteValue { i, j });
                found_blow_up = true;
                continue;
            }

            max_h = max_h.max(h[k]);
            min_h = min_h.min(h[k]);

            let anomaly = (h[k] - mean_depth).abs();
            if anomaly > t.max_depth_anomaly {
                warnings.push(StabilityWarning::DepthAnomalyExceedsMax {
                    i,
                    j,
                    value: anomaly,
                    threshold: t.max_depth_anomaly,
                });
            }
            if h[k] < t.min_depth {
                warnings.push(StabilityWarning::DepthBelowMin {
                    i,
                    j,
                    value: h[k],
                    threshold: t.min_depth,
                });
            }

            let vel = u[k].hypot(v[k]);
            max_vel = max_vel.max(vel);
            if vel > t.max_velocity {
                warnings.push(StabilityWarning::VelocityExceedsMax {
                    i,
                    j,
                    value: vel,
                    threshold: t.max_velocity,
                });
            }
        }

        if found_blow_up || max_vel > 1e6 || (max_h - mean_depth).abs() > 1e8 {
            warnings.push(StabilityWarning::SolutionBlowUp);
        }

        let is_stable = warnings.is_empty();
        if is_stable {
            self.consecutive_warnings = 0;
        } else {
            self.consecutive_warnings += 1;
            self.total_warnings += warnings.len();
        }

        let status = StabilityStatus {
            h_range: (min_h, max_h),
            max_velocity: max_vel,
            is_stable,
            warnings,
        };
        self.last_status = Some(status.clone());
        status
    }

    /// Whether the run should stop given the warning history.
    pub fn should_stop(&self) -> bool {
        if self.consecutive_warnings >= self.thresholds.max_consecutive_warnings {
            return true;
        }
        self.last_status
            .as_ref()
            .is_some_and(StabilityStatus::has_critical_warnings)
    }

    /// Emit the last status through `tracing` if it was unstable.
    pub fn report(&self, time: f64, step: usize) {
        let Some(status) = &self.last_status else {
            return;
        };
        if status.is_stable {
            return;
        }
        tracing::warn!(
            time,
            step,
            h_min = status.h_range.0,
            h_max = status.h_range.1,
            max_velocity = status.max_velocity,
            warnings = status.warnings.len(),
            "stability warning"
        );
        for warning in status.warnings.iter().take(8) {
            tracing::warn!("  {warning}");
        }
        if self.should_stop() {
            tracing::warn!("stability monitor recommends stopping the run");
        }
    }
}
