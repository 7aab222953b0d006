//! Rational approximation of the exponential on the imaginary axis.
//!
//! The REXI terms `(αₙ, βₙ)` satisfy
//!
//! ```text
//! exp(iω) ≈ Σₙ βₙ / (iω − αₙ)      for |ω| ≲ (M − 10)·h
//! ```
//!
//! They are built in two stages:
//!
//! 1. `exp(iω)` is expanded in shifted Gaussians
//!    `ψ_h(x) = (4π)^{-1/2} exp(−x²/(4h²))` with weights `bₘ = e^{h²} e^{−imh}`,
//!    `m = −M..M`.
//! 2. Each Gaussian is written as the real part of a sum of simple poles
//!    `p_l = l − iπ`, `l = −L..L`, obtained from the trapezoidal rule applied
//!    to the Cauchy integral along the strip `Im s = −π`.
//!
//! Expanding the real part into both conjugate pole families gives a set of
//! `2(2M+1)(2L+1)` terms closed under conjugation.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::{Result, RexiError};

/// Default number of Gaussian poles per side when `l == 0`.
pub const DEFAULT_POLES: i32 = 11;

/// Imaginary offset of the Gaussian poles.
const POLE_SHIFT: f64 = PI;

/// Poles closer than this to the real axis count as self-conjugate.
const REAL_AXIS_TOL: f64 = 1e-14;

// =============================================================================
// Parameters
// =============================================================================

/// Parameters of the rational approximation.
///
/// # Example
///
/// ```
/// use rexi_rs::rexi::{RexiParameters, compute_terms};
///
/// let params = RexiParameters::new(1.0, 16).with_half(false);
/// let terms = compute_terms(&params).unwrap();
/// assert_eq!(terms.len(), 2 * 33 * 23);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RexiParameters {
    /// Gaussian spacing h
    pub h: f64,
    /// Number of Gaussian shifts per side (M)
    pub m: i32,
    /// Number of poles per Gaussian per side (L); 0 selects the default
    pub l: i32,
    /// Keep only the upper half-plane poles (real-part reconstruction)
    pub half: bool,
    /// Rescale so that the zero frequency is reproduced exactly
    pub normalize: bool,
}

impl Default for RexiParameters {
    fn default() -> Self {
        Self {
            h: 0.2,
            m: 64,
            l: 0,
            half: true,
            normalize: true,
        }
    }
}

impl RexiParameters {
    /// Parameters with the given spacing and shift count; default L, half
    /// and normalisation enabled.
    pub fn new(h: f64, m: i32) -> Self {
        Self {
            h,
            m,
            ..Self::default()
        }
    }

    /// Set the pole count per side (0 = default).
    pub fn with_poles(mut self, l: i32) -> Self {
        self.l = l;
        self
    }

    /// Enable or disable half-pole reduction.
    pub fn with_half(mut self, half: bool) -> Self {
        self.half = half;
        self
    }

    /// Enable or disable normalisation.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Effective pole count per side after applying the default.
    pub fn effective_poles(&self) -> i32 {
        if self.l == 0 { DEFAULT_POLES } else { self.l }
    }

    /// Largest |ω| for which the approximation is accurate.
    pub fn max_frequency(&self) -> f64 {
        (f64::from(self.m) - 10.0).max(0.0) * self.h
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<()> {
        if self.m <= 0 {
            return Err(RexiError::configuration(format!(
                "REXI shift count M must be positive, got {}",
                self.m
            )));
        }
        if self.l < 0 {
            return Err(RexiError::configuration(format!(
                "REXI pole count L must be non-negative, got {}",
                self.l
            )));
        }
        if !(self.h.is_finite() && self.h > 0.0) {
            return Err(RexiError::configuration(format!(
                "REXI spacing h must be positive, got {}",
                self.h
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Terms
// =============================================================================

/// One shifted-inverse term `β / (z − α)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RexiTerm {
    pub alpha: Complex64,
    pub beta: Complex64,
}

impl RexiTerm {
    #[inline]
    pub fn new(alpha: Complex64, beta: Complex64) -> Self {
        Self { alpha, beta }
    }

    /// Contribution `β / (z − α)` at `z`.
    #[inline]
    pub fn eval(&self, z: Complex64) -> Complex64 {
        self.beta / (z - self.alpha)
    }
}

/// Evaluate `Σ βₙ / (z − αₙ)`.
pub fn evaluate(terms: &[RexiTerm], z: Complex64) -> Complex64 {
    terms.iter().map(|t| t.eval(z)).sum()
}

fn gaussian_at(s: Complex64) -> Complex64 {
    (-s * s / 4.0).exp() / (4.0 * PI).sqrt()
}

/// Compute the ordered REXI term sequence.
///
/// The order depends only on the parameters, so every worker that calls this
/// with the same input partitions the same sequence.
pub fn compute_terms(params: &RexiParameters) -> Result<Vec<RexiTerm>> {
    params.validate()?;

    let h = params.h;
    let m_max = params.m;
    let l_max = params.effective_poles();
    let i = Complex64::i();
    let weight = h / (2.0 * PI);
    let gauss_scale = (h * h).exp();

    let mut terms = Vec::with_capacity(2 * (2 * m_max as usize + 1) * (2 * l_max as usize + 1));
    for m in -m_max..=m_max {
        let shift = f64::from(m) * h;
        let b_m = gauss_scale * Complex64::from_polar(1.0, -shift);
        for l in -l_max..=l_max {
            let pole = Complex64::new(f64::from(l), -POLE_SHIFT);
            let psi = gaussian_at(pole);

            terms.push(RexiTerm::new(
                i * (h * pole - shift),
                -weight * b_m * psi,
            ));
            terms.push(RexiTerm::new(
                i * (h * pole.conj() - shift),
                weight * b_m * psi.conj(),
            ));
        }
    }

    if params.half {
        terms = reduce_to_half(terms);
    }

    if params.normalize {
        let zero = evaluate(&terms, Complex64::new(0.0, 0.0));
        let scale = if params.half {
            Complex64::new(zero.re, 0.0)
        } else {
            zero
        };
        if scale.norm() == 0.0 || !scale.re.is_finite() || !scale.im.is_finite() {
            return Err(RexiError::configuration(
                "REXI normalisation factor is degenerate",
            ));
        }
        for t in &mut terms {
            t.beta /= scale;
        }
    }

    tracing::debug!(
        h = params.h,
        m = params.m,
        l = l_max,
        half = params.half,
        n = terms.len(),
        "computed REXI terms"
    );

    Ok(terms)
}

/// Keep the upper half-plane poles with doubled weights plus the
/// self-conjugate ones.
fn reduce_to_half(terms: Vec<RexiTerm>) -> Vec<RexiTerm> {
    terms
        .into_iter()
        .filter_map(|t| {
            if t.alpha.im > REAL_AXIS_TOL {
                Some(RexiTerm::new(t.alpha, 2.0 * t.beta))
            } else if t.alpha.im.abs() <= REAL_AXIS_TOL {
                Some(t)
            } else {
                None
            }
        })
        .collect()
}
