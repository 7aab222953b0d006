//! Closed-form eigen-decomposition of the per-wavenumber symbol.
//!
//! For Fourier mode `(κₓ, κᵧ)` the linear system `dU/dt = L U` becomes
//! `dÛ/dt = −i A Û` with the Hermitian-like symbol
//!
//! ```text
//!     ⎡ 0      h̄ κₓ   h̄ κᵧ ⎤
//! A = ⎢ g κₓ   0      i f  ⎥
//!     ⎣ g κᵧ   −i f   0    ⎦
//! ```
//!
//! whose eigenvalues are `0` and `±ω`, `ω = sqrt(f² + g h̄ |κ|²)`. The
//! eigenvectors have simple closed forms that differ by branch; a wrong
//! branch would divide by a vanishing component, so the branch is chosen
//! from the integer mode numbers.

use num_complex::Complex64;

/// Which closed-form eigenvector set applies to a wavenumber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveMode {
    /// `k₀ = k₁ = 0` with rotation: inertial oscillation of the mean flow
    ZeroMode,
    /// `k₀ = 0, k₁ ≠ 0`
    ZonalMode,
    /// `k₁ = 0, k₀ ≠ 0`
    MeridionalMode,
    /// `k₀ ≠ 0, k₁ ≠ 0`
    GenericMode,
    /// No rotation; `rest` when also `k₀ = k₁ = 0`
    NoCoriolis { rest: bool },
}

impl WaveMode {
    /// Select the branch for integer mode numbers `(k0, k1)`.
    pub fn classify(k0: i64, k1: i64, f0: f64) -> Self {
        if f0 == 0.0 {
            return Self::NoCoriolis {
                rest: k0 == 0 && k1 == 0,
            };
        }
        match (k0 == 0, k1 == 0) {
            (true, true) => Self::ZeroMode,
            (true, false) => Self::ZonalMode,
            (false, true) => Self::MeridionalMode,
            (false, false) => Self::GenericMode,
        }
    }
}

/// Physical parameters of the symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymbolParams {
    pub f0: f64,
    pub gravity: f64,
    pub mean_depth: f64,
}

/// Dense 3×3 complex matrix, `m[row][col]`.
pub type Matrix3 = [[Complex64; 3]; 3];

/// Eigenvalues and eigenvectors (columns of `vectors`) of one symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModalDecomposition {
    pub mode: WaveMode,
    pub eigenvalues: [f64; 3],
    /// `vectors[row][col]`; column `c` is the eigenvector of `eigenvalues[c]`
    pub vectors: Matrix3,
}

impl ModalDecomposition {
    /// Decompose the symbol at angular wavenumber `(kx, ky)`.
    pub fn new(mode: WaveMode, kx: f64, ky: f64, p: SymbolParams) -> Self {
        let c = |re: f64, im: f64| Complex64::new(re, im);
        let r = |re: f64| Complex64::new(re, 0.0);
        let SymbolParams {
            f0: f,
            gravity: g,
            mean_depth: h,
        } = p;

        let k2 = kx * kx + ky * ky;
        let (eigenvalues, columns): ([f64; 3], [[Complex64; 3]; 3]) = match mode {
            WaveMode::NoCoriolis { rest: true } => (
                [0.0; 3],
                [[r(1.0), r(0.0), r(0.0)], [r(0.0), r(1.0), r(0.0)], [r(0.0), r(0.0), r(1.0)]],
            ),
            WaveMode::NoCoriolis { rest: false } => {
                let k = k2.sqrt();
                let w = (g * h).sqrt() * k;
                let lam = [0.0, -w, w];
                let wave = |l: f64| [r(h * k), r(l * kx / k), r(l * ky / k)];
                (lam, [[r(0.0), r(ky / k), r(-kx / k)], wave(lam[1]), wave(lam[2])])
            }
            WaveMode::ZeroMode => (
                [0.0, -f, f],
                [
                    [r(1.0), r(0.0), r(0.0)],
                    [r(0.0), c(0.0, -1.0), r(1.0)],
                    [r(0.0), c(0.0, 1.0), r(1.0)],
                ],
            ),
            WaveMode::ZonalMode => {
                let lam = omega_pair(f, g, h, k2);
                let wave = |l: f64| [r(h * ky), c(0.0, f), r(l)];
                (lam, [[c(0.0, f), r(g * ky), r(0.0)], wave(lam[1]), wave(lam[2])])
            }
            WaveMode::MeridionalMode => {
                let lam = omega_pair(f, g, h, k2);
                let wave = |l: f64| [r(h * kx), r(l), c(0.0, -f)];
                (lam, [[c(0.0, f), r(0.0), r(-g * kx)], wave(lam[1]), wave(lam[2])])
            }
            WaveMode::GenericMode => {
                let lam = omega_pair(f, g, h, k2);
                let wave = |l: f64| [r(h * k2), c(l * kx, f * ky), c(l * ky, -f * kx)];
                (lam, [[c(0.0, f), r(g * ky), r(-g * kx)], wave(lam[1]), wave(lam[2])])
            }
        };

        let mut vectors = [[r(0.0); 3]; 3];
        for (col, v) in columns.iter().enumerate() {
            for row in 0..3 {
                vectors[row][col] = v[row];
            }
        }

        Self {
            mode,
            eigenvalues,
            vectors,
        }
    }

    /// Inverse of the eigenvector matrix via cofactors.
    ///
    /// A singular matrix yields non-finite entries; check with
    /// [`is_finite_matrix`].
    pub fn inverse(&self) -> Matrix3 {
        let a = &self.vectors;
        let mut cof = [[Complex64::new(0.0, 0.0); 3]; 3];
        for (r, cof_row) in cof.iter_mut().enumerate() {
            let (r0, r1) = others(r);
            for (c, entry) in cof_row.iter_mut().enumerate() {
                let (c0, c1) = others(c);
                let minor = a[r0][c0] * a[r1][c1] - a[r0][c1] * a[r1][c0];
                *entry = if (r + c) % 2 == 0 { minor } else { -minor };
            }
        }
        let det = a[0][0] * cof[0][0] + a[0][1] * cof[0][1] + a[0][2] * cof[0][2];

        let mut inv = [[Complex64::new(0.0, 0.0); 3]; 3];
        for (r, inv_row) in inv.iter_mut().enumerate() {
            for (c, entry) in inv_row.iter_mut().enumerate() {
                *entry = cof[c][r] / det;
            }
        }
        inv
    }

    /// `V · diag(exp(−iλ dt)) · V⁻¹ · u`
    pub fn propagate(&self, inverse: &Matrix3, u: [Complex64; 3], dt: f64) -> [Complex64; 3] {
        let mut modal = mat_vec(inverse, &u);
        for (m, &lam) in modal.iter_mut().zip(&self.eigenvalues) {
            *m *= Complex64::from_polar(1.0, -lam * dt);
        }
        mat_vec(&self.vectors, &modal)
    }

    /// `A · v` for the symbol this decomposition was built from.
    pub fn apply_symbol(kx: f64, ky: f64, p: SymbolParams, v: &[Complex64; 3]) -> [Complex64; 3] {
        let f = Complex64::new(0.0, p.f0);
        [
            p.mean_depth * kx * v[1] + p.mean_depth * ky * v[2],
            p.gravity * kx * v[0] + f * v[2],
            p.gravity * ky * v[0] - f * v[1],
        ]
    }
}

fn omega_pair(f: f64, g: f64, h: f64, k2: f64) -> [f64; 3] {
    let w = (f * f + g * h * k2).sqrt();
    [0.0, -w, w]
}

#[inline]
fn others(i: usize) -> (usize, usize) {
    match i {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

fn mat_vec(m: &Matrix3, v: &[Complex64; 3]) -> [Complex64; 3] {
    let mut out = [Complex64::new(0.0, 0.0); 3];
    for (o, row) in out.iter_mut().zip(m) {
        *o = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
    }
    out
}

/// Whether every entry of a 3×3 matrix is finite.
pub fn is_finite_matrix(m: &Matrix3) -> bool {
    m.iter()
        .flatten()
        .all(|c| c.re.is_finite() && c.im.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: SymbolParams = SymbolParams {
        f0: 1e-4,
        gravity: 9.81,
        mean_depth: 1000.0,
    };

    fn check_eigenpairs(mode: WaveMode, kx: f64, ky: f64, p: SymbolParams) {
        let d = ModalDecomposition::new(mode, kx, ky, p);
        for col in 0..3 {
            let v = [d.vectors[0][col], d.vectors[1][col], d.vectors[2][col]];
            let av = ModalDecomposition::apply_symbol(kx, ky, p, &v);
            let scale = v.iter().map(|c| c.norm()).fold(0.0, f64::max).max(1.0);
            for row in 0..3 {
                let residual = (av[row] - d.eigenvalues[col] * v[row]).norm();
                assert!(
                    residual < 1e-12 * scale * (1.0 + d.eigenvalues[col].abs()),
                    "{mode:?} column {col} row {row}: residual {residual}"
                );
            }
        }
    }

    #[test]
    fn test_branch_selection() {
        assert_eq!(WaveMode::classify(0, 0, 1e-4), WaveMode::ZeroMode);
        assert_eq!(WaveMode::classify(0, 2, 1e-4), WaveMode::ZonalMode);
        assert_eq!(WaveMode::classify(-1, 0, 1e-4), WaveMode::MeridionalMode);
        assert_eq!(WaveMode::classify(3, -2, 1e-4), WaveMode::GenericMode);
        assert_eq!(
            WaveMode::classify(0, 0, 0.0),
            WaveMode::NoCoriolis { rest: true }
        );
        assert_eq!(
            WaveMode::classify(1, 0, 0.0),
            WaveMode::NoCoriolis { rest: false }
        );
    }

    #[test]
    fn test_every_branch_satisfies_eigen_relation() {
        let k = 2.0 * std::f64::consts::PI / 1000.0;
        check_eigenpairs(WaveMode::ZeroMode, 0.0, 0.0, P);
        check_eigenpairs(WaveMode::ZonalMode, 0.0, 3.0 * k, P);
        check_eigenpairs(WaveMode::MeridionalMode, -2.0 * k, 0.0, P);
        check_eigenpairs(WaveMode::GenericMode, k, -4.0 * k, P);

        let no_rot = SymbolParams { f0: 0.0, ..P };
        check_eigenpairs(WaveMode::NoCoriolis { rest: false }, 2.0 * k, k, no_rot);
        check_eigenpairs(WaveMode::NoCoriolis { rest: false }, 0.0, k, no_rot);
    }

    #[test]
    fn test_no_coriolis_frequency_from_wavenumbers() {
        let p = SymbolParams { f0: 0.0, ..P };
        let (kx, ky) = (3.0e-3, 4.0e-3);
        let d = ModalDecomposition::new(WaveMode::NoCoriolis { rest: false }, kx, ky, p);
        let expected = (9.81_f64 * 1000.0).sqrt() * 5.0e-3;
        assert!((d.eigenvalues[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_is_inverse() {
        let k = 2.0 * std::f64::consts::PI / 1000.0;
        let d = ModalDecomposition::new(WaveMode::GenericMode, 2.0 * k, k, P);
        let inv = d.inverse();
        assert!(is_finite_matrix(&inv));
        for i in 0..3 {
            for j in 0..3 {
                let mut s = Complex64::new(0.0, 0.0);
                for (k, row) in inv.iter().enumerate() {
                    s += d.vectors[i][k] * row[j];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((s - expected).norm() < 1e-10, "entry ({i}, {j}) = {s}");
            }
        }
    }

    #[test]
    fn test_zero_step_is_identity() {
        let d = ModalDecomposition::new(WaveMode::ZeroMode, 0.0, 0.0, P);
        let inv = d.inverse();
        let u = [
            Complex64::new(1.0, 0.5),
            Complex64::new(-2.0, 0.0),
            Complex64::new(0.0, 3.0),
        ];
        let out = d.propagate(&inv, u, 0.0);
        for (a, b) in out.iter().zip(&u) {
            assert!((a - b).norm() < 1e-14);
        }
    }

    #[test]
    fn test_singular_matrix_detected() {
        // Without rotation the zonal vectors vanish at k = 0.
        let p = SymbolParams { f0: 0.0, ..P };
        let d = ModalDecomposition::new(WaveMode::ZonalMode, 0.0, 0.0, p);
        assert!(!is_finite_matrix(&d.inverse()));
    }
}
