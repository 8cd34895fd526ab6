//! Built-in models.
//!
//! Kernels use `k` for the wavenumber, `mu` (or `mu1`, `mu2`) for direction
//! cosines and `sig_g` for the galaxy velocity-dispersion damping scale.
//! Velocity kernels carry the `100 / k` factor of `v = 100 f aH θ / k` in
//! units of `h`.

use flipsym_core::Expr;
use flipsym_decompose::{Geometry, ModelSpec, TermSpec, TypeSpec};

fn k() -> Expr {
    Expr::symbol("k")
}

fn mu() -> Expr {
    Expr::symbol("mu")
}

fn mu1() -> Expr {
    Expr::symbol("mu1")
}

fn mu2() -> Expr {
    Expr::symbol("mu2")
}

fn sig_g() -> Expr {
    Expr::symbol("sig_g")
}

fn ty(name: &str, terms: Vec<TermSpec>) -> TypeSpec {
    TypeSpec {
        name: name.to_string(),
        terms,
    }
}

/// `10⁴ mu1 mu2 / k²`, the wide-angle velocity auto-correlation kernel.
fn wide_velocity() -> Expr {
    Expr::integer(10000) * mu1() * mu2() / k().powi(2)
}

fn factorial(n: u32) -> i64 {
    (1..=i64::from(n)).product()
}

/// Adams & Blake (2020): plane-parallel with Gaussian damping.
#[must_use]
pub fn adamsblake20() -> ModelSpec {
    let damping = (-(k() * sig_g() * mu()).powi(2)).exp();
    let half_damping = (Expr::rational(-1, 2) * (k() * sig_g() * mu()).powi(2)).exp();
    let pp = TermSpec::plane_parallel;
    ModelSpec {
        name: "adamsblake20".to_string(),
        geometry: Geometry::PlaneParallel,
        additional_parameters: vec!["sig_g".into()],
        multi_index_model: false,
        types: vec![
            ty(
                "gg",
                vec![
                    pp("0", damping.clone(), 4),
                    pp("1", Expr::integer(2) * mu().powi(2) * damping.clone(), 4),
                    pp("2", mu().powi(4) * damping, 4),
                ],
            ),
            ty(
                "gv",
                vec![
                    pp("0", Expr::integer(100) * mu() / k() * half_damping.clone(), 3),
                    pp("1", Expr::integer(100) * mu().powi(3) / k() * half_damping, 3),
                ],
            ),
            ty(
                "vv",
                vec![pp("0", Expr::integer(10000) * mu().powi(2) / k().powi(2), 2)],
            ),
        ],
    }
}

/// Carreres et al. (2023): wide-angle velocity auto-correlation only.
#[must_use]
pub fn carreres23() -> ModelSpec {
    ModelSpec {
        name: "carreres23".to_string(),
        geometry: Geometry::WideAngle,
        additional_parameters: vec![],
        multi_index_model: false,
        types: vec![ty("vv", vec![TermSpec::wide_angle("0", wide_velocity(), 2, 1, 1)])],
    }
}

/// Ravoux, Carreres et al.: wide-angle with Gaussian damping.
#[must_use]
pub fn ravouxcarreres() -> ModelSpec {
    let mu_sq = mu1().powi(2) + mu2().powi(2);
    let damping = (Expr::rational(-1, 2) * (k() * sig_g()).powi(2) * mu_sq.clone()).exp();
    let gv_damping = (Expr::rational(-1, 2) * (k() * sig_g() * mu1()).powi(2)).exp();
    let wa = TermSpec::wide_angle;
    ModelSpec {
        name: "ravouxcarreres".to_string(),
        geometry: Geometry::WideAngle,
        additional_parameters: vec!["sig_g".into()],
        multi_index_model: false,
        types: vec![
            ty(
                "gg",
                vec![
                    wa("0", damping.clone(), 6, 4, 4),
                    wa("1", mu_sq * damping.clone(), 6, 4, 4),
                    wa("2", mu1().powi(2) * mu2().powi(2) * damping, 6, 4, 4),
                ],
            ),
            ty(
                "gv",
                vec![
                    wa("0", Expr::integer(100) * mu2() / k() * gv_damping.clone(), 5, 4, 1),
                    wa(
                        "1",
                        Expr::integer(100) * mu2() * mu1().powi(2) / k() * gv_damping,
                        5,
                        4,
                        1,
                    ),
                ],
            ),
            ty("vv", vec![wa("0", wide_velocity(), 2, 1, 1)]),
        ],
    }
}

/// Highest power of `k² mu1²` and `k² mu2²` kept in the expanded damping.
const LAI22_GG_ORDER: u32 = 3;
/// Highest power of `k² mu1²` kept in the expanded velocity damping.
const LAI22_GV_ORDER: u32 = 3;

/// Order-`m` part of `exp(-k²(mu1² + mu2²)/2)` expanded in both cosines:
/// `Σ_{p+q=m} (-1)^m / (2^m p! q!) k^{2m} mu1^{2p} mu2^{2q}`.
fn lai22_gg_damping(m: u32) -> Expr {
    let terms = (0..=LAI22_GG_ORDER)
        .flat_map(|p| (0..=LAI22_GG_ORDER).map(move |q| (p, q)))
        .filter(|&(p, q)| p + q == m)
        .map(|(p, q)| {
            let sign = if m % 2 == 0 { 1 } else { -1 };
            let denom = (1_i64 << m) * factorial(p) * factorial(q);
            Expr::rational(sign, denom)
                * k().powi(2 * i64::from(m))
                * mu1().powi(2 * i64::from(p))
                * mu2().powi(2 * i64::from(q))
        });
    Expr::add(terms)
}

/// Lai et al. (2022): wide-angle with the damping Taylor-expanded, one term
/// per `{i}_{m}` pair.
#[must_use]
pub fn lai22() -> ModelSpec {
    let wa = TermSpec::wide_angle;
    let gg_order = 2 * LAI22_GG_ORDER;

    let gg_shapes = [
        Expr::one(),
        mu1().powi(2) + mu2().powi(2),
        mu1().powi(2) * mu2().powi(2),
    ];
    let mut gg = Vec::new();
    for (i, shape) in (0u32..).zip(&gg_shapes) {
        for m in 0..=gg_order {
            let kernel = lai22_gg_damping(m) * shape.clone();
            let index = format!("{i}_{m}");
            let term = match i {
                0 => wa(&index, kernel, 2 * m, (2 * m).min(gg_order), (2 * m).min(gg_order)),
                1 => {
                    let sub = (2 * (m + 1)).min(gg_order + 2);
                    wa(&index, kernel, 2 * (m + 1), sub, sub)
                }
                _ => {
                    let sub = (2 * (m + 1)).min(gg_order + 2);
                    wa(&index, kernel, 2 * (m + 2), sub, sub)
                }
            };
            gg.push(term);
        }
    }

    let gv_shapes = [Expr::one(), mu1().powi(2)];
    let mut gv = Vec::new();
    for (i, shape) in (0u32..).zip(&gv_shapes) {
        for m in 0..=LAI22_GV_ORDER {
            let sign = if m % 2 == 0 { 1 } else { -1 };
            let kernel = Expr::integer(100)
                * Expr::rational(sign, (1_i64 << m) * factorial(m))
                * k().powi(2 * i64::from(m) - 1)
                * mu1().powi(2 * i64::from(m))
                * mu2()
                * shape.clone();
            let index = format!("{i}_{m}");
            gv.push(if i == 0 {
                wa(&index, kernel, 2 * m + 1, 2 * m, 1)
            } else {
                wa(&index, kernel, 2 * m + 3, 2 * m + 2, 1)
            });
        }
    }

    ModelSpec {
        name: "lai22".to_string(),
        geometry: Geometry::WideAngle,
        additional_parameters: vec![],
        multi_index_model: true,
        types: vec![
            ty("gg", gg),
            ty("gv", gv),
            ty("vv", vec![wa("0_0", wide_velocity(), 2, 1, 1)]),
        ],
    }
}
