//! Temperature dependence of log10 equilibrium constants.
//!
//! Two models are supported and the choice is made once, when a reaction record is loaded:
//! the analytical polynomial `logK = a + bT + c/T + d log10(T) + e/T^2 + fT^2` and the
//! Van't Hoff extrapolation from 25 °C. Records with neither carry no data and give 0.0.
//! ATTENTION! all temperatures are absolute temperatures in Kelvin.
use super::reaction_record::Reaction;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use enum_dispatch::enum_dispatch;
use nalgebra::DVector;

pub const R: f64 = 8.314;
/// reference temperature (25 °C) of log_K25
pub const T_REF: f64 = 298.15;
pub const N_LOGK_COEFS: usize = 6;

#[enum_dispatch]
pub trait LogKCalculator {
    /// log10 K at temperature T
    fn log_k(&self, T: f64) -> f64;
    /// symbolic log10 K as a function of variable "T"
    fn log_k_sym(&self) -> Expr;
}

/// analytical expression with exactly six coefficients for the basis [1, T, 1/T, log10(T), 1/T^2, T^2]
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialLogK {
    pub coefs: [f64; N_LOGK_COEFS],
}

impl PolynomialLogK {
    /// pads shorter lists with trailing zeros; None if the list is longer than six entries
    pub fn from_slice(coefs: &[f64]) -> Option<Self> {
        if coefs.len() > N_LOGK_COEFS {
            return None;
        }
        let mut padded = [0.0; N_LOGK_COEFS];
        padded[..coefs.len()].copy_from_slice(coefs);
        Some(Self { coefs: padded })
    }
}

impl LogKCalculator for PolynomialLogK {
    fn log_k(&self, T: f64) -> f64 {
        let basis = [1.0, T, 1.0 / T, T.log10(), 1.0 / T.powi(2), T.powi(2)];
        self.coefs.iter().zip(basis.iter()).map(|(c, f)| c * f).sum()
    }
    fn log_k_sym(&self) -> Expr {
        let t = Expr::Var("T".to_owned());
        let [a, b, c, d, e, f] = self.coefs.map(Expr::Const);
        a + b * t.clone()
            + c / t.clone()
            + d * t.clone().ln() / Expr::Const(std::f64::consts::LN_10)
            + e / t.clone().pow(Expr::Const(2.0))
            + f * t.pow(Expr::Const(2.0))
    }
}

/// Van't Hoff extrapolation from log_K25 with reaction enthalpy deltah
#[derive(Debug, Clone, PartialEq)]
pub struct VantHoffLogK {
    pub log_k25: f64,
    pub deltah: f64,
}

impl LogKCalculator for VantHoffLogK {
    fn log_k(&self, T: f64) -> f64 {
        self.log_k25 - self.deltah / (2.303 * R) * (1.0 / T - 1.0 / T_REF)
    }
    fn log_k_sym(&self) -> Expr {
        let t = Expr::Var("T".to_owned());
        Expr::Const(self.log_k25)
            - Expr::Const(self.deltah / (2.303 * R))
                * (Expr::Const(1.0) / t - Expr::Const(1.0 / T_REF))
    }
}

/// no usable thermodynamic data: log K is taken as 0.0
#[derive(Debug, Clone, PartialEq)]
pub struct NoLogKData;

impl LogKCalculator for NoLogKData {
    fn log_k(&self, _T: f64) -> f64 {
        0.0
    }
    fn log_k_sym(&self) -> Expr {
        Expr::Const(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(LogKCalculator)]
pub enum LogKModel {
    Polynomial(PolynomialLogK),
    VantHoff(VantHoffLogK),
    Unavailable(NoLogKData),
}

impl LogKModel {
    /// Picks the model from the fields of a record: the coefficient list wins over log_K25,
    /// deltah defaults to 0.0. Returns None for a coefficient list longer than six entries.
    pub fn from_fields(
        log_k_coefs: Option<&[f64]>,
        log_k25: Option<f64>,
        deltah: Option<f64>,
    ) -> Option<Self> {
        match (log_k_coefs, log_k25) {
            (Some(coefs), _) => PolynomialLogK::from_slice(coefs).map(LogKModel::Polynomial),
            (None, Some(log_k25)) => Some(LogKModel::VantHoff(VantHoffLogK {
                log_k25,
                deltah: deltah.unwrap_or(0.0),
            })),
            (None, None) => Some(LogKModel::Unavailable(NoLogKData)),
        }
    }
}

pub fn log_k(reaction: &Reaction, T: f64) -> f64 {
    reaction.log_k_model.log_k(T)
}

/// log K of every reaction, in input order
pub fn log_k_batch(reactions: &[Reaction], T: f64) -> DVector<f64> {
    DVector::from_iterator(reactions.len(), reactions.iter().map(|r| log_k(r, T)))
}

pub fn log_k_sym(reaction: &Reaction) -> Expr {
    reaction.log_k_model.log_k_sym()
}

/// log K on n points from T0 to Tend (Tend excluded)
pub fn log_k_for_T_range(reaction: &Reaction, T0: f64, Tend: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| T0 + i as f64 * (Tend - T0) / n as f64)
        .map(|Ti| log_k(reaction, Ti))
        .collect()
}
