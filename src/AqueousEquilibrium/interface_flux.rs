//! Reaction rates at a reactive interface from a steady-state elemental balance.
//!
//! With `B` the reduced balance matrix (elements without H, O and charge, over all species,
//! water in column 0), `S` the stoichiometric matrix of the solid reactions active at the
//! interface and `J_T` the transport fluxes of the solutes (every species but water), the
//! rates `J_R` solve `(B S^T) J_R = B[:, 1..] J_T` in the least-squares sense. The system is
//! usually not square; when it is underdetermined the minimum-norm solution is returned.
//! Rates that are already known (implicit phases) are moved to the right-hand side and only
//! the remaining (explicit) phases are solved for.
use super::errors::AqueousEquilibriumError;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use std::collections::{HashMap, HashSet};

/// `transport_vector ∘ (x_bulk − x_interface)`, one entry per solute
pub fn transport_fluxes(
    transport_vector: &DVector<f64>,
    x_bulk: &DVector<f64>,
    x_interface: &DVector<f64>,
) -> Result<DVector<f64>, AqueousEquilibriumError> {
    if transport_vector.len() != x_bulk.len() || x_bulk.len() != x_interface.len() {
        return Err(AqueousEquilibriumError::DimensionMismatch(format!(
            "transport vector {}, bulk {} and interface {} lengths differ",
            transport_vector.len(),
            x_bulk.len(),
            x_interface.len()
        )));
    }
    Ok(transport_vector.component_mul(&(x_bulk - x_interface)))
}

/// Minimum-norm least-squares solution of `a x = b` through the SVD of `a`.
pub fn lstsq(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, AqueousEquilibriumError> {
    if a.nrows() != b.len() {
        return Err(AqueousEquilibriumError::DimensionMismatch(format!(
            "matrix with {} rows and right-hand side of length {}",
            a.nrows(),
            b.len()
        )));
    }
    if a.ncols() == 0 {
        return Ok(DVector::zeros(0));
    }
    if a.nrows() == 0 {
        return Err(AqueousEquilibriumError::DimensionMismatch(
            "empty balance: no element rows left to solve with".to_string(),
        ));
    }
    let svd = a.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    let eps = f64::EPSILON * a.nrows().max(a.ncols()) as f64 * max_sv;
    svd.solve(b, eps)
        .map_err(|e| AqueousEquilibriumError::LeastSquares(e.to_string()))
}

/// rates and transport fluxes keyed by phase / solute name
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceFluxes {
    /// mol/(m^2 s), every solid phase, 0.0 for phases not at the interface
    pub reaction_fluxes: HashMap<String, f64>,
    /// mol/(m^2 s), every solute
    pub transport_fluxes: HashMap<String, f64>,
}

/// Interface set of a system: which solid phases react at the interface, split into phases
/// whose rates are solved for (explicit) and phases whose rates are supplied (implicit).
#[derive(Debug, Clone)]
pub struct InterfaceFluxSolver {
    solid_phase_names: Vec<String>,
    explicit: Vec<usize>,
    implicit: Vec<usize>,
}

impl InterfaceFluxSolver {
    pub fn new<S: AsRef<str>>(
        solid_phase_names: &[String],
        explicit_phases: &[S],
        implicit_phases: &[S],
    ) -> Result<Self, AqueousEquilibriumError> {
        let position = |phase: &S| {
            solid_phase_names
                .iter()
                .position(|name| name == phase.as_ref())
                .ok_or_else(|| AqueousEquilibriumError::UnknownPhase(phase.as_ref().to_string()))
        };
        let explicit = explicit_phases
            .iter()
            .map(position)
            .collect::<Result<Vec<usize>, _>>()?;
        let implicit = implicit_phases
            .iter()
            .map(position)
            .collect::<Result<Vec<usize>, _>>()?;
        // a phase twice in the interface set would split its rate over identical columns
        let mut seen = HashSet::new();
        for i in explicit.iter().chain(implicit.iter()) {
            if !seen.insert(*i) {
                return Err(AqueousEquilibriumError::DuplicatePhase(
                    solid_phase_names[*i].clone(),
                ));
            }
        }
        Ok(Self {
            solid_phase_names: solid_phase_names.to_vec(),
            explicit,
            implicit,
        })
    }

    /// interface phases, explicit first
    pub fn interface_phases(&self) -> Vec<&str> {
        self.explicit
            .iter()
            .chain(self.implicit.iter())
            .map(|i| self.solid_phase_names[*i].as_str())
            .collect()
    }

    /// Rates of every solid phase in canonical order. Without `known_rates` every interface
    /// phase is solved for; with them (one per implicit phase) only the explicit ones are.
    pub fn solve(
        &self,
        balance_matrix: &DMatrix<f64>,
        solid_stoich_matrix: &DMatrix<f64>,
        transport_fluxes: &DVector<f64>,
        known_rates: Option<&DVector<f64>>,
    ) -> Result<DVector<f64>, AqueousEquilibriumError> {
        let n_species = balance_matrix.ncols();
        if solid_stoich_matrix.ncols() != n_species {
            return Err(AqueousEquilibriumError::DimensionMismatch(format!(
                "balance matrix has {} species columns, solid stoichiometric matrix {}",
                n_species,
                solid_stoich_matrix.ncols()
            )));
        }
        if solid_stoich_matrix.nrows() != self.solid_phase_names.len() {
            return Err(AqueousEquilibriumError::DimensionMismatch(format!(
                "{} solid phases but {} solid reactions",
                self.solid_phase_names.len(),
                solid_stoich_matrix.nrows()
            )));
        }
        if n_species == 0 || transport_fluxes.len() + 1 != n_species {
            return Err(AqueousEquilibriumError::DimensionMismatch(format!(
                "{} transport fluxes for {} species (water excluded)",
                transport_fluxes.len(),
                n_species.saturating_sub(1)
            )));
        }
        let solutes_balance = balance_matrix.columns(1, n_species - 1);
        let mut rhs = solutes_balance * transport_fluxes;

        let (solved, known): (Vec<usize>, DVector<f64>) = match known_rates {
            None => (
                self.explicit.iter().chain(self.implicit.iter()).copied().collect(),
                DVector::zeros(0),
            ),
            Some(rates) => {
                if rates.len() != self.implicit.len() {
                    return Err(AqueousEquilibriumError::DimensionMismatch(format!(
                        "{} known rates for {} implicit phases",
                        rates.len(),
                        self.implicit.len()
                    )));
                }
                let stoich_implicit = solid_stoich_matrix.select_rows(self.implicit.iter());
                rhs -= balance_matrix * stoich_implicit.transpose() * rates;
                (self.explicit.clone(), rates.clone())
            }
        };
        let stoich_solved = solid_stoich_matrix.select_rows(solved.iter());
        let a = balance_matrix * stoich_solved.transpose();
        let rates_solved = lstsq(&a, &rhs)?;
        debug!("interface rates solved for {} phases", solved.len());

        let mut reaction_fluxes = DVector::zeros(self.solid_phase_names.len());
        for (k, i) in solved.iter().enumerate() {
            reaction_fluxes[*i] = rates_solved[k];
        }
        if known_rates.is_some() {
            for (k, i) in self.implicit.iter().enumerate() {
                reaction_fluxes[*i] = known[k];
            }
        }
        Ok(reaction_fluxes)
    }

    /// [`InterfaceFluxSolver::solve`] with the results keyed by phase and solute names
    pub fn fluxes(
        &self,
        balance_matrix: &DMatrix<f64>,
        solid_stoich_matrix: &DMatrix<f64>,
        solutes: &[String],
        transport_fluxes: &DVector<f64>,
        known_rates: Option<&DVector<f64>>,
    ) -> Result<InterfaceFluxes, AqueousEquilibriumError> {
        if solutes.len() != transport_fluxes.len() {
            return Err(AqueousEquilibriumError::DimensionMismatch(format!(
                "{} solutes and {} transport fluxes",
                solutes.len(),
                transport_fluxes.len()
            )));
        }
        let rates = self.solve(
            balance_matrix,
            solid_stoich_matrix,
            transport_fluxes,
            known_rates,
        )?;
        let reaction_fluxes = self
            .solid_phase_names
            .iter()
            .cloned()
            .zip(rates.iter().copied())
            .collect();
        let transport_fluxes = solutes
            .iter()
            .cloned()
            .zip(transport_fluxes.iter().copied())
            .collect();
        info!("interface fluxes computed for {:?}", self.interface_phases());
        Ok(InterfaceFluxes {
            reaction_fluxes,
            transport_fluxes,
        })
    }
}
