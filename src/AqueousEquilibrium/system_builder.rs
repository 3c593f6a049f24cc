//! Assembly of everything an equilibrium solver needs for one query (seed species +
//! temperature): the aqueous network, the solid and gas reactions reachable from it, element
//! list, matrices, log K vectors and the most stable polymorphs.
//!
//! Stages:
//! 1. closure of the seeds over solutions + irreversible reactions -> species, reactions
//! 2. closure of the species over phase reactions -> solid reactions (new species dropped)
//! 3. closure of the species over gas reactions -> gas reactions (new species dropped)
//!
//! # Examples
//! ```ignore
//! let database = ReactionDatabase::default_database()?;
//! let system = AqueousSystem::from_species(&["NaHCO3", "CaCl2"], &database, 298.15)?;
//! system.print_summary();
//! ```
use super::equilibrium_constants::log_k_batch;
use super::errors::AqueousEquilibriumError;
use super::formula_parser::parse_formula;
use super::interface_flux::{InterfaceFluxSolver, InterfaceFluxes, transport_fluxes};
use super::matrix_assembler::{
    formula_matrix, reduced_balance_matrix, solid_formula_matrix, stoich_matrix,
};
use super::network_closure::{NetworkClosure, WATER};
use super::phase_stability::most_stable_phases;
use super::reaction_database::ReactionDatabase;
use super::reaction_record::Reaction;
use log::info;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeSet;

/// placeholder species representing an element in solution
pub const ELEMENT_SPECIES_MAP: &[(&str, &str)] = &[
    ("C", "HCO3-"),
    ("Ca", "Ca++"),
    ("Cl", "Cl-"),
    ("Na", "Na+"),
    ("S", "SO4--"),
    ("Ba", "Ba++"),
    ("Mg", "Mg++"),
    ("Fe", "Fe++"),
    ("K", "K+"),
    ("Sr", "Sr++"),
];

/// Placeholder species of a set of elements, sorted, with H2O first. H and O are represented
/// by water itself.
pub fn elements_to_species<S: AsRef<str>>(
    elements: &[S],
) -> Result<Vec<String>, AqueousEquilibriumError> {
    let mut species = BTreeSet::new();
    for element in elements {
        let element = element.as_ref();
        if element == "H" || element == "O" {
            continue;
        }
        let (_, tag) = ELEMENT_SPECIES_MAP
            .iter()
            .find(|(el, _)| *el == element)
            .ok_or_else(|| {
                AqueousEquilibriumError::InvalidRecord(format!(
                    "no placeholder species for element {}",
                    element
                ))
            })?;
        species.insert(tag.to_string());
    }
    let mut species: Vec<String> = species.into_iter().collect();
    species.insert(0, WATER.to_string());
    Ok(species)
}

/// elements present in a list of species, in first-seen order
pub fn species_to_elements(species: &[String]) -> Result<Vec<String>, AqueousEquilibriumError> {
    let mut elements: Vec<String> = Vec::new();
    for tag in species {
        for (element, _) in parse_formula(tag)? {
            if !elements.contains(&element) {
                elements.push(element);
            }
        }
    }
    Ok(elements)
}

/// puts H then O in front (inserting them if absent), the rest keeps its order
pub fn set_h_and_o_as_first_elements(elements: Vec<String>) -> Vec<String> {
    let mut ordered = vec!["H".to_string(), "O".to_string()];
    ordered.extend(elements.into_iter().filter(|el| el != "H" && el != "O"));
    ordered
}

fn phase_names(reactions: &[Reaction]) -> Result<Vec<String>, AqueousEquilibriumError> {
    reactions
        .iter()
        .map(|r| {
            r.phase_name.clone().ok_or_else(|| {
                AqueousEquilibriumError::InvalidRecord(format!("phase reaction without phase_name: {}", r))
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct AqueousSystem {
    /// temperature, K
    pub T: f64,
    /// discovered species, H2O first; column order of every species matrix
    pub species: Vec<String>,
    /// species without water
    pub solutes: Vec<String>,
    /// H, O first; the charge row "e" is added by the matrices
    pub elements: Vec<String>,
    pub reactions: Vec<Reaction>,
    pub solid_reactions: Vec<Reaction>,
    pub gas_reactions: Vec<Reaction>,
    /// seeds that take part in no aqueous reaction
    pub unreachable_seeds: Vec<String>,
    pub formula_matrix: DMatrix<f64>,
    pub stoich_matrix: DMatrix<f64>,
    pub solid_formula_matrix: DMatrix<f64>,
    pub solid_stoich_matrix: DMatrix<f64>,
    pub gas_stoich_matrix: DMatrix<f64>,
    /// formula matrix without H, O and charge rows
    pub reduced_balance_matrix: DMatrix<f64>,
    pub log_ks: DVector<f64>,
    pub solid_log_ks: DVector<f64>,
    pub gas_log_ks: DVector<f64>,
    pub solid_phase_names: Vec<String>,
    pub gas_phase_names: Vec<String>,
    pub stable_phases: Vec<String>,
}

impl AqueousSystem {
    pub fn from_species<S: AsRef<str>>(
        seeds: &[S],
        database: &ReactionDatabase,
        T: f64,
    ) -> Result<Self, AqueousEquilibriumError> {
        let possible_reactions = database.possible_reactions();
        let aqueous = NetworkClosure::new(&possible_reactions).expand(seeds);
        let species = aqueous.species;
        let solid_reactions =
            NetworkClosure::new(database.possible_solid_reactions()).fired_reactions(&species);
        let gas_reactions =
            NetworkClosure::new(database.possible_gas_reactions()).fired_reactions(&species);
        info!(
            "aqueous system: {} species, {} reactions, {} solid and {} gas reactions",
            species.len(),
            aqueous.reactions.len(),
            solid_reactions.len(),
            gas_reactions.len()
        );

        let elements = set_h_and_o_as_first_elements(species_to_elements(&species)?);
        let formula = formula_matrix(&species, &elements)?;
        let reduced = reduced_balance_matrix(&formula, &elements)?;
        let mut system = AqueousSystem {
            T,
            solutes: species.iter().skip(1).cloned().collect(),
            stoich_matrix: stoich_matrix(&species, &aqueous.reactions),
            solid_formula_matrix: solid_formula_matrix(&solid_reactions, &elements)?,
            solid_stoich_matrix: stoich_matrix(&species, &solid_reactions),
            gas_stoich_matrix: stoich_matrix(&species, &gas_reactions),
            solid_phase_names: phase_names(&solid_reactions)?,
            gas_phase_names: phase_names(&gas_reactions)?,
            formula_matrix: formula,
            reduced_balance_matrix: reduced,
            species,
            elements,
            reactions: aqueous.reactions,
            solid_reactions,
            gas_reactions,
            unreachable_seeds: aqueous.unreachable_seeds,
            log_ks: DVector::zeros(0),
            solid_log_ks: DVector::zeros(0),
            gas_log_ks: DVector::zeros(0),
            stable_phases: Vec::new(),
        };
        system.set_temperature(T)?;
        Ok(system)
    }

    /// system seeded with the placeholder species of `elements`
    pub fn from_elements<S: AsRef<str>>(
        elements: &[S],
        database: &ReactionDatabase,
        T: f64,
    ) -> Result<Self, AqueousEquilibriumError> {
        let seeds = elements_to_species(elements)?;
        Self::from_species(&seeds, database, T)
    }

    /// recomputes the temperature-dependent parts: log K vectors and stable phases
    pub fn set_temperature(&mut self, T: f64) -> Result<(), AqueousEquilibriumError> {
        self.T = T;
        self.log_ks = log_k_batch(&self.reactions, T);
        self.solid_log_ks = log_k_batch(&self.solid_reactions, T);
        self.gas_log_ks = log_k_batch(&self.gas_reactions, T);
        self.stable_phases = most_stable_phases(&self.solid_reactions, T)?;
        Ok(())
    }

    pub fn interface_solver<S: AsRef<str>>(
        &self,
        explicit_phases: &[S],
        implicit_phases: &[S],
    ) -> Result<InterfaceFluxSolver, AqueousEquilibriumError> {
        InterfaceFluxSolver::new(&self.solid_phase_names, explicit_phases, implicit_phases)
    }

    /// Reaction and transport fluxes at an interface with solute mole fractions `x_interface`
    /// against a bulk at `x_bulk`, both in solute order.
    pub fn interface_fluxes(
        &self,
        solver: &InterfaceFluxSolver,
        transport_vector: &DVector<f64>,
        x_bulk: &DVector<f64>,
        x_interface: &DVector<f64>,
        known_rates: Option<&DVector<f64>>,
    ) -> Result<InterfaceFluxes, AqueousEquilibriumError> {
        let fluxes = transport_fluxes(transport_vector, x_bulk, x_interface)?;
        solver.fluxes(
            &self.reduced_balance_matrix,
            &self.solid_stoich_matrix,
            &self.solutes,
            &fluxes,
            known_rates,
        )
    }

    pub fn print_summary(&self) {
        use prettytable::{Table, row};
        println!("\n aqueous system at T = {} K", self.T);
        let mut species_table = Table::new();
        species_table.add_row(row!["#", "Species"]);
        for (i, tag) in self.species.iter().enumerate() {
            species_table.add_row(row![i, tag]);
        }
        species_table.printstd();

        let mut reaction_table = Table::new();
        reaction_table.add_row(row!["Reaction", "type", "log K"]);
        for (reaction, lk) in self.reactions.iter().zip(self.log_ks.iter()) {
            reaction_table.add_row(row![
                reaction.to_string(),
                reaction.reaction_type.to_string(),
                format!("{:.4}", lk)
            ]);
        }
        reaction_table.printstd();

        let mut phase_table = Table::new();
        phase_table.add_row(row!["Phase", "Reaction", "log K", "stable"]);
        for ((name, reaction), lk) in self
            .solid_phase_names
            .iter()
            .zip(self.solid_reactions.iter())
            .zip(self.solid_log_ks.iter())
        {
            let stable = if self.stable_phases.contains(name) { "*" } else { "" };
            phase_table.add_row(row![name, reaction.to_string(), format!("{:.4}", lk), stable]);
        }
        for ((name, reaction), lk) in self
            .gas_phase_names
            .iter()
            .zip(self.gas_reactions.iter())
            .zip(self.gas_log_ks.iter())
        {
            phase_table.add_row(row![name, reaction.to_string(), format!("{:.4}", lk), ""]);
        }
        phase_table.printstd();
        if !self.unreachable_seeds.is_empty() {
            println!("species without reactions: {:?}", self.unreachable_seeds);
        }
    }
}
