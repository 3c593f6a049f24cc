//! Formula, stoichiometric and solid-formula matrices of a reaction network.
//!
//! Row/column conventions:
//! - formula matrix: (elements + "e") x species, the last row is the net charge of each species
//! - stoichiometric matrix: reactions x species, 0.0 where a species does not take part
//! - solid-formula matrix: (elements + "e") x solid reactions, one column per represented solid
use super::errors::AqueousEquilibriumError;
use super::formula_parser::{ELECTRON, charge, parse_formula};
use super::reaction_record::Reaction;
use super::species_registry::column_index;
use nalgebra::DMatrix;

/// element rows of a matrix: the given elements without "e", then "e"
pub fn with_electron(elements: &[String]) -> Vec<String> {
    let mut rows: Vec<String> = elements
        .iter()
        .filter(|el| el.as_str() != ELECTRON)
        .cloned()
        .collect();
    rows.push(ELECTRON.to_string());
    rows
}

// column of a formula matrix for one species tag
fn composition_column(tag: &str, rows: &[String]) -> Result<Vec<f64>, AqueousEquilibriumError> {
    let composition = parse_formula(tag)?;
    let column = rows
        .iter()
        .map(|el| {
            if el == ELECTRON {
                charge(tag) as f64
            } else {
                composition
                    .iter()
                    .filter(|(symbol, _)| symbol == el)
                    .map(|(_, coef)| *coef as f64)
                    .sum()
            }
        })
        .collect();
    Ok(column)
}

pub fn formula_matrix(
    species: &[String],
    elements: &[String],
) -> Result<DMatrix<f64>, AqueousEquilibriumError> {
    let rows = with_electron(elements);
    let mut matrix = DMatrix::zeros(rows.len(), species.len());
    for (j, tag) in species.iter().enumerate() {
        let column = composition_column(tag, &rows)?;
        for (i, value) in column.into_iter().enumerate() {
            matrix[(i, j)] = value;
        }
    }
    Ok(matrix)
}

/// Participants missing from `species` (e.g. the solid of a phase reaction) have no column
/// and are left out.
pub fn stoich_matrix(species: &[String], reactions: &[Reaction]) -> DMatrix<f64> {
    let index = column_index(species);
    let mut matrix = DMatrix::zeros(reactions.len(), species.len());
    for (i, reaction) in reactions.iter().enumerate() {
        for (tag, coef) in &reaction.participants {
            if let Some(j) = index.get(tag.as_str()) {
                matrix[(i, *j)] = *coef;
            }
        }
    }
    matrix
}

pub fn solid_formula_matrix(
    solid_reactions: &[Reaction],
    elements: &[String],
) -> Result<DMatrix<f64>, AqueousEquilibriumError> {
    let rows = with_electron(elements);
    let mut matrix = DMatrix::zeros(rows.len(), solid_reactions.len());
    for (j, reaction) in solid_reactions.iter().enumerate() {
        let formula = reaction.solid_formula(false).ok_or_else(|| {
            AqueousEquilibriumError::InvalidRecord(format!(
                "phase reaction without a solid formula: {}",
                reaction
            ))
        })?;
        let column = composition_column(&formula, &rows)?;
        for (i, value) in column.into_iter().enumerate() {
            matrix[(i, j)] = value;
        }
    }
    Ok(matrix)
}

/// Formula matrix without the water-related H and O rows and without the charge row: the
/// elemental balance used at a reactive interface. `elements` are the row labels the formula
/// matrix was built with.
pub fn reduced_balance_matrix(
    formula_matrix: &DMatrix<f64>,
    elements: &[String],
) -> Result<DMatrix<f64>, AqueousEquilibriumError> {
    let rows = with_electron(elements);
    if rows.len() != formula_matrix.nrows() {
        return Err(AqueousEquilibriumError::DimensionMismatch(format!(
            "formula matrix has {} rows, {} element rows expected",
            formula_matrix.nrows(),
            rows.len()
        )));
    }
    let kept: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, el)| !matches!(el.as_str(), "H" | "O" | ELECTRON))
        .map(|(i, _)| i)
        .collect();
    Ok(formula_matrix.select_rows(kept.iter()))
}
