//! Selection of the thermodynamically favored polymorph of every solid formula.
use super::equilibrium_constants::log_k;
use super::errors::AqueousEquilibriumError;
use super::reaction_record::Reaction;
use log::{info, warn};

/// Groups phase reactions by base formula and keeps, per formula, the phase with the lowest
/// log K at temperature T (least soluble). Strict comparison: on an exact tie the earlier
/// phase is kept and the tie is logged. Phase names are returned in first-seen formula order.
pub fn most_stable_phases(
    solid_reactions: &[Reaction],
    T: f64,
) -> Result<Vec<String>, AqueousEquilibriumError> {
    // (formula, phase_name, log K) of the current best phase of each group
    let mut groups: Vec<(String, String, f64)> = Vec::new();
    for reaction in solid_reactions {
        let (Some(formula), Some(phase_name)) =
            (reaction.solid_formula(true), reaction.phase_name.as_ref())
        else {
            return Err(AqueousEquilibriumError::InvalidRecord(format!(
                "phase reaction without a phase name: {}",
                reaction
            )));
        };
        let value = log_k(reaction, T);
        match groups.iter_mut().find(|(f, _, _)| *f == formula) {
            Some((_, best_phase, best_value)) => {
                if value < *best_value {
                    *best_phase = phase_name.clone();
                    *best_value = value;
                } else if value == *best_value {
                    warn!(
                        "phases {} and {} of {} have equal log K = {} at T = {}, keeping {}",
                        best_phase, phase_name, formula, value, T, best_phase
                    );
                }
            }
            None => groups.push((formula, phase_name.clone(), value)),
        }
    }
    info!(
        "{} stable phases selected out of {} phase reactions at T = {}",
        groups.len(),
        solid_reactions.len(),
        T
    );
    Ok(groups.into_iter().map(|(_, phase, _)| phase).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn solid(tag: &str, phase: &str, log_k25: f64) -> Reaction {
        let mut record = serde_json::Map::new();
        record.insert(format!("{}__{}", tag, phase), json!(-1.0));
        record.insert("Ca++".to_string(), json!(1.0));
        record.insert("CO3--".to_string(), json!(1.0));
        record.insert("phase_name".to_string(), json!(phase));
        record.insert("type".to_string(), json!("rev"));
        record.insert("log_K25".to_string(), json!(log_k25));
        Reaction::try_from(record).unwrap()
    }

    #[test]
    fn test_lowest_log_k_wins() {
        let solids = vec![
            solid("CaCO3(s)", "Aragonite", -8.22),
            solid("CaCO3(s)", "Calcite", -8.48),
        ];
        let phases = most_stable_phases(&solids, 298.15).unwrap();
        assert_eq!(phases, vec!["Calcite".to_string()]);
    }

    #[test]
    fn test_one_phase_per_formula_in_first_seen_order() {
        let solids = vec![
            solid("CaCO3(s)", "Calcite", -8.48),
            solid("MgCO3(s)", "Magnesite", -7.46),
            solid("CaCO3(s)", "Vaterite", -7.913),
            solid("MgCO3(s)", "Nesquehonite", -5.62),
        ];
        let phases = most_stable_phases(&solids, 298.15).unwrap();
        assert_eq!(phases, vec!["Calcite".to_string(), "Magnesite".to_string()]);
    }

    #[test]
    fn test_exact_tie_keeps_first_seen() {
        let solids = vec![
            solid("CaCO3(s)", "Aragonite", -8.3),
            solid("CaCO3(s)", "Calcite", -8.3),
        ];
        let phases = most_stable_phases(&solids, 298.15).unwrap();
        assert_eq!(phases, vec!["Aragonite".to_string()]);
    }

    #[test]
    fn test_missing_phase_name_is_rejected() {
        let reaction: Reaction = serde_json::from_value(
            json!({"CaCO3(s)": -1.0, "Ca++": 1.0, "CO3--": 1.0, "type": "rev", "log_K25": -8.48}),
        )
        .unwrap();
        assert!(most_stable_phases(&[reaction], 298.15).is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(most_stable_phases(&[], 298.15).unwrap().is_empty());
    }
}
