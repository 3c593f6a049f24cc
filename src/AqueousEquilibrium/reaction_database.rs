//! Read-only reaction database: aqueous reversible reactions, irreversible (dissolution)
//! reactions, solid phase reactions and gas-aqueous equilibria, plus an opaque species table.
//! A database is an explicit value handed to every closure/assembly call; nothing here is
//! process-wide.
use super::errors::AqueousEquilibriumError;
use super::reaction_record::{Reaction, ReactionType};
use log::{info, warn};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_DATABASE: &str = include_str!("data/default_database.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionDatabase {
    #[serde(default)]
    pub solutions: Vec<Reaction>,
    #[serde(default)]
    pub irreversible: Vec<Reaction>,
    #[serde(default)]
    pub phases: Vec<Reaction>,
    #[serde(default)]
    pub gases: Vec<Reaction>,
    /// species tag -> free-form metadata
    #[serde(default)]
    pub species: Map<String, Value>,
}

impl ReactionDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// built-in carbonate/sulfate/chloride database with the CaCO3 polymorphs and common gases
    pub fn default_database() -> Result<Self, AqueousEquilibriumError> {
        Self::from_json_str(DEFAULT_DATABASE)
    }

    pub fn from_json_str(document: &str) -> Result<Self, AqueousEquilibriumError> {
        let database: ReactionDatabase = serde_json::from_str(document)?;
        database.validate()?;
        Ok(database)
    }

    /// Checks the collection-level invariants records cannot check alone: phase and gas
    /// reactions carry a phase name, irreversible reactions are typed "irrev".
    pub fn validate(&self) -> Result<(), AqueousEquilibriumError> {
        for reaction in self.phases.iter().chain(self.gases.iter()) {
            if reaction.phase_name.is_none() {
                return Err(AqueousEquilibriumError::InvalidRecord(format!(
                    "phase reaction without phase_name: {}",
                    reaction
                )));
            }
        }
        for reaction in &self.irreversible {
            if reaction.reaction_type != ReactionType::Irrev {
                warn!(
                    "reaction {} is listed as irreversible but typed {}",
                    reaction, reaction.reaction_type
                );
            }
        }
        for reaction in &self.gases {
            if reaction.critical_constants.is_none() {
                warn!("gas reaction {} has no critical constants", reaction);
            }
        }
        Ok(())
    }

    /// candidates of the aqueous closure: solutions followed by irreversible reactions
    pub fn possible_reactions(&self) -> Vec<Reaction> {
        self.solutions
            .iter()
            .chain(self.irreversible.iter())
            .cloned()
            .collect()
    }

    pub fn possible_solid_reactions(&self) -> &[Reaction] {
        &self.phases
    }

    pub fn possible_gas_reactions(&self) -> &[Reaction] {
        &self.gases
    }

    pub fn species_info(&self, tag: &str) -> Option<&Value> {
        self.species.get(tag)
    }

    pub fn len(&self) -> usize {
        self.solutions.len() + self.irreversible.len() + self.phases.len() + self.gases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// appends every reaction of `other`, collection by collection
    pub fn extend(&mut self, other: ReactionDatabase) {
        self.solutions.extend(other.solutions);
        self.irreversible.extend(other.irreversible);
        self.phases.extend(other.phases);
        self.gases.extend(other.gases);
        self.species.extend(other.species);
        info!("database extended to {} reactions", self.len());
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("collection"),
            Cell::new("reaction"),
            Cell::new("phase"),
        ]));
        let collections = [
            ("solutions", &self.solutions),
            ("irreversible", &self.irreversible),
            ("phases", &self.phases),
            ("gases", &self.gases),
        ];
        for (name, reactions) in collections {
            for reaction in reactions {
                table.add_row(Row::new(vec![
                    Cell::new(name),
                    Cell::new(&reaction.to_string()),
                    Cell::new(reaction.phase_name.as_deref().unwrap_or("")),
                ]));
            }
        }
        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AqueousEquilibrium::equilibrium_constants::{LogKModel, log_k};
    use approx::assert_relative_eq;

    #[test]
    fn test_default_database_loads() {
        let db = ReactionDatabase::default_database().unwrap();
        assert!(!db.solutions.is_empty());
        assert_eq!(db.irreversible.len(), 4);
        assert_eq!(db.gases.len(), 8);
        let phases: Vec<&str> = db
            .phases
            .iter()
            .filter_map(|r| r.phase_name.as_deref())
            .collect();
        for polymorph in ["Calcite", "Aragonite", "Vaterite"] {
            assert!(phases.contains(&polymorph));
        }
        assert_eq!(db.species_info("Ca++").unwrap()["charge"], 2);
    }

    #[test]
    fn test_default_log_k_values_at_25_celsius() {
        let db = ReactionDatabase::default_database().unwrap();
        let T = 298.15;
        // water, bicarbonate and CO2 use the analytical expression
        assert_relative_eq!(log_k(&db.solutions[0], T), -14.0, epsilon = 0.01);
        assert_relative_eq!(log_k(&db.solutions[1], T), -10.33, epsilon = 0.01);
        assert_relative_eq!(log_k(&db.solutions[2], T), -6.35, epsilon = 0.01);
        // placeholder coefficient list falls back to Van't Hoff
        assert!(matches!(db.solutions[3].log_k_model, LogKModel::VantHoff(_)));
        assert_eq!(log_k(&db.solutions[3], T), -1.988);
        let calcite = &db.phases[0];
        assert_relative_eq!(log_k(calcite, T), -8.48, epsilon = 0.01);
    }

    #[test]
    fn test_possible_reactions_order() {
        let db = ReactionDatabase::default_database().unwrap();
        let possible = db.possible_reactions();
        assert_eq!(possible.len(), db.solutions.len() + db.irreversible.len());
        assert_eq!(possible[0], db.solutions[0]);
        assert_eq!(possible[db.solutions.len()], db.irreversible[0]);
        assert_eq!(db.possible_solid_reactions().len(), db.phases.len());
        assert!(
            db.possible_gas_reactions()
                .iter()
                .all(|r| r.critical_constants.is_some())
        );
    }

    #[test]
    fn test_phase_without_name_is_rejected() {
        let document = r#"{"phases": [{"CaCO3(s)": -1.0, "Ca++": 1.0, "CO3--": 1.0, "type": "rev"}]}"#;
        assert!(matches!(
            ReactionDatabase::from_json_str(document),
            Err(AqueousEquilibriumError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_bad_record_is_a_json_error() {
        let document = r#"{"solutions": [{"H2O": -1.0, "H+": 1.0, "OH-": 1.0}]}"#;
        assert!(matches!(
            ReactionDatabase::from_json_str(document),
            Err(AqueousEquilibriumError::Json(_))
        ));
    }

    #[test]
    fn test_extend() {
        let mut db = ReactionDatabase::new();
        assert!(db.is_empty());
        db.extend(ReactionDatabase::default_database().unwrap());
        let n = db.len();
        db.extend(ReactionDatabase::from_json_str(r#"{"solutions": []}"#).unwrap());
        assert_eq!(db.len(), n);
    }
}
