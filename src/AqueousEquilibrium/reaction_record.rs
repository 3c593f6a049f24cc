//! Structured reaction record.
//!
//! Database entries come as flat JSON objects where participant tags and metadata share one
//! namespace, e.g. `{"CaCO3(s)": -1.0, "Ca++": 1.0, "CO3--": 1.0, "phase_name": "Calcite",
//! "type": "rev", "log_K25": -8.48}`. The reserved metadata keys are separated out once, at
//! load time, into an ordered participant list plus a fixed metadata block.
use super::equilibrium_constants::{LogKModel, N_LOGK_COEFS};
use super::errors::AqueousEquilibriumError;
use super::formula_parser::PHASE_SEPARATOR;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// metadata keys of a database record, never participant tags
pub const RESERVED_KEYS: &[&str] = &[
    "type",
    "id_db",
    "log_K25",
    "log_K_coefs",
    "deltah",
    "phase_name",
    "T_c",
    "P_c",
    "Omega",
];
pub const SOLID_MARK: &str = "(s)";
pub const GAS_MARK: &str = "(g)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    /// reversible
    Rev,
    /// irreversible: only fires from reactants to products
    Irrev,
    /// redox half reaction, excluded from network closure
    Electronic,
}

impl FromStr for ReactionType {
    type Err = AqueousEquilibriumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rev" => Ok(ReactionType::Rev),
            "irrev" => Ok(ReactionType::Irrev),
            "electronic" => Ok(ReactionType::Electronic),
            _ => Err(AqueousEquilibriumError::InvalidRecord(format!(
                "unknown reaction type: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReactionType::Rev => "rev",
            ReactionType::Irrev => "irrev",
            ReactionType::Electronic => "electronic",
        };
        write!(f, "{}", s)
    }
}

/// critical constants carried by gas records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct CriticalConstants {
    pub T_c: f64,
    pub P_c: f64,
    pub Omega: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Reaction {
    /// (tag, signed coefficient) in record order; positive = product, negative = reactant
    pub participants: Vec<(String, f64)>,
    pub reaction_type: ReactionType,
    /// name of the solid/gas phase for phase reactions
    pub phase_name: Option<String>,
    pub id_db: Option<i64>,
    pub critical_constants: Option<CriticalConstants>,
    /// log_K25 and deltah as read, kept even when log_K_coefs drives the model
    pub log_k25: Option<f64>,
    pub deltah: Option<f64>,
    pub log_k_model: LogKModel,
}

impl Reaction {
    pub fn coefficient(&self, tag: &str) -> Option<f64> {
        self.participants
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, coef)| *coef)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.participants.iter().any(|(t, _)| t == tag)
    }

    pub fn products(&self) -> Vec<&str> {
        self.participants
            .iter()
            .filter(|(_, coef)| *coef > 0.0)
            .map(|(t, _)| t.as_str())
            .collect()
    }

    pub fn reactants(&self) -> Vec<&str> {
        self.participants
            .iter()
            .filter(|(_, coef)| *coef < 0.0)
            .map(|(t, _)| t.as_str())
            .collect()
    }

    pub fn is_electronic(&self) -> bool {
        self.reaction_type == ReactionType::Electronic
    }

    /// Tag under which a participant of this reaction enters a network: solids of a phase
    /// reaction get the `__<phase_name>` suffix, everything else keeps its tag. Already
    /// suffixed tags are returned as they are.
    pub fn polymorph_tag(&self, tag: &str) -> String {
        match &self.phase_name {
            Some(phase) if tag.contains(SOLID_MARK) && !tag.contains(PHASE_SEPARATOR) => {
                format!("{}{}{}", tag, PHASE_SEPARATOR, phase)
            }
            _ => tag.to_string(),
        }
    }

    /// renames one participant; no-op if `from` is absent
    pub fn relabel(&mut self, from: &str, to: &str) {
        for (tag, _) in self.participants.iter_mut() {
            if tag == from {
                *tag = to.to_string();
            }
        }
    }

    /// Chemical formula represented by a phase reaction: the participant whose tag ends with
    /// the phase name (or, failing that, the first solid/gas participant), cut at the first
    /// underscore. With `drop_phase_mark` a trailing "(s)"/"(g)" is removed too.
    pub fn solid_formula(&self, drop_phase_mark: bool) -> Option<String> {
        let phase_name = self.phase_name.as_ref()?;
        let key = self
            .participants
            .iter()
            .map(|(t, _)| t)
            .find(|t| t.ends_with(phase_name.as_str()))
            .or_else(|| {
                self.participants
                    .iter()
                    .map(|(t, _)| t)
                    .find(|t| t.contains(SOLID_MARK) || t.contains(GAS_MARK))
            })?;
        let mut formula = match key.find('_') {
            Some(idx) => key[..idx].to_string(),
            None => key.clone(),
        };
        if drop_phase_mark {
            for mark in [SOLID_MARK, GAS_MARK] {
                if let Some(stripped) = formula.strip_suffix(mark) {
                    formula = stripped.to_string();
                }
            }
        }
        Some(formula)
    }
}

fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

impl TryFrom<Map<String, Value>> for Reaction {
    type Error = AqueousEquilibriumError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let reaction_type = match map.get("type") {
            Some(Value::String(s)) => s.parse::<ReactionType>()?,
            _ => {
                return Err(AqueousEquilibriumError::InvalidRecord(
                    "missing 'type' field".to_string(),
                ));
            }
        };
        // empty strings and nulls are placeholders for absent data
        let phase_name = match map.get("phase_name") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        let log_k_coefs = match map.get("log_K_coefs") {
            Some(Value::Array(values)) => Some(
                values
                    .iter()
                    .map(|v| {
                        v.as_f64().ok_or_else(|| {
                            AqueousEquilibriumError::InvalidRecord(format!(
                                "non-numeric entry in log_K_coefs: {}",
                                v
                            ))
                        })
                    })
                    .collect::<Result<Vec<f64>, _>>()?,
            ),
            _ => None,
        };
        let log_k25 = number_field(&map, "log_K25");
        let deltah = number_field(&map, "deltah");
        let log_k_model = LogKModel::from_fields(log_k_coefs.as_deref(), log_k25, deltah)
        .ok_or_else(|| {
            AqueousEquilibriumError::InvalidRecord(format!(
                "log_K_coefs has more than {} entries",
                N_LOGK_COEFS
            ))
        })?;
        let critical_constants = match (
            number_field(&map, "T_c"),
            number_field(&map, "P_c"),
            number_field(&map, "Omega"),
        ) {
            (Some(T_c), Some(P_c), Some(Omega)) => Some(CriticalConstants { T_c, P_c, Omega }),
            _ => None,
        };
        let id_db = map.get("id_db").and_then(Value::as_i64);

        let mut participants = Vec::new();
        for (key, value) in map.iter() {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let coef = value.as_f64().ok_or_else(|| {
                AqueousEquilibriumError::InvalidRecord(format!(
                    "participant '{}' has non-numeric coefficient {}",
                    key, value
                ))
            })?;
            participants.push((key.clone(), coef));
        }
        if participants.is_empty() {
            return Err(AqueousEquilibriumError::InvalidRecord(
                "reaction without participants".to_string(),
            ));
        }
        Ok(Reaction {
            participants,
            reaction_type,
            phase_name,
            id_db,
            critical_constants,
            log_k25,
            deltah,
            log_k_model,
        })
    }
}

fn to_number(x: f64) -> Value {
    Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null)
}

impl From<Reaction> for Map<String, Value> {
    fn from(reaction: Reaction) -> Self {
        let mut map = Map::new();
        for (tag, coef) in reaction.participants {
            map.insert(tag, to_number(coef));
        }
        if let Some(phase_name) = reaction.phase_name {
            map.insert("phase_name".to_string(), Value::String(phase_name));
        }
        if let Some(id_db) = reaction.id_db {
            map.insert("id_db".to_string(), Value::from(id_db));
        }
        if let Some(critical) = reaction.critical_constants {
            map.insert("T_c".to_string(), to_number(critical.T_c));
            map.insert("P_c".to_string(), to_number(critical.P_c));
            map.insert("Omega".to_string(), to_number(critical.Omega));
        }
        if let Some(log_k25) = reaction.log_k25 {
            map.insert("log_K25".to_string(), to_number(log_k25));
        }
        if let Some(deltah) = reaction.deltah {
            map.insert("deltah".to_string(), to_number(deltah));
        }
        if let LogKModel::Polynomial(p) = reaction.log_k_model {
            let coefs = p.coefs.iter().map(|c| to_number(*c)).collect();
            map.insert("log_K_coefs".to_string(), Value::Array(coefs));
        }
        map.insert(
            "type".to_string(),
            Value::String(reaction.reaction_type.to_string()),
        );
        map
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |sign: f64| {
            self.participants
                .iter()
                .filter(|(_, coef)| coef * sign > 0.0)
                .map(|(tag, coef)| {
                    if coef.abs() == 1.0 {
                        tag.clone()
                    } else {
                        format!("{} {}", coef.abs(), tag)
                    }
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        let arrow = match self.reaction_type {
            ReactionType::Irrev => "->",
            _ => "=",
        };
        write!(f, "{} {} {}", side(-1.0), arrow, side(1.0))
    }
}
