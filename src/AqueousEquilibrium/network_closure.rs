//! Discovery of the species and reactions reachable from a set of seed species.
//!
//! A reaction fires when the current species sits on one side of it and every other species of
//! that side is already known; the species of the opposite side then become known too.
//! Irreversible reactions only fire from reactants to products, electronic (redox) reactions
//! never fire. Solid reactants of a phase reaction enter the network under the tag
//! `<solid>__<phase_name>` so that polymorphs sharing one formula stay distinct.
//!
//! The traversal is a FIFO work queue over interned species ids. Species and reactions are only
//! ever added, so the result is the same fixpoint a recursive walk reaches; the candidate
//! reactions are never mutated, fired reactions are cloned and relabeled.
use super::errors::AqueousEquilibriumError;
use super::reaction_record::{Reaction, ReactionType};
use super::species_registry::{SpeciesId, SpeciesRegistry};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet, VecDeque};

pub const WATER: &str = "H2O";

/// result of a closure run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionNetwork {
    /// discovered species in discovery order, water first
    pub species: Vec<String>,
    /// fired reactions in firing order, solids relabeled
    pub reactions: Vec<Reaction>,
    /// seeds that take part in no discovered reaction
    pub unreachable_seeds: Vec<String>,
}

impl ReactionNetwork {
    pub fn is_empty(&self) -> bool {
        self.species.is_empty() && self.reactions.is_empty()
    }

    /// turns the first unreachable seed into an error, for callers that do not accept isolated species
    pub fn require_all_reachable(&self) -> Result<(), AqueousEquilibriumError> {
        match self.unreachable_seeds.first() {
            Some(seed) => Err(AqueousEquilibriumError::ClosureUnreachable(seed.clone())),
            None => Ok(()),
        }
    }
}

// products and reactants of one candidate reaction as ids
#[derive(Debug, Clone)]
struct Sides {
    products: Vec<SpeciesId>,
    reactants: Vec<SpeciesId>,
}

/// Index over a list of candidate reactions, reusable for several seed sets.
#[derive(Debug, Clone)]
pub struct NetworkClosure<'a> {
    candidates: &'a [Reaction],
    registry: SpeciesRegistry,
    // None for reactions excluded from closure
    sides: Vec<Option<Sides>>,
    // species id -> indexes of candidates containing it, ascending
    occurrences: HashMap<SpeciesId, Vec<usize>>,
}

impl<'a> NetworkClosure<'a> {
    pub fn new(candidates: &'a [Reaction]) -> Self {
        let mut registry = SpeciesRegistry::new();
        let mut sides = Vec::with_capacity(candidates.len());
        let mut occurrences: HashMap<SpeciesId, Vec<usize>> = HashMap::new();
        for (idx, reaction) in candidates.iter().enumerate() {
            if reaction.is_electronic() {
                sides.push(None);
                continue;
            }
            let mut products = Vec::new();
            let mut reactants = Vec::new();
            for (tag, coef) in &reaction.participants {
                let id = registry.intern(tag);
                occurrences.entry(id).or_default().push(idx);
                if *coef > 0.0 {
                    products.push(id);
                } else if *coef < 0.0 {
                    reactants.push(id);
                }
            }
            sides.push(Some(Sides {
                products,
                reactants,
            }));
        }
        Self {
            candidates,
            registry,
            sides,
            occurrences,
        }
    }

    /// Closure of `seeds`; seeds that take part in no fired reaction are logged and reported.
    pub fn expand<S: AsRef<str>>(&self, seeds: &[S]) -> ReactionNetwork {
        let network = self.close(seeds);
        for seed in &network.unreachable_seeds {
            warn!("seed species {} takes part in no discovered reaction", seed);
        }
        network
    }

    /// Reactions fired from `seeds`, without reporting seeds that fire nothing. Used for the
    /// phase and gas stages, where most aqueous species have no phase reaction.
    pub fn fired_reactions<S: AsRef<str>>(&self, seeds: &[S]) -> Vec<Reaction> {
        self.close(seeds).reactions
    }

    fn close<S: AsRef<str>>(&self, seeds: &[S]) -> ReactionNetwork {
        let mut registry = self.registry.clone();
        let mut known: HashSet<SpeciesId> = HashSet::new();
        let mut order: Vec<SpeciesId> = Vec::new();
        let mut queue: VecDeque<SpeciesId> = VecDeque::new();
        let mut seed_ids = Vec::new();
        for seed in seeds {
            let id = registry.intern(seed.as_ref());
            if known.insert(id) {
                order.push(id);
                queue.push_back(id);
                seed_ids.push(id);
            }
        }

        let mut fired = vec![false; self.candidates.len()];
        let mut fired_order: Vec<usize> = Vec::new();
        let mut renames: HashMap<usize, Vec<(String, String)>> = HashMap::new();

        while let Some(current) = queue.pop_front() {
            let Some(occurrences) = self.occurrences.get(&current) else {
                continue;
            };
            for &r_idx in occurrences {
                if fired[r_idx] {
                    continue;
                }
                let Some(sides) = &self.sides[r_idx] else {
                    continue;
                };
                let reaction = &self.candidates[r_idx];
                let all_known = |side: &[SpeciesId]| side.iter().all(|s| known.contains(s));
                let new_tags: Vec<String> = if sides.products.contains(&current)
                    && reaction.reaction_type != ReactionType::Irrev
                    && all_known(&sides.products)
                {
                    // solids are always written as consumed, so only this branch renames
                    sides
                        .reactants
                        .iter()
                        .map(|id| {
                            let tag = registry.tag(*id).to_string();
                            let tag_add = reaction.polymorph_tag(&tag);
                            if tag_add != tag {
                                renames
                                    .entry(r_idx)
                                    .or_default()
                                    .push((tag, tag_add.clone()));
                            }
                            tag_add
                        })
                        .collect()
                } else if sides.reactants.contains(&current) && all_known(&sides.reactants) {
                    sides
                        .products
                        .iter()
                        .map(|id| registry.tag(*id).to_string())
                        .collect()
                } else {
                    continue;
                };
                fired[r_idx] = true;
                fired_order.push(r_idx);
                debug!("reaction fired from {}: {}", registry.tag(current), reaction);
                for tag in new_tags {
                    let id = registry.intern(&tag);
                    if known.insert(id) {
                        order.push(id);
                        queue.push_back(id);
                    }
                }
            }
        }

        let reactions: Vec<Reaction> = fired_order
            .iter()
            .map(|r_idx| {
                let mut reaction = self.candidates[*r_idx].clone();
                if let Some(pairs) = renames.get(r_idx) {
                    for (from, to) in pairs {
                        reaction.relabel(from, to);
                    }
                }
                reaction
            })
            .collect();

        let unreachable_seeds: Vec<String> = seed_ids
            .iter()
            .filter(|id| {
                !fired_order.iter().any(|r_idx| {
                    self.sides[*r_idx].as_ref().is_some_and(|sides| {
                        sides.products.contains(*id) || sides.reactants.contains(*id)
                    })
                })
            })
            .map(|id| registry.tag(*id).to_string())
            .collect();

        let species: Vec<String> = order
            .iter()
            .map(|id| registry.tag(*id).to_string())
            .collect();
        let species = if species.is_empty() {
            species
        } else {
            place_water_first(species)
        };
        info!(
            "closure finished: {} species, {} reactions out of {} candidates",
            species.len(),
            reactions.len(),
            self.candidates.len()
        );
        ReactionNetwork {
            species,
            reactions,
            unreachable_seeds,
        }
    }
}

/// one-shot closure of `seeds` over `candidates`
pub fn expand<S: AsRef<str>>(seeds: &[S], candidates: &[Reaction]) -> ReactionNetwork {
    NetworkClosure::new(candidates).expand(seeds)
}

/// moves "H2O" to index 0, inserting it when missing
pub fn place_water_first(mut species: Vec<String>) -> Vec<String> {
    match species.iter().position(|s| s == WATER) {
        Some(idx) => {
            let water = species.remove(idx);
            species.insert(0, water);
        }
        None => {
            debug!("{} not discovered, inserted at the first position", WATER);
            species.insert(0, WATER.to_string());
        }
    }
    species
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn reactions(values: Vec<Value>) -> Vec<Reaction> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    fn carbonate_candidates() -> Vec<Reaction> {
        reactions(vec![
            json!({"H2O": -1.0, "H+": 1.0, "OH-": 1.0, "type": "rev", "log_K25": -14.0}),
            json!({"HCO3-": -1.0, "H+": 1.0, "CO3--": 1.0, "type": "rev", "log_K25": -10.329}),
            json!({"CO2": -1.0, "H2O": -1.0, "H+": 1.0, "HCO3-": 1.0, "type": "rev", "log_K25": -6.352}),
            json!({"Ca++": -1.0, "CO3--": -1.0, "CaCO3": 1.0, "type": "rev", "log_K25": 3.224}),
            json!({"Na+": -1.0, "Cl-": -1.0, "NaCl": 1.0, "type": "rev", "log_K25": -0.5}),
        ])
    }

    fn solid_candidates() -> Vec<Reaction> {
        reactions(vec![
            json!({"CaCO3(s)": -1.0, "Ca++": 1.0, "CO3--": 1.0, "phase_name": "Calcite",
                   "type": "rev", "log_K25": -8.48}),
            json!({"CaCO3(s)": -1.0, "Ca++": 1.0, "CO3--": 1.0, "phase_name": "Aragonite",
                   "type": "rev", "log_K25": -8.336}),
            json!({"NaCl(s)": -1.0, "Na+": 1.0, "Cl-": 1.0, "phase_name": "Halite",
                   "type": "rev", "log_K25": 1.57}),
        ])
    }

    #[test]
    fn test_carbonate_closure_order() {
        let candidates = carbonate_candidates();
        let network = expand(&["Ca++", "HCO3-"], &candidates);
        assert_eq!(
            network.species,
            vec!["H2O", "Ca++", "HCO3-", "H+", "CO3--", "CO2", "CaCO3", "OH-"]
        );
        let fired: Vec<Reaction> = [1, 2, 3, 0].iter().map(|i| candidates[*i].clone()).collect();
        assert_eq!(network.reactions, fired);
        assert!(network.unreachable_seeds.is_empty());
        assert!(network.require_all_reachable().is_ok());
    }

    #[test]
    fn test_closure_is_idempotent() {
        let candidates = carbonate_candidates();
        let closure = NetworkClosure::new(&candidates);
        let first = closure.expand(&["Ca++", "HCO3-"]);
        let second = closure.expand(&first.species);
        let set = |v: &Vec<String>| v.iter().cloned().collect::<HashSet<String>>();
        assert_eq!(set(&first.species), set(&second.species));
        assert_eq!(first.reactions.len(), second.reactions.len());
        for reaction in &second.reactions {
            assert!(first.reactions.contains(reaction));
        }
        assert_eq!(second.species[0], WATER);
    }

    #[test]
    fn test_closure_is_deterministic_and_keeps_seeds() {
        let candidates = carbonate_candidates();
        let a = expand(&["HCO3-", "Ca++", "HCO3-"], &candidates);
        let b = expand(&["HCO3-", "Ca++"], &candidates);
        assert_eq!(a, b);
        assert!(a.species.contains(&"Ca++".to_string()));
        assert!(a.species.contains(&"HCO3-".to_string()));
    }

    #[test]
    fn test_irreversible_reaction_fires_forward_only() {
        let candidates = reactions(vec![
            json!({"H2O": -1.0, "H+": 1.0, "OH-": 1.0, "type": "rev", "log_K25": -14.0}),
            json!({"CH4": -1.0, "CO2": 1.0, "type": "irrev"}),
        ]);
        let backward = expand(&["H2O", "CO2"], &candidates);
        assert_eq!(backward.reactions.len(), 1);
        assert!(!backward.species.contains(&"CH4".to_string()));
        assert_eq!(backward.unreachable_seeds, vec!["CO2".to_string()]);
        assert!(matches!(
            backward.require_all_reachable(),
            Err(AqueousEquilibriumError::ClosureUnreachable(s)) if s == "CO2"
        ));

        let forward = expand(&["H2O", "CH4"], &candidates);
        assert_eq!(forward.reactions.len(), 2);
        assert!(forward.species.contains(&"CO2".to_string()));
    }

    #[test]
    fn test_electronic_reactions_are_excluded() {
        let candidates = reactions(vec![
            json!({"Fe+++": -1.0, "e-": -1.0, "Fe++": 1.0, "type": "electronic", "log_K25": 13.02}),
        ]);
        let network = expand(&["Fe+++"], &candidates);
        assert!(network.reactions.is_empty());
        assert_eq!(network.species, vec!["H2O", "Fe+++"]);
        assert_eq!(network.unreachable_seeds, vec!["Fe+++".to_string()]);
    }

    #[test]
    fn test_polymorphs_are_relabeled_without_touching_candidates() {
        let candidates = solid_candidates();
        let snapshot = candidates.clone();
        let network = expand(&["H2O", "Ca++", "CO3--"], &candidates);
        assert_eq!(network.reactions.len(), 2);
        assert_eq!(
            network.reactions[0].coefficient("CaCO3(s)__Calcite"),
            Some(-1.0)
        );
        assert_eq!(
            network.reactions[1].coefficient("CaCO3(s)__Aragonite"),
            Some(-1.0)
        );
        assert!(network.species.contains(&"CaCO3(s)__Calcite".to_string()));
        assert!(network.species.contains(&"CaCO3(s)__Aragonite".to_string()));
        assert!(!network.species.contains(&"CaCO3(s)".to_string()));
        assert_eq!(candidates, snapshot);

        // a second run over the same candidates sees the same records
        let again = expand(&["H2O", "Ca++", "CO3--"], &candidates);
        assert_eq!(network, again);
    }

    #[test]
    fn test_fired_reactions_of_a_later_stage() {
        let aqueous = carbonate_candidates();
        let solids = solid_candidates();
        let species = expand(&["Ca++", "HCO3-"], &aqueous).species;
        let closure = NetworkClosure::new(&solids);
        let reactions = closure.fired_reactions(&species);
        let network = closure.expand(&species);
        assert_eq!(reactions, network.reactions);
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[0].phase_name.as_deref(), Some("Calcite"));
        // every aqueous species without a phase reaction is a seed that fired nothing
        assert!(network.unreachable_seeds.contains(&"HCO3-".to_string()));
        assert!(!network.unreachable_seeds.contains(&"Ca++".to_string()));
    }

    #[test]
    fn test_empty_seed_list() {
        let candidates = carbonate_candidates();
        let seeds: Vec<String> = Vec::new();
        let network = expand(&seeds, &candidates);
        assert!(network.is_empty());
    }

    #[test]
    fn test_place_water_first() {
        let species = vec!["Na+".to_string(), "H2O".to_string(), "Cl-".to_string()];
        assert_eq!(place_water_first(species), vec!["H2O", "Na+", "Cl-"]);
        let dry = vec!["Na+".to_string()];
        assert_eq!(place_water_first(dry), vec!["H2O", "Na+"]);
    }
}
