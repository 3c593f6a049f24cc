use std::collections::HashMap;

/// index of an interned species tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(pub usize);

/// Interns species tags to integer ids. Ids are handed out in first-interned order and never
/// change, so a polymorph rename is the interning of a new tag, not a mutation of an old one.
#[derive(Debug, Clone, Default)]
pub struct SpeciesRegistry {
    tags: Vec<String>,
    ids: HashMap<String, SpeciesId>,
}

impl SpeciesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, tag: &str) -> SpeciesId {
        if let Some(id) = self.ids.get(tag) {
            return *id;
        }
        let id = SpeciesId(self.tags.len());
        self.tags.push(tag.to_string());
        self.ids.insert(tag.to_string(), id);
        id
    }

    pub fn id(&self, tag: &str) -> Option<SpeciesId> {
        self.ids.get(tag).copied()
    }

    pub fn tag(&self, id: SpeciesId) -> &str {
        &self.tags[id.0]
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// column index of every tag of an ordered species list
pub fn column_index(species: &[String]) -> HashMap<&str, usize> {
    species
        .iter()
        .enumerate()
        .map(|(i, tag)| (tag.as_str(), i))
        .collect()
}
