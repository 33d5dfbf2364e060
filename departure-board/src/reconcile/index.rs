//! Lookup tables over the `included` side table.

use std::collections::HashMap;

use crate::transit::{EntityKind, Resource};

/// Included entities keyed by `(type, id)`.
///
/// Borrowed from one document and rebuilt for every reconciliation, so
/// nothing outlives the load it came from.
#[derive(Debug, Default)]
pub struct IncludedIndex<'a> {
    routes: HashMap<&'a str, &'a Resource>,
    stops: HashMap<&'a str, &'a Resource>,
    trips: HashMap<&'a str, &'a Resource>,
    predictions: HashMap<&'a str, &'a Resource>,
}

impl<'a> IncludedIndex<'a> {
    /// Index the included entities. Unknown types are skipped, and for
    /// duplicate `(type, id)` pairs the first occurrence wins.
    pub fn build(included: &'a [Resource]) -> Self {
        let mut index = Self::default();

        for entity in included {
            let Some(kind) = entity.entity_kind() else {
                continue;
            };
            index
                .table_mut(kind)
                .entry(entity.id.as_str())
                .or_insert(entity);
        }

        index
    }

    /// Look up an entity by type and id.
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&'a Resource> {
        self.table(kind).get(id).copied()
    }

    /// Number of indexed entities of a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.table(kind).len()
    }

    fn table(&self, kind: EntityKind) -> &HashMap<&'a str, &'a Resource> {
        match kind {
            EntityKind::Route => &self.routes,
            EntityKind::Stop => &self.stops,
            EntityKind::Trip => &self.trips,
            EntityKind::Prediction => &self.predictions,
        }
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut HashMap<&'a str, &'a Resource> {
        match kind {
            EntityKind::Route => &mut self.routes,
            EntityKind::Stop => &mut self.stops,
            EntityKind::Trip => &mut self.trips,
            EntityKind::Prediction => &mut self.predictions,
        }
    }
}
