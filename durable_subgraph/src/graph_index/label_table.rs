use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Interned vertex label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LabelId(u32);

impl LabelId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional map between label names and [`LabelId`]s.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    names: Vec<String>,
    ids: HashMap<String, LabelId>,
}

impl LabelTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, allocating a fresh one on first sight.
    pub fn intern(&mut self, name: &str) -> LabelId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = LabelId(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<LabelId> {
        self.ids.get(name).copied()
    }

    /// Name of `id`; ids are only handed out by this table.
    #[must_use]
    pub fn name(&self, id: LabelId) -> &str {
        self.names.get(id.index()).map_or("?", String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabelId, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(i, n)| Some((LabelId(u32::try_from(i).ok()?), n.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let mut table = LabelTable::new();
        let a = table.intern("A");
        let b = table.intern("B");
        assert_eq!(table.intern("A"), a);
        assert_ne!(a, b);
        assert_eq!(table.name(b), "B");
        assert_eq!(table.get("C"), None);
        assert_eq!(table.len(), 2);
    }
}
