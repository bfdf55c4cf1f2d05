//! Dense handles for state variables, facts and operators.
//!
//! Everything past the grounder works with these instead of the
//! `v<i>_is_<k>` strings the textual format uses; the strings only survive
//! as the [`FactTable`]'s side table, used for debug output and for the
//! LM-Cut supporter tie-break, which is defined in terms of the canonical
//! name.

use classical_collections::create_ref_type;
use classical_collections::ref_store::RefStore;
use std::sync::Arc;

create_ref_type!(VarId);
create_ref_type!(FactId);
create_ref_type!(OpId);

/// Interner from `(variable, value)` pairs to dense [`FactId`] handles.
///
/// Only facts that are actually mentioned by the initial state, the goal or
/// some operator are ever interned; the fact universe is never the full
/// cross product of every variable's declared domain.
#[derive(Default, Clone)]
pub struct FactTable {
    var_of: RefStore<FactId, VarId>,
    value_of: RefStore<FactId, u32>,
    names: RefStore<FactId, Arc<str>>,
    by_pair: std::collections::HashMap<(VarId, u32), FactId>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `(var, value)`, interning it on first use.
    pub fn intern(&mut self, var: VarId, value: u32) -> FactId {
        if let Some(&id) = self.by_pair.get(&(var, value)) {
            return id;
        }
        let id = self.var_of.push(var);
        self.value_of.push(value);
        let name: Arc<str> = format!("v{}_is_{}", u32::from(var), value).into();
        self.names.push(name);
        self.by_pair.insert((var, value), id);
        id
    }

    pub fn var_of(&self, f: FactId) -> VarId {
        self.var_of[f]
    }

    pub fn value_of(&self, f: FactId) -> u32 {
        self.value_of[f]
    }

    /// Canonical `v<i>_is_<k>` name, used for debug printing and for the
    /// deterministic lexicographic tie-break in LM-Cut's supporter selection.
    pub fn name_of(&self, f: FactId) -> &str {
        &self.names[f]
    }

    pub fn len(&self) -> usize {
        self.var_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.var_of.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FactId> + '_ {
        self.var_of.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable_and_deduplicates() {
        let mut t = FactTable::new();
        let v0 = VarId::from_u32(0);
        let v1 = VarId::from_u32(1);
        let a = t.intern(v0, 3);
        let b = t.intern(v1, 0);
        let a2 = t.intern(v0, 3);
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(t.name_of(a), "v0_is_3");
        assert_eq!(t.name_of(b), "v1_is_0");
        assert_eq!(t.var_of(a), v0);
        assert_eq!(t.value_of(a), 3);
        assert_eq!(t.len(), 2);
    }
}
