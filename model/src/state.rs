//! The planning state: a total variable-to-fact assignment.
//!
//! Represented densely, one `FactId` per variable, so the FDR invariant
//! ("exactly one value per variable") holds by construction instead of by
//! runtime check, and applying an operator's effect is a plain overwrite,
//! no separate delete pass.

use crate::ids::{FactId, OpId, VarId};
use crate::task::{Operator, Task};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct State {
    values: Box<[FactId]>,
}

impl State {
    pub fn new(values: Box<[FactId]>) -> Self {
        State { values }
    }

    pub fn get(&self, var: VarId) -> FactId {
        self.values[usize::from(var)]
    }

    fn set(&mut self, var: VarId, fact: FactId) {
        self.values[usize::from(var)] = fact;
    }

    /// True if every `(variable, fact)` pair currently holds in this state.
    pub fn satisfies(&self, facts: &[(VarId, FactId)]) -> bool {
        facts.iter().all(|&(var, fact)| self.get(var) == fact)
    }

    pub fn is_applicable(&self, op: &Operator) -> bool {
        self.satisfies(&op.pre)
    }

    pub fn is_goal(&self, task: &Task) -> bool {
        self.satisfies(&task.goal)
    }

    /// Applies `op`'s effect, overwriting each reassigned variable.
    pub fn apply(&self, op: &Operator) -> State {
        let mut next = self.clone();
        for &(var, fact) in &op.eff {
            next.set(var, fact);
        }
        next
    }

    /// Every operator applicable in this state, paired with its successor.
    pub fn successors<'a>(&'a self, task: &'a Task) -> impl Iterator<Item = (OpId, State)> + 'a {
        task.operators.entries().filter_map(move |(id, op)| {
            if self.is_applicable(op) {
                Some((id, self.apply(op)))
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::{SasEffect, SasOperator, SasTask, SasVariable};

    fn two_room_task() -> Task {
        let sas = SasTask {
            version: 3,
            metric: 0,
            variables: vec![SasVariable {
                name: "loc".into(),
                domain_size: 2,
                atoms: vec!["roomA".into(), "roomB".into()],
            }],
            initial: vec![0],
            goal: vec![(0, 1)],
            operators: vec![SasOperator {
                name: "walk".into(),
                prevail: vec![],
                effects: vec![SasEffect { var: 0, pre: Some(0), post: 1 }],
                cost: 1,
            }],
        };
        Task::ground(&sas).unwrap()
    }

    #[test]
    fn applying_the_single_operator_reaches_the_goal() {
        let task = two_room_task();
        let s0 = task.initial.clone();
        assert!(!s0.is_goal(&task));
        let (_, s1) = s0.successors(&task).next().unwrap();
        assert!(s1.is_goal(&task));
    }

    #[test]
    fn inapplicable_operators_are_excluded_from_successors() {
        let task = two_room_task();
        let s0 = task.initial.clone();
        let (_, s1) = s0.successors(&task).next().unwrap();
        assert_eq!(s1.successors(&task).count(), 0);
    }
}
