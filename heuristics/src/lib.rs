//! Admissible delete-relaxation heuristics over the propositional task
//! representation: h_max and LM-Cut, behind one trait so the search driver
//! stays heuristic-agnostic.

pub mod hmax;
pub mod lmcut;

use classical_model::{ExtInt, State, Task};

/// A heuristic function estimating the cost to go from `state` to the goal.
pub trait Heuristic {
    fn estimate(&self, task: &Task, state: &State) -> ExtInt;
}

pub struct HMax;

impl Heuristic for HMax {
    fn estimate(&self, task: &Task, state: &State) -> ExtInt {
        hmax::compute(task, state).0
    }
}

pub struct LmCut;

impl Heuristic for LmCut {
    fn estimate(&self, task: &Task, state: &State) -> ExtInt {
        lmcut::compute(task, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classical_model::{SasEffect, SasOperator, SasTask, SasVariable, Task as ModelTask};

    #[test]
    fn both_heuristics_are_admissible_on_a_two_step_chain() {
        let sas = SasTask {
            version: 3,
            metric: 1,
            variables: vec![SasVariable {
                name: "stage".into(),
                domain_size: 3,
                atoms: vec!["a".into(), "b".into(), "c".into()],
            }],
            initial: vec![0],
            goal: vec![(0, 2)],
            operators: vec![
                SasOperator {
                    name: "ab".into(),
                    prevail: vec![],
                    effects: vec![SasEffect { var: 0, pre: Some(0), post: 1 }],
                    cost: 2,
                },
                SasOperator {
                    name: "bc".into(),
                    prevail: vec![],
                    effects: vec![SasEffect { var: 0, pre: Some(1), post: 2 }],
                    cost: 3,
                },
            ],
        };
        let task = ModelTask::ground(&sas).unwrap();
        let h_max = HMax.estimate(&task, &task.initial);
        let h_lmcut = LmCut.estimate(&task, &task.initial);
        assert!(h_max <= h_lmcut);
        assert!(h_lmcut <= ExtInt::Finite(5)); // the real optimal cost
    }
}
