//! The max-cost delete-relaxation heuristic: a generalised Dijkstra over
//! facts, where an operator's cost to its effects is the *max* (not sum)
//! over its preconditions' costs.

use classical_collections::RefVec;
use classical_model::{ExtInt, FactId, OpId, Operator, State, Task};
use fixedbitset::FixedBitSet;

/// `delta[f]` is the cheapest relaxed cost to make fact `f` true, one entry
/// per fact ever interned in the task, produced fresh by every call to
/// [`compute`]/[`compute_with`], never cached across calls.
pub struct DeltaTable {
    values: RefVec<FactId, ExtInt>,
}

impl DeltaTable {
    pub fn get(&self, f: FactId) -> ExtInt {
        self.values[f]
    }
}

/// `h_max` of `state` under the task's own operator costs.
pub fn compute(task: &Task, state: &State) -> (ExtInt, DeltaTable) {
    compute_with(task, state, |_id, op| op.cost)
}

/// Same computation, but operator cost is supplied by `cost_of` instead of
/// read from `task` directly; this is the hook LM-Cut uses to run h_max
/// against its local, round-mutated cost shadow without touching the task.
pub fn compute_with(task: &Task, state: &State, cost_of: impl Fn(OpId, &Operator) -> u32) -> (ExtInt, DeltaTable) {
    let num_facts = task.facts.len();
    let mut delta: RefVec<FactId, ExtInt> = RefVec::with_values(num_facts, ExtInt::Infinite);
    for f in task.facts.iter() {
        if state.get(task.facts.var_of(f)) == f {
            delta[f] = ExtInt::ZERO;
        }
    }

    let mut remaining: RefVec<OpId, u32> = RefVec::with_values(task.operators.len(), 0);
    for (id, op) in task.operators.entries() {
        remaining[id] = op.pre.len() as u32;
    }

    let mut dependents: RefVec<FactId, Vec<OpId>> = RefVec::with_values(num_facts, Vec::new());
    for (id, op) in task.operators.entries() {
        for &(_, f) in &op.pre {
            dependents[f].push(id);
        }
    }

    for (id, op) in task.operators.entries() {
        if op.pre.is_empty() {
            relax(&mut delta, op, ExtInt::ZERO, cost_of(id, op));
        }
    }

    let mut settled = FixedBitSet::with_capacity(num_facts.max(1));

    while !task.goal.iter().all(|&(_, f)| settled.contains(usize::from(f))) {
        let mut candidate: Option<(FactId, ExtInt)> = None;
        for f in task.facts.iter() {
            if settled.contains(usize::from(f)) {
                continue;
            }
            let d = delta[f];
            match candidate {
                Some((_, best)) if d >= best => {}
                _ => candidate = Some((f, d)),
            }
        }
        let (k, dk) = candidate.expect("goal not yet settled implies an unsettled fact remains");
        if dk.is_infinite() {
            return (ExtInt::Infinite, DeltaTable { values: delta });
        }
        settled.insert(usize::from(k));
        for &id in &dependents[k] {
            remaining[id] -= 1;
            if remaining[id] == 0 {
                let op = &task.operators[id];
                let m = op.pre.iter().map(|&(_, p)| delta[p]).max().unwrap_or(ExtInt::ZERO);
                relax(&mut delta, op, m, cost_of(id, op));
            }
        }
    }

    let h = task.goal.iter().map(|&(_, f)| delta[f]).max().unwrap_or(ExtInt::ZERO);
    (h, DeltaTable { values: delta })
}

fn relax(delta: &mut RefVec<FactId, ExtInt>, op: &Operator, base: ExtInt, cost: u32) {
    let candidate = base + ExtInt::Finite(cost);
    for &(_, f) in &op.eff {
        if candidate < delta[f] {
            delta[f] = candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classical_model::{SasEffect, SasOperator, SasTask, SasVariable, Task as ModelTask};

    fn single_switch(cost: u32) -> ModelTask {
        let sas = SasTask {
            version: 3,
            metric: 1,
            variables: vec![SasVariable {
                name: "light".into(),
                domain_size: 2,
                atoms: vec!["off".into(), "on".into()],
            }],
            initial: vec![0],
            goal: vec![(0, 1)],
            operators: vec![SasOperator {
                name: "flip".into(),
                prevail: vec![],
                effects: vec![SasEffect { var: 0, pre: Some(0), post: 1 }],
                cost,
            }],
        };
        ModelTask::ground(&sas).unwrap()
    }

    #[test]
    fn trivial_task_with_no_operators_has_zero_cost() {
        let sas = SasTask {
            version: 3,
            metric: 0,
            variables: vec![SasVariable {
                name: "v0".into(),
                domain_size: 1,
                atoms: vec!["is_0".into()],
            }],
            initial: vec![0],
            goal: vec![(0, 0)],
            operators: vec![],
        };
        let task = ModelTask::ground(&sas).unwrap();
        let (h, _) = compute(&task, &task.initial);
        assert_eq!(h, ExtInt::ZERO);
    }

    #[test]
    fn single_operator_cost_is_its_own_cost() {
        let task = single_switch(5);
        let (h, _) = compute(&task, &task.initial);
        assert_eq!(h, ExtInt::Finite(5));
    }

    #[test]
    fn unreachable_goal_is_infinite() {
        let sas = SasTask {
            version: 3,
            metric: 0,
            variables: vec![SasVariable {
                name: "light".into(),
                domain_size: 2,
                atoms: vec!["off".into(), "on".into()],
            }],
            initial: vec![0],
            goal: vec![(0, 1)],
            operators: vec![],
        };
        let task = ModelTask::ground(&sas).unwrap();
        let (h, _) = compute(&task, &task.initial);
        assert!(h.is_infinite());
    }

    #[test]
    fn two_independent_goals_take_the_max_not_the_sum() {
        // Two unrelated switches, each flipped by its own operator; the goal
        // needs both on. The real optimal plan pays for both (cost 5), but
        // h_max only ever charges for the more expensive of the two.
        let sas = SasTask {
            version: 3,
            metric: 1,
            variables: vec![
                SasVariable { name: "switch_a".into(), domain_size: 2, atoms: vec!["off".into(), "on".into()] },
                SasVariable { name: "switch_b".into(), domain_size: 2, atoms: vec!["off".into(), "on".into()] },
            ],
            initial: vec![0, 0],
            goal: vec![(0, 1), (1, 1)],
            operators: vec![
                SasOperator {
                    name: "flip_a".into(),
                    prevail: vec![],
                    effects: vec![SasEffect { var: 0, pre: Some(0), post: 1 }],
                    cost: 2,
                },
                SasOperator {
                    name: "flip_b".into(),
                    prevail: vec![],
                    effects: vec![SasEffect { var: 1, pre: Some(0), post: 1 }],
                    cost: 3,
                },
            ],
        };
        let task = ModelTask::ground(&sas).unwrap();
        let (h, _) = compute(&task, &task.initial);
        assert_eq!(h, ExtInt::Finite(3));
    }
}
