//! STRIPS grounding: turns variable/value SAS operators into propositional
//! operators over interned facts.
//!
//! Precondition and add lists are exactly the delete-relaxation view used by
//! both the real search and the heuristics: a [`State`](crate::state::State)
//! is a total variable-to-fact assignment, so overwriting the affected
//! variable on an add effect already encodes the implicit delete that FDR's
//! mutual exclusion gives for free; no separate delete list exists anywhere
//! in this crate.

use crate::ids::{FactId, FactTable, OpId, VarId};
use crate::sas::SasTask;
use crate::state::State;
use classical_collections::RefStore;
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroundError {
    #[error("operator `{op}` references variable {var}, but the task only declares {num_vars} variables")]
    VariableOutOfRange { op: String, var: u32, num_vars: u32 },
    #[error("operator `{op}` sets variable {var} to value {value}, outside its domain of size {domain_size}")]
    ValueOutOfRange {
        op: String,
        var: u32,
        value: u32,
        domain_size: u32,
    },
    #[error("goal references variable {var}, but the task only declares {num_vars} variables")]
    GoalVariableOutOfRange { var: u32, num_vars: u32 },
    #[error("initial state assigns {given} variables, but the task declares {num_vars}")]
    InitialStateSizeMismatch { given: usize, num_vars: usize },
}

/// A grounded, propositional operator. `pre` must all hold for the operator
/// to apply; `eff` is the `(variable, new fact)` reassignment performed on
/// application, simultaneously the add effect and, since every FDR variable
/// holds exactly one value, the implicit delete of whatever fact the
/// variable held before.
#[derive(Debug, Clone)]
pub struct Operator {
    pub name: Arc<str>,
    pub pre: SmallVec<[(VarId, FactId); 4]>,
    pub eff: SmallVec<[(VarId, FactId); 4]>,
    pub cost: u32,
}

pub struct Task {
    pub facts: FactTable,
    pub num_vars: u32,
    pub initial: State,
    pub goal: SmallVec<[(VarId, FactId); 4]>,
    pub operators: RefStore<OpId, Operator>,
}

impl Task {
    pub fn ground(sas: &SasTask) -> Result<Task, GroundError> {
        let num_vars = sas.variables.len() as u32;
        let mut facts = FactTable::new();

        if sas.initial.len() != sas.variables.len() {
            return Err(GroundError::InitialStateSizeMismatch {
                given: sas.initial.len(),
                num_vars: sas.variables.len(),
            });
        }

        let mut initial_values = Vec::with_capacity(sas.variables.len());
        for (i, &value) in sas.initial.iter().enumerate() {
            let var_idx = i as u32;
            let domain_size = sas.variables[i].domain_size;
            if value >= domain_size {
                return Err(GroundError::ValueOutOfRange {
                    op: "<initial state>".to_string(),
                    var: var_idx,
                    value,
                    domain_size,
                });
            }
            initial_values.push(facts.intern(VarId::from_u32(var_idx), value));
        }
        let initial = State::new(initial_values.into_boxed_slice());

        let mut goal = SmallVec::new();
        for &(var_idx, value) in &sas.goal {
            if var_idx >= num_vars {
                return Err(GroundError::GoalVariableOutOfRange { var: var_idx, num_vars });
            }
            let domain_size = sas.variables[var_idx as usize].domain_size;
            if value >= domain_size {
                return Err(GroundError::ValueOutOfRange {
                    op: "<goal>".to_string(),
                    var: var_idx,
                    value,
                    domain_size,
                });
            }
            let var = VarId::from_u32(var_idx);
            goal.push((var, facts.intern(var, value)));
        }

        let mut operators = RefStore::new();
        for sas_op in &sas.operators {
            let mut pre = SmallVec::new();
            let mut eff = SmallVec::new();

            for &(var_idx, value) in &sas_op.prevail {
                if var_idx >= num_vars {
                    return Err(GroundError::VariableOutOfRange {
                        op: sas_op.name.clone(),
                        var: var_idx,
                        num_vars,
                    });
                }
                let domain_size = sas.variables[var_idx as usize].domain_size;
                if value >= domain_size {
                    return Err(GroundError::ValueOutOfRange {
                        op: sas_op.name.clone(),
                        var: var_idx,
                        value,
                        domain_size,
                    });
                }
                let var = VarId::from_u32(var_idx);
                pre.push((var, facts.intern(var, value)));
            }

            for effect in &sas_op.effects {
                if effect.var >= num_vars {
                    return Err(GroundError::VariableOutOfRange {
                        op: sas_op.name.clone(),
                        var: effect.var,
                        num_vars,
                    });
                }
                let domain_size = sas.variables[effect.var as usize].domain_size;
                if effect.post >= domain_size {
                    return Err(GroundError::ValueOutOfRange {
                        op: sas_op.name.clone(),
                        var: effect.var,
                        value: effect.post,
                        domain_size,
                    });
                }
                let var = VarId::from_u32(effect.var);
                if let Some(pre_value) = effect.pre {
                    if pre_value >= domain_size {
                        return Err(GroundError::ValueOutOfRange {
                            op: sas_op.name.clone(),
                            var: effect.var,
                            value: pre_value,
                            domain_size,
                        });
                    }
                    pre.push((var, facts.intern(var, pre_value)));
                }
                eff.push((var, facts.intern(var, effect.post)));
            }

            operators.push(Operator {
                name: Arc::from(sas_op.name.as_str()),
                pre,
                eff,
                cost: sas_op.cost,
            });
        }

        Ok(Task {
            facts,
            num_vars,
            initial,
            goal,
            operators,
        })
    }

    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::{SasEffect, SasOperator, SasVariable};

    fn two_switch_task() -> SasTask {
        SasTask {
            version: 3,
            metric: 1,
            variables: vec![
                SasVariable { name: "light".into(), domain_size: 2, atoms: vec!["off".into(), "on".into()] },
            ],
            initial: vec![0],
            goal: vec![(0, 1)],
            operators: vec![SasOperator {
                name: "flip".into(),
                prevail: vec![],
                effects: vec![SasEffect { var: 0, pre: Some(0), post: 1 }],
                cost: 3,
            }],
        }
    }

    #[test]
    fn grounds_a_minimal_task() {
        let task = Task::ground(&two_switch_task()).unwrap();
        assert_eq!(task.num_vars, 1);
        assert_eq!(task.goal.len(), 1);
        assert_eq!(task.operators.len(), 1);
        let op = &task.operators[OpId::from_u32(0)];
        assert_eq!(op.pre.len(), 1);
        assert_eq!(op.eff.len(), 1);
        assert_eq!(op.cost, 3);
    }

    #[test]
    fn metric_flag_does_not_affect_declared_cost() {
        let mut sas = two_switch_task();
        sas.metric = 0;
        let task = Task::ground(&sas).unwrap();
        assert_eq!(task.operators[OpId::from_u32(0)].cost, 3);
    }

    #[test]
    fn out_of_range_goal_variable_is_rejected() {
        let mut sas = two_switch_task();
        sas.goal = vec![(5, 0)];
        let err = Task::ground(&sas).unwrap_err();
        assert!(matches!(err, GroundError::GoalVariableOutOfRange { var: 5, num_vars: 1 }));
    }

    #[test]
    fn out_of_range_effect_value_is_rejected() {
        let mut sas = two_switch_task();
        sas.operators[0].effects[0].post = 9;
        let err = Task::ground(&sas).unwrap_err();
        assert!(matches!(err, GroundError::ValueOutOfRange { .. }));
    }
}
