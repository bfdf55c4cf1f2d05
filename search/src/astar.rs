//! Cost-optimal A* search: a plain admissible-heuristic best-first search.
//! Optimality matters here more than anytime performance, so there is no
//! weighting or lookahead.

use classical_heuristics::Heuristic;
use classical_model::{ExtInt, State, Task};
use env_param::EnvParam;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

/// Safety cap on the number of nodes A* will expand before giving up and
/// returning `None`, `0` meaning unbounded. Development/debugging only.
pub static PLANNER_MAX_EXPANSIONS: EnvParam<u64> = EnvParam::new("PLANNER_MAX_EXPANSIONS", "0");

struct SearchNode {
    state: State,
    parent: Option<Rc<SearchNode>>,
    via: Option<(Arc<str>, u32)>,
    g: u32,
    h: ExtInt,
    f: ExtInt,
    seq: u64,
}

impl SearchNode {
    fn extract_plan(self: Rc<Self>) -> (Vec<Arc<str>>, u32) {
        let mut ops = Vec::new();
        let mut cost = 0u32;
        let mut curr = self;
        loop {
            let Some((name, op_cost)) = curr.via.clone() else {
                break;
            };
            ops.push(name);
            cost += op_cost;
            let Some(parent) = curr.parent.clone() else {
                break;
            };
            curr = parent;
        }
        ops.reverse();
        (ops, cost)
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}
impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `BinaryHeap` is a max-heap; reversed so the smallest `(f, seq)` pops first.
impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Finds a cost-optimal plan from the task's initial state to its goal,
/// using `heuristic` for pruning. Returns the plan as operator names in
/// application order together with its total cost, or `None` if no plan
/// exists (or the optional expansion cap is hit first).
pub fn plan(task: &Task, heuristic: &impl Heuristic) -> Option<(Vec<Arc<str>>, u32)> {
    let max_expansions = PLANNER_MAX_EXPANSIONS.get();

    let mut seq_counter: u64 = 0;
    let mut next_seq = || {
        let s = seq_counter;
        seq_counter += 1;
        s
    };

    let mut heap: BinaryHeap<Rc<SearchNode>> = BinaryHeap::new();
    let mut best_known: HashMap<State, u32> = HashMap::new();

    let h0 = heuristic.estimate(task, &task.initial);
    if h0.is_infinite() {
        return None;
    }
    best_known.insert(task.initial.clone(), 0);
    heap.push(Rc::new(SearchNode {
        state: task.initial.clone(),
        parent: None,
        via: None,
        g: 0,
        h: h0,
        f: h0,
        seq: next_seq(),
    }));

    let mut expansions: u64 = 0;
    while let Some(node) = heap.pop() {
        if let Some(&known) = best_known.get(&node.state) {
            if node.g > known {
                continue;
            }
        }

        if node.state.is_goal(task) {
            debug!(expansions, cost = node.g, "goal reached");
            return Some(node.extract_plan());
        }

        expansions += 1;
        if max_expansions > 0 && expansions > max_expansions {
            debug!(expansions, "expansion cap reached, aborting search");
            return None;
        }
        trace!(expansions, g = node.g, f = %node.f, "expanding node");

        for (op_id, succ_state) in node.state.successors(task) {
            let op = &task.operators[op_id];
            let g = node.g + op.cost;
            let improves = match best_known.get(&succ_state) {
                Some(&known) => g < known,
                None => true,
            };
            if !improves {
                continue;
            }
            let h = heuristic.estimate(task, &succ_state);
            if h.is_infinite() {
                continue;
            }
            best_known.insert(succ_state.clone(), g);
            let f = ExtInt::Finite(g) + h;
            heap.push(Rc::new(SearchNode {
                state: succ_state,
                parent: Some(node.clone()),
                via: Some((op.name.clone(), op.cost)),
                g,
                h,
                f,
                seq: next_seq(),
            }));
        }
    }

    debug!(expansions, "open list exhausted, no plan exists");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use classical_heuristics::{HMax, LmCut};
    use classical_model::{SasEffect, SasOperator, SasTask, SasVariable, Task as ModelTask};

    fn two_room_task() -> ModelTask {
        let sas = SasTask {
            version: 3,
            metric: 1,
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
                cost: 7,
            }],
        };
        ModelTask::ground(&sas).unwrap()
    }

    #[test]
    fn finds_the_single_step_plan_with_hmax() {
        let task = two_room_task();
        let (ops, cost) = plan(&task, &HMax).unwrap();
        assert_eq!(cost, 7);
        assert_eq!(ops.len(), 1);
        assert_eq!(&*ops[0], "walk");
    }

    #[test]
    fn finds_the_single_step_plan_with_lmcut() {
        let task = two_room_task();
        let (ops, cost) = plan(&task, &LmCut).unwrap();
        assert_eq!(cost, 7);
        assert_eq!(&*ops[0], "walk");
    }

    #[test]
    fn unreachable_goal_returns_none() {
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
            operators: vec![],
        };
        let task = ModelTask::ground(&sas).unwrap();
        assert!(plan(&task, &HMax).is_none());
    }

    #[test]
    fn picks_the_cheaper_of_two_routes() {
        let sas = SasTask {
            version: 3,
            metric: 1,
            variables: vec![SasVariable {
                name: "loc".into(),
                domain_size: 3,
                atoms: vec!["start".into(), "mid".into(), "end".into()],
            }],
            initial: vec![0],
            goal: vec![(0, 2)],
            operators: vec![
                SasOperator {
                    name: "direct".into(),
                    prevail: vec![],
                    effects: vec![SasEffect { var: 0, pre: Some(0), post: 2 }],
                    cost: 10,
                },
                SasOperator {
                    name: "to_mid".into(),
                    prevail: vec![],
                    effects: vec![SasEffect { var: 0, pre: Some(0), post: 1 }],
                    cost: 2,
                },
                SasOperator {
                    name: "mid_to_end".into(),
                    prevail: vec![],
                    effects: vec![SasEffect { var: 0, pre: Some(1), post: 2 }],
                    cost: 3,
                },
            ],
        };
        let task = ModelTask::ground(&sas).unwrap();
        let (ops, cost) = plan(&task, &LmCut).unwrap();
        assert_eq!(cost, 5);
        assert_eq!(ops.len(), 2);
    }
}
