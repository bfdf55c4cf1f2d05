//! The landmark-cut heuristic: iteratively extracts disjoint action
//! landmarks from the justification graph h_max induces, summing their costs
//! into an admissible estimate at least as informed as h_max itself.
//!
//! Operator costs are shadowed locally (`Vec<u32>` indexed by [`OpId`]) and
//! mutated round to round; the [`Task`] passed in is never touched.

use classical_model::{ExtInt, FactId, OpId, State, Task};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// A node in LM-Cut's internal fact universe is a plain `usize`: indices
/// `0..num_facts` are the task's own facts, and the two indices past that
/// are the synthetic Î/Ĝ facts introduced by pre-normalisation when the
/// evaluated state or the goal mention more than one fact.
struct StaticOp {
    source: Option<OpId>,
    pre: Vec<usize>,
    eff: Vec<usize>,
}

pub fn compute(task: &Task, state: &State) -> ExtInt {
    let num_facts = task.facts.len();
    let synth_init = num_facts;
    let synth_goal = num_facts + 1;
    let total_nodes = num_facts + 2;

    let node_of = |f: FactId| usize::from(f);

    let facts0: Vec<usize> = task
        .facts
        .iter()
        .filter(|&f| state.get(task.facts.var_of(f)) == f)
        .map(node_of)
        .collect();
    let goal0: Vec<usize> = task.goal.iter().map(|&(_, f)| node_of(f)).collect();
    if goal0.is_empty() {
        return ExtInt::ZERO;
    }

    let init_node = if facts0.len() > 1 { synth_init } else { facts0[0] };
    let goal_node = if goal0.len() > 1 { synth_goal } else { goal0[0] };

    let mut static_ops: Vec<StaticOp> = task
        .operators
        .entries()
        .map(|(id, op)| StaticOp {
            source: Some(id),
            pre: op.pre.iter().map(|&(_, f)| node_of(f)).collect(),
            eff: op.eff.iter().map(|&(_, f)| node_of(f)).collect(),
        })
        .collect();
    if facts0.len() > 1 {
        static_ops.push(StaticOp {
            source: None,
            pre: vec![init_node],
            eff: facts0.clone(),
        });
    }
    if goal0.len() > 1 {
        static_ops.push(StaticOp {
            source: None,
            pre: goal0.clone(),
            eff: vec![goal_node],
        });
    }

    let mut local_costs: Vec<u32> = task.operators.entries().map(|(_, op)| op.cost).collect();

    let mut h_lmcut: u32 = 0;
    let mut round = 0u32;
    loop {
        let costs: Vec<u32> = static_ops
            .iter()
            .map(|op| op.source.map(|id| local_costs[usize::from(id)]).unwrap_or(0))
            .collect();

        let delta = internal_hmax(total_nodes, &static_ops, &costs, init_node, goal_node);
        let h_round = delta[goal_node];
        debug!(round, h_round = %h_round, "lmcut round");
        if h_round.is_infinite() {
            return ExtInt::Infinite;
        }
        if h_round == ExtInt::ZERO {
            break;
        }

        let supporter: Vec<usize> = static_ops
            .iter()
            .map(|op| select_supporter(task, num_facts, op, &delta, init_node))
            .collect();

        let mut forward: Vec<Vec<(usize, usize)>> = vec![Vec::new(); total_nodes];
        let mut reverse_zero: Vec<Vec<usize>> = vec![Vec::new(); total_nodes];
        for (i, op) in static_ops.iter().enumerate() {
            let tail = supporter[i];
            for &head in &op.eff {
                forward[tail].push((head, i));
                if costs[i] == 0 {
                    reverse_zero[head].push(tail);
                }
            }
        }

        let mut in_star = vec![false; total_nodes];
        in_star[goal_node] = true;
        let mut queue = VecDeque::from([goal_node]);
        while let Some(n) = queue.pop_front() {
            for &t in &reverse_zero[n] {
                if !in_star[t] {
                    in_star[t] = true;
                    queue.push_back(t);
                }
            }
        }

        let mut in_n0 = vec![false; total_nodes];
        if !in_star[init_node] {
            in_n0[init_node] = true;
            let mut queue = VecDeque::from([init_node]);
            while let Some(n) = queue.pop_front() {
                for &(head, _) in &forward[n] {
                    if !in_star[head] && !in_n0[head] {
                        in_n0[head] = true;
                        queue.push_back(head);
                    }
                }
            }
        }

        let mut landmark: HashSet<usize> = HashSet::new();
        let mut c_l = u32::MAX;
        for (n0, &member) in in_n0.iter().enumerate() {
            if !member {
                continue;
            }
            for &(head, op_idx) in &forward[n0] {
                if in_star[head] {
                    landmark.insert(op_idx);
                    c_l = c_l.min(costs[op_idx]);
                }
            }
        }

        if landmark.is_empty() {
            unreachable!(
                "h_max > 0 after pre-normalisation guarantees a positive-cost cut edge; \
                 landmark extraction found none"
            );
        }

        debug!(round, c_l, landmarks = landmark.len(), "landmark extracted");
        h_lmcut += c_l;
        for op_idx in landmark {
            if let Some(id) = static_ops[op_idx].source {
                local_costs[usize::from(id)] -= c_l;
            }
        }
        round += 1;
    }

    ExtInt::Finite(h_lmcut)
}

fn internal_hmax(total_nodes: usize, ops: &[StaticOp], costs: &[u32], init_node: usize, goal_node: usize) -> Vec<ExtInt> {
    let mut delta = vec![ExtInt::Infinite; total_nodes];
    delta[init_node] = ExtInt::ZERO;

    let mut remaining: Vec<u32> = ops.iter().map(|o| o.pre.len() as u32).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); total_nodes];
    for (i, op) in ops.iter().enumerate() {
        for &p in &op.pre {
            dependents[p].push(i);
        }
    }

    for (i, op) in ops.iter().enumerate() {
        if op.pre.is_empty() {
            relax(&mut delta, op, ExtInt::ZERO, costs[i]);
        }
    }

    let mut settled = vec![false; total_nodes];
    while !settled[goal_node] {
        let mut candidate: Option<(usize, ExtInt)> = None;
        for f in 0..total_nodes {
            if settled[f] {
                continue;
            }
            let d = delta[f];
            match candidate {
                Some((_, best)) if d >= best => {}
                _ => candidate = Some((f, d)),
            }
        }
        let (k, dk) = candidate.expect("goal unsettled implies some unsettled node remains");
        if dk.is_infinite() {
            break;
        }
        settled[k] = true;
        for &i in &dependents[k] {
            remaining[i] -= 1;
            if remaining[i] == 0 {
                let op = &ops[i];
                let m = op.pre.iter().map(|&p| delta[p]).max().unwrap_or(ExtInt::ZERO);
                relax(&mut delta, op, m, costs[i]);
            }
        }
    }
    delta
}

fn relax(delta: &mut [ExtInt], op: &StaticOp, base: ExtInt, cost: u32) {
    let candidate = base + ExtInt::Finite(cost);
    for &f in &op.eff {
        if candidate < delta[f] {
            delta[f] = candidate;
        }
    }
}

fn node_name(task: &Task, num_facts: usize, node: usize) -> String {
    if node < num_facts {
        task.facts.name_of(FactId::from_u32(node as u32)).to_string()
    } else if node == num_facts {
        "~synthetic_init~".to_string()
    } else {
        "~synthetic_goal~".to_string()
    }
}

/// `argmax` over `op`'s preconditions of `delta`, ties broken by the
/// lexicographically smallest canonical fact name.
fn select_supporter(task: &Task, num_facts: usize, op: &StaticOp, delta: &[ExtInt], init_node: usize) -> usize {
    if op.pre.is_empty() {
        return init_node;
    }
    let mut best = op.pre[0];
    let mut best_delta = delta[best];
    let mut best_name = node_name(task, num_facts, best);
    for &p in &op.pre[1..] {
        let d = delta[p];
        let name = node_name(task, num_facts, p);
        if d > best_delta || (d == best_delta && name < best_name) {
            best = p;
            best_delta = d;
            best_name = name;
        }
    }
    best
}
