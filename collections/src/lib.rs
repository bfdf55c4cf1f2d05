//! Dense, interned-key collections used throughout the classical planner.
//!
//! Facts, state variables and operators are all identified by small `Copy`
//! handles (see [`create_ref_type`](ref_store::create_ref_type)) once they
//! leave the parser/grounder boundary; everything downstream, delta
//! tables, justification graphs, adjacency lists, is then just a `Vec`
//! indexed by that handle instead of a hash map keyed by string.

pub mod ref_store;

pub use ref_store::{Ref, RefMap, RefPool, RefStore, RefVec};
