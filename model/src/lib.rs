//! FDR/SAS parsing, STRIPS grounding and the propositional task/state types
//! shared by the heuristics and search crates.

pub mod ext_int;
pub mod ids;
pub mod sas;
pub mod state;
pub mod task;

pub use ext_int::ExtInt;
pub use ids::{FactId, FactTable, OpId, VarId};
pub use sas::{parse_sas, read_sas_file, SasEffect, SasOperator, SasParseError, SasTask, SasVariable};
pub use state::State;
pub use task::{GroundError, Operator, Task};
