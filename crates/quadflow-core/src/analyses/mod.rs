/*! Analyses shipped with the solver.
 *
 * Backward: liveness (optionally removing dead code) and faintness. Forward: reaching
 * definitions, constant propagation and null-check elimination.
 */

pub mod constant_prop;
pub mod faintness;
pub mod liveness;
pub mod null_check;
pub mod reaching_defs;

pub use constant_prop::ConstantProp;
pub use faintness::Faintness;
pub use liveness::Liveness;
pub use null_check::{NullCheckElimination, NullCheckMode};
pub use reaching_defs::ReachingDefs;
