/*! Lattice elements the solver iterates over.
 *
 * Every analysis picks one concrete element type. The solver only needs meet, copy,
 * equality and a fresh top value; everything else is for the analysis and for reports.
 */

pub mod constant;
pub mod def_set;
pub mod register_set;

pub use constant::{ConstState, ConstantTable};
pub use def_set::DefSet;
pub use register_set::{MeetOp, RegisterSet};

use crate::Result;
use std::fmt;

pub trait DataflowObject: Clone + PartialEq + fmt::Debug + fmt::Display {
    /// Reset to the identity of `meet_with`.
    fn set_to_top(&mut self);

    /// Reset to the absorbing element. Lattices without a finite bottom return
    /// `FlowError::UnsupportedLatticeOp`.
    fn set_to_bottom(&mut self) -> Result<()>;

    fn meet_with(&mut self, other: &Self);

    fn copy_from(&mut self, other: &Self) {
        self.clone_from(other);
    }
}
