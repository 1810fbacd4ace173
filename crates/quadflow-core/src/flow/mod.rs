/*! The analysis contract and the fixpoint solver.
 *
 * An analysis owns a `FlowState` holding IN/OUT values per quad plus the entry and
 * exit values. The solver drives it: preprocess, chaotic iteration in quad order until
 * a sweep changes nothing, postprocess, then removal of whatever the analysis asked
 * to delete.
 */

pub mod solver;
pub mod state;

pub use solver::{SolveStats, Solver};
pub use state::FlowState;

use crate::cfg::ControlFlowGraph;
use crate::lattice::DataflowObject;
use crate::quad::{Quad, QuadId};
use crate::report::FlowReport;
use crate::Result;

pub trait Analysis {
    type Lattice: DataflowObject;

    fn name(&self) -> &'static str;

    fn is_forward(&self) -> bool;

    /// Builds fresh storage for `cfg` and resets every per-graph index.
    fn preprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()>;

    /// Forward analyses derive OUT from IN, backward ones IN from OUT. Only the slot
    /// of `quad` may be written.
    fn process_quad(&mut self, quad: &Quad) -> Result<()>;

    fn postprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()>;

    fn state(&self) -> &FlowState<Self::Lattice>;

    fn state_mut(&mut self) -> &mut FlowState<Self::Lattice>;

    fn pending_removals(&self) -> Vec<QuadId> {
        Vec::new()
    }

    fn new_temp_var(&self) -> Self::Lattice {
        self.state().top()
    }

    fn get_entry(&self) -> Self::Lattice {
        self.state().entry()
    }

    fn get_exit(&self) -> Self::Lattice {
        self.state().exit()
    }

    fn set_entry(&mut self, value: &Self::Lattice) {
        self.state_mut().set_entry(value);
    }

    fn set_exit(&mut self, value: &Self::Lattice) {
        self.state_mut().set_exit(value);
    }

    fn get_in(&self, id: QuadId) -> Self::Lattice {
        self.state().get_in(id)
    }

    fn get_out(&self, id: QuadId) -> Self::Lattice {
        self.state().get_out(id)
    }

    fn set_in(&mut self, id: QuadId, value: &Self::Lattice) {
        self.state_mut().set_in(id, value);
    }

    fn set_out(&mut self, id: QuadId, value: &Self::Lattice) {
        self.state_mut().set_out(id, value);
    }

    fn report(&self, cfg: &ControlFlowGraph) -> FlowReport {
        self.state().report(self.name(), &cfg.method().name)
    }
}
