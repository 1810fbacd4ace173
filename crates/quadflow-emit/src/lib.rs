/*! Render analysis results for people and for tools.
 *
 * Text output mirrors the classic `Method:` / `entry:` / `in:` / `out:` / `exit:` layout so
 * fixpoints can be diffed against hand-worked answers. JSON output carries the same data
 * for scripts.
 */

pub mod config;
pub mod emitter;
pub mod null_check_emitter;
pub mod optimize_emitter;
pub mod output;
pub mod report_emitter;

pub use config::EmitterConfig;
pub use emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
pub use null_check_emitter::NullCheckEmitter;
pub use optimize_emitter::OptimizeEmitter;
pub use output::OutputFormat;
pub use report_emitter::ReportEmitter;
