use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use colored::Color;
use quadflow_core::OptimizeSummary;
use std::io::Write;

pub struct OptimizeEmitter {
    config: EmitterConfig,
}

impl OptimizeEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }
}

impl Emitter for OptimizeEmitter {
    type Item = OptimizeSummary;

    fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn emit<W: Write>(
        &self,
        summary: &OptimizeSummary,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        if self.config.format.is_json() {
            return EmitHelper::write_json(writer, summary);
        }

        EmitHelper::write_header(writer, context, &format!("Method: {}", summary.method))?;
        context.indent();
        for pass in &summary.passes {
            let removed = if pass.removed.is_empty() {
                "nothing".to_string()
            } else {
                pass.removed
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            EmitHelper::write_line(
                writer,
                context,
                &format!("round {} {}: removed {}", pass.round, pass.pass, removed),
            )?;
        }
        context.dedent();
        EmitHelper::write_colored_line(
            writer,
            context,
            &format!("total removed: {}", summary.total_removed()),
            Color::Green,
        )
    }
}
