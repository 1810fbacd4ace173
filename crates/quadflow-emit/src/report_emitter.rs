use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use colored::Color;
use quadflow_core::FlowReport;
use std::io::Write;

/// Emits a solved fixpoint, either as the per-quad text listing or as JSON.
pub struct ReportEmitter {
    config: EmitterConfig,
}

impl ReportEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    fn emit_text<W: Write>(
        &self,
        report: &FlowReport,
        writer: &mut W,
        context: &EmitContext,
    ) -> EmitResult {
        EmitHelper::write_header(writer, context, &format!("Method: {}", report.method))?;
        EmitHelper::write_line(writer, context, &format!("entry: {}", report.entry))?;
        for node in &report.nodes {
            EmitHelper::write_line(writer, context, &format!("{} in:  {}", node.id, node.input))?;
            EmitHelper::write_line(writer, context, &format!("{} out: {}", node.id, node.output))?;
        }
        EmitHelper::write_line(writer, context, &format!("exit: {}", report.exit))?;

        if self.config.show_removed && !report.removed.is_empty() {
            let ids: Vec<String> = report.removed.iter().map(|id| id.to_string()).collect();
            EmitHelper::write_colored_line(
                writer,
                context,
                &format!("removed: {}", ids.join(" ")),
                Color::Yellow,
            )?;
        }
        Ok(())
    }
}

impl Default for ReportEmitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

impl Emitter for ReportEmitter {
    type Item = FlowReport;

    fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn emit<W: Write>(
        &self,
        report: &FlowReport,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        if self.config.format.is_json() {
            EmitHelper::write_json(writer, report)
        } else {
            self.emit_text(report, writer, context)
        }
    }
}
