use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use quadflow_core::NullCheckReport;
use std::io::Write;

/// One `name id id ...` line per method.
pub struct NullCheckEmitter {
    config: EmitterConfig,
}

impl NullCheckEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }
}

impl Emitter for NullCheckEmitter {
    type Item = NullCheckReport;

    fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn emit<W: Write>(
        &self,
        report: &NullCheckReport,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        if self.config.format.is_json() {
            EmitHelper::write_json(writer, report)
        } else {
            EmitHelper::write_line(writer, context, &report.to_string())
        }
    }
}
