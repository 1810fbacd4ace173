use crate::config::EmitterConfig;
use anyhow::Result;
use colored::{Color, Colorize};
use std::io::Write;

pub type EmitResult = Result<()>;

#[derive(Debug, Clone)]
pub struct EmitContext {
    pub indent_level: usize,
    pub indent_chars: String,
    pub use_colors: bool,
}

impl EmitContext {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_chars: "  ".to_string(),
            use_colors: false,
        }
    }

    pub fn from_config(config: &EmitterConfig) -> Self {
        Self {
            indent_level: 0,
            indent_chars: " ".repeat(config.indent),
            use_colors: config.use_colors,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_chars.repeat(self.indent_level)
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Emitter {
    type Item;

    fn config(&self) -> &EmitterConfig;

    fn emit<W: Write>(
        &self,
        item: &Self::Item,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult;

    fn emit_to_string(&self, item: &Self::Item) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = EmitContext::from_config(self.config());
        self.emit(item, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Text items are written one after another. JSON items are collected into one array.
    fn emit_all<W: Write>(&self, items: &[Self::Item], writer: &mut W) -> EmitResult
    where
        Self::Item: serde::Serialize,
    {
        if self.config().format.is_json() {
            serde_json::to_writer_pretty(&mut *writer, items)?;
            writeln!(writer)?;
            return Ok(());
        }
        let mut context = EmitContext::from_config(self.config());
        for item in items {
            self.emit(item, writer, &mut context)?;
        }
        Ok(())
    }
}

pub struct EmitHelper;

impl EmitHelper {
    pub fn write_line<W: Write>(writer: &mut W, context: &EmitContext, text: &str) -> EmitResult {
        writeln!(writer, "{}{}", context.get_indent(), text)?;
        Ok(())
    }

    pub fn write_colored_line<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        text: &str,
        color: Color,
    ) -> EmitResult {
        if context.use_colors {
            writeln!(writer, "{}{}", context.get_indent(), text.color(color))?;
        } else {
            Self::write_line(writer, context, text)?;
        }
        Ok(())
    }

    pub fn write_header<W: Write>(writer: &mut W, context: &EmitContext, text: &str) -> EmitResult {
        if context.use_colors {
            writeln!(writer, "{}{}", context.get_indent(), text.bright_blue().bold())?;
        } else {
            Self::write_line(writer, context, text)?;
        }
        Ok(())
    }

    pub fn write_json<W: Write, T: serde::Serialize>(writer: &mut W, value: &T) -> EmitResult {
        serde_json::to_writer_pretty(&mut *writer, value)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_indentation() {
        let mut ctx = EmitContext::new();
        assert_eq!(ctx.get_indent(), "");

        ctx.indent();
        ctx.indent();
        assert_eq!(ctx.get_indent(), "    ");

        ctx.dedent();
        ctx.dedent();
        ctx.dedent();
        assert_eq!(ctx.indent_level, 0);
    }

    #[test]
    fn test_context_from_config() {
        let config = EmitterConfig {
            indent: 4,
            ..EmitterConfig::plain()
        };
        let mut ctx = EmitContext::from_config(&config);
        ctx.indent();
        assert_eq!(ctx.get_indent(), "    ");
        assert!(!ctx.use_colors);
    }

    #[test]
    fn test_uncoloured_line_is_plain() {
        let ctx = EmitContext::new();
        let mut buffer = Vec::new();
        EmitHelper::write_colored_line(&mut buffer, &ctx, "exit: []", Color::Yellow).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "exit: []\n");
    }
}
