//! Manifest parsing from files and strings.

use std::{path::Path, str::FromStr};

use super::{IndentStyle, Manifest, validate::ParseContext};
use crate::{Error, Result, error::SourceContext};

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, "bridge.toml")
    }
}

impl Manifest {
    /// Parse a bridge.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse a bridge.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_manifest(&manifest, content, filename)?;
    Ok(manifest)
}

/// Validate the manifest after parsing.
fn validate_manifest(manifest: &Manifest, src: &str, filename: &str) -> Result<()> {
    let ctx = ParseContext::new(src, filename);

    let handler = ctx.push("handler");
    handler.validate_qualified_name(&manifest.handler.class, "class name")?;
    handler.validate_name(&manifest.handler.return_argument, "return argument")?;
    handler.validate_name(&manifest.handler.retval_field, "retval field")?;

    let manager = ctx.push("manager");
    manager.validate_qualified_name(&manifest.manager.class, "class name")?;
    manager.validate_name(&manifest.manager.singleton_accessor, "singleton accessor")?;
    manager.validate_name(&manifest.manager.variable, "variable name")?;
    for method in &manifest.manager.ignored_methods {
        manager.validate_name(method, "ignored method")?;
    }

    let matching = ctx.push("matching");
    matching.validate_pattern(&manifest.matching.disambiguation_pattern)?;
    matching.validate_marker(&manifest.matching.callback_marker, "callback marker")?;
    matching.validate_marker(&manifest.matching.context_marker, "context marker")?;
    for ty in manifest.matching.conversions.keys() {
        matching.validate_qualified_name(ty, "conversion type")?;
    }

    let emit = ctx.push("emit");
    emit.validate_name(&manifest.emit.lock, "lock name")?;
    emit.validate_name(&manifest.emit.result_variable, "result variable")?;
    if manifest.emit.indent == IndentStyle::Spaces && manifest.emit.indent_width == 0 {
        return Err(emit.source_context().validation_error_at(
            "indent_width must be at least 1 when indent = \"spaces\"",
            None,
        ));
    }

    Ok(())
}
