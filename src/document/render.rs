//! Document rendering

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError,
    RenderErrorReason,
};
use serde::Serialize;
use tracing::{debug, info};

use super::{Document, Entry};
use crate::Result;

/// Environment variable that enables [`Document::generate`]. Generation is
/// skipped unless it is set to a non-empty value.
pub const ENV_HTTPDOC: &str = "HTTPDOC";

/// Built-in Markdown template
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/doc.md.hbs");

const TEMPLATE_NAME: &str = "httpdoc";

/// Whether [`ENV_HTTPDOC`] asks for documentation to be generated
#[must_use]
pub fn generation_enabled() -> bool {
    std::env::var_os(ENV_HTTPDOC).is_some_and(|v| !v.is_empty())
}

/// What the template sees
#[derive(Serialize)]
struct DocumentView<'a> {
    name: &'a str,
    exclude_headers: &'a [String],
    entries: &'a [Entry],
}

impl Document {
    /// Write the document to `path` if [`ENV_HTTPDOC`] is set.
    ///
    /// The file is created or truncated. Nothing is written when generation
    /// is disabled.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or the template fails
    pub fn generate(&self, path: impl AsRef<Path>) -> Result<()> {
        if !generation_enabled() {
            debug!(
                "{} is not set, skipping documentation for {}",
                ENV_HTTPDOC, self.name
            );
            return Ok(());
        }

        let path = Self::output_path(path.as_ref())?;
        let mut writer = BufWriter::new(File::create(&path)?);
        self.render(&mut writer)?;
        writer.flush()?;

        info!("Wrote {} entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Render the document through its template into `writer`
    ///
    /// # Errors
    ///
    /// Returns error if the template cannot be parsed or rendered
    pub fn render<W: Write>(&self, writer: W) -> Result<()> {
        let handlebars = registry(self.template_source())?;
        let entries = self.entries();
        let view = DocumentView {
            name: &self.name,
            exclude_headers: &self.exclude_headers,
            entries: &entries,
        };

        handlebars.render_to_write(TEMPLATE_NAME, &view, writer)?;
        Ok(())
    }

    /// Render the document into a string
    ///
    /// # Errors
    ///
    /// Returns error if the template cannot be parsed or rendered
    pub fn render_to_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.render(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn registry(template: &str) -> Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_helper("lower", Box::new(lower_helper));
    handlebars.register_helper("stripslash", Box::new(stripslash_helper));
    handlebars.register_template_string(TEMPLATE_NAME, template)?;
    Ok(handlebars)
}

fn string_param<'a>(h: &'a Helper, name: &str) -> std::result::Result<&'a str, RenderError> {
    h.param(0)
        .and_then(|p| p.value().as_str())
        .ok_or_else(|| {
            RenderErrorReason::Other(format!("{name} requires a string parameter")).into()
        })
}

/// Lowercase helper: {{lower method}}
fn lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = string_param(h, "lower")?;
    out.write(&value.to_lowercase())?;
    Ok(())
}

/// Slash removal helper for anchors: {{stripslash path}}
fn stripslash_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = string_param(h, "stripslash")?;
    out.write(&value.replace('/', ""))?;
    Ok(())
}
