//! Embedded template files for generated agent artifacts.
//!
//! This module uses `rust-embed` to embed the files under the crate's
//! `templates/` directory into the binary at compile time, so the CLI can
//! render service files, tool stubs and the prompt-generation instruction
//! without external file dependencies.

use regex::{Captures, Regex};
use rust_embed::RustEmbed;
use std::sync::LazyLock;

use super::error::{CodegenError, CodegenResult};

/// Embedded template files from `crates/core/templates/`.
///
/// During development with the `debug-embed` feature, files are read from the
/// filesystem at runtime, allowing for quick iteration without recompilation.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/templates"]
pub struct TemplateAssets;

pub const STANDARD_SERVICE: &str = "services/standard.py.tmpl";
pub const BATCH_SERVICE: &str = "services/batch.py.tmpl";
pub const TOOL_STUB: &str = "tools/stub.py.tmpl";
pub const PROMPT_GENERATION: &str = "prompts/generation.md.tmpl";

/// Get template file content by path.
///
/// # Arguments
/// * `path` - Relative path from templates root (e.g., "tools/stub.py.tmpl")
///
/// # Returns
/// The file content as a String, or None if the file doesn't exist.
///
/// # Example
/// ```
/// use ak_core::codegen::templates::get_template;
///
/// let stub = get_template("tools/stub.py.tmpl").expect("stub template should exist");
/// assert!(stub.contains("@tool"));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("constant regex pattern is valid"));

/// Render the template at `path`, replacing every `{{key}}` placeholder with
/// its value. Unknown placeholders are left as they are.
pub fn render_template(path: &str, vars: &[(&str, &str)]) -> CodegenResult<String> {
    let template =
        get_template(path).ok_or_else(|| CodegenError::TemplateNotFound(path.to_string()))?;
    Ok(substitute(&template, vars))
}

/// Placeholder substitution on an arbitrary string. Substituted values are
/// not scanned again.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            vars.iter()
                .find(|(key, _)| *key == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| (*value).to_string())
        })
        .into_owned()
}
