//! Description template renderer.

use crate::release::ReleaseEvent;
use handlebars::{
    no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext, Template,
};
use serde_json::json;
use std::fmt;

/// Registry name of the description template.
const TEMPLATE_NAME: &str = "description";

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (Jira descriptions are plain wiki text)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));

    hbs
}

/// Helper function for equality comparison in templates.
///
/// Usage: `{{#if (eq provider "github")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// A validated issue description template.
///
/// Templates see `provider`, `project` and `version`.
#[derive(Clone)]
pub struct DescriptionTemplate {
    source: String,
    handlebars: Handlebars<'static>,
}

impl Default for DescriptionTemplate {
    fn default() -> Self {
        let mut handlebars = create_handlebars_registry();
        // The stock template is a constant covered by tests. Were it ever to
        // fail compiling, rendering would report the missing template.
        if let Ok(compiled) = Template::compile(super::DEFAULT_DESCRIPTION_TEMPLATE) {
            handlebars.register_template(TEMPLATE_NAME, compiled);
        }
        Self {
            source: super::DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
            handlebars,
        }
    }
}

impl fmt::Debug for DescriptionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptionTemplate")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl DescriptionTemplate {
    /// Parses and validates a template.
    ///
    /// Besides syntax, the template is rendered once against a sample release
    /// so that references to unknown variables fail here rather than on a
    /// live webhook.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`](super::TemplateError) if the template is
    /// malformed or references unknown variables.
    pub fn parse(source: impl Into<String>) -> Result<Self, super::TemplateError> {
        let source = source.into();
        let mut handlebars = create_handlebars_registry();
        handlebars.register_template(TEMPLATE_NAME, Template::compile(&source)?);
        let template = Self { source, handlebars };

        let sample = json!({
            "provider": "github",
            "project": "example",
            "version": "1.0.0"
        });
        template.handlebars.render(TEMPLATE_NAME, &sample)?;

        Ok(template)
    }

    /// Returns the template source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the description for a release with the template compiled in
    /// [`parse`](Self::parse).
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render(&self, event: &ReleaseEvent) -> Result<String, super::TemplateError> {
        Ok(self.handlebars.render(TEMPLATE_NAME, event)?)
    }
}
