// pawhaven-web/src/templates.rs
// ============================================================================
// Module: Page Templates
// Description: Compiled Tera templates embedded in the binary.
// Purpose: Render every HTML page from one template set.
// Dependencies: tera
// ============================================================================

//! ## Overview
//! Templates are embedded with `include_str!` and compiled once at startup,
//! so a broken template fails server initialization instead of a request.
//! Names ending in `.html` are auto-escaped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tera::Context;
use tera::Tera;

use crate::error::WebError;

// ============================================================================
// SECTION: Template Set
// ============================================================================

/// Embedded templates by name.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("pets.html", include_str!("../templates/pets.html")),
    ("pet_detail.html", include_str!("../templates/pet_detail.html")),
    ("contact.html", include_str!("../templates/contact.html")),
    ("adoption_process.html", include_str!("../templates/adoption_process.html")),
    ("adoption_gate.html", include_str!("../templates/adoption_gate.html")),
    ("adoption_apply.html", include_str!("../templates/adoption_apply.html")),
    ("success_stories.html", include_str!("../templates/success_stories.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("account.html", include_str!("../templates/account.html")),
    ("account_applications.html", include_str!("../templates/account_applications.html")),
    ("account_edit.html", include_str!("../templates/account_edit.html")),
    ("admin/dashboard.html", include_str!("../templates/admin/dashboard.html")),
    ("admin/applications.html", include_str!("../templates/admin/applications.html")),
    (
        "admin/application_detail.html",
        include_str!("../templates/admin/application_detail.html"),
    ),
    ("admin/pets.html", include_str!("../templates/admin/pets.html")),
    ("admin/pet_form.html", include_str!("../templates/admin/pet_form.html")),
    ("admin/messages.html", include_str!("../templates/admin/messages.html")),
    ("admin/story_form.html", include_str!("../templates/admin/story_form.html")),
];

/// Compiled page templates.
pub struct Templates {
    /// Template engine holding every embedded template.
    tera: Tera,
}

impl Templates {
    /// Compiles the embedded templates.
    ///
    /// # Errors
    ///
    /// Returns [`tera::Error`] when a template fails to parse.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Renders `name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Internal`] when rendering fails.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, WebError> {
        Ok(self.tera.render(name, context)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::*;

    #[test]
    fn embedded_templates_compile() {
        let templates = Templates::new().unwrap();
        let mut context = Context::new();
        context.insert("title", "About");
        let html = templates.render("about.html", &context).unwrap();
        assert!(html.contains("PawHaven"));
    }

    #[test]
    fn values_are_escaped() {
        let templates = Templates::new().unwrap();
        let mut context = Context::new();
        context.insert(
            "notice",
            &serde_json::json!({"level": "success", "text": "<b>hi</b>"}),
        );
        let html = templates.render("about.html", &context).unwrap();
        assert!(html.contains("&lt;b&gt;hi&lt;&#x2F;b&gt;"));
    }
}
