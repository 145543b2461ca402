/* src/render.rs */

use std::sync::LazyLock;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::Result;
use crate::footer::{ContentVariant, Disclaimer};

const FOOTER_TEMPLATE: &str = "footer";

static RENDERER: LazyLock<Result<FooterRenderer>> = LazyLock::new(FooterRenderer::new);

#[derive(Serialize)]
struct RiskWarning {
    lead: &'static str,
    headline: String,
    tail: &'static str,
}

#[derive(Serialize)]
struct FooterContext<'a> {
    name: &'static str,
    #[serde(flatten)]
    variant: &'a ContentVariant,
    risk: RiskWarning,
}

/// Footer template registered once and rendered per variant.
///
/// Values are HTML-escaped by the template engine.
#[derive(Debug)]
pub struct FooterRenderer {
    registry: Handlebars<'static>,
}

impl FooterRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_template_string(FOOTER_TEMPLATE, include_str!("templates/footer.hbs"))?;
        Ok(Self { registry })
    }

    /// Render a self-contained `<footer>` followed by the risk disclaimer.
    pub fn render(&self, variant: &ContentVariant) -> Result<String> {
        let context = FooterContext {
            name: variant.name(),
            variant,
            risk: RiskWarning {
                lead: Disclaimer::LEAD,
                headline: variant.disclaimer.headline(),
                tail: Disclaimer::TAIL,
            },
        };
        Ok(self.registry.render(FOOTER_TEMPLATE, &context)?)
    }
}

/// Render the footer fragment for a content variant with the shared renderer.
pub fn render_footer(variant: &ContentVariant) -> Result<String> {
    match &*RENDERER {
        Ok(renderer) => renderer.render(variant),
        Err(err) => Err(err.clone()),
    }
}
