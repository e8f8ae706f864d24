use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogOptions, Space, Style};
use crate::design::report::{build_report, INVALID_INPUT_SENTINEL};
use crate::design::selector::select_materials;
use crate::inference::TextCompleter;

/// Composition root for the textual pipeline: catalog lookup → material
/// selection → report assembly → optional model-written philosophy section.
pub struct DesignGenerator {
    catalog: Arc<Catalog>,
    completer: Option<Arc<dyn TextCompleter>>,
}

impl DesignGenerator {
    pub fn new(catalog: Arc<Catalog>, completer: Option<Arc<dyn TextCompleter>>) -> Self {
        DesignGenerator { catalog, completer }
    }

    /// Produces the full specification text. Unknown style/space/size keys
    /// short-circuit to [`INVALID_INPUT_SENTINEL`]; the caller checks for
    /// that string instead of handling an error.
    pub async fn generate(
        &self,
        style_key: &str,
        space_key: &str,
        size_key: &str,
        colors: &[String],
    ) -> String {
        let (Some(style), Some(space), Some(size)) = (
            self.catalog.style(style_key),
            self.catalog.space(space_key),
            self.catalog.size(size_key),
        ) else {
            warn!(
                "Invalid specification request: style='{}', space='{}', size='{}'",
                style_key, space_key, size_key
            );
            return INVALID_INPUT_SENTINEL.to_string();
        };

        let materials = select_materials(&style.materials, &space.space_type, colors);
        info!(
            "Generating specification: style={}, space={}, size={}, materials={}",
            style_key,
            space_key,
            size_key,
            materials.len()
        );

        let mut spec = build_report(style, space, size, &materials, size_key);
        spec.push_str("\nDESIGN PHILOSOPHY:\n");
        spec.push_str(&self.philosophy(style, space, size_key, colors).await);
        spec.push('\n');
        spec
    }

    /// The one model-augmented section. Any completer failure degrades to
    /// the fixed template so the report never depends on the model being up.
    async fn philosophy(
        &self,
        style: &Style,
        space: &Space,
        size_key: &str,
        colors: &[String],
    ) -> String {
        let fallback = format!(
            "This {} design emphasizes {}.",
            style.name, style.characteristics
        );

        let Some(completer) = &self.completer else {
            return fallback;
        };

        let prompt = format!(
            "Write a short design philosophy paragraph for a {} style {} of {} size.\nFocus on {}.\nPreferred colors: {}.\nKeep it technical and professional.",
            style.name,
            crate::design::report::display_token(&space.space_type),
            size_key,
            style.characteristics,
            colors.join(", ")
        );

        match completer.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Philosophy completion was empty, using template");
                fallback
            }
            Err(err) => {
                warn!("Philosophy completion failed, using template: {}", err);
                fallback
            }
        }
    }

    pub fn options(&self) -> CatalogOptions {
        self.catalog.options()
    }
}
