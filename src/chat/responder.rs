use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, Material};
use crate::chat::templates::{
    fill_recommendation, APOLOGY_REPLY, BATHROOM_KEYWORDS, FLOORING_KEYWORDS, OFF_TOPIC_REPLY,
    ON_TOPIC_FALLBACK, PAINT_KEYWORDS, RECOMMENDATION_TEMPLATES, SPEC_REQUEST_KEYWORDS,
    TOPIC_KEYWORDS,
};
use crate::config::CONFIG;
use crate::design::{DesignGenerator, INVALID_INPUT_SENTINEL};
use crate::inference::TextCompleter;
use crate::render::{RenderGenerator, RenderOptions};

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub on_topic: bool,
    pub materials_suggested: Vec<Material>,
    pub image_path: Option<PathBuf>,
}

impl ChatReply {
    fn off_topic() -> Self {
        ChatReply {
            response: OFF_TOPIC_REPLY.to_string(),
            on_topic: false,
            materials_suggested: Vec::new(),
            image_path: None,
        }
    }

    fn apology() -> Self {
        ChatReply {
            response: APOLOGY_REPLY.to_string(),
            on_topic: true,
            materials_suggested: Vec::new(),
            image_path: None,
        }
    }
}

/// Keyword-gated responder for finish-related questions. Can escalate a
/// specification request into the full design + render pipeline.
pub struct ChatResponder {
    catalog: Arc<Catalog>,
    completer: Option<Arc<dyn TextCompleter>>,
    design: Arc<DesignGenerator>,
    render: Option<Arc<RenderGenerator>>,
    rng: Mutex<SmallRng>,
}

impl ChatResponder {
    pub fn new(
        catalog: Arc<Catalog>,
        completer: Option<Arc<dyn TextCompleter>>,
        design: Arc<DesignGenerator>,
        render: Option<Arc<RenderGenerator>>,
    ) -> Self {
        ChatResponder {
            catalog,
            completer,
            design,
            render,
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Same as [`ChatResponder::new`] but with a fixed RNG seed so the
    /// chosen phrasing is reproducible.
    pub fn with_seed(
        catalog: Arc<Catalog>,
        completer: Option<Arc<dyn TextCompleter>>,
        design: Arc<DesignGenerator>,
        render: Option<Arc<RenderGenerator>>,
        seed: u64,
    ) -> Self {
        ChatResponder {
            catalog,
            completer,
            design,
            render,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn is_on_topic(&self, message: &str) -> bool {
        let message_lower = message.to_lowercase();
        TOPIC_KEYWORDS
            .iter()
            .any(|keyword| message_lower.contains(keyword))
    }

    fn is_specification_request(message: &str) -> bool {
        let message_lower = message.to_lowercase();
        SPEC_REQUEST_KEYWORDS
            .iter()
            .any(|keyword| message_lower.contains(keyword))
    }

    /// Up to three catalog materials relevant to the message: two per
    /// detected category (bathroom, paint, flooring) plus two per style
    /// mentioned by name, truncated in detection order.
    fn extract_relevant_materials(&self, message: &str) -> Vec<Material> {
        let message_lower = message.to_lowercase();
        let mut materials: Vec<Material> = Vec::new();

        if BATHROOM_KEYWORDS.iter().any(|kw| message_lower.contains(kw)) {
            materials.extend(
                self.catalog
                    .bathroom_finishes
                    .ceramics
                    .iter()
                    .take(2)
                    .cloned(),
            );
        }
        if PAINT_KEYWORDS.iter().any(|kw| message_lower.contains(kw)) {
            materials.extend(self.catalog.paints.interior_paints.iter().take(2).cloned());
        }
        if FLOORING_KEYWORDS.iter().any(|kw| message_lower.contains(kw)) {
            materials.extend(self.catalog.flooring.ceramic_floors.iter().take(2).cloned());
        }
        for (style_name, style) in &self.catalog.styles {
            if message_lower.contains(style_name.as_str()) {
                materials.extend(style.materials.iter().take(2).cloned());
            }
        }

        materials.truncate(3);
        materials
    }

    /// Topic gate → material extraction → response assembly. Model failures
    /// degrade to the fixed apology; nothing propagates to the caller.
    pub async fn respond(&self, message: &str) -> ChatReply {
        if !self.is_on_topic(message) {
            return ChatReply::off_topic();
        }

        let materials = self.extract_relevant_materials(message);

        let mut opener = None;
        if let Some(completer) = &self.completer {
            let prompt = format!(
                "Question: {message}\n\nProvide a helpful one-to-two sentence answer with specific recommendations:"
            );
            match completer.complete(&prompt).await {
                Ok(text) if !text.trim().is_empty() => opener = Some(text.trim().to_string()),
                Ok(_) => warn!("Chat completion was empty, assembling reply from templates"),
                Err(err) => {
                    warn!("Chat completion failed: {}", err);
                    return ChatReply::apology();
                }
            }
        }

        let response = self.assemble_reply(opener, &materials);
        ChatReply {
            response,
            on_topic: true,
            materials_suggested: materials,
            image_path: None,
        }
    }

    /// Full entry point used by the HTTP surface: answers the message and,
    /// when asked for a specification with image generation on, runs the
    /// design + render pipeline. A failed pipeline leaves the text reply
    /// intact with no image path.
    pub async fn process(&self, message: &str, generate_image: bool) -> ChatReply {
        let mut reply = self.respond(message).await;
        if !reply.on_topic || !generate_image || !Self::is_specification_request(message) {
            return reply;
        }

        let Some(render) = &self.render else {
            warn!("Specification request received but no render backend is configured");
            return reply;
        };

        let (style, space, size, colors) = detect_pipeline_params(message);
        info!(
            "Chat pipeline invocation: style={}, space={}, size={}",
            style, space, size
        );

        let specification = self.design.generate(style, space, size, &colors).await;
        if specification == INVALID_INPUT_SENTINEL {
            warn!("Chat pipeline produced invalid-input sentinel, skipping render");
            return reply;
        }

        let options = RenderOptions {
            output_dir: CONFIG.output_dir.join("chat_renders"),
            filename: Some(format!("chat_{style}_{space}.png")),
            steps: CONFIG.render_steps,
            guidance: CONFIG.render_guidance,
        };
        match render.generate(style, space, &colors, &options).await {
            Ok(path) => reply.image_path = Some(path),
            Err(err) => warn!("Chat render failed: {err:#}"),
        }
        reply
    }

    fn assemble_reply(&self, opener: Option<String>, materials: &[Material]) -> String {
        if materials.is_empty() {
            return opener.unwrap_or_else(|| ON_TOPIC_FALLBACK.to_string());
        }

        let template = {
            let mut rng = self.rng.lock();
            RECOMMENDATION_TEMPLATES[rng.gen_range(0..RECOMMENDATION_TEMPLATES.len())]
        };

        let mut reply = String::new();
        if let Some(opener) = opener {
            reply.push_str(&opener);
            reply.push_str("\n\n");
        }
        reply.push_str(&fill_recommendation(template, &materials[0]));

        if materials.len() > 1 {
            reply.push_str("\n\nMateriales recomendados:\n");
            for (idx, material) in materials.iter().enumerate() {
                reply.push_str(&format!("\n{}. {}", idx + 1, material.name));
                if !material.material_type.is_empty() {
                    reply.push_str(&format!(
                        " ({})",
                        crate::design::report::display_token(&material.material_type)
                    ));
                }
                if !material.price_range.is_empty() {
                    reply.push_str(&format!("\n   Precio: {}", material.price_range));
                }
                if !material.colors.is_empty() {
                    let colors: Vec<_> = material.colors.iter().take(3).cloned().collect();
                    reply.push_str(&format!("\n   Colores: {}", colors.join(", ")));
                }
            }
        }
        reply
    }
}

/// Heuristic style/space extraction for chat-triggered pipeline runs, with
/// the fixed defaults the rest of the message leaves unspecified.
fn detect_pipeline_params(message: &str) -> (&'static str, &'static str, &'static str, Vec<String>) {
    let message_lower = message.to_lowercase();

    let mut style = "minimalist";
    if message_lower.contains("rustic") {
        style = "rustic";
    } else if message_lower.contains("industrial") {
        style = "industrial";
    } else if message_lower.contains("brutalism") {
        style = "brutalism";
    }

    let mut space = "bathroom";
    if message_lower.contains("baño") || message_lower.contains("bathroom") {
        space = "bathroom";
    } else if message_lower.contains("cocina") || message_lower.contains("kitchen") {
        space = "kitchen";
    } else if message_lower.contains("sala") || message_lower.contains("living") {
        space = "living_room";
    }

    let colors = vec!["white".to_string(), "grey".to_string()];
    (style, space, "medium", colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BathroomFinishes, Flooring, Paints, SizeCategory, Space, Style};
    use crate::inference::{ImageSynthesizer, InferenceError, RenderRequest};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    struct FailingCompleter;

    #[async_trait]
    impl TextCompleter for FailingCompleter {
        async fn complete(&self, _prompt: &str) -> Result<String, InferenceError> {
            Err(InferenceError::MalformedResponse("down".to_string()))
        }
    }

    struct FixedSynthesizer(Vec<u8>);

    #[async_trait]
    impl ImageSynthesizer for FixedSynthesizer {
        async fn synthesize(&self, _request: &RenderRequest) -> Result<Vec<u8>, InferenceError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSynthesizer;

    #[async_trait]
    impl ImageSynthesizer for FailingSynthesizer {
        async fn synthesize(&self, _request: &RenderRequest) -> Result<Vec<u8>, InferenceError> {
            Err(InferenceError::Status {
                status: 503,
                detail: "diffusion backend offline".to_string(),
            })
        }
    }

    fn tiny_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        let bitmap = image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4));
        bitmap
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode test png");
        bytes
    }

    fn material(name: &str, material_type: &str) -> Material {
        Material {
            name: name.to_string(),
            material_type: material_type.to_string(),
            application: vec!["bathroom".to_string(), "interior".to_string()],
            colors: vec!["white".to_string(), "beige".to_string()],
            texture: "smooth".to_string(),
            finish: "matte".to_string(),
            coverage: "walls and floors".to_string(),
            price_range: "$25-45/m2".to_string(),
        }
    }

    fn test_catalog() -> Arc<Catalog> {
        let mut styles = BTreeMap::new();
        styles.insert(
            "minimalist".to_string(),
            Style {
                name: "Minimalist".to_string(),
                characteristics: "clean lines, smooth surfaces".to_string(),
                palette: vec!["white".to_string(), "grey".to_string()],
                materials: vec![material("microcement", "concrete_coating")],
            },
        );
        let mut spaces = BTreeMap::new();
        spaces.insert(
            "bathroom".to_string(),
            Space {
                space_type: "bathroom_interior".to_string(),
                considerations: vec!["Waterproofing required".to_string()],
            },
        );
        let mut sizes = BTreeMap::new();
        sizes.insert(
            "medium".to_string(),
            SizeCategory {
                range: "6-10m2".to_string(),
                optimization: vec!["Wall-hung fixtures".to_string()],
            },
        );
        Arc::new(Catalog {
            styles,
            spaces,
            sizes,
            bathroom_finishes: BathroomFinishes {
                ceramics: vec![
                    material("porcelain bathroom tile", "porcelain_tile"),
                    material("glass mosaic tiles", "glass_mosaic"),
                    material("ceramic subway tile", "ceramic_tile"),
                ],
            },
            paints: Paints {
                interior_paints: vec![material("anti-humidity latex", "latex_paint")],
                exterior_paints: Vec::new(),
            },
            flooring: Flooring {
                ceramic_floors: vec![material("wood-look porcelain", "porcelain_tile")],
                wood_floors: Vec::new(),
                vinyl_floors: Vec::new(),
            },
        })
    }

    fn responder(seed: u64) -> ChatResponder {
        let catalog = test_catalog();
        let design = Arc::new(DesignGenerator::new(catalog.clone(), None));
        ChatResponder::with_seed(catalog, None, design, None, seed)
    }

    #[tokio::test]
    async fn off_topic_message_gets_fixed_redirect() {
        let responder = responder(7);
        let reply = responder.respond("hola, cómo estás").await;
        assert!(!reply.on_topic);
        assert_eq!(reply.response, OFF_TOPIC_REPLY);
        assert!(reply.materials_suggested.is_empty());
    }

    #[tokio::test]
    async fn bathroom_question_suggests_catalog_materials() {
        let responder = responder(7);
        let reply = responder
            .respond("¿Qué enchape recomiendas para un baño moderno?")
            .await;
        assert!(reply.on_topic);
        assert!(!reply.materials_suggested.is_empty());
        assert!(reply.materials_suggested.len() <= 3);
        assert!(reply.response.contains("porcelain bathroom tile"));
    }

    #[tokio::test]
    async fn fixed_seed_makes_phrasing_reproducible() {
        let message = "necesito pintura para la pared del baño";
        let first = responder(42).respond(message).await;
        let second = responder(42).respond(message).await;
        assert_eq!(first.response, second.response);
    }

    #[tokio::test]
    async fn mixed_categories_cap_at_three_suggestions() {
        let responder = responder(7);
        let reply = responder
            .respond("busco pintura, piso y enchape para el baño")
            .await;
        assert_eq!(reply.materials_suggested.len(), 3);
    }

    #[tokio::test]
    async fn spec_request_without_image_flag_stays_text_only() {
        let responder = responder(7);
        let reply = responder
            .process("quiero la especificacion de un baño minimalista", false)
            .await;
        assert!(reply.on_topic);
        assert!(reply.image_path.is_none());
    }

    #[tokio::test]
    async fn completer_failure_degrades_to_apology() {
        let catalog = test_catalog();
        let design = Arc::new(DesignGenerator::new(catalog.clone(), None));
        let responder = ChatResponder::with_seed(
            catalog,
            Some(Arc::new(FailingCompleter)),
            design,
            None,
            7,
        );

        let reply = responder.respond("¿qué pintura recomiendas para el baño?").await;
        assert!(reply.on_topic);
        assert_eq!(reply.response, APOLOGY_REPLY);
        assert!(reply.materials_suggested.is_empty());
    }

    #[tokio::test]
    async fn spec_request_with_image_flag_runs_the_pipeline() {
        let catalog = test_catalog();
        let design = Arc::new(DesignGenerator::new(catalog.clone(), None));
        let render = Arc::new(RenderGenerator::new(Arc::new(FixedSynthesizer(tiny_png()))));
        let responder = ChatResponder::with_seed(catalog, None, design, Some(render), 7);

        let reply = responder
            .process("genera la especificacion completa del baño minimalista", true)
            .await;

        assert!(reply.on_topic);
        let path = reply.image_path.expect("pipeline produced a render");
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("chat_minimalist_bathroom.png")
        );
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn render_failure_leaves_the_text_reply_intact() {
        let catalog = test_catalog();
        let design = Arc::new(DesignGenerator::new(catalog.clone(), None));
        let render = Arc::new(RenderGenerator::new(Arc::new(FailingSynthesizer)));
        let responder = ChatResponder::with_seed(catalog, None, design, Some(render), 7);

        let reply = responder
            .process("genera la especificacion completa del baño minimalista", true)
            .await;

        assert!(reply.on_topic);
        assert!(reply.image_path.is_none());
        assert_ne!(reply.response, APOLOGY_REPLY);
        assert!(!reply.response.is_empty());
    }

    #[test]
    fn detects_pipeline_params_with_defaults() {
        let (style, space, size, colors) =
            detect_pipeline_params("quiero un render de una cocina rustic");
        assert_eq!(style, "rustic");
        assert_eq!(space, "kitchen");
        assert_eq!(size, "medium");
        assert_eq!(colors, vec!["white".to_string(), "grey".to_string()]);

        let (style, space, _, _) = detect_pipeline_params("especificacion completa por favor");
        assert_eq!(style, "minimalist");
        assert_eq!(space, "bathroom");
    }

    #[test]
    fn specification_request_detection_matches_keywords() {
        assert!(ChatResponder::is_specification_request(
            "Genera una especificacion del proyecto"
        ));
        assert!(ChatResponder::is_specification_request(
            "quiero un render del baño"
        ));
        assert!(!ChatResponder::is_specification_request(
            "¿qué pintura me recomiendas?"
        ));
    }
}
