use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::inference::{ImageSynthesizer, RenderRequest};

pub const RENDER_RESOLUTION: u32 = 768;

const QUALITY_SUFFIX: &str = "photorealistic, high quality, architectural digest style, professional photography, 8k, detailed textures, realistic materials";

const NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, cartoon, anime, painting, sketch, unrealistic, oversaturated, people, humans, text, watermark, signature";

const STYLE_PROMPTS: [(&str, &str); 8] = [
    (
        "rustic",
        "rustic architectural design, natural stone cladding, weathered wood texture, organic materials, warm lighting",
    ),
    (
        "brutalism",
        "brutalist architecture, exposed concrete walls, raw materials, geometric shapes, dramatic lighting, modern design",
    ),
    (
        "minimalist",
        "minimalist interior design, clean lines, smooth surfaces, white walls, simple elegant, natural light",
    ),
    (
        "industrial",
        "industrial style, exposed brick walls, metal accents, urban design, loft aesthetic, Edison lighting",
    ),
    (
        "modern",
        "modern contemporary architecture, sleek materials, glass and steel, clean geometric design, professional lighting",
    ),
    (
        "mediterranean",
        "mediterranean architecture, stucco walls, terracotta accents, warm earth tones, soft textures, natural lighting",
    ),
    (
        "scandinavian",
        "scandinavian design, light wood, white walls, cozy atmosphere, natural materials, bright airy space",
    ),
    (
        "contemporary_luxury",
        "luxury contemporary design, marble surfaces, premium materials, elegant sophisticated, ambient lighting",
    ),
];

const SPACE_PROMPTS: [(&str, &str); 8] = [
    (
        "facade",
        "exterior facade view, architectural photography, building exterior, professional real estate photography",
    ),
    (
        "living_room",
        "living room interior, residential space, comfortable seating area, interior design photography",
    ),
    (
        "kitchen",
        "modern kitchen interior, culinary space, functional design, interior architecture",
    ),
    (
        "bathroom",
        "bathroom interior, spa-like atmosphere, clean design, interior photography",
    ),
    (
        "bedroom",
        "bedroom interior, sleeping area, peaceful atmosphere, residential design",
    ),
    (
        "office",
        "office interior, workspace design, professional environment, commercial interior",
    ),
    (
        "restaurant",
        "restaurant interior, dining space, hospitality design, commercial photography",
    ),
    (
        "store",
        "retail store interior, commercial space, display area, shop design",
    ),
];

fn lookup(table: &'static [(&str, &str)], key: &str, fallback: &'static str) -> &'static str {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, phrase)| *phrase)
        .unwrap_or(fallback)
}

/// Builds the positive/negative prompt pair for a render. Unknown style or
/// space keys fall back to generic phrases rather than failing.
pub fn build_render_prompt(style: &str, space: &str, colors: &[String]) -> (String, String) {
    let mut prompt = format!(
        "{}, {}",
        lookup(&STYLE_PROMPTS, style, "architectural design"),
        lookup(&SPACE_PROMPTS, space, "interior space"),
    );

    if !colors.is_empty() {
        prompt.push_str(&format!(", {} color palette", colors.join(" ")));
    }

    prompt.push_str(", ");
    prompt.push_str(QUALITY_SUFFIX);

    (prompt, NEGATIVE_PROMPT.to_string())
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub output_dir: PathBuf,
    pub filename: Option<String>,
    pub steps: u32,
    pub guidance: f32,
}

/// Delegates pixel generation to an external diffusion service and persists
/// the returned bitmap as PNG.
pub struct RenderGenerator {
    synthesizer: Arc<dyn ImageSynthesizer>,
}

impl RenderGenerator {
    pub fn new(synthesizer: Arc<dyn ImageSynthesizer>) -> Self {
        RenderGenerator { synthesizer }
    }

    pub async fn generate(
        &self,
        style: &str,
        space: &str,
        colors: &[String],
        options: &RenderOptions,
    ) -> Result<PathBuf> {
        let (prompt, negative_prompt) = build_render_prompt(style, space, colors);
        info!("Generating render: style={}, space={}", style, space);

        let request = RenderRequest {
            prompt,
            negative_prompt,
            steps: options.steps,
            guidance: options.guidance,
            width: RENDER_RESOLUTION,
            height: RENDER_RESOLUTION,
        };
        let bytes = self
            .synthesizer
            .synthesize(&request)
            .await
            .context("diffusion service call failed")?;

        tokio::fs::create_dir_all(&options.output_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create render directory '{}'",
                    options.output_dir.display()
                )
            })?;

        let filename = options
            .filename
            .clone()
            .unwrap_or_else(|| format!("{style}_{space}_render.png"));
        let path = options.output_dir.join(filename);

        let bitmap = image::load_from_memory(&bytes)
            .context("diffusion service returned an unreadable bitmap")?;
        bitmap
            .save(&path)
            .with_context(|| format!("failed to write render to '{}'", path.display()))?;

        info!("Render saved: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferenceError;
    use async_trait::async_trait;
    use std::io::Cursor;

    #[test]
    fn prompt_uses_style_and_space_tables() {
        let colors = vec!["grey".to_string(), "beige".to_string()];
        let (prompt, negative) = build_render_prompt("rustic", "facade", &colors);

        assert!(prompt.starts_with("rustic architectural design"));
        assert!(prompt.contains("exterior facade view"));
        assert!(prompt.contains("grey beige color palette"));
        assert!(prompt.ends_with(QUALITY_SUFFIX));
        assert_eq!(negative, NEGATIVE_PROMPT);
    }

    #[test]
    fn unknown_keys_fall_back_to_generic_phrases() {
        let (prompt, _) = build_render_prompt("victorian", "attic", &[]);
        assert!(prompt.starts_with("architectural design, interior space"));
        assert!(prompt.ends_with(QUALITY_SUFFIX));
    }

    struct FixedSynthesizer(Vec<u8>);

    #[async_trait]
    impl ImageSynthesizer for FixedSynthesizer {
        async fn synthesize(&self, _request: &RenderRequest) -> Result<Vec<u8>, InferenceError> {
            Ok(self.0.clone())
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

    #[tokio::test]
    async fn persists_returned_bitmap_with_default_filename() {
        let generator = RenderGenerator::new(Arc::new(FixedSynthesizer(tiny_png())));
        let output_dir = std::env::temp_dir().join("cladding_studio_render_test");
        let options = RenderOptions {
            output_dir: output_dir.clone(),
            filename: None,
            steps: 4,
            guidance: 7.5,
        };

        let path = generator
            .generate("rustic", "facade", &[], &options)
            .await
            .expect("render succeeds");

        assert_eq!(path, output_dir.join("rustic_facade_render.png"));
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn unreadable_bitmap_is_an_error() {
        let generator = RenderGenerator::new(Arc::new(FixedSynthesizer(vec![1, 2, 3])));
        let options = RenderOptions {
            output_dir: std::env::temp_dir(),
            filename: Some("never_written.png".to_string()),
            steps: 4,
            guidance: 7.5,
        };
        let result = generator.generate("rustic", "facade", &[], &options).await;
        assert!(result.is_err());
    }
}
