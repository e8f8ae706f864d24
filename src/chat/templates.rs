use crate::catalog::Material;
use crate::design::report::display_token;

/// Admission list for the topic gate. Matching is a case-insensitive
/// substring test, so stems like "impermeabili" cover several word forms.
pub const TOPIC_KEYWORDS: &[&str] = &[
    // Tiles and cladding
    "enchape",
    "ceramica",
    "porcelanato",
    "azulejo",
    "mosaico",
    "revestimiento",
    "baldosa",
    "tile",
    "piedra",
    "marmol",
    "granito",
    // Paints
    "pintura",
    "pintar",
    "latex",
    "esmalte",
    "color",
    // Bathrooms
    "baño",
    "ducha",
    "shower",
    "sanitario",
    "griferia",
    "llave",
    "impermeabili",
    "humedad",
    // Floors
    "piso",
    "suelo",
    "floor",
    "parquet",
    "madera",
    "laminado",
    "vinil",
    "ceramico",
    // General finishes
    "acabado",
    "terminacion",
    "finish",
    "textura",
    "superficie",
    "pared",
    "wall",
    "techo",
    "ceiling",
    "estuco",
    "zocalo",
    "moldura",
];

pub const OFF_TOPIC_REPLY: &str = "Me especializo únicamente en terminaciones arquitectónicas como enchapes, pinturas, baños y acabados. ¿Puedo ayudarte con alguno de estos temas?";

pub const APOLOGY_REPLY: &str =
    "Lo siento, hubo un error al generar la respuesta. ¿Puedes reformular tu pregunta?";

pub const ON_TOPIC_FALLBACK: &str =
    "Puedo ayudarte con enchapes, pinturas, baños y pisos. ¿Qué material o acabado te interesa?";

pub const SPEC_REQUEST_KEYWORDS: &[&str] = &[
    "especificacion",
    "specification",
    "diseño completo",
    "complete design",
    "proyecto",
    "project",
    "render",
    "visualizacion",
    "generar diseño",
];

pub const BATHROOM_KEYWORDS: &[&str] = &["baño", "bath", "ducha", "shower"];
pub const PAINT_KEYWORDS: &[&str] = &["pintura", "paint", "pintar"];
pub const FLOORING_KEYWORDS: &[&str] = &["piso", "floor", "suelo"];

/// Fixed phrasings for the lead recommendation; one is chosen at random
/// per reply for variety.
pub const RECOMMENDATION_TEMPLATES: [&str; 3] = [
    "Para tu proyecto te recomiendo {name} ({type}), disponible en {colors}, con un precio de {price}.",
    "Una excelente opción es {name}: acabado {finish} en tonos {colors}, alrededor de {price}.",
    "Considera {name} ({type}); ofrece buena durabilidad, viene en {colors} y cuesta {price}.",
];

pub fn fill_recommendation(template: &str, material: &Material) -> String {
    let colors = if material.colors.is_empty() {
        "varios colores".to_string()
    } else {
        material
            .colors
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    let price = if material.price_range.trim().is_empty() {
        "precio variable"
    } else {
        material.price_range.as_str()
    };

    template
        .replace("{name}", &material.name)
        .replace("{type}", &display_token(&material.material_type))
        .replace("{finish}", &material.finish)
        .replace("{colors}", &colors)
        .replace("{price}", price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_placeholder() {
        let material = Material {
            name: "porcelain bathroom tile".to_string(),
            material_type: "porcelain_tile".to_string(),
            application: vec!["bathroom".to_string()],
            colors: vec!["white".to_string(), "beige".to_string()],
            texture: "smooth".to_string(),
            finish: "matte".to_string(),
            coverage: "walls and floors".to_string(),
            price_range: "$25-45/m2".to_string(),
        };

        for template in RECOMMENDATION_TEMPLATES {
            let filled = fill_recommendation(template, &material);
            assert!(!filled.contains('{'), "unfilled placeholder in: {filled}");
            assert!(filled.contains("porcelain bathroom tile"));
        }
    }

    #[test]
    fn missing_price_and_colors_use_neutral_wording() {
        let material = Material {
            name: "custom stucco".to_string(),
            material_type: "stucco_finish".to_string(),
            application: vec![],
            colors: vec![],
            texture: String::new(),
            finish: "textured".to_string(),
            coverage: String::new(),
            price_range: String::new(),
        };
        let filled = fill_recommendation(RECOMMENDATION_TEMPLATES[0], &material);
        assert!(filled.contains("varios colores"));
        assert!(filled.contains("precio variable"));
    }
}
