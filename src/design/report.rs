use std::fmt::Write as _;

use crate::catalog::{parse_price_range, Material, SizeCategory, Space, Style};

/// Returned whole when a requested style, space, or size key is unknown.
/// Callers check for this string; it is never raised as an error.
pub const INVALID_INPUT_SENTINEL: &str = "Error: Invalid style, space, or size";

/// Budget fallback when no selected material carries a parseable price.
/// Returned verbatim, without the size multiplier.
pub const DEFAULT_BUDGET: (u32, u32) = (100, 200);

const MAINTENANCE_NOTES: [(&str, &str); 8] = [
    ("stone", "Annual cleaning, re-seal every 2 years"),
    ("wood", "Varnish/oil treatment every 12-18 months"),
    ("concrete", "Low maintenance, occasional sealing"),
    ("metal", "Corrosion check annually, clean as needed"),
    ("ceramic", "Regular cleaning, grout maintenance"),
    ("porcelain", "Minimal maintenance, easy cleaning"),
    ("glass", "Regular cleaning, check seals"),
    ("stucco", "Touch-up as needed, wash annually"),
];

const GENERIC_MAINTENANCE: &str = "  - Standard maintenance per manufacturer specs\n";

/// `"living_room"` → `"Living Room"`.
pub fn display_token(raw: &str) -> String {
    raw.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Averages the selected materials' parseable price bounds (integer
/// division) and scales by the size multiplier. Materials with malformed
/// prices are skipped silently.
pub fn estimate_budget(materials: &[&Material], size_name: &str) -> (u32, u32) {
    let prices: Vec<_> = materials
        .iter()
        .filter_map(|m| parse_price_range(&m.price_range))
        .collect();
    if prices.is_empty() {
        return DEFAULT_BUDGET;
    }

    let count = prices.len() as u32;
    let avg_low = prices.iter().map(|p| p.low).sum::<u32>() / count;
    let avg_high = prices.iter().map(|p| p.high).sum::<u32>() / count;

    let factor = match size_name {
        "small" => 1.2,
        "medium" => 1.0,
        "large" => 0.9,
        _ => 1.0,
    };

    (
        (avg_low as f32 * factor) as u32,
        (avg_high as f32 * factor) as u32,
    )
}

fn maintenance_notes(materials: &[&Material]) -> String {
    let mut notes = String::new();
    for material in materials {
        let type_token = material
            .material_type
            .split('_')
            .next()
            .unwrap_or(&material.material_type);
        if let Some((_, instruction)) = MAINTENANCE_NOTES
            .iter()
            .find(|(known, _)| *known == type_token)
        {
            let _ = writeln!(notes, "  - {}: {}", material.name, instruction);
        }
    }
    if notes.is_empty() {
        GENERIC_MAINTENANCE.to_string()
    } else {
        notes
    }
}

/// Deterministic specification text in fixed section order. Pure string
/// composition; every value comes from the catalog records passed in.
pub fn build_report(
    style: &Style,
    space: &Space,
    size: &SizeCategory,
    materials: &[&Material],
    size_name: &str,
) -> String {
    let mut spec = String::new();

    let _ = write!(
        spec,
        "DESIGN SPECIFICATION - {} STYLE\n\n",
        style.name.to_uppercase()
    );
    let _ = writeln!(spec, "SPACE DETAILS:");
    let _ = writeln!(spec, "Type: {}", display_token(&space.space_type));
    let _ = writeln!(spec, "Size: {} ({})", display_token(size_name), size.range);
    let _ = writeln!(spec, "Style: {}", style.name);
    let _ = writeln!(spec, "Characteristics: {}\n", style.characteristics);

    spec.push_str("PRIMARY MATERIALS:\n\n");
    for (idx, material) in materials.iter().enumerate() {
        let _ = writeln!(
            spec,
            "{}. {} ({})",
            idx + 1,
            material.name.to_uppercase(),
            display_token(&material.material_type)
        );
        let _ = writeln!(spec, "   Colors: {}", material.colors.join(", "));
        let _ = writeln!(spec, "   Texture: {}", material.texture);
        let _ = writeln!(spec, "   Finish: {}", material.finish);
        let _ = writeln!(spec, "   Application: {}", material.application.join(", "));
        let _ = writeln!(spec, "   Coverage: {}", material.coverage);
        let _ = writeln!(spec, "   Price: {}\n", material.price_range);
    }

    spec.push_str("COLOR PALETTE:\n");
    for (idx, color) in style.palette.iter().take(4).enumerate() {
        let _ = writeln!(spec, "  {}. {}", idx + 1, color);
    }

    let _ = write!(
        spec,
        "\nSPACE OPTIMIZATION ({}):\n",
        size_name.to_uppercase()
    );
    for opt in &size.optimization {
        let _ = writeln!(spec, "  - {}", opt);
    }

    spec.push_str("\nTECHNICAL CONSIDERATIONS:\n");
    for consideration in &space.considerations {
        let _ = writeln!(spec, "  - {}", consideration);
    }

    let (low, high) = estimate_budget(materials, size_name);
    let _ = write!(spec, "\nESTIMATED BUDGET: ${}-{}/m2\n", low, high);

    spec.push_str("\nMAINTENANCE:\n");
    spec.push_str(&maintenance_notes(materials));

    spec
}
