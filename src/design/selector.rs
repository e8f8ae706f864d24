use crate::catalog::Material;

/// Picks at most three materials for a space, in catalog insertion order.
///
/// Filtering is staged: materials tagged with the coarse space category
/// first, then the "interior" tag, then the full list. A requested color
/// narrows the set only when it matches something; a color mismatch never
/// empties the result. Color matching is a case-insensitive substring test
/// against the joined color text, so "grey" also matches "greyish-blue";
/// that fuzziness is intentional.
pub fn select_materials<'a>(
    materials: &'a [Material],
    space_type: &str,
    colors: &[String],
) -> Vec<&'a Material> {
    let category = space_type.split('_').next().unwrap_or(space_type);

    let mut filtered: Vec<&Material> = materials
        .iter()
        .filter(|m| m.application.iter().any(|tag| tag == category))
        .collect();

    if filtered.is_empty() {
        filtered = materials
            .iter()
            .filter(|m| m.application.iter().any(|tag| tag == "interior"))
            .collect();
    }

    if filtered.is_empty() {
        filtered = materials.iter().collect();
    }

    if !colors.is_empty() {
        let color_matched: Vec<&Material> = filtered
            .iter()
            .copied()
            .filter(|m| {
                let joined = m.colors.join(" ").to_lowercase();
                colors
                    .iter()
                    .any(|color| joined.contains(&color.to_lowercase()))
            })
            .collect();
        if !color_matched.is_empty() {
            filtered = color_matched;
        }
    }

    filtered.truncate(3);
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(name: &str, application: &[&str], colors: &[&str]) -> Material {
        Material {
            name: name.to_string(),
            material_type: "stone_cladding".to_string(),
            application: application.iter().map(|s| s.to_string()).collect(),
            colors: colors.iter().map(|s| s.to_string()).collect(),
            texture: "rough".to_string(),
            finish: "natural".to_string(),
            coverage: "wall".to_string(),
            price_range: "$25-45/m2".to_string(),
        }
    }

    fn colors(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filters_by_coarse_space_category() {
        let materials = vec![
            material("slate", &["facade"], &["grey"]),
            material("oak panel", &["interior"], &["brown"]),
        ];
        let selected = select_materials(&materials, "facade_exterior", &[]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "slate");
    }

    #[test]
    fn falls_back_to_interior_then_full_list() {
        let materials = vec![
            material("oak panel", &["interior"], &["brown"]),
            material("pine slat", &["interior"], &["beige"]),
        ];
        let selected = select_materials(&materials, "facade_exterior", &[]);
        assert_eq!(selected.len(), 2);

        let exterior_only = vec![material("slate", &["facade"], &["grey"])];
        let selected = select_materials(&exterior_only, "pool_exterior", &[]);
        assert_eq!(selected.len(), 1, "full list is the last fallback");
    }

    #[test]
    fn never_returns_more_than_three() {
        let materials: Vec<Material> = (0..6)
            .map(|i| material(&format!("m{i}"), &["interior"], &["white"]))
            .collect();
        let selected = select_materials(&materials, "living_interior", &[]);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].name, "m0", "catalog insertion order is kept");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let selected = select_materials(&[], "facade_exterior", &colors(&["grey"]));
        assert!(selected.is_empty());
    }

    #[test]
    fn color_mismatch_keeps_previous_set() {
        let materials = vec![
            material("slate", &["facade"], &["grey"]),
            material("granite", &["facade"], &["black"]),
        ];
        let selected = select_materials(&materials, "facade_exterior", &colors(&["turquoise"]));
        assert_eq!(selected.len(), 2, "color filter is ignored, not zeroed");
    }

    #[test]
    fn color_match_is_substring_fuzzy() {
        let materials = vec![
            material("slate", &["facade"], &["greyish-blue"]),
            material("granite", &["facade"], &["black"]),
        ];
        let selected = select_materials(&materials, "facade_exterior", &colors(&["grey"]));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "slate");
    }
}
