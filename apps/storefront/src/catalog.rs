//! Catalog cards loaded from a JSON file (array of entries).

use std::{fs, path::Path};

use anyhow::{Context, Result};
use shared::{domain::CatalogEntry, format::display_price};

pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog '{}'", path.display()))
}

/// Resolves a 1-based position first, then an exact identifier.
pub fn find_entry<'a>(catalog: &'a [CatalogEntry], key: &str) -> Option<&'a CatalogEntry> {
    if let Ok(position) = key.parse::<usize>() {
        if let Some(entry) = position.checked_sub(1).and_then(|idx| catalog.get(idx)) {
            return Some(entry);
        }
    }
    catalog.iter().find(|entry| entry.id == key)
}

pub fn render_catalog(catalog: &[CatalogEntry]) -> String {
    catalog
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            format!(
                "{:>3}. {} {} [{}]",
                idx + 1,
                entry.name,
                display_price(entry.price),
                entry.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CatalogEntry> {
        serde_json::from_str(
            r#"[
                {"id": "p-10", "name": "Bandeja", "price": 32000},
                {"id": "p-11", "name": "Ajiaco", "price": 28500}
            ]"#,
        )
        .expect("catalog")
    }

    #[test]
    fn finds_by_position_then_id() {
        let catalog = catalog();
        assert_eq!(find_entry(&catalog, "2").map(|e| e.id.as_str()), Some("p-11"));
        assert_eq!(find_entry(&catalog, "p-10").map(|e| e.id.as_str()), Some("p-10"));
        assert!(find_entry(&catalog, "0").is_none());
        assert!(find_entry(&catalog, "9").is_none());
    }

    #[test]
    fn renders_prices_with_grouping() {
        let rendered = render_catalog(&catalog());
        assert!(rendered.contains("Bandeja $32.000 [p-10]"));
        assert!(rendered.contains("  2. Ajiaco $28.500"));
    }
}
