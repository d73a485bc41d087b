use crate::error::Result;
use std::path::Path;
use stockkeeper_protocol::CatalogProduct;

/// Load the full catalog from a JSON array file.
///
/// Called once before any resolution runs; IO and parse failures propagate
/// as fatal `CatalogError`s.
pub fn load_catalog_json(path: impl AsRef<Path>) -> Result<Vec<CatalogProduct>> {
    let path = path.as_ref();
    log::info!("Loading catalog from {:?}", path);
    let raw = std::fs::read_to_string(path)?;
    let products: Vec<CatalogProduct> = serde_json::from_str(&raw)?;
    log::info!("Loaded {} catalog rows", products.len());
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CatalogIndex;
    use tempfile::TempDir;

    const CATALOG_JSON: &str = r#"[
        {
            "id": "CBT8901",
            "name": "Chelsea Boots",
            "description": "Classic leather Chelsea boots with elastic side panels",
            "category": "mens_shoes",
            "price": 89.99,
            "stock": 12,
            "season": "fall"
        },
        {
            "id": "SFT1098",
            "name": "Infinity Scarf",
            "description": "Soft knit infinity scarf in a versatile loop design",
            "category": "accessories",
            "price": 19.99,
            "stock": 42,
            "season": "winter"
        }
    ]"#;

    #[test]
    fn loads_and_indexes_catalog_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.json");
        std::fs::write(&path, CATALOG_JSON).unwrap();

        let products = load_catalog_json(&path).unwrap();
        assert_eq!(products.len(), 2);

        let index = CatalogIndex::from_products(products).unwrap();
        assert!(index.lookup_exact("sft 1098").is_some());
    }

    #[test]
    fn missing_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = load_catalog_json(temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, crate::error::CatalogError::Io(_)));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_catalog_json(&path).unwrap_err();
        assert!(matches!(err, crate::error::CatalogError::Parse(_)));
    }
}
