use crate::error::{CatalogError, Result};
use std::collections::HashMap;
use stockkeeper_protocol::CatalogProduct;

/// Strip everything that is not alphanumeric and uppercase the rest.
///
/// Customers write "cbt 8901", "CBT-8901", "Cbt.8901"; all of them must hit
/// the canonical "CBT8901" row.
pub fn normalize_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Read-only product store keyed by normalized product ID.
///
/// Insertion order is preserved; the fuzzy matcher relies on it for stable
/// tie-breaking. Safe to share across concurrent mention resolutions since
/// nothing here mutates after construction.
#[derive(Debug)]
pub struct CatalogIndex {
    products: Vec<CatalogProduct>,
    by_normalized_id: HashMap<String, usize>,
}

impl CatalogIndex {
    /// Build the index, validating catalog well-formedness.
    ///
    /// Duplicate normalized IDs and an empty catalog abort construction;
    /// these are the only fatal conditions in the whole pipeline.
    pub fn from_products(products: Vec<CatalogProduct>) -> Result<Self> {
        if products.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut by_normalized_id = HashMap::with_capacity(products.len());
        for (idx, product) in products.iter().enumerate() {
            let key = normalize_id(&product.id);
            if by_normalized_id.insert(key, idx).is_some() {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        log::info!("Catalog index built: {} products", products.len());
        Ok(Self {
            products,
            by_normalized_id,
        })
    }

    /// Exact lookup with tolerance for formatting noise.
    ///
    /// Malformed or empty input is "not found", never an error.
    pub fn lookup_exact(&self, raw_id: &str) -> Option<&CatalogProduct> {
        let key = normalize_id(raw_id);
        if key.is_empty() {
            return None;
        }
        self.by_normalized_id
            .get(&key)
            .map(|&idx| &self.products[idx])
    }

    /// All products in catalog insertion order.
    pub fn all_products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stockkeeper_protocol::{ProductCategory, Season};

    fn product(id: &str, name: &str) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: ProductCategory::MensShoes,
            price: 49.99,
            stock: 10,
            season: Season::Fall,
        }
    }

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(normalize_id("cbt 8901"), "CBT8901");
        assert_eq!(normalize_id("CBT-8901"), "CBT8901");
        assert_eq!(normalize_id("  cbt.8901  "), "CBT8901");
        assert_eq!(normalize_id("!!!"), "");
    }

    #[test]
    fn lookup_tolerates_formatting() {
        let index = CatalogIndex::from_products(vec![
            product("CBT8901", "Chelsea Boots"),
            product("SFT1098", "Infinity Scarf"),
        ])
        .unwrap();

        assert_eq!(index.lookup_exact("cbt 8901").unwrap().name, "Chelsea Boots");
        assert_eq!(index.lookup_exact("SFT-1098").unwrap().name, "Infinity Scarf");
        assert!(index.lookup_exact("XXX9999").is_none());
        assert!(index.lookup_exact("").is_none());
        assert!(index.lookup_exact("---").is_none());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = CatalogIndex::from_products(vec![
            product("CBT8901", "Chelsea Boots"),
            product("cbt-8901", "Chelsea Boots (restock)"),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(_)));
    }

    #[test]
    fn empty_catalog_rejected() {
        let err = CatalogIndex::from_products(vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCatalog));
    }

    #[test]
    fn insertion_order_preserved() {
        let index = CatalogIndex::from_products(vec![
            product("AAA1111", "First"),
            product("BBB2222", "Second"),
        ])
        .unwrap();
        let names: Vec<&str> = index.all_products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
