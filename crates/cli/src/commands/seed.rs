//! Seed the product catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Teak Serving Tray
//!     price: 120
//!     image: /images/tray.jpg
//!     description: Hand-finished teak.
//!     stock: 15
//! ```
//!
//! Products are matched by name: an existing product is overwritten, a new
//! one is inserted. With `--replace`, products that no order refers to are
//! deleted first. Products that appear in order history are always kept.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use teakspice_api::db::{ProductRepository, RepositoryError, create_pool, products::NewProduct};
use teakspice_core::Price;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: TEAKSPICE_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedProduct {
    name: String,
    price: i64,
    #[serde(default)]
    image: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    stock: i32,
}

impl From<SeedProduct> for NewProduct {
    fn from(p: SeedProduct) -> Self {
        Self {
            name: p.name.trim().to_owned(),
            price: Price::new(p.price),
            image: p.image,
            description: p.description,
            stock: p.stock,
        }
    }
}

/// Parse a seed file's contents.
fn parse(content: &str) -> Result<Vec<SeedProduct>, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    Ok(file.products)
}

/// Collect every problem in the file rather than stopping at the first.
fn validate(products: &[SeedProduct]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, p) in products.iter().enumerate() {
        let name = p.name.trim();
        if name.is_empty() {
            errors.push(format!("product #{}: name is empty", i + 1));
            continue;
        }
        if p.price < 0 {
            errors.push(format!("{name}: price must not be negative"));
        }
        if p.stock < 0 {
            errors.push(format!("{name}: stock must not be negative"));
        }
        if !seen.insert(name) {
            errors.push(format!("{name}: listed more than once"));
        }
    }

    errors
}

/// Upsert products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or a database
/// operation fails. Nothing is written when validation fails.
pub async fn products(path: &Path, replace: bool) -> Result<(), SeedError> {
    if !path.exists() {
        return Err(SeedError::FileNotFound(path.display().to_string()));
    }

    info!(path = %path.display(), "Loading products from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse(&content)?;

    let errors = validate(&products);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    info!(products = products.len(), "Seed file validated");

    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;
    let pool = create_pool(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    if replace {
        let removed = repo.delete_unreferenced().await?;
        info!(removed, "Removed products not referenced by any order");
    }

    for product in products {
        let product = repo.upsert_by_name(&product.into()).await?;
        info!(id = %product.id, name = %product.name, stock = product.stock, "Upserted product");
    }

    info!("Seeding complete!");
    pool.close().await;
    Ok(())
}

/// Show catalog statistics.
///
/// # Errors
///
/// Returns an error if the database connection fails.
pub async fn stats() -> Result<(), SeedError> {
    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;
    let pool = create_pool(&database_url).await?;

    let (count, units) = ProductRepository::new(&pool).stock_summary().await?;

    info!("Catalog Statistics");
    info!("==================");
    info!("Products: {count}");
    info!("Units in stock: {units}");

    pool.close().await;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
products:
  - name: Teak Serving Tray
    price: 120
    image: /images/tray.jpg
    description: Hand-finished teak.
    stock: 15
  - name: Cardamom Pods
    price: 9
";

    #[test]
    fn test_parse_sample_with_defaults() {
        let products = parse(SAMPLE).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].stock, 15);
        assert_eq!(products[1].stock, 0);
        assert!(products[1].image.is_empty());
        assert!(validate(&products).is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = parse("products:\n  - name: A\n    price: 1\n    colour: red\n");
        assert!(matches!(result, Err(SeedError::Yaml(_))));
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let products = parse(
            r"
products:
  - name: '  '
    price: 1
  - name: Tray
    price: -5
    stock: -1
  - name: Tray
    price: 5
",
        )
        .unwrap();

        let errors = validate(&products);
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("name is empty"));
        assert!(errors.iter().any(|e| e.contains("listed more than once")));
    }

    #[test]
    fn test_conversion_trims_name() {
        let products = parse("products:\n  - name: ' Tray '\n    price: 30\n").unwrap();
        let new: NewProduct = products.into_iter().next().unwrap().into();

        assert_eq!(new.name, "Tray");
        assert_eq!(new.price, Price::new(30));
    }
}
