//! Catalog seeding from a YAML file.
//!
//! # Usage
//!
//! ```bash
//! atelier seed catalog.yaml
//! ```
//!
//! The file holds the documents to write:
//!
//! ```yaml
//! categories:
//!   - name: Summer Dresses
//! products:
//!   - name: Linen Shirt
//!     price: "60"
//!     sizes: [S, M, L]
//!     category: shirts
//! hero:
//!   title: New Season
//! ```
//!
//! Missing ids are derived from the name, missing category slugs likewise.
//! Every record is validated before anything is written; existing documents
//! with the same id are replaced.

use std::path::Path;

use serde::Deserialize;

use atelier_core::{Category, CategoryId, FooterSettings, HeroSection, Product, ProductId};
use atelier_store::{SiteSetting, Store, paths};

use super::CliError;

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub hero: Option<HeroSection>,
    #[serde(default)]
    pub footer: Option<FooterSettings>,
}

/// Counts of documents written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub settings: usize,
}

impl SeedFile {
    /// Parse seed YAML.
    pub fn parse(yaml: &str) -> Result<Self, CliError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Fill in derived ids and slugs, then validate every record.
    pub fn prepare(mut self) -> Result<Self, CliError> {
        for category in &mut self.categories {
            category.ensure_slug();
            if category.id.as_str().is_empty() {
                category.id = CategoryId::new(category.slug.clone());
            }
            category.validate().map_err(|errors| CliError::Invalid {
                kind: "category",
                name: category.name.clone(),
                errors,
            })?;
        }

        for product in &mut self.products {
            if product.id.as_str().is_empty() {
                product.id = ProductId::new(Category::slugify(&product.name));
            }
            product.validate().map_err(|errors| CliError::Invalid {
                kind: "product",
                name: product.name.clone(),
                errors,
            })?;
        }

        Ok(self)
    }

    /// Write the prepared documents.
    pub async fn apply(self, store: &Store) -> Result<SeedReport, CliError> {
        let mut report = SeedReport {
            categories: 0,
            products: 0,
            settings: 0,
        };

        for category in &self.categories {
            store.put(&paths::category(&category.id)?, category).await?;
            report.categories += 1;
        }
        for product in &self.products {
            store.put(&paths::product(&product.id)?, product).await?;
            report.products += 1;
        }
        if let Some(hero) = &self.hero {
            store.put(&paths::site_setting(SiteSetting::Hero)?, hero).await?;
            report.settings += 1;
        }
        if let Some(footer) = &self.footer {
            store
                .put(&paths::site_setting(SiteSetting::Footer)?, footer)
                .await?;
            report.settings += 1;
        }

        Ok(report)
    }
}

/// Seed the store behind `DATABASE_URL` from `file`.
pub async fn run(file: &Path) -> Result<(), CliError> {
    let yaml = std::fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.display().to_string(),
        source,
    })?;
    let seed = SeedFile::parse(&yaml)?.prepare()?;

    let connected = super::connect().await?;
    let report = seed.apply(&connected.store).await?;

    tracing::info!(
        categories = report.categories,
        products = report.products,
        settings = report.settings,
        "Seed complete"
    );
    Ok(())
}
