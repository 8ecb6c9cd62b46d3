use serde::{Deserialize, Serialize};

use super::{contains_folded, not_blank, required, CatalogEntity, SpecPair, ValidationError};
use crate::model::Model;

/// A product shown in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub numeric_id: u64,
    pub title: String,
    pub short: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub specs: Vec<SpecPair>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

/// Body of a product creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: Option<String>,
    pub short: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub badges: Option<Vec<String>>,
    pub highlights: Option<Vec<String>>,
    pub specs: Option<Vec<SpecPair>>,
}

/// Body of a product update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs: Option<Vec<SpecPair>>,
}

impl Model for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> String {
        self.numeric_id.to_string()
    }
}

impl CatalogEntity for Product {
    const SEQUENCE: &'static str = "products";
    const KIND: &'static str = "product";

    type New = NewProduct;
    type Patch = ProductPatch;

    fn numeric_id(&self) -> u64 {
        self.numeric_id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn gallery(&self) -> &[String] {
        &self.gallery
    }

    fn created_at(&self) -> u64 {
        self.created_at
    }

    fn set_updated_at(&mut self, at: u64) {
        self.updated_at = at;
    }

    fn validate_new(input: &NewProduct) -> Result<(), ValidationError> {
        required("title", input.title.as_deref())?;
        required("short", input.short.as_deref())
    }

    fn from_new(input: NewProduct, numeric_id: u64, now: u64) -> Self {
        Self {
            numeric_id,
            title: input.title.unwrap_or_default(),
            short: input.short.unwrap_or_default(),
            gallery: input.gallery.unwrap_or_default(),
            badges: input.badges.unwrap_or_default(),
            highlights: input.highlights.unwrap_or_default(),
            specs: input.specs.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn validate_patch(patch: &ProductPatch) -> Result<(), ValidationError> {
        not_blank("title", patch.title.as_deref())?;
        not_blank("short", patch.short.as_deref())
    }

    fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(short) = patch.short {
            self.short = short;
        }
        if let Some(gallery) = patch.gallery {
            self.gallery = gallery;
        }
        if let Some(badges) = patch.badges {
            self.badges = badges;
        }
        if let Some(highlights) = patch.highlights {
            self.highlights = highlights;
        }
        if let Some(specs) = patch.specs {
            self.specs = specs;
        }
    }

    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty() || contains_folded(&self.title, &needle) || contains_folded(&self.short, &needle)
    }
}
