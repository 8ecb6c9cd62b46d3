use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{contains_folded, not_blank, required, CatalogEntity, SpecPair, ValidationError};
use crate::model::Model;

/// Delivery state of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Delivered,
    InProgress,
    Prototype,
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    /// Parses the wire names: `delivered`, `in-progress`, `prototype`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "delivered" => Ok(ProjectStatus::Delivered),
            "in-progress" => Ok(ProjectStatus::InProgress),
            "prototype" => Ok(ProjectStatus::Prototype),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// A delivered or ongoing project shown in the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub numeric_id: u64,
    pub title: String,
    pub summary: String,
    pub gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub specs: Vec<SpecPair>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

/// Body of a project creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub year: Option<i32>,
    pub status: Option<ProjectStatus>,
    pub overview: Option<String>,
    pub tags: Option<Vec<String>>,
    pub specs: Option<Vec<SpecPair>>,
}

/// Body of a project update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs: Option<Vec<SpecPair>>,
}

impl Model for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> String {
        self.numeric_id.to_string()
    }
}

impl CatalogEntity for Project {
    const SEQUENCE: &'static str = "projects";
    const KIND: &'static str = "project";

    type New = NewProject;
    type Patch = ProjectPatch;

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

    fn validate_new(input: &NewProject) -> Result<(), ValidationError> {
        required("title", input.title.as_deref())?;
        required("summary", input.summary.as_deref())?;
        match &input.gallery {
            Some(gallery) if !gallery.is_empty() => Ok(()),
            _ => Err(ValidationError::EmptyGallery),
        }
    }

    fn from_new(input: NewProject, numeric_id: u64, now: u64) -> Self {
        Self {
            numeric_id,
            title: input.title.unwrap_or_default(),
            summary: input.summary.unwrap_or_default(),
            gallery: input.gallery.unwrap_or_default(),
            year: input.year,
            status: input.status.unwrap_or_default(),
            overview: input.overview.unwrap_or_default(),
            tags: input.tags.unwrap_or_default(),
            specs: input.specs.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn validate_patch(patch: &ProjectPatch) -> Result<(), ValidationError> {
        not_blank("title", patch.title.as_deref())?;
        not_blank("summary", patch.summary.as_deref())?;
        if matches!(&patch.gallery, Some(g) if g.is_empty()) {
            return Err(ValidationError::EmptyGallery);
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: ProjectPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        if let Some(gallery) = patch.gallery {
            self.gallery = gallery;
        }
        if let Some(year) = patch.year {
            self.year = Some(year);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(overview) = patch.overview {
            self.overview = overview;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(specs) = patch.specs {
            self.specs = specs;
        }
    }

    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || contains_folded(&self.title, &needle)
            || contains_folded(&self.summary, &needle)
            || self.tags.iter().any(|t| contains_folded(t, &needle))
    }
}
