//! GeoJSON feature collection for the directory map.
//!
//! See <https://geojson.org/>. Positions are `[longitude, latitude]`, the
//! reverse of the `"lat,lng"` strings stored on category terms.

use crate::core::query::DirectoryQuery;
use crate::domain::model::{CategoryTerm, DirectoryEntry, ImageSizes, LogoSize, QueryArgs, TermId};
use crate::domain::ports::DirectoryStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Position([f64; 2]),
    /// Already-structured geo metadata, passed through as stored.
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub id: TermId,
    pub name: String,
    pub slug: String,
    pub sites: Vec<SiteSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSummary {
    pub post_name: String,
    pub post_title: String,
    pub post_excerpt: String,
    pub post_content: String,
    pub meta: SiteMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMeta {
    pub siteurl: String,
    pub sitelogo: String,
}

/// Convert stored geo metadata into a GeoJSON position.
///
/// `"lat,lng"` becomes `[lng, lat]`. Non-string values are returned unchanged.
/// Strings that do not hold two finite numbers yield `None`.
pub fn geo_to_position(geo: &Value) -> Option<Coordinates> {
    let Value::String(text) = geo else {
        return Some(Coordinates::Raw(geo.clone()));
    };

    let mut parts = text.split(',').map(str::trim);
    let mut coordinate = || parts.next()?.parse::<f64>().ok().filter(|n| n.is_finite());
    let latitude = coordinate()?;
    let longitude = coordinate()?;
    Some(Coordinates::Position([longitude, latitude]))
}

pub struct MapDataBuilder<'q, 'a, S: DirectoryStore + ?Sized> {
    query: &'q DirectoryQuery<'a, S>,
    logo_size: &'q LogoSize,
    sizes: &'q ImageSizes,
}

impl<'q, 'a, S: DirectoryStore + ?Sized> MapDataBuilder<'q, 'a, S> {
    pub fn new(query: &'q DirectoryQuery<'a, S>, logo_size: &'q LogoSize, sizes: &'q ImageSizes) -> Self {
        Self {
            query,
            logo_size,
            sizes,
        }
    }

    pub fn build(&self, terms: &[CategoryTerm]) -> FeatureCollection {
        let mut collection = FeatureCollection::default();
        for term in terms {
            match self.feature(term) {
                Some(feature) => collection.features.push(feature),
                None => tracing::warn!(
                    "Skipping category '{}': unusable geo metadata {:?}",
                    term.slug,
                    term.geo()
                ),
            }
        }
        tracing::debug!("Built {} map features", collection.features.len());
        collection
    }

    fn feature(&self, term: &CategoryTerm) -> Option<Feature> {
        let coordinates = geo_to_position(term.geo()?)?;

        Some(Feature {
            kind: "Feature".to_string(),
            geometry: Geometry {
                kind: "Point".to_string(),
                coordinates,
            },
            properties: FeatureProperties {
                id: term.term_id,
                name: term.name.clone(),
                slug: term.slug.clone(),
                sites: self.site_summaries(term),
            },
        })
    }

    fn site_summaries(&self, term: &CategoryTerm) -> Vec<SiteSummary> {
        let entries = match self.query.entries_by_term(term, &QueryArgs::new()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Could not load sites for category '{}': {}", term.slug, e);
                return Vec::new();
            }
        };

        entries.iter().map(|entry| self.summary(entry)).collect()
    }

    fn summary(&self, entry: &DirectoryEntry) -> SiteSummary {
        let siteurl = self.query.permalink(entry.blog_id).unwrap_or_else(|e| {
            tracing::warn!("Could not resolve URL for site {}: {}", entry.blog_id, e);
            String::new()
        });
        let sitelogo = self
            .query
            .logo(entry.blog_id, self.logo_size, self.sizes)
            .unwrap_or_else(|e| {
                tracing::warn!("Could not resolve logo for site {}: {}", entry.blog_id, e);
                String::new()
            });

        SiteSummary {
            post_name: entry.post_name.clone(),
            post_title: entry.post_title.clone(),
            post_excerpt: entry.post_excerpt.clone(),
            post_content: entry.post_content.clone(),
            meta: SiteMeta { siteurl, sitelogo },
        }
    }
}
