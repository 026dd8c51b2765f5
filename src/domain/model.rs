use crate::utils::error::{DirectoryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type SiteId = u64;
pub type TermId = u64;
pub type PostId = u64;

/// 目錄分類使用的 taxonomy 名稱
pub const DIRECTORY_TAXONOMY: &str = "multisite_directory_category";

/// 分類上存放 "lat,lng" 的 meta key
pub const GEO_META_KEY: &str = "geo";

/// Filter object handed to the directory query layer (`get_posts`/`get_terms` style args).
pub type QueryArgs = Map<String, Value>;

fn default_taxonomy() -> String {
    DIRECTORY_TAXONOMY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A member site of the network as seen by the site registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDetails {
    pub blog_id: SiteId,
    pub blogname: String,
    pub siteurl: String,
    #[serde(default)]
    pub custom_logo: Option<Image>,
}

/// One directory listing record, linked to a member site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: PostId,
    pub post_name: String,
    pub post_title: String,
    #[serde(default)]
    pub post_excerpt: String,
    #[serde(default)]
    pub post_content: String,
    pub blog_id: SiteId,
    #[serde(default)]
    pub categories: Vec<TermId>,
    #[serde(default)]
    pub thumbnail: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTerm {
    pub term_id: TermId,
    pub name: String,
    pub slug: String,
    #[serde(default = "default_taxonomy")]
    pub taxonomy: String,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl CategoryTerm {
    pub fn new(term_id: TermId, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            term_id,
            name: name.into(),
            slug: slug.into(),
            taxonomy: default_taxonomy(),
            meta: Map::new(),
        }
    }

    pub fn with_geo(mut self, geo: impl Into<Value>) -> Self {
        self.meta.insert(GEO_META_KEY.to_string(), geo.into());
        self
    }

    pub fn geo(&self) -> Option<&Value> {
        self.meta.get(GEO_META_KEY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Map,
    List,
    Other(String),
}

impl DisplayMode {
    pub fn parse(value: &str) -> Self {
        match value {
            "map" => Self::Map,
            "list" => Self::List,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSize {
    Named(String),
    Dimensions(u32, u32),
}

impl Default for LogoSize {
    fn default() -> Self {
        Self::Dimensions(72, 72)
    }
}

impl LogoSize {
    /// `attachment-*` / `size-*` class suffix used in image markup.
    pub fn class_suffix(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Dimensions(w, h) => format!("{}x{}", w, h),
        }
    }
}

/// Registered named image sizes (`thumbnail`, `medium`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSizes(BTreeMap<String, (u32, u32)>);

impl Default for ImageSizes {
    fn default() -> Self {
        let mut sizes = BTreeMap::new();
        sizes.insert("thumbnail".to_string(), (150, 150));
        sizes.insert("post-thumbnail".to_string(), (150, 150));
        sizes.insert("medium".to_string(), (300, 300));
        sizes.insert("large".to_string(), (1024, 1024));
        Self(sizes)
    }
}

impl ImageSizes {
    pub fn get(&self, name: &str) -> Option<(u32, u32)> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, dimensions: (u32, u32)) {
        self.0.insert(name.into(), dimensions);
    }

    /// Pixel dimensions for a logo size, if known.
    pub fn resolve(&self, size: &LogoSize) -> Option<(u32, u32)> {
        match size {
            LogoSize::Named(name) => self.get(name),
            LogoSize::Dimensions(w, h) => Some((*w, *h)),
        }
    }
}

/// Raw shortcode attributes as they come off the tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAttributes {
    pub named: Vec<(String, String)>,
    pub positional: Vec<String>,
}

impl RawAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.push((key.into(), value.into()));
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.positional.push(flag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxField {
    Slug,
    TermId,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxOperator {
    In,
    NotIn,
    And,
}

/// One `tax_query` constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxClause {
    pub taxonomy: String,
    pub field: TaxField,
    pub terms: Vec<String>,
    pub operator: TaxOperator,
}

impl TaxClause {
    pub fn slugs_in(slugs: &[String]) -> Self {
        Self {
            taxonomy: default_taxonomy(),
            field: TaxField::Slug,
            terms: slugs.to_vec(),
            operator: TaxOperator::In,
        }
    }

    pub fn term_ids_in(taxonomy: &str, ids: &[TermId]) -> Self {
        Self {
            taxonomy: taxonomy.to_string(),
            field: TaxField::TermId,
            terms: ids.iter().map(|id| id.to_string()).collect(),
            operator: TaxOperator::In,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| DirectoryError::upstream(format!("tax_query clause must be an object, was {}", value)))?;

        let taxonomy = match obj.get("taxonomy") {
            Some(Value::String(s)) => s.clone(),
            None => default_taxonomy(),
            Some(other) => {
                return Err(DirectoryError::upstream(format!("invalid tax_query taxonomy: {}", other)))
            }
        };

        let field = match obj.get("field").and_then(Value::as_str) {
            None | Some("term_id") | Some("id") => TaxField::TermId,
            Some("slug") => TaxField::Slug,
            Some("name") => TaxField::Name,
            Some(other) => {
                return Err(DirectoryError::upstream(format!("unsupported tax_query field: {}", other)))
            }
        };

        let terms = match obj.get("terms") {
            Some(Value::Array(items)) => items.iter().map(scalar_to_string).collect::<Result<Vec<_>>>()?,
            Some(scalar @ (Value::String(_) | Value::Number(_))) => vec![scalar_to_string(scalar)?],
            _ => return Err(DirectoryError::upstream("tax_query clause is missing terms")),
        };

        let operator = match obj.get("operator").and_then(Value::as_str).map(str::to_uppercase) {
            None => TaxOperator::In,
            Some(op) if op == "IN" => TaxOperator::In,
            Some(op) if op == "NOT IN" => TaxOperator::NotIn,
            Some(op) if op == "AND" => TaxOperator::And,
            Some(op) => {
                return Err(DirectoryError::upstream(format!("unsupported tax_query operator: {}", op)))
            }
        };

        Ok(Self {
            taxonomy,
            field,
            terms,
            operator,
        })
    }

    pub fn to_value(&self) -> Value {
        let field = match self.field {
            TaxField::Slug => "slug",
            TaxField::TermId => "term_id",
            TaxField::Name => "name",
        };
        let operator = match self.operator {
            TaxOperator::In => "IN",
            TaxOperator::NotIn => "NOT IN",
            TaxOperator::And => "AND",
        };
        serde_json::json!({
            "taxonomy": self.taxonomy,
            "field": field,
            "terms": self.terms,
            "operator": operator,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxRelation {
    #[default]
    And,
    Or,
}

/// Caller-supplied `tax_query`: clauses joined by `relation`.
///
/// Accepts a JSON list of clauses or a keyed object such as
/// `{"relation": "OR", "0": {...}, "1": {...}}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaxQuery {
    pub relation: TaxRelation,
    pub clauses: Vec<TaxClause>,
}

impl TaxQuery {
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut query = Self::default();
        match value {
            Value::Array(items) => {
                for item in items {
                    query.clauses.push(TaxClause::from_value(item)?);
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    if key.eq_ignore_ascii_case("relation") {
                        query.relation = match item.as_str().map(str::to_uppercase).as_deref() {
                            Some("AND") => TaxRelation::And,
                            Some("OR") => TaxRelation::Or,
                            _ => return Err(DirectoryError::upstream(format!("invalid tax_query relation: {}", item))),
                        };
                    } else {
                        query.clauses.push(TaxClause::from_value(item)?);
                    }
                }
            }
            other => {
                return Err(DirectoryError::upstream(format!(
                    "tax_query must be a list or an object, was {}",
                    other
                )))
            }
        }
        Ok(query)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

fn scalar_to_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(DirectoryError::upstream(format!("invalid term reference: {}", other))),
    }
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(scalar_to_string).collect(),
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        Value::Number(n) => Ok(vec![n.to_string()]),
        other => Err(DirectoryError::upstream(format!("invalid value for '{}': {}", key, other))),
    }
}

fn id_list(value: &Value, key: &str) -> Result<Vec<u64>> {
    string_list(value, key)?
        .iter()
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| DirectoryError::upstream(format!("invalid id in '{}': {}", key, s)))
        })
        .collect()
}

/// PHP 風格的布林值判斷
fn loose_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn limit(value: &Value, key: &str) -> Result<Option<usize>> {
    let n = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| DirectoryError::upstream(format!("invalid value for '{}': {}", key, value)))?;

    // -1 與 0 都代表不限制
    Ok(if n <= 0 { None } else { Some(n as usize) })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

fn sort_order(value: &Value) -> Result<SortOrder> {
    match value.as_str().map(str::to_uppercase).as_deref() {
        Some("ASC") => Ok(SortOrder::Asc),
        Some("DESC") => Ok(SortOrder::Desc),
        _ => Err(DirectoryError::upstream(format!("invalid order: {}", value))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermOrderBy {
    #[default]
    Name,
    Slug,
    TermId,
    None,
}

/// Typed form of a `get_terms` argument set.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub taxonomy: String,
    pub hide_empty: bool,
    pub slugs: Option<Vec<String>>,
    pub include: Vec<TermId>,
    pub exclude: Vec<TermId>,
    pub meta_key: Option<String>,
    pub orderby: TermOrderBy,
    pub order: SortOrder,
    pub number: Option<usize>,
}

impl Default for TermQuery {
    fn default() -> Self {
        Self {
            taxonomy: default_taxonomy(),
            hide_empty: false,
            slugs: None,
            include: Vec::new(),
            exclude: Vec::new(),
            meta_key: None,
            orderby: TermOrderBy::Name,
            order: SortOrder::Asc,
            number: None,
        }
    }
}

impl TermQuery {
    /// Overlay caller args on `defaults`; unrecognised keys are ignored.
    pub fn from_args(args: &QueryArgs, defaults: TermQuery) -> Result<Self> {
        let mut query = defaults;
        for (key, value) in args {
            match key.as_str() {
                "taxonomy" => {
                    query.taxonomy = value
                        .as_str()
                        .ok_or_else(|| DirectoryError::upstream(format!("invalid taxonomy: {}", value)))?
                        .to_string()
                }
                "hide_empty" => query.hide_empty = loose_bool(value),
                "slug" => query.slugs = Some(string_list(value, key)?),
                "include" => query.include = id_list(value, key)?,
                "exclude" => query.exclude = id_list(value, key)?,
                "meta_key" => query.meta_key = value.as_str().map(str::to_string),
                "orderby" => {
                    query.orderby = match value.as_str() {
                        Some("name") => TermOrderBy::Name,
                        Some("slug") => TermOrderBy::Slug,
                        Some("term_id") | Some("id") => TermOrderBy::TermId,
                        Some("none") => TermOrderBy::None,
                        _ => return Err(DirectoryError::upstream(format!("unsupported term orderby: {}", value))),
                    }
                }
                "order" => query.order = sort_order(value)?,
                "number" => query.number = limit(value, key)?,
                _ => {}
            }
        }
        Ok(query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryOrderBy {
    #[default]
    None,
    Title,
    Name,
    Id,
}

/// Typed form of a `get_posts` argument set for directory entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntryQuery {
    /// Clauses every entry must satisfy.
    pub tax_query: Vec<TaxClause>,
    /// Caller `tax_query`, applied on top of `tax_query`.
    pub filter: TaxQuery,
    pub blog_id: Option<SiteId>,
    pub include: Vec<PostId>,
    pub exclude: Vec<PostId>,
    pub orderby: EntryOrderBy,
    pub order: SortOrder,
    pub number: Option<usize>,
}

impl EntryQuery {
    pub fn for_site(blog_id: SiteId) -> Self {
        Self {
            blog_id: Some(blog_id),
            ..Self::default()
        }
    }

    pub fn for_term(term: &CategoryTerm) -> Self {
        Self {
            tax_query: vec![TaxClause::term_ids_in(&term.taxonomy, &[term.term_id])],
            ..Self::default()
        }
    }

    /// Overlay caller args. A caller `tax_query` becomes `filter` and never
    /// replaces the required clauses.
    pub fn from_args(args: &QueryArgs, defaults: EntryQuery) -> Result<Self> {
        let mut query = defaults;
        for (key, value) in args {
            match key.as_str() {
                "tax_query" => query.filter = TaxQuery::from_value(value)?,
                "numberposts" | "posts_per_page" => query.number = limit(value, key)?,
                "include" => query.include = id_list(value, key)?,
                "exclude" => query.exclude = id_list(value, key)?,
                "orderby" => {
                    query.orderby = match value.as_str() {
                        Some("title") => EntryOrderBy::Title,
                        Some("name") => EntryOrderBy::Name,
                        Some("ID") | Some("id") => EntryOrderBy::Id,
                        Some("none") => EntryOrderBy::None,
                        _ => return Err(DirectoryError::upstream(format!("unsupported orderby: {}", value))),
                    }
                }
                "order" => query.order = sort_order(value)?,
                _ => {}
            }
        }
        Ok(query)
    }
}
