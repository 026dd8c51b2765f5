use crate::config::network::NetworkConfig;
use crate::domain::model::{
    CategoryTerm, DirectoryEntry, EntryOrderBy, EntryQuery, SiteDetails, SiteId, SortOrder,
    TaxClause, TaxField, TaxOperator, TaxRelation, TermId, TermOrderBy, TermQuery, GEO_META_KEY,
};
use crate::domain::ports::DirectoryStore;
use crate::utils::error::{DirectoryError, Result};
use std::collections::{BTreeMap, HashSet};

/// Directory content hosted on one tenant.
#[derive(Debug, Clone, Default)]
pub struct DirectoryData {
    pub terms: Vec<CategoryTerm>,
    pub entries: Vec<DirectoryEntry>,
}

/// In-memory network: site registry plus per-tenant directory data.
#[derive(Debug, Clone)]
pub struct InMemoryNetwork {
    multisite: bool,
    main_site: SiteId,
    sites: BTreeMap<SiteId, SiteDetails>,
    directories: BTreeMap<SiteId, DirectoryData>,
}

impl InMemoryNetwork {
    pub fn new(main_site: SiteId) -> Self {
        Self {
            multisite: true,
            main_site,
            sites: BTreeMap::new(),
            directories: BTreeMap::new(),
        }
    }

    pub fn single_site(mut self) -> Self {
        self.multisite = false;
        self
    }

    pub fn with_site(mut self, site: SiteDetails) -> Self {
        self.sites.insert(site.blog_id, site);
        self
    }

    pub fn with_term(mut self, tenant: SiteId, term: CategoryTerm) -> Self {
        self.directories.entry(tenant).or_default().terms.push(term);
        self
    }

    pub fn with_entry(mut self, tenant: SiteId, entry: DirectoryEntry) -> Self {
        self.directories.entry(tenant).or_default().entries.push(entry);
        self
    }

    /// Build the network from a parsed (and validated) network file.
    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        let tenant = config.directory_tenant();
        let mut network = Self::new(config.network.main_site);
        network.multisite = config.network.multisite;

        for site in &config.sites {
            network.sites.insert(
                site.id,
                SiteDetails {
                    blog_id: site.id,
                    blogname: site.name.clone(),
                    siteurl: site.url.clone(),
                    custom_logo: site.custom_logo.clone(),
                },
            );
        }

        let data = network.directories.entry(tenant).or_default();
        for term in &config.terms {
            let mut category = CategoryTerm::new(term.id, term.name.clone(), term.slug.clone());
            category.meta.extend(term.meta.iter().map(|(k, v)| (k.clone(), v.clone())));
            if let Some(geo) = &term.geo {
                category.meta.insert(GEO_META_KEY.to_string(), geo.clone());
            }
            data.terms.push(category);
        }

        for entry in &config.entries {
            let categories = entry
                .categories
                .iter()
                .map(|slug| {
                    data.terms
                        .iter()
                        .find(|t| &t.slug == slug)
                        .map(|t| t.term_id)
                        .ok_or_else(|| DirectoryError::ConfigError {
                            message: format!("entry {} references unknown category '{}'", entry.id, slug),
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            data.entries.push(DirectoryEntry {
                id: entry.id,
                post_name: entry.name.clone(),
                post_title: entry.title.clone(),
                post_excerpt: entry.excerpt.clone(),
                post_content: entry.content.clone(),
                blog_id: entry.site,
                categories,
                thumbnail: entry.thumbnail.clone(),
            });
        }

        tracing::info!(
            "Loaded network with {} sites; directory on site {} ({} categories, {} entries)",
            network.sites.len(),
            tenant,
            data.terms.len(),
            data.entries.len()
        );
        Ok(network)
    }

    fn directory(&self, tenant: SiteId) -> Option<&DirectoryData> {
        self.directories.get(&tenant)
    }
}

/// Term ids in `data` matched by a clause's term references.
fn resolve_clause(data: &DirectoryData, clause: &TaxClause) -> Result<HashSet<TermId>> {
    let in_taxonomy = || data.terms.iter().filter(|t| t.taxonomy == clause.taxonomy);
    let mut ids = HashSet::new();
    for reference in &clause.terms {
        match clause.field {
            TaxField::TermId => {
                let id = reference.trim().parse::<TermId>().map_err(|_| {
                    DirectoryError::upstream(format!("tax_query term id is not numeric: {}", reference))
                })?;
                if in_taxonomy().any(|t| t.term_id == id) {
                    ids.insert(id);
                }
            }
            TaxField::Slug => ids.extend(in_taxonomy().filter(|t| &t.slug == reference).map(|t| t.term_id)),
            TaxField::Name => ids.extend(in_taxonomy().filter(|t| &t.name == reference).map(|t| t.term_id)),
        }
    }
    Ok(ids)
}

fn clause_matches(entry: &DirectoryEntry, clause: &TaxClause, ids: &HashSet<TermId>) -> bool {
    match clause.operator {
        TaxOperator::In => entry.categories.iter().any(|c| ids.contains(c)),
        TaxOperator::NotIn => !entry.categories.iter().any(|c| ids.contains(c)),
        // 任一指定分類不存在時視為不符合
        TaxOperator::And => {
            ids.len() == clause.terms.len() && ids.iter().all(|id| entry.categories.contains(id))
        }
    }
}

impl DirectoryStore for InMemoryNetwork {
    fn is_multisite(&self) -> bool {
        self.multisite
    }

    fn main_site_id(&self) -> SiteId {
        self.main_site
    }

    fn terms(&self, tenant: SiteId, query: &TermQuery) -> Result<Vec<CategoryTerm>> {
        let Some(data) = self.directory(tenant) else {
            return Ok(Vec::new());
        };

        let mut terms: Vec<CategoryTerm> = data
            .terms
            .iter()
            .filter(|t| t.taxonomy == query.taxonomy)
            .filter(|t| query.slugs.as_ref().map_or(true, |slugs| slugs.contains(&t.slug)))
            .filter(|t| query.include.is_empty() || query.include.contains(&t.term_id))
            .filter(|t| !query.exclude.contains(&t.term_id))
            .filter(|t| query.meta_key.as_ref().map_or(true, |key| t.meta.contains_key(key)))
            .filter(|t| !query.hide_empty || data.entries.iter().any(|e| e.categories.contains(&t.term_id)))
            .cloned()
            .collect();

        match query.orderby {
            TermOrderBy::Name => terms.sort_by(|a, b| a.name.cmp(&b.name)),
            TermOrderBy::Slug => terms.sort_by(|a, b| a.slug.cmp(&b.slug)),
            TermOrderBy::TermId => terms.sort_by_key(|t| t.term_id),
            TermOrderBy::None => {}
        }
        if query.order == SortOrder::Desc {
            terms.reverse();
        }
        if let Some(number) = query.number {
            terms.truncate(number);
        }

        tracing::debug!("Term query on site {} matched {} categories", tenant, terms.len());
        Ok(terms)
    }

    fn entries(&self, tenant: SiteId, query: &EntryQuery) -> Result<Vec<DirectoryEntry>> {
        let Some(data) = self.directory(tenant) else {
            return Ok(Vec::new());
        };

        let resolve_all = |clauses: &[TaxClause]| {
            clauses
                .iter()
                .map(|clause| Ok((clause.clone(), resolve_clause(data, clause)?)))
                .collect::<Result<Vec<_>>>()
        };
        let required = resolve_all(query.tax_query.as_slice())?;
        let filter = resolve_all(query.filter.clauses.as_slice())?;
        let filter_matches = |e: &DirectoryEntry| {
            if filter.is_empty() {
                return true;
            }
            let mut hits = filter.iter().map(|(clause, ids)| clause_matches(e, clause, ids));
            match query.filter.relation {
                TaxRelation::And => hits.all(|hit| hit),
                TaxRelation::Or => hits.any(|hit| hit),
            }
        };

        let mut entries: Vec<DirectoryEntry> = data
            .entries
            .iter()
            .filter(|e| query.blog_id.map_or(true, |id| e.blog_id == id))
            .filter(|e| query.include.is_empty() || query.include.contains(&e.id))
            .filter(|e| !query.exclude.contains(&e.id))
            .filter(|e| required.iter().all(|(clause, ids)| clause_matches(e, clause, ids)))
            .filter(|e| filter_matches(e))
            .cloned()
            .collect();

        match query.orderby {
            EntryOrderBy::Title => entries.sort_by(|a, b| a.post_title.cmp(&b.post_title)),
            EntryOrderBy::Name => entries.sort_by(|a, b| a.post_name.cmp(&b.post_name)),
            EntryOrderBy::Id => entries.sort_by_key(|e| e.id),
            EntryOrderBy::None => {}
        }
        if query.order == SortOrder::Desc {
            entries.reverse();
        }
        if let Some(number) = query.number {
            entries.truncate(number);
        }

        tracing::debug!("Entry query on site {} matched {} entries", tenant, entries.len());
        Ok(entries)
    }

    fn site_details(&self, site: SiteId) -> Result<Option<SiteDetails>> {
        Ok(self.sites.get(&site).cloned())
    }
}
