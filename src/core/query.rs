use crate::core::logo;
use crate::domain::model::{
    CategoryTerm, DirectoryEntry, EntryQuery, ImageSizes, LogoSize, QueryArgs, SiteDetails,
    SiteId, TermQuery, GEO_META_KEY,
};
use crate::domain::ports::DirectoryStore;
use crate::utils::error::Result;

/// Directory lookups against one explicitly named directory tenant.
pub struct DirectoryQuery<'a, S: DirectoryStore + ?Sized> {
    store: &'a S,
    directory: SiteId,
}

impl<'a, S: DirectoryStore + ?Sized> DirectoryQuery<'a, S> {
    pub fn new(store: &'a S, directory: SiteId) -> Self {
        Self { store, directory }
    }

    pub fn directory(&self) -> SiteId {
        self.directory
    }

    /// All directory categories.
    pub fn terms(&self, args: &QueryArgs) -> Result<Vec<CategoryTerm>> {
        if !self.store.is_multisite() {
            tracing::debug!("Not a multisite network, skipping term lookup");
            return Ok(Vec::new());
        }
        let query = TermQuery::from_args(args, TermQuery::default())?;
        self.store.terms(self.directory, &query)
    }

    /// Directory categories carrying `geo` metadata.
    pub fn location_terms(&self, args: &QueryArgs) -> Result<Vec<CategoryTerm>> {
        if !self.store.is_multisite() {
            tracing::debug!("Not a multisite network, skipping location term lookup");
            return Ok(Vec::new());
        }
        let mut query = TermQuery::from_args(args, TermQuery::default())?;
        query.meta_key = Some(GEO_META_KEY.to_string());
        self.store.terms(self.directory, &query)
    }

    /// Directory entries assigned `term`, further narrowed by `args`.
    pub fn entries_by_term(&self, term: &CategoryTerm, args: &QueryArgs) -> Result<Vec<DirectoryEntry>> {
        if !self.store.is_multisite() {
            return Ok(Vec::new());
        }
        let query = EntryQuery::from_args(args, EntryQuery::for_term(term))?;
        self.store.entries(self.directory, &query)
    }

    /// Site details for every entry assigned `term`.
    pub fn sites_by_term(&self, term: &CategoryTerm, args: &QueryArgs) -> Result<Vec<SiteDetails>> {
        let entries = self.entries_by_term(term, args)?;
        let mut details = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.store.site_details(entry.blog_id)? {
                Some(site) => details.push(site),
                None => tracing::debug!(
                    "Directory entry {} points at unknown site {}",
                    entry.id,
                    entry.blog_id
                ),
            }
        }
        Ok(details)
    }

    /// The directory entry describing `site`, if one exists.
    pub fn entry_for_site(&self, site: SiteId) -> Result<Option<DirectoryEntry>> {
        if !self.store.is_multisite() {
            return Ok(None);
        }
        // 多筆時取最後一筆
        let mut entries = self.store.entries(self.directory, &EntryQuery::for_site(site))?;
        Ok(entries.pop())
    }

    /// Categories assigned to `site` in the directory.
    pub fn site_terms(&self, site: SiteId) -> Result<Vec<CategoryTerm>> {
        let Some(entry) = self.entry_for_site(site)? else {
            return Ok(Vec::new());
        };
        if entry.categories.is_empty() {
            return Ok(Vec::new());
        }
        let query = TermQuery {
            include: entry.categories.clone(),
            ..TermQuery::default()
        };
        self.store.terms(self.directory, &query)
    }

    pub fn permalink(&self, site: SiteId) -> Result<String> {
        Ok(self
            .store
            .site_details(site)?
            .map(|details| details.siteurl)
            .unwrap_or_default())
    }

    /// Logo markup for `site`: the entry's featured image, else the site's custom logo.
    pub fn logo(&self, site: SiteId, size: &LogoSize, sizes: &ImageSizes) -> Result<String> {
        if let Some(image) = self.entry_for_site(site)?.and_then(|entry| entry.thumbnail) {
            return Ok(logo::thumbnail_html(&image, size, sizes));
        }

        match self.store.site_details(site)? {
            Some(details) => Ok(logo::custom_logo_html(&details)),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryNetwork;
    use crate::domain::model::Image;

    fn network() -> InMemoryNetwork {
        let entry = |id, blog_id, categories, thumbnail| DirectoryEntry {
            id,
            post_name: format!("entry-{}", id),
            post_title: format!("Entry {}", id),
            post_excerpt: String::new(),
            post_content: String::new(),
            blog_id,
            categories,
            thumbnail,
        };
        let logo = Image {
            src: "https://two.example.com/new.png".to_string(),
            alt: "New".to_string(),
            width: None,
            height: None,
        };

        InMemoryNetwork::new(1)
            .with_site(SiteDetails {
                blog_id: 2,
                blogname: "Two".to_string(),
                siteurl: "https://two.example.com".to_string(),
                custom_logo: None,
            })
            .with_term(1, CategoryTerm::new(1, "News", "news"))
            .with_term(1, CategoryTerm::new(2, "Arts", "arts").with_geo("1,2"))
            .with_entry(1, entry(10, 2, vec![1], None))
            .with_entry(1, entry(11, 2, vec![1, 2], Some(logo)))
            .with_entry(1, entry(12, 9, vec![2], None))
    }

    #[test]
    fn test_entry_for_site_takes_last_match() {
        let store = network();
        let query = DirectoryQuery::new(&store, 1);
        assert_eq!(query.entry_for_site(2).unwrap().map(|e| e.id), Some(11));
        assert_eq!(query.entry_for_site(5).unwrap(), None);
    }

    #[test]
    fn test_site_terms() {
        let store = network();
        let query = DirectoryQuery::new(&store, 1);
        let names: Vec<_> = query.site_terms(2).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Arts", "News"]);
        assert!(query.site_terms(5).unwrap().is_empty());
    }

    #[test]
    fn test_sites_by_term_skips_unknown_sites() {
        let store = network();
        let query = DirectoryQuery::new(&store, 1);
        let arts = CategoryTerm::new(2, "Arts", "arts");
        let sites = query.sites_by_term(&arts, &QueryArgs::new()).unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].blog_id, 2);
    }

    #[test]
    fn test_location_terms_require_geo() {
        let store = network();
        let query = DirectoryQuery::new(&store, 1);
        let terms = query.location_terms(&QueryArgs::new()).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].slug, "arts");
    }

    #[test]
    fn test_permalink_and_logo() {
        let store = network();
        let query = DirectoryQuery::new(&store, 1);
        assert_eq!(query.permalink(2).unwrap(), "https://two.example.com");
        assert_eq!(query.permalink(9).unwrap(), "");

        let logo = query.logo(2, &LogoSize::default(), &ImageSizes::default()).unwrap();
        assert!(logo.contains("src=\"https://two.example.com/new.png\""));
        assert_eq!(query.logo(9, &LogoSize::default(), &ImageSizes::default()).unwrap(), "");
    }

    #[test]
    fn test_single_site_has_no_directory() {
        let store = network().single_site();
        let query = DirectoryQuery::new(&store, 1);
        assert!(query.terms(&QueryArgs::new()).unwrap().is_empty());
        assert_eq!(query.entry_for_site(2).unwrap(), None);
    }
}
