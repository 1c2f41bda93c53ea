use crate::analysis::aggregate::AggregationRow;
use crate::analysis::canonical::{AliasTable, AssetKind};
use crate::api::endpoints;

/// `name -> iconRef` mapping supplied by the caller.
pub trait IconSource {
    fn exact(&self, name: &str) -> Option<String>;
    fn normalized(&self, name: &str) -> Option<String>;
}

/// `name -> canonicalId` mapping for a versioned asset catalog.
pub trait CanonicalIdSource {
    fn version(&self) -> &str;
    fn canonical_id(&self, kind: AssetKind, name: &str) -> Option<String>;
}

/// Layered lookup: exact local, normalized local, alias then local again,
/// then a catalog URL. Nothing resolving is not an error.
pub struct IconResolver<'a> {
    local: Option<&'a dyn IconSource>,
    aliases: &'a AliasTable,
    catalog: Option<&'a dyn CanonicalIdSource>,
    base_url: String,
}

impl<'a> IconResolver<'a> {
    pub fn new(aliases: &'a AliasTable) -> Self {
        IconResolver {
            local: None,
            aliases,
            catalog: None,
            base_url: endpoints::DATA_DRAGON_BASE.to_string(),
        }
    }

    pub fn with_local(mut self, local: &'a dyn IconSource) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_catalog(mut self, catalog: &'a dyn CanonicalIdSource, base_url: &str) -> Self {
        self.catalog = Some(catalog);
        self.base_url = base_url.to_string();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.local.is_some() || self.catalog.is_some()
    }

    fn local_lookup(&self, name: &str) -> Option<String> {
        let local = self.local?;
        local.exact(name).or_else(|| local.normalized(name))
    }

    pub fn resolve(&self, kind: AssetKind, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        if let Some(icon) = self.local_lookup(name) {
            return Some(icon);
        }

        let canonical = self.aliases.lookup(kind, name);
        if let Some(label) = canonical {
            if let Some(icon) = self.local_lookup(label) {
                return Some(icon);
            }
        }

        let catalog = self.catalog?;
        let id = canonical
            .and_then(|label| catalog.canonical_id(kind, label))
            .or_else(|| catalog.canonical_id(kind, name));
        match id {
            Some(id) => Some(endpoints::icon_url(&self.base_url, catalog.version(), kind, &id)),
            None => {
                log::debug!("No {} icon for '{}'", kind, name);
                None
            }
        }
    }

    /// Icons for every member of each row's key, in key order.
    pub fn annotate(&self, kind: AssetKind, rows: &[AggregationRow]) -> Vec<Vec<Option<String>>> {
        rows.iter()
            .map(|row| row.key.iter().map(|member| self.resolve(kind, member)).collect())
            .collect()
    }
}
