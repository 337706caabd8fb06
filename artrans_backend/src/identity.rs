use crate::artran::Artran;
use crate::config::ImportTarget;
use crate::database::models::{PageRecord, SiteRecord, UserRecord};
use crate::store::{ImportStore, UserProfile};
use anyhow::{bail, Context, Result};
use url::Url;

/// The storage rows a source record's comment will hang off.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub user: UserRecord,
    pub site: SiteRecord,
    pub page: PageRecord,
}

pub struct IdentityResolver<'a, S: ?Sized> {
    store: &'a S,
    target: &'a ImportTarget,
    base_url: Option<Url>,
}

impl<'a, S: ImportStore + ?Sized> IdentityResolver<'a, S> {
    /// Fails when the URL resolver is on but the target URL does not parse;
    /// preflight validation normally rules this out.
    pub fn new(store: &'a S, target: &'a ImportTarget) -> Result<Self> {
        let base_url = if target.url_resolver_enabled() {
            let raw = target.site_url.as_deref().unwrap_or_default();
            Some(Url::parse(raw).with_context(|| format!("invalid target site URL {raw:?}"))?)
        } else {
            None
        };
        Ok(Self {
            store,
            target,
            base_url,
        })
    }

    pub fn resolve(&self, record: &Artran) -> Result<ResolvedIdentity> {
        let site_name = self
            .target
            .site_name
            .as_deref()
            .unwrap_or(&record.site_name);
        let site_urls = self
            .target
            .site_url
            .as_deref()
            .unwrap_or(&record.site_urls);

        validate_site_urls(site_urls)?;
        let site = self.store.find_or_create_site(site_name, site_urls)?;

        let user = self.store.find_or_create_user(&UserProfile {
            name: record.nick.clone(),
            email: record.email.clone(),
            link: record.link.clone(),
            password: record.password.clone(),
            badge_name: record.badge_name.clone(),
            badge_color: record.badge_color.clone(),
        })?;

        let page_key = match &self.base_url {
            Some(base) => resolve_page_key(base, &record.page_key),
            None => record.page_key.clone(),
        };
        let page = self.store.find_or_create_page(
            &page_key,
            &record.page_title,
            &site.name,
            record.page_admin_only,
        )?;

        Ok(ResolvedIdentity { user, site, page })
    }
}

/// True for absolute `http`/`https` URLs with a host.
pub fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Every entry of a comma-separated site URL list must be a valid URL.
pub fn validate_site_urls(urls: &str) -> Result<()> {
    for entry in urls.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        if !is_valid_url(entry) {
            bail!("site URL {entry:?} is not a valid http(s) URL");
        }
    }
    Ok(())
}

/// Re-roots a page key on `base`, keeping its path, query and fragment.
/// Keys that cannot be interpreted as URLs are returned unchanged.
pub fn resolve_page_key(base: &Url, page_key: &str) -> String {
    let reference = match Url::parse(page_key) {
        Ok(absolute) => {
            let mut reference = absolute.path().to_string();
            if let Some(query) = absolute.query() {
                reference.push('?');
                reference.push_str(query);
            }
            if let Some(fragment) = absolute.fragment() {
                reference.push('#');
                reference.push_str(fragment);
            }
            reference
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => page_key.to_string(),
        Err(_) => return page_key.to_string(),
    };
    match base.join(&reference) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => page_key.to_string(),
    }
}
