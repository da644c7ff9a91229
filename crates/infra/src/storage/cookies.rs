//! In-memory cookie jar shared by provider HTTP clients
//!
//! Wraps a [`cookie_store::CookieStore`] so RFC 6265 parsing, expiry and
//! path matching follow reqwest's own jar, and adds dropping every cookie
//! for a domain on logout.

use std::sync::PoisonError;

use cookie_store::CookieDomain;
use inkstat_core::CookiePurger;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest_cookie_store::CookieStoreMutex;
use tracing::debug;
use url::Url;

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain || host.strip_suffix(domain).is_some_and(|prefix| prefix.ends_with('.'))
}

/// Cookie jar that can purge all cookies of a domain.
pub struct SessionCookieJar {
    store: CookieStoreMutex,
}

impl Default for SessionCookieJar {
    fn default() -> Self {
        Self { store: CookieStoreMutex::new(cookie_store::CookieStore::default()) }
    }
}

impl std::fmt::Debug for SessionCookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookieJar").field("cookies", &self.len()).finish()
    }
}

impl SessionCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut cookie_store::CookieStore) -> T) -> T {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// Number of unexpired cookies.
    pub fn len(&self) -> usize {
        self.with_store(|store| store.iter_unexpired().count())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the named cookie that would be sent to `url`.
    pub fn get(&self, url: &Url, name: &str) -> Option<String> {
        self.with_store(|store| {
            store
                .matches(url)
                .into_iter()
                .find(|cookie| cookie.name() == name)
                .map(|cookie| cookie.value().to_string())
        })
    }
}

impl CookieStore for SessionCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.store.set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.store.cookies(url)
    }
}

impl CookiePurger for SessionCookieJar {
    fn purge_domain(&self, domain: &str) -> usize {
        let domain = domain.trim_start_matches('.').to_ascii_lowercase();
        let purged = self.with_store(|store| {
            let doomed: Vec<(String, String, String)> = store
                .iter_any()
                .filter_map(|cookie| {
                    let cookie_domain = match &cookie.domain {
                        CookieDomain::HostOnly(host) | CookieDomain::Suffix(host) => host,
                        CookieDomain::NotPresent | CookieDomain::Empty => return None,
                    };
                    domain_matches(cookie_domain, &domain).then(|| {
                        (cookie_domain.clone(), String::from(&cookie.path), cookie.name().to_string())
                    })
                })
                .collect();

            doomed
                .iter()
                .filter(|(domain, path, name)| store.remove(domain, path, name).is_some())
                .count()
        });
        debug!(%domain, purged, "purged provider cookies");
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    fn set(jar: &SessionCookieJar, url: &Url, headers: &[&str]) {
        let values: Vec<HeaderValue> =
            headers.iter().map(|h| HeaderValue::from_str(h).unwrap()).collect();
        jar.set_cookies(&mut values.iter(), url);
    }

    #[test]
    fn domain_cookie_is_sent_to_subdomains() {
        let jar = SessionCookieJar::new();
        let origin = url("https://api-lp1.znc.srv.nintendo.net/v3/Account/Login");
        set(&jar, &origin, &["sid=abc; Domain=.nintendo.net; Path=/"]);

        let header = jar.cookies(&url("https://app.splatoon2.nintendo.net/")).unwrap();
        assert_eq!(header.to_str().unwrap(), "sid=abc");
        assert!(jar.cookies(&url("https://example.com/")).is_none());
    }

    #[test]
    fn host_only_cookie_stays_on_host() {
        let jar = SessionCookieJar::new();
        set(&jar, &url("https://a.nintendo.net/x"), &["k=v; Path=/"]);

        assert_eq!(jar.get(&url("https://a.nintendo.net/"), "k"), Some("v".into()));
        assert!(jar.get(&url("https://b.nintendo.net/"), "k").is_none());
    }

    #[test]
    fn foreign_domain_attribute_is_rejected() {
        let jar = SessionCookieJar::new();
        set(&jar, &url("https://evil.example.com/"), &["k=v; Domain=nintendo.net"]);
        assert!(jar.is_empty());
    }

    #[test]
    fn replacing_and_expiring_cookies() {
        let jar = SessionCookieJar::new();
        let origin = url("https://a.nintendo.net/");
        set(&jar, &origin, &["k=1; Path=/"]);
        set(&jar, &origin, &["k=2; Path=/"]);
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get(&origin, "k"), Some("2".into()));

        set(&jar, &origin, &["k=; Path=/; Max-Age=0"]);
        assert!(jar.is_empty());
    }

    #[test]
    fn expires_in_the_past_deletes_the_cookie() {
        let jar = SessionCookieJar::new();
        let origin = url("https://app.splatoon2.nintendo.net/");
        set(&jar, &origin, &["iksm_session=live; Path=/"]);
        set(&jar, &origin, &["iksm_session=deleted; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT"]);

        assert!(jar.cookies(&origin).is_none());
        assert!(jar.is_empty());
    }

    #[test]
    fn path_matches_on_segment_boundaries() {
        let jar = SessionCookieJar::new();
        set(&jar, &url("https://a.nintendo.net/api/login"), &["k=v; Path=/api"]);

        assert_eq!(jar.get(&url("https://a.nintendo.net/api"), "k"), Some("v".into()));
        assert_eq!(jar.get(&url("https://a.nintendo.net/api/x"), "k"), Some("v".into()));
        assert!(jar.cookies(&url("https://a.nintendo.net/apiary")).is_none());
    }

    #[test]
    fn purge_drops_domain_and_subdomains_only() {
        let jar = SessionCookieJar::new();
        set(&jar, &url("https://nintendo.net/"), &["root=1"]);
        set(&jar, &url("https://app.splatoon2.nintendo.net/"), &["iksm_session=2; Path=/"]);
        set(&jar, &url("https://example.com/"), &["other=3"]);

        assert_eq!(jar.purge_domain("nintendo.net"), 2);
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get(&url("https://example.com/"), "other"), Some("3".into()));
        assert_eq!(jar.purge_domain(".nintendo.net"), 0);
    }
}
