//! Site-selector learning store.
//!
//! Persists domain → extraction-rule mappings: either a direct company
//! name for single-company career sites, or a platform name plus a URL
//! pattern for multi-tenant job boards. Seeded with built-ins at first
//! startup; grows whenever the operator teaches it a new domain.

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::db::selector_repo::{self, NewSelectorRow, SelectorRow};
use crate::db::{Database, DatabaseError};

mod builtin;

pub use builtin::{BuiltinSelector, BUILTIN_SELECTORS};

/// Whether a domain maps straight to one company or hosts many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteType {
    Company,
    Platform,
}

impl SiteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteType::Company => "company",
            SiteType::Platform => "platform",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "company" => Some(SiteType::Company),
            "platform" => Some(SiteType::Platform),
            _ => None,
        }
    }
}

/// A rule to learn for a domain.
#[derive(Debug, Clone)]
pub struct NewSelector {
    pub site_type: SiteType,
    pub company_name: Option<String>,
    pub platform_name: Option<String>,
    pub url_pattern: Option<String>,
    pub example_url: Option<String>,
    pub example_company: Option<String>,
}

/// Errors from the selector store.
#[derive(Error, Debug)]
pub enum SelectorError {
    /// A different rule already exists for the domain; overwriting
    /// requires an explicit operator update.
    #[error("A selector already exists for domain '{domain}'")]
    Conflict { domain: String },

    /// The rule is internally inconsistent or its pattern is unusable.
    #[error("Invalid selector rule for '{domain}': {reason}")]
    InvalidRule { domain: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// The persistent store of domain extraction rules.
#[derive(Clone)]
pub struct SelectorStore {
    db: Database,
}

impl SelectorStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Seeds the built-in rules, skipping any domain that already has a
    /// row. Safe to run on every startup. Returns the number added.
    pub fn seed(&self) -> Result<usize, SelectorError> {
        let now = crate::db::now_str();
        let added = self.db.with_tx(|conn| {
            let mut added = 0;
            for rule in BUILTIN_SELECTORS {
                if selector_repo::find_by_domain(conn, rule.domain)?.is_some() {
                    // Never overwrite a user customization.
                    continue;
                }
                selector_repo::insert(
                    conn,
                    &NewSelectorRow {
                        domain: rule.domain,
                        site_type: rule.site_type,
                        company_name: rule.company_name,
                        platform_name: rule.platform_name,
                        url_pattern: rule.url_pattern,
                        example_url: None,
                        example_company: rule.company_name,
                        created_at: &now,
                    },
                )?;
                added += 1;
            }
            Ok(added)
        })?;

        if added > 0 {
            log::info!("Seeded {} built-in site selectors", added);
        }
        Ok(added)
    }

    /// Learns a rule for a new domain. Rejected with
    /// [`SelectorError::Conflict`] when a different rule already exists;
    /// re-learning an identical rule is a no-op.
    pub fn learn(&self, domain: &str, rule: &NewSelector) -> Result<(), SelectorError> {
        validate_rule(domain, rule)?;

        let now = crate::db::now_str();
        self.db.with_conn(|conn| {
            if let Some(existing) = selector_repo::find_by_domain(conn, domain)? {
                if rule_matches_row(rule, &existing) {
                    return Ok(Ok(()));
                }
                return Ok(Err(SelectorError::Conflict {
                    domain: domain.to_string(),
                }));
            }
            selector_repo::insert(conn, &rule_to_row(domain, rule, &now))?;
            Ok(Ok(()))
        })??;

        log::info!("Learned selector for domain: {} ({})", domain, rule.site_type.as_str());
        Ok(())
    }

    /// Explicit operator update: inserts or overwrites the rule for a
    /// domain. This is the only sanctioned way to replace an existing rule.
    pub fn update(&self, domain: &str, rule: &NewSelector) -> Result<(), SelectorError> {
        validate_rule(domain, rule)?;

        let now = crate::db::now_str();
        self.db.with_conn(|conn| {
            let row = rule_to_row(domain, rule, &now);
            if !selector_repo::update_rule(conn, &row)? {
                selector_repo::insert(conn, &row)?;
            }
            Ok(())
        })?;

        log::info!("Updated selector for domain: {}", domain);
        Ok(())
    }

    /// Returns the best-match rule for a domain: exact row first, then
    /// any platform row whose domain is a suffix of the query.
    pub fn lookup(&self, domain: &str) -> Result<Option<SelectorRow>, SelectorError> {
        if let Some(row) = self.lookup_exact(domain)? {
            return Ok(Some(row));
        }
        Ok(self.platform_candidates(domain)?.into_iter().next())
    }

    /// Returns the rule stored under exactly this domain, if any.
    pub fn lookup_exact(&self, domain: &str) -> Result<Option<SelectorRow>, SelectorError> {
        Ok(self
            .db
            .with_conn(|conn| selector_repo::find_by_domain(conn, domain))?)
    }

    /// Platform rules whose domain is a proper suffix of the query,
    /// covering sub-path platform hosts never seen verbatim.
    pub fn platform_candidates(&self, domain: &str) -> Result<Vec<SelectorRow>, SelectorError> {
        let rows = self.db.with_conn(|conn| {
            let mut matches = Vec::new();
            for row in selector_repo::list_platforms(conn)? {
                if domain != row.domain && domain.ends_with(&row.domain) {
                    matches.push(row);
                }
            }
            Ok(matches)
        })?;
        Ok(rows)
    }

    /// Stamps a rule as used.
    pub fn touch(&self, domain: &str) -> Result<(), SelectorError> {
        let now = crate::db::now_str();
        self.db
            .with_conn(|conn| selector_repo::touch_last_used(conn, domain, &now))?;
        Ok(())
    }

    /// Lists every stored rule.
    pub fn list(&self) -> Result<Vec<SelectorRow>, SelectorError> {
        Ok(self.db.with_conn(selector_repo::list_all)?)
    }
}

fn rule_to_row<'a>(domain: &'a str, rule: &'a NewSelector, now: &'a str) -> NewSelectorRow<'a> {
    NewSelectorRow {
        domain,
        site_type: rule.site_type.as_str(),
        company_name: rule.company_name.as_deref(),
        platform_name: rule.platform_name.as_deref(),
        url_pattern: rule.url_pattern.as_deref(),
        example_url: rule.example_url.as_deref(),
        example_company: rule.example_company.as_deref(),
        created_at: now,
    }
}

fn rule_matches_row(rule: &NewSelector, row: &SelectorRow) -> bool {
    row.site_type == rule.site_type.as_str()
        && row.company_name.as_deref() == rule.company_name.as_deref()
        && row.url_pattern.as_deref() == rule.url_pattern.as_deref()
}

fn validate_rule(domain: &str, rule: &NewSelector) -> Result<(), SelectorError> {
    match rule.site_type {
        SiteType::Company => {
            if rule.company_name.as_deref().map_or(true, str::is_empty) {
                return Err(SelectorError::InvalidRule {
                    domain: domain.to_string(),
                    reason: "company rules require a company name".to_string(),
                });
            }
        }
        SiteType::Platform => {
            let pattern = rule.url_pattern.as_deref().unwrap_or_default();
            if pattern.is_empty() {
                return Err(SelectorError::InvalidRule {
                    domain: domain.to_string(),
                    reason: "platform rules require a URL pattern".to_string(),
                });
            }
            let compiled = Regex::new(pattern).map_err(|e| SelectorError::InvalidRule {
                domain: domain.to_string(),
                reason: e.to_string(),
            })?;
            if compiled.captures_len() < 2 {
                return Err(SelectorError::InvalidRule {
                    domain: domain.to_string(),
                    reason: "pattern must capture the company token".to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Derives an extraction pattern for a platform from one example URL and
/// the company it belongs to. Checks the subdomain first, then each path
/// segment, then falls back to a literal prefix before the company token.
pub fn generate_url_pattern(url: &str, company_name: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let normalized = normalize_token(company_name);

    // Company encoded in the subdomain: ([^.]+).base-domain
    let host_parts: Vec<&str> = host.split('.').collect();
    if host_parts.len() > 2 {
        let subdomain = normalize_token(host_parts[0]);
        if subdomain == normalized || subdomain.contains(&normalized) {
            let base_domain = host_parts[1..].join(".");
            return Some(format!(r"([^.]+)\.{}", regex::escape(&base_domain)));
        }
    }

    // Company encoded in a path segment: host/prefix/([^/]+)
    let segments: Vec<&str> = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    for (i, segment) in segments.iter().enumerate() {
        let token = normalize_token(segment);
        if token == normalized || token.contains(&normalized) {
            let escaped_host = regex::escape(host);
            let prefix = segments[..i].join("/");
            return Some(if prefix.is_empty() {
                format!(r"{}/([^/]+)", escaped_host)
            } else {
                format!(r"{}/{}/([^/]+)", escaped_host, prefix)
            });
        }
    }

    // Literal fallback: everything before the first occurrence of a
    // company variant, then one token.
    let url_lower = url.to_lowercase();
    let lower = company_name.to_lowercase();
    for variant in [
        lower.clone(),
        lower.replace(' ', "-"),
        lower.replace(' ', "_"),
        lower.replace(' ', ""),
    ] {
        if let Some(idx) = url_lower.find(&variant) {
            return Some(format!(r"{}([^/.\-_]+)", regex::escape(&url[..idx])));
        }
    }

    log::warn!("Could not generate URL pattern for: {}", url);
    None
}

fn normalize_token(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SelectorStore {
        SelectorStore::new(Database::open_in_memory().unwrap())
    }

    fn company_rule(name: &str) -> NewSelector {
        NewSelector {
            site_type: SiteType::Company,
            company_name: Some(name.to_string()),
            platform_name: None,
            url_pattern: None,
            example_url: None,
            example_company: Some(name.to_string()),
        }
    }

    fn platform_rule(pattern: &str) -> NewSelector {
        NewSelector {
            site_type: SiteType::Platform,
            company_name: None,
            platform_name: Some("board".to_string()),
            url_pattern: Some(pattern.to_string()),
            example_url: None,
            example_company: None,
        }
    }

    #[test]
    fn test_seed_inserts_builtins_once() {
        let store = store();
        let added = store.seed().unwrap();
        assert_eq!(added, BUILTIN_SELECTORS.len());

        // Second run is a no-op.
        assert_eq!(store.seed().unwrap(), 0);
    }

    #[test]
    fn test_seed_preserves_user_customization() {
        let store = store();
        store
            .learn("lever.co", &company_rule("My Custom Company"))
            .unwrap();

        store.seed().unwrap();

        let row = store.lookup("lever.co").unwrap().unwrap();
        assert_eq!(row.site_type, "company");
        assert_eq!(row.company_name.as_deref(), Some("My Custom Company"));
    }

    #[test]
    fn test_learn_conflict_rejected() {
        let store = store();
        store.learn("acme.example", &company_rule("Acme")).unwrap();

        let err = store
            .learn("acme.example", &company_rule("Other Corp"))
            .unwrap_err();
        assert!(matches!(err, SelectorError::Conflict { .. }));

        // Identical rule is accepted as a no-op.
        store.learn("acme.example", &company_rule("Acme")).unwrap();
    }

    #[test]
    fn test_update_overwrites_explicitly() {
        let store = store();
        store.learn("acme.example", &company_rule("Acme")).unwrap();
        store
            .update("acme.example", &company_rule("Acme Industries"))
            .unwrap();

        let row = store.lookup("acme.example").unwrap().unwrap();
        assert_eq!(row.company_name.as_deref(), Some("Acme Industries"));

        // Update on a fresh domain inserts.
        store
            .update("new.example", &company_rule("New Co"))
            .unwrap();
        assert!(store.lookup("new.example").unwrap().is_some());
    }

    #[test]
    fn test_learn_validates_rules() {
        let store = store();

        let mut bad_company = company_rule("x");
        bad_company.company_name = None;
        assert!(matches!(
            store.learn("a.example", &bad_company),
            Err(SelectorError::InvalidRule { .. })
        ));

        assert!(matches!(
            store.learn("b.example", &platform_rule("no capture group")),
            Err(SelectorError::InvalidRule { .. })
        ));

        assert!(matches!(
            store.learn("c.example", &platform_rule(r"([unclosed")),
            Err(SelectorError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_lookup_prefers_exact_then_suffix() {
        let store = store();
        store
            .learn("lever.co", &platform_rule(r"jobs\.lever\.co/([^/]+)"))
            .unwrap();

        // Exact.
        assert!(store.lookup("lever.co").unwrap().is_some());
        // Suffix: an unseen subdomain host still resolves to the platform.
        let row = store.lookup("jobs.lever.co").unwrap().unwrap();
        assert_eq!(row.domain, "lever.co");
        // Company rows never suffix-match.
        store.learn("acme.example", &company_rule("Acme")).unwrap();
        assert!(store.lookup("careers.acme.example").unwrap().is_none());
    }

    #[test]
    fn test_touch_sets_last_used() {
        let store = store();
        store.learn("acme.example", &company_rule("Acme")).unwrap();
        store.touch("acme.example").unwrap();

        let row = store.lookup("acme.example").unwrap().unwrap();
        assert!(row.last_used_at.is_some());
    }

    #[test]
    fn test_generate_pattern_from_subdomain() {
        let pattern =
            generate_url_pattern("https://acme.breezy.hr/p/engineer-123", "Acme").unwrap();
        assert_eq!(pattern, r"([^.]+)\.breezy\.hr");

        let re = Regex::new(&pattern).unwrap();
        let caps = re.captures("https://acme.breezy.hr/p/engineer-123").unwrap();
        assert_eq!(&caps[1], "acme");
    }

    #[test]
    fn test_generate_pattern_from_path_segment() {
        let pattern =
            generate_url_pattern("https://boards.example.com/jobs/acme-corp/123", "Acme Corp")
                .unwrap();
        assert_eq!(pattern, r"boards\.example\.com/jobs/([^/]+)");

        let re = Regex::new(&pattern).unwrap();
        let caps = re
            .captures("https://boards.example.com/jobs/other-co/999")
            .unwrap();
        assert_eq!(&caps[1], "other-co");
    }

    #[test]
    fn test_generate_pattern_fallback_literal() {
        let pattern = generate_url_pattern("https://example.com?ref=acme", "Acme").unwrap();
        assert!(pattern.ends_with(r"([^/.\-_]+)"));
    }

    #[test]
    fn test_generate_pattern_unmatched_is_none() {
        assert!(generate_url_pattern("https://example.com/careers/123", "Acme").is_none());
        assert!(generate_url_pattern("not a url", "Acme").is_none());
    }
}
