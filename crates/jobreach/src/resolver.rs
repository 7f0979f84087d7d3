//! Company resolver — turns a job-posting URL into a hiring company name.
//!
//! Resolution order: exact domain rule, platform URL pattern, suffix
//! match over stored platform domains, and finally a pause for operator
//! input. Unmatched or malformed input never raises; only storage
//! failures surface as errors.

use regex::RegexBuilder;
use url::Url;

use crate::db::selector_repo::SelectorRow;
use crate::selectors::{SelectorError, SelectorStore, SiteType};

/// Where a resolved company name came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionSource {
    /// A stored rule mapped the domain straight to a company.
    KnownCompany,
    /// A platform pattern extracted the company token from the URL.
    PlatformPattern { platform: Option<String> },
}

/// Outcome of a resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        company: String,
        source: ResolutionSource,
    },
    /// No rule matched; the operator must classify the domain.
    NeedsInput {
        domain: Option<String>,
        url: String,
    },
}

/// Resolves company names against the selector store.
#[derive(Clone)]
pub struct CompanyResolver {
    store: SelectorStore,
}

impl CompanyResolver {
    pub fn new(store: SelectorStore) -> Self {
        Self { store }
    }

    /// Resolves the hiring company for a job-posting URL.
    pub fn resolve(&self, raw_url: &str) -> Result<Resolution, SelectorError> {
        let domain = match extract_domain(raw_url) {
            Some(d) => d,
            None => {
                log::warn!("Could not extract domain from URL: {}", raw_url);
                return Ok(Resolution::NeedsInput {
                    domain: None,
                    url: raw_url.to_string(),
                });
            }
        };

        // Exact host rule first.
        if let Some(row) = self.store.lookup_exact(&domain)? {
            if let Some(resolution) = self.try_row(raw_url, &row)? {
                return Ok(resolution);
            }
        }

        // Suffix matches over stored platform domains handle hosts never
        // seen verbatim (and exact rows whose pattern did not match).
        for row in self.store.platform_candidates(&domain)? {
            if let Some(resolution) = self.try_row(raw_url, &row)? {
                return Ok(resolution);
            }
        }

        Ok(Resolution::NeedsInput {
            domain: Some(domain),
            url: raw_url.to_string(),
        })
    }

    fn try_row(
        &self,
        raw_url: &str,
        row: &SelectorRow,
    ) -> Result<Option<Resolution>, SelectorError> {
        match SiteType::parse(&row.site_type) {
            Some(SiteType::Company) => {
                if let Some(company) = row.company_name.clone().filter(|c| !c.is_empty()) {
                    self.store.touch(&row.domain)?;
                    return Ok(Some(Resolution::Resolved {
                        company,
                        source: ResolutionSource::KnownCompany,
                    }));
                }
            }
            Some(SiteType::Platform) => {
                if let Some(company) = row
                    .url_pattern
                    .as_deref()
                    .and_then(|p| extract_company_from_url(raw_url, p))
                {
                    self.store.touch(&row.domain)?;
                    return Ok(Some(Resolution::Resolved {
                        company,
                        source: ResolutionSource::PlatformPattern {
                            platform: row.platform_name.clone(),
                        },
                    }));
                }
                log::warn!("URL pattern did not match for platform: {}", row.domain);
            }
            None => {
                log::warn!("Stored selector for {} has unknown site_type", row.domain);
            }
        }
        Ok(None)
    }
}

/// Extracts the normalized host from a URL: lowercased, `www.` stripped.
pub fn extract_domain(raw_url: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Applies a platform pattern to a URL and normalizes the captured
/// company token: `-`/`_` become spaces, then title case.
pub fn extract_company_from_url(raw_url: &str, pattern: &str) -> Option<String> {
    let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            log::warn!("Could not compile selector pattern '{}': {}", pattern, e);
            return None;
        }
    };

    let token = re.captures(raw_url)?.get(1)?.as_str();
    let spaced = token.replace(['-', '_'], " ");
    let company = title_case(&spaced);
    if company.is_empty() {
        return None;
    }
    log::info!("Extracted company from URL: {}", company);
    Some(company)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
