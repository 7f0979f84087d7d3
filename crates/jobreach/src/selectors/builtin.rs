//! Built-in site selectors.
//!
//! Seeded into the database on first startup to give new installs
//! out-of-the-box coverage of common job boards. Seeding never
//! overwrites an existing row, so user customizations win.

/// A bundled selector rule.
pub struct BuiltinSelector {
    pub domain: &'static str,
    pub site_type: &'static str,
    pub company_name: Option<&'static str>,
    pub platform_name: Option<&'static str>,
    pub url_pattern: Option<&'static str>,
}

const fn company(domain: &'static str, name: &'static str) -> BuiltinSelector {
    BuiltinSelector {
        domain,
        site_type: "company",
        company_name: Some(name),
        platform_name: None,
        url_pattern: None,
    }
}

const fn platform(
    domain: &'static str,
    name: &'static str,
    pattern: &'static str,
) -> BuiltinSelector {
    BuiltinSelector {
        domain,
        site_type: "platform",
        company_name: None,
        platform_name: Some(name),
        url_pattern: Some(pattern),
    }
}

/// Bundled rules: direct company career pages map straight to a name;
/// multi-tenant platforms carry a pattern that pulls the company token
/// out of the URL.
pub const BUILTIN_SELECTORS: &[BuiltinSelector] = &[
    // Company career pages.
    company("amazon.jobs", "amazon"),
    company("careers.cisco.com", "cisco"),
    company("careers.ibm.com", "IBM"),
    company("careers.qualitestgroup.com", "qualitest"),
    company("catonetworks.com", "cato"),
    company("fullpath.com", "Fullpath"),
    company("global-e.com", "global e"),
    company("jobs.sap.com", "sap"),
    company("nanit.com", "nanit"),
    company("nayax.com", "nayax"),
    company("papaya.com", "papaya"),
    company("rapyd.net", "rapyd"),
    company("tailorbrands.com", "Tailor Brands"),
    company("waterfall-security.com", "waterfall"),
    // Job platforms.
    platform("greenhouse.io", "greenhouse", r"boards\.greenhouse\.io/([^/]+)"),
    platform("boards.greenhouse.io", "greenhouse", r"boards\.greenhouse\.io/([^/]+)"),
    platform(
        "job-boards.eu.greenhouse.io",
        "greenhouse",
        r"job-boards\.eu\.greenhouse\.io/([^/]+)",
    ),
    platform("lever.co", "lever", r"jobs\.lever\.co/([^/]+)"),
    platform("jobs.lever.co", "lever", r"jobs\.lever\.co/([^/]+)"),
    platform("jobs.eu.lever.co", "lever", r"jobs\.eu\.lever\.co/([^/]+)"),
    platform(
        "myworkdayjobs.com",
        "workday",
        r"://([^.]+)\.wd\d*\.myworkdayjobs\.com",
    ),
    platform("ashbyhq.com", "ashby", r"jobs\.ashbyhq\.com/([^/]+)"),
    platform("jobs.ashbyhq.com", "ashby", r"jobs\.ashbyhq\.com/([^/]+)"),
    platform(
        "smartrecruiters.com",
        "smartrecruiters",
        r"jobs\.smartrecruiters\.com/([^/]+)",
    ),
    platform("breezy.hr", "breezy", r"://([^.]+)\.breezy\.hr"),
    platform("applytojob.com", "jazzhr", r"://([^.]+)\.applytojob\.com"),
    platform("recruitee.com", "recruitee", r"://([^.]+)\.recruitee\.com"),
    platform("bamboohr.com", "bamboohr", r"://([^.]+)\.bamboohr\.com"),
    platform("icims.com", "icims", r"://careers-([^.]+)\.icims\.com"),
    platform("comeet.com", "comeet", r"www\.comeet\.com/jobs/([^/]+)"),
];
