//! Patterns that must never appear in synthesizer output.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::output::{OutputViolation, ViolationCode};

/// Field names that would let a synthesizer claim provenance.
pub const FORBIDDEN_FIELDS: [&str; 7] = ["url", "author", "quote", "source_url", "username", "handle", "link"];

/// Fields tolerated for compatibility but never trusted.
pub const LEGACY_FIELDS: [&str; 2] = ["evidence", "sources"];

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bhttps?://[^\s\x22'<>)\]]*").expect("valid url regex"));

static WWW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bwww\.[^\s\x22'<>)\]]*").expect("valid www regex"));

/// Any dotted name ending in an alphabetic label; the label is captured
/// so file names can be told apart from hosts.
static BARE_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.([a-z]{2,24})\b").expect("valid domain regex")
});

/// Final labels that name file types or runtimes in prose, not hosts.
const FILE_EXTENSIONS: [&str; 24] = [
    "js", "jsx", "ts", "tsx", "json", "yaml", "yml", "toml", "txt", "pdf", "csv", "html", "htm", "css", "xml", "exe",
    "png", "jpg", "jpeg", "gif", "svg", "docx", "xlsx", "pptx",
];

// No lookbehind in `regex`: the leading group stands in for it. A word
// character before `@` is an email local part, not a handle.
static HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\w@])@([A-Za-z0-9_]{1,30})").expect("valid handle regex"));

static FORBIDDEN_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)"(url|author|quote|source_url|username|handle|link)"\s*:"#).expect("valid field regex")
});

static LEGACY_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"(evidence|sources)"\s*:\s*\["#).expect("valid legacy regex"));

/// Finds link and handle patterns in free text.
pub fn scan_text(text: &str, location: &str) -> Vec<OutputViolation> {
    let mut violations = Vec::new();

    for m in URL.find_iter(text) {
        violations.push(OutputViolation::new(
            ViolationCode::UrlDetected,
            format!("URL in {}: {}", location, m.as_str()),
        ));
    }
    for m in WWW.find_iter(text) {
        violations.push(OutputViolation::new(
            ViolationCode::WwwDetected,
            format!("www address in {}: {}", location, m.as_str()),
        ));
    }
    // Domains inside URLs were already reported.
    let without_links = WWW.replace_all(&URL.replace_all(text, " "), " ").into_owned();
    for caps in BARE_DOMAIN.captures_iter(&without_links) {
        if is_file_name(&caps) {
            continue;
        }
        violations.push(OutputViolation::new(
            ViolationCode::DomainDetected,
            format!("domain in {}: {}", location, &caps[0]),
        ));
    }
    for caps in HANDLE.captures_iter(text) {
        violations.push(OutputViolation::new(
            ViolationCode::HandleDetected,
            format!("handle in {}: @{}", location, &caps[2]),
        ));
    }

    violations
}

/// Forbidden `"field":` keys anywhere in raw text.
pub fn scan_field_names(raw: &str) -> Vec<OutputViolation> {
    FORBIDDEN_FIELD
        .captures_iter(raw)
        .map(|caps| {
            OutputViolation::new(
                ViolationCode::ForbiddenField,
                format!("forbidden field '{}' in output", caps[1].to_lowercase()),
            )
        })
        .collect()
}

/// Legacy `evidence`/`sources` arrays; reported as warnings only.
pub fn scan_legacy_arrays(raw: &str) -> Vec<String> {
    LEGACY_ARRAY
        .captures_iter(raw)
        .map(|caps| format!("legacy '{}' array present; only sampleIds are trusted", caps[1].to_lowercase()))
        .collect()
}

fn is_file_name(caps: &Captures<'_>) -> bool {
    let label = caps[1].to_ascii_lowercase();
    FILE_EXTENSIONS.contains(&label.as_str())
}

pub fn is_forbidden_field(key: &str) -> bool {
    let key = key.to_lowercase();
    FORBIDDEN_FIELDS.contains(&key.as_str())
}

/// Masks links and handles before text is shown to the synthesizer.
///
/// Only used on outbound prompt text. Synthesizer output is never repaired.
pub fn mask_for_prompt(text: &str) -> String {
    let masked = URL.replace_all(text, "[link]");
    let masked = WWW.replace_all(&masked, "[link]");
    let masked = BARE_DOMAIN.replace_all(&masked, |caps: &Captures<'_>| {
        if is_file_name(caps) {
            caps[0].to_string()
        } else {
            "[link]".to_string()
        }
    });
    HANDLE.replace_all(&masked, "${1}[user]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(text: &str) -> Vec<ViolationCode> {
        scan_text(text, "text").into_iter().map(|v| v.code).collect()
    }

    #[test]
    fn detects_each_link_kind_once() {
        assert_eq!(codes("see https://example.com/x"), vec![ViolationCode::UrlDetected]);
        assert_eq!(codes("see www.example.com"), vec![ViolationCode::WwwDetected]);
        assert_eq!(codes("see example.com for more"), vec![ViolationCode::DomainDetected]);
        assert_eq!(codes("ask @jane_doe"), vec![ViolationCode::HandleDetected]);
    }

    #[test]
    fn plain_prose_is_clean() {
        assert!(codes("Contract renewals are coming up in Q3, e.g. for agencies.").is_empty());
        assert!(codes("Uses Node.js and vs. competitors").is_empty());
    }

    #[test]
    fn email_is_a_domain_not_a_handle() {
        assert_eq!(codes("mail bob@corp.com"), vec![ViolationCode::DomainDetected]);
    }

    #[test]
    fn domains_under_any_tld_are_detected() {
        for text in [
            "visit acme.tech",
            "brightline.agency does SEO",
            "order at shop.in",
            "see growth.eu",
            "acme.nl",
            "buyer.so/pricing",
            "x.gg",
            "reach Buyer.Consulting today",
        ] {
            assert_eq!(codes(text), vec![ViolationCode::DomainDetected], "{}", text);
        }
    }

    #[test]
    fn file_names_and_numbers_are_not_domains() {
        assert!(codes("migrated to Next.js and exported report.PDF").is_empty());
        assert!(codes("CTR rose 3.5 points, i.e. about 12.75 percent").is_empty());
        assert_eq!(mask_for_prompt("see config.yaml"), "see config.yaml");
    }

    #[test]
    fn short_and_numeric_handles_are_detected() {
        assert_eq!(codes("ask @x"), vec![ViolationCode::HandleDetected]);
        assert_eq!(codes("switched to @1password"), vec![ViolationCode::HandleDetected]);
        assert_eq!(codes("thanks.@jane"), vec![ViolationCode::HandleDetected]);
        assert_eq!(mask_for_prompt("cc @x, thanks.@jane"), "cc [user], thanks.[user]");
    }

    #[test]
    fn field_names_are_case_insensitive() {
        assert_eq!(scan_field_names(r#"{"URL": "x", "Author" : "y"}"#).len(), 2);
        assert!(scan_field_names(r#"{"title": "url"}"#).is_empty());
    }

    #[test]
    fn legacy_arrays_are_warnings() {
        assert_eq!(scan_legacy_arrays(r#"{"evidence": [1]}"#).len(), 1);
        assert!(scan_legacy_arrays(r#"{"evidence": "x"}"#).is_empty());
    }

    #[test]
    fn masking_replaces_links_and_handles() {
        let masked = mask_for_prompt("Ping @acme_support or visit https://acme.io/help and acme.com");
        assert_eq!(masked, "Ping [user] or visit [link] and [link]");
    }
}
