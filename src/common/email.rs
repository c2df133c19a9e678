//! Best-effort e-mail scraping from free text
//!
//! PubMed affiliation strings frequently embed the corresponding author's
//! address ("... Electronic address: jdoe@example.org."). This is a heuristic
//! over free text, not a validated contact field.

use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
            .expect("Failed to compile email regex")
    })
}

/// E-mail-shaped substrings of `text`, in order of appearance, deduplicated
pub fn extract_emails(text: &str) -> Vec<String> {
    unique_list(
        email_regex()
            .find_iter(text)
            .map(|m| m.as_str().to_string()),
    )
}

/// Remove exact duplicates while keeping first-seen order
pub fn unique_list<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut unique: Vec<String> = Vec::new();
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
