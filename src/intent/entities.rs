//! Entity extraction — a fixed set of regexes run over raw text, one
//! per entity kind. Every non-empty match set becomes an argument keyed
//! by entity kind.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(?:25[0-5]|2[0-4][0-9]|1?[0-9]{1,2})\.){3}(?:25[0-5]|2[0-4][0-9]|1?[0-9]{1,2})\b").unwrap()
});

static MAC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:[0-9A-F]{2}[:-]){5}[0-9A-F]{2}\b").unwrap()
});

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?){2,}\b").unwrap()
});

static DEVICE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdevice[-_ ]?[a-z0-9]{4,}\b").unwrap()
});

static SEVERITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(critical|high|medium|low|info)\b").unwrap()
});

/// Run every entity regex over `text`; returns a map from entity kind
/// to the ordered, de-duplicated list of raw match strings. Kinds with
/// zero matches are omitted.
pub fn extract(text: &str) -> BTreeMap<&'static str, Vec<String>> {
    let mut out = BTreeMap::new();
    insert_matches(&mut out, "ip_address", &IPV4, text);
    insert_matches(&mut out, "mac_address", &MAC, text);
    insert_matches(&mut out, "hostname", &HOSTNAME, text);
    insert_matches(&mut out, "device_id", &DEVICE_ID, text);
    insert_matches(&mut out, "severity", &SEVERITY, text);
    out
}

fn insert_matches(out: &mut BTreeMap<&'static str, Vec<String>>, kind: &'static str, regex: &Regex, text: &str) {
    let mut seen = Vec::new();
    for m in regex.find_iter(text) {
        let value = m.as_str().to_string();
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    if !seen.is_empty() {
        out.insert(kind, seen);
    }
}
