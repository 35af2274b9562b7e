/// Named regular expressions for common field shapes.
///
/// Used by the `--pattern` CLI flag and the GUI "Patterns" menu; each one is
/// run as an ordinary regex search.
pub const PRESETS: &[(&str, &str)] = &[
    ("email", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
    ("phone_us", r"\d{3}-\d{3}-\d{4}"),
    ("phone_intl", r"\+\d{1,3}[-.\s]?\d{1,14}"),
    ("date_iso", r"\d{4}-\d{2}-\d{2}"),
    ("date_us", r"\d{1,2}/\d{1,2}/\d{4}"),
    ("ssn", r"\d{3}-\d{2}-\d{4}"),
    ("zip_code", r"\d{5}(-\d{4})?"),
    ("url", r"https?://[^\s]+"),
    ("ip_address", r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}"),
    ("credit_card", r"\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}"),
];

/// Look up a preset by name (case-insensitive).
pub fn preset(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, p)| *p)
}

pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_compiles() {
        for (name, pattern) in PRESETS {
            assert!(regex::Regex::new(pattern).is_ok(), "{name}");
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(preset("EMAIL"), preset("email"));
        assert!(preset("nope").is_none());
        assert!(regex::Regex::new(preset("date_iso").unwrap())
            .unwrap()
            .is_match("2024-01-05"));
    }
}
