//! MHC-II allele identifiers.

use regex::Regex;

/// Default HLA-DRB1 panel evaluated during binding re-evaluation.
pub const DEFAULT_DRB1_PANEL: [&str; 8] = [
    "DRB1*01:01",
    "DRB1*03:01",
    "DRB1*04:01",
    "DRB1*07:01",
    "DRB1*08:01",
    "DRB1*11:01",
    "DRB1*13:01",
    "DRB1*15:01",
];

pub fn default_panel() -> Vec<String> {
    DEFAULT_DRB1_PANEL.iter().map(|a| a.to_string()).collect()
}

fn allele_regex() -> Option<&'static Regex> {
    use std::sync::OnceLock;
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        // DRB1_0101, DRB1*01:01, HLA-DRB1*0101, drb1_1501
        Regex::new(r"(?i)^(?:HLA-)?(DRB\d|DQA\d|DQB\d|DPA\d|DPB\d)[\*_]?(\d{2}):?(\d{2,3})$").ok()
    })
    .as_ref()
}

/// Canonical `DRB1*01:01` form of an allele name. Names that do not look like
/// an HLA class II allele are returned trimmed but otherwise untouched.
pub fn normalize_allele(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(re) = allele_regex() else {
        return trimmed.to_string();
    };
    match re.captures(trimmed) {
        Some(caps) => format!(
            "{}*{}:{}",
            caps[1].to_ascii_uppercase(),
            &caps[2],
            &caps[3]
        ),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_netmhcii_style() {
        assert_eq!(normalize_allele("DRB1_0101"), "DRB1*01:01");
        assert_eq!(normalize_allele("HLA-DRB1*15:01"), "DRB1*15:01");
        assert_eq!(normalize_allele("drb1_0401"), "DRB1*04:01");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        assert_eq!(normalize_allele(" H2-IAb "), "H2-IAb");
    }

    #[test]
    fn test_default_panel_is_canonical() {
        for allele in DEFAULT_DRB1_PANEL {
            assert_eq!(normalize_allele(allele), allele);
        }
        assert_eq!(default_panel().len(), 8);
    }
}
