use std::sync::OnceLock;

use regex::Regex;

/// Rewrite a spreadsheet share link (the "/edit" form people copy out of
/// their browser) into its CSV export form, keeping the tab id when the
/// link carries one. Anything that is not a share link passes through
/// unchanged, so applying this twice is a no-op.
pub fn resolve(shareable_link: &str) -> String {
    static SHARE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SHARE_RE.get_or_init(|| {
        Regex::new(r"^(https?://[^/]+/spreadsheets/d/[A-Za-z0-9_-]+)/edit[^#]*(?:#gid=(\d+))?$")
            .unwrap()
    });

    let link = shareable_link.trim();
    match re.captures(link) {
        Some(caps) => {
            let mut url = format!("{}/export?format=csv", &caps[1]);
            if let Some(gid) = caps.get(2) {
                url.push_str("&gid=");
                url.push_str(gid.as_str());
            }
            url
        }
        None => link.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHARE: &str =
        "https://docs.google.com/spreadsheets/d/1XZXKwCfJ_922HAkAANzpXyyZL97uJzcu84viFWdtgpA/edit?usp=sharing";
    const EXPORT: &str =
        "https://docs.google.com/spreadsheets/d/1XZXKwCfJ_922HAkAANzpXyyZL97uJzcu84viFWdtgpA/export?format=csv";

    #[test]
    fn test_share_link_rewritten() {
        assert_eq!(resolve(SHARE), EXPORT);
    }

    #[test]
    fn test_tab_id_preserved() {
        let link = "https://docs.google.com/spreadsheets/d/abc_DEF-123/edit?usp=sharing#gid=42";
        assert_eq!(
            resolve(link),
            "https://docs.google.com/spreadsheets/d/abc_DEF-123/export?format=csv&gid=42"
        );
    }

    #[test]
    fn test_export_link_passes_through() {
        assert_eq!(resolve(EXPORT), EXPORT);
    }

    #[test]
    fn test_unrelated_url_passes_through() {
        assert_eq!(resolve("https://example.com/data.csv"), "https://example.com/data.csv");
        assert_eq!(resolve("not a url"), "not a url");
    }

    #[test]
    fn test_idempotent() {
        for link in [SHARE, EXPORT, "https://example.com/data.csv"] {
            assert_eq!(resolve(&resolve(link)), resolve(link));
        }
    }
}
