pub const INDEX_URI: &str = "spec-score://pages/index";
pub const PRIVACY_URI: &str = "spec-score://pages/privacy";

pub const INDEX_HTML: &str = include_str!("../pages/index.html");
pub const PRIVACY_HTML: &str = include_str!("../pages/privacy.html");

#[derive(Debug, Clone, Copy)]
pub struct PageResource {
    pub uri: &'static str,
    pub http_path: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
    pub text: &'static str,
}

static PAGE_RESOURCES: [PageResource; 2] = [
    PageResource {
        uri: INDEX_URI,
        http_path: "/",
        name: "pages/index.html",
        description: "Landing page: axes, verdicts, and API overview.",
        mime_type: "text/html",
        text: INDEX_HTML,
    },
    PageResource {
        uri: PRIVACY_URI,
        http_path: "/privacy",
        name: "pages/privacy.html",
        description: "Privacy policy: no data collected, stored, or logged.",
        mime_type: "text/html",
        text: PRIVACY_HTML,
    },
];

pub fn pages() -> &'static [PageResource] {
    &PAGE_RESOURCES
}

pub fn page_text(uri: &str) -> Option<&'static str> {
    PAGE_RESOURCES
        .iter()
        .find(|page| page.uri == uri)
        .map(|page| page.text)
}

pub fn page_for_path(path: &str) -> Option<&'static PageResource> {
    PAGE_RESOURCES.iter().find(|page| page.http_path == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uris_resolve_to_page_text() {
        assert!(page_text(INDEX_URI).is_some_and(|t| t.contains("Spec Score")));
        assert!(page_text(PRIVACY_URI).is_some_and(|t| t.contains("Privacy Policy")));
        assert!(page_text("spec-score://pages/missing").is_none());
    }

    #[test]
    fn http_paths_resolve_to_pages() {
        assert!(page_for_path("/").is_some_and(|p| p.uri == INDEX_URI));
        assert!(page_for_path("/privacy").is_some_and(|p| p.uri == PRIVACY_URI));
        assert!(page_for_path("/nope").is_none());
    }
}
