//! Queryable index over one fetched HTML page
//!
//! A single pre-order walk of the parsed document collects every
//! hyperlink together with the text of the nearest preceding
//! heading/paragraph/emphasis element, which downstream code uses for
//! quality classification. Parsing is tolerant of malformed markup and
//! never fails the chain; the worst case is an empty link set.

use scraper::{ElementRef, Html};

/// Elements whose text can serve as a label for a following link
const LABEL_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "span", "em", "b"];

/// One hyperlink discovered on a page
///
/// Transient: produced while scanning a page for the next hop and
/// discarded once the hop completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Raw href as it appears in the markup (possibly relative)
    pub url: String,
    /// Visible text of the anchor, trimmed
    pub text: String,
    /// `id` attribute of the anchor, when present
    pub attr_id: Option<String>,
    /// Text of the nearest preceding label element, captured at parse time
    label: Option<String>,
}

impl LinkCandidate {
    /// Constructs a synthetic candidate for content-scan matches
    pub(crate) fn bare(url: String) -> Self {
        Self {
            url,
            text: String::new(),
            attr_id: None,
            label: None,
        }
    }
}

/// Parsed, queryable structure over one HTML document
pub struct PageIndex {
    links: Vec<LinkCandidate>,
    raw: String,
}

impl PageIndex {
    /// Parses an HTML document into a link index
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut links = Vec::new();
        let mut last_label: Option<String> = None;

        for node in document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            let name = element.value().name();

            if LABEL_TAGS.contains(&name) {
                let text = collect_text(&element);
                if !text.is_empty() {
                    last_label = Some(text);
                }
            } else if name == "a"
                && let Some(href) = element.value().attr("href")
            {
                links.push(LinkCandidate {
                    url: href.to_string(),
                    text: collect_text(&element),
                    attr_id: element.value().attr("id").map(str::to_string),
                    label: last_label.clone(),
                });
            }
        }

        Self {
            links,
            raw: html.to_string(),
        }
    }

    /// All hyperlinks in document order
    pub fn all_links(&self) -> &[LinkCandidate] {
        &self.links
    }

    /// Text of the nearest label element preceding the candidate
    pub fn preceding_label<'a>(&self, candidate: &'a LinkCandidate) -> Option<&'a str> {
        candidate.label.as_deref()
    }

    /// The raw page text, for content-scan extraction strategies
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn collect_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collects_links_in_document_order() {
        let html = r#"
        <html><body>
            <a href="https://first.example/a">First</a>
            <a href="https://second.example/b" id="gen">Second</a>
        </body></html>
        "#;

        let index = PageIndex::parse(html);
        let links = index.all_links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://first.example/a");
        assert_eq!(links[0].text, "First");
        assert_eq!(links[0].attr_id, None);
        assert_eq!(links[1].attr_id.as_deref(), Some("gen"));
    }

    #[test]
    fn test_preceding_label_nearest_wins() {
        let html = r#"
        <html><body>
            <h3>480p x264</h3>
            <a href="https://one.example/">one</a>
            <h4>720p HEVC</h4>
            <a href="https://two.example/">two</a>
        </body></html>
        "#;

        let index = PageIndex::parse(html);
        let links = index.all_links();
        assert_eq!(index.preceding_label(&links[0]), Some("480p x264"));
        assert_eq!(index.preceding_label(&links[1]), Some("720p HEVC"));
    }

    #[test]
    fn test_preceding_label_absent() {
        let html = r#"<html><body><a href="https://x.example/">x</a></body></html>"#;
        let index = PageIndex::parse(html);
        assert_eq!(index.preceding_label(&index.all_links()[0]), None);
    }

    #[test]
    fn test_empty_label_elements_are_skipped() {
        let html = r#"
        <html><body>
            <h3>1080p BluRay</h3>
            <span>   </span>
            <a href="https://x.example/">x</a>
        </body></html>
        "#;
        let index = PageIndex::parse(html);
        assert_eq!(
            index.preceding_label(&index.all_links()[0]),
            Some("1080p BluRay")
        );
    }

    #[test]
    fn test_malformed_markup_never_fails() {
        let html = "<html><body><a href='https://x.example/'>x<div></a></body>";
        let index = PageIndex::parse(html);
        assert_eq!(index.all_links().len(), 1);
    }

    #[test]
    fn test_empty_page_yields_empty_link_set() {
        let index = PageIndex::parse("");
        assert!(index.all_links().is_empty());
    }

    #[test]
    fn test_anchors_without_href_are_ignored() {
        let html = r#"<html><body><a name="top">anchor</a></body></html>"#;
        let index = PageIndex::parse(html);
        assert!(index.all_links().is_empty());
    }
}
