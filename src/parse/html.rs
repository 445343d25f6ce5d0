//! HTML parsing and text extraction

use super::normalize_whitespace;
use crate::error::{Error, Result};
use scraper::{Html, Selector};
use url::Url;

/// A page extracted for indexing.
///
/// The id doubles as the storage path of the page's text content.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub id: String,
    pub title: String,
    pub text: String,
}

/// Derive the storage id for a page URL: `{hostname}{pathname}#content.txt`.
pub fn document_id(page_url: &str) -> Result<String> {
    let url = Url::parse(page_url)?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::Parse(format!("URL has no host: {}", page_url)))?;
    Ok(format!("{}{}#content.txt", host, url.path()))
}

/// Parse a page's HTML and extract its title and visible body text.
///
/// Title and body both fall back to the empty string when absent.
pub fn extract_page(html: &str, page_url: &str) -> Result<ExtractedPage> {
    let id = document_id(page_url)?;
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|s| document.select(&s).next())
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let body_html = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
        .map(|elem| elem.html());

    let text = match body_html {
        Some(body) => {
            let rendered = html2text::from_read(body.as_bytes(), 80).unwrap_or(body);
            normalize_whitespace(&rendered)
        }
        None => String::new(),
    };

    Ok(ExtractedPage { id, title, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id() {
        assert_eq!(
            document_id("https://example.com/docs/page").unwrap(),
            "example.com/docs/page#content.txt"
        );
        assert_eq!(
            document_id("https://example.com").unwrap(),
            "example.com/#content.txt"
        );
    }

    #[test]
    fn test_document_id_no_host() {
        assert!(document_id("not a url").is_err());
        assert!(document_id("data:text/plain,hi").is_err());
    }

    #[test]
    fn test_extract_page_basic() {
        let html = r#"
        <!DOCTYPE html>
        <html>
        <head><title>  Test Page  </title></head>
        <body>
            <h1>Main Heading</h1>
            <p>Some paragraph text here.</p>
        </body>
        </html>
        "#;

        let page = extract_page(html, "https://example.com/docs/intro").unwrap();
        assert_eq!(page.id, "example.com/docs/intro#content.txt");
        assert_eq!(page.title, "Test Page");
        assert!(page.text.contains("Main Heading"));
        assert!(page.text.contains("paragraph text"));
    }

    #[test]
    fn test_extract_page_missing_title() {
        let html = "<html><body><p>content</p></body></html>";
        let page = extract_page(html, "https://example.com/a").unwrap();
        assert_eq!(page.title, "");
        assert!(page.text.contains("content"));
    }

    #[test]
    fn test_extract_page_empty_body() {
        let html = "<html><head><title>T</title></head><body></body></html>";
        let page = extract_page(html, "https://example.com/a").unwrap();
        assert_eq!(page.title, "T");
        assert_eq!(page.text, "");
    }
}
