use crate::error::{Error, Result};
use scraper::{Html, Selector};

const PAGE_SELECTOR: &str = ".page";

/// Splits extractor HTML into one entry per page container, in document order.
///
/// With `as_text` each entry is the container's trimmed text content,
/// otherwise its inner markup.
pub fn extract_pages(html: &str, as_text: bool) -> Result<Vec<String>> {
    let selector = Selector::parse(PAGE_SELECTOR).map_err(|e| Error::Parse {
        what: "page selector",
        reason: e.to_string(),
        command: None,
    })?;
    let doc = Html::parse_document(html);
    Ok(doc
        .select(&selector)
        .map(|page| {
            if as_text {
                page.text().collect::<String>().trim().to_string()
            } else {
                page.inner_html()
            }
        })
        .collect())
}
