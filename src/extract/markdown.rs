//! Markdown rendering of sanitized markup

use htmd::options::{CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use tracing::warn;

fn converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .options(Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            ..Default::default()
        })
        .build()
}

/// Converts `html` to Markdown with ATX headings and fenced code blocks
///
/// Falls back to `fallback_text` if the converter fails, so a page never
/// loses its body because of a conversion error.
pub fn to_markdown(html: &str, fallback_text: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    match converter().convert(html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            warn!("Markdown conversion failed, using plain text: {}", e);
            fallback_text.to_string()
        }
    }
}
