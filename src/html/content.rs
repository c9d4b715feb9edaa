//! Raw HTML handling: byte decoding, metadata extraction, and main-content
//! isolation.

use std::sync::LazyLock;

use encoding_rs::WINDOWS_1252;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static CATEGORY_META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="category"]"#).unwrap());
static MAIN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("main").unwrap());
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

static QUOTED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]*)['"]"#).unwrap());

/// Elements dropped entirely during main-content extraction.
const BOILERPLATE_TAGS: [&str; 7] = [
    "nav", "header", "footer", "aside", "script", "style", "noscript",
];

const VOID_TAGS: [&str; 6] = ["br", "hr", "img", "input", "link", "meta"];

/// Decodes raw document bytes, preferring UTF-8 with a lossy windows-1252
/// fallback. Never fails.
pub fn decode_html(bytes: &[u8], source_path: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::warn!(
                path = source_path,
                "UTF-8 decode failed, falling back to windows-1252"
            );
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

/// Extracts the document title from the `<title>` tag, defaulting to
/// `"Untitled"`.
pub fn extract_title(html: &str, source_path: &str) -> String {
    let document = Html::parse_document(html);
    if let Some(element) = document.select(&TITLE).next() {
        let title: String = element.text().collect::<String>().trim().to_string();
        if !title.is_empty() {
            return title;
        }
    }
    tracing::info!(path = source_path, "no title found");
    "Untitled".to_string()
}

/// Extracts category paths from `<meta name="category">`, whose content
/// attribute holds a list of quoted values.
pub fn extract_category_paths(html: &str, source_path: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    if let Some(element) = document.select(&CATEGORY_META).next() {
        let content = element.value().attr("content").unwrap_or("");
        return QUOTED_VALUE
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .collect();
    }
    tracing::info!(path = source_path, "no category metadata found");
    Vec::new()
}

/// Optionally isolates the main content of a page before Markdown conversion.
///
/// A pure function: with extraction disabled, or when nothing useful can be
/// isolated, the input is returned unchanged. Extraction keeps the subtree of
/// `<main>`, `<article>`, or `<body>` (first found, in that order) and drops
/// navigation and boilerplate elements.
pub fn extract_main_content(html: &str, extract: bool) -> String {
    if !extract {
        return html.to_string();
    }

    let document = Html::parse_document(html);
    let root = [&*MAIN, &*ARTICLE, &*BODY]
        .into_iter()
        .find_map(|selector| document.select(selector).next());
    let Some(root) = root else {
        return html.to_string();
    };

    let mut out = String::new();
    render_content(root, &mut out);
    if out.trim().is_empty() {
        html.to_string()
    } else {
        out
    }
}

/// Re-serializes an element subtree, skipping boilerplate elements.
fn render_content(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if BOILERPLATE_TAGS.contains(&name) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                out.push('<');
                out.push_str(name);
                for (attr, value) in el.attrs() {
                    out.push(' ');
                    out.push_str(attr);
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if !VOID_TAGS.contains(&name) {
                    render_content(child_ref, out);
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <html>
            <head>
                <title>Test Document</title>
                <meta name="category" content='"cat1", "cat2", "cat3"'/>
            </head>
            <body>
                <h1>Heading 1</h1>
                <p>This is a paragraph.</p>
                <h2>Heading 2</h2>
                <p>Another paragraph.</p>
                <nav>Navigation content</nav>
            </body>
        </html>
    "#;

    #[test]
    fn decodes_utf8() {
        assert_eq!(decode_html("héllo".as_bytes(), "p"), "héllo");
    }

    #[test]
    fn falls_back_to_windows_1252() {
        // 0xE9 is "é" in windows-1252 and invalid UTF-8 on its own.
        let decoded = decode_html(b"caf\xe9", "p");
        assert_eq!(decoded, "café");
    }

    #[test]
    fn extracts_title() {
        assert_eq!(extract_title(HTML, "p"), "Test Document");
    }

    #[test]
    fn missing_title_defaults_to_untitled() {
        assert_eq!(extract_title("<html><body>x</body></html>", "p"), "Untitled");
    }

    #[test]
    fn extracts_category_paths() {
        assert_eq!(extract_category_paths(HTML, "p"), vec!["cat1", "cat2", "cat3"]);
    }

    #[test]
    fn missing_category_meta_yields_empty() {
        assert!(extract_category_paths("<html></html>", "p").is_empty());
    }

    #[test]
    fn extraction_disabled_returns_input() {
        assert_eq!(extract_main_content(HTML, false), HTML);
    }

    #[test]
    fn extraction_drops_navigation() {
        let extracted = extract_main_content(HTML, true);
        assert!(extracted.contains("This is a paragraph."));
        assert!(extracted.contains("Another paragraph."));
        assert!(!extracted.contains("Navigation content"));
    }

    #[test]
    fn extraction_prefers_main_element() {
        let html = "<body><nav>menu</nav><main><p>core</p></main><footer>f</footer></body>";
        let extracted = extract_main_content(html, true);
        assert!(extracted.contains("core"));
        assert!(!extracted.contains("menu"));
        assert!(!extracted.contains("<footer>"));
    }

    #[test]
    fn unextractable_input_passes_through() {
        let fragment = "plain text, nothing structural";
        let extracted = extract_main_content(fragment, true);
        assert!(extracted.contains("plain text"));
    }
}
