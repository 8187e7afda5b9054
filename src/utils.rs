//! Utility functions for text extraction and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Visible-text extraction from HTML documents for the pattern-based
//!   adapters
//! - Whitespace normalization
//! - File system validation for output directories

use scraper::{ElementRef, Html};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Extract the visible text of an HTML document.
///
/// Walks the DOM and collects text nodes, skipping `script`, `style`, and
/// `noscript` subtrees so that embedded JavaScript does not pollute the
/// pattern matching done by the adapters. The result is whitespace
/// normalized.
///
/// # Arguments
///
/// * `html` - Raw HTML document
///
/// # Returns
///
/// The document's visible text with runs of whitespace collapsed to
/// single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_text(document.root_element(), &mut out);
    clean_text(&out)
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            match child_el.value().name() {
                "script" | "style" | "noscript" => {}
                _ => collect_text(child_el, out),
            }
        }
    }
}

/// Collapse all runs of whitespace to single spaces and trim the ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("  hello \n  world  "), "hello world");
/// ```
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Arguments
///
/// * `path` - The directory path to validate
///
/// # Returns
///
/// `Ok(())` if the directory exists and is writable, or an error describing
/// the failure.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  hello   world  "), "hello world");
        assert_eq!(clean_text("multi\nline\ntext"), "multi line text");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let html = r#"
            <html>
            <head><style>.a { color: red; }</style></head>
            <body>
                <div>5/10 Lifts Open</div>
                <script>var hidden = "12/12 Lifts";</script>
                <noscript>Enable JavaScript</noscript>
                <div>Base: 48"</div>
            </body>
            </html>
        "#;

        let text = visible_text(html);
        assert!(text.contains("5/10 Lifts Open"));
        assert!(text.contains("Base: 48\""));
        assert!(!text.contains("12/12"));
        assert!(!text.contains("Enable JavaScript"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_visible_text_normalizes_whitespace() {
        let html = "<html><body><p>New\n   Snow:</p>\n<p>6\"</p></body></html>";
        assert_eq!(visible_text(html), "New Snow: 6\"");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested/data");
        let target_str = target.to_str().unwrap();

        ensure_writable_dir(target_str).await.unwrap();
        assert!(target.is_dir());
    }
}
