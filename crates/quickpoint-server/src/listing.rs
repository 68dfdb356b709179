//! Directory listings for directories without an index file.

use std::fmt::Write;
use std::path::Path;

use axum::response::{Html, IntoResponse, Response};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::error::ServerError;

/// Characters escaped in listing hrefs (one path segment each).
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    name: String,
    is_dir: bool,
}

/// Render an HTML listing of `dir`, titled with the request path.
pub(crate) async fn render(dir: &Path, url_path: &str) -> Result<Response, ServerError> {
    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .map_err(|_| ServerError::FileNotFound(dir.to_path_buf()))?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .is_ok_and(|m| m.is_dir());
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    entries.sort_by_key(|e| e.name.to_lowercase());

    let title = percent_decode_str(url_path).decode_utf8_lossy();
    Ok(Html(render_html(&title, &entries)).into_response())
}

fn render_html(title: &str, entries: &[Entry]) -> String {
    let title = escape_html(title);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Directory listing for {title}</title>\n</head>\n<body>\n\
         <h1>Directory listing for {title}</h1>\n<hr>\n<ul>\n"
    );

    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let href = utf8_percent_encode(&entry.name, SEGMENT);
        let label = escape_html(&entry.name);
        let _ = writeln!(html, "<li><a href=\"{href}{suffix}\">{label}{suffix}</a></li>");
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool) -> Entry {
        Entry {
            name: name.to_owned(),
            is_dir,
        }
    }

    #[test]
    fn test_render_marks_directories() {
        let html = render_html("/presentation/", &[entry("images", true), entry("a.md", false)]);

        assert!(html.contains("<a href=\"images/\">images/</a>"));
        assert!(html.contains("<a href=\"a.md\">a.md</a>"));
        assert!(html.contains("Directory listing for /presentation/"));
    }

    #[test]
    fn test_render_escapes_names() {
        let html = render_html("/", &[entry("<b>&co.html", false)]);

        assert!(html.contains("href=\"%3Cb%3E%26co.html\""));
        assert!(html.contains("&lt;b&gt;&amp;co.html</a>"));
    }

    #[test]
    fn test_render_encodes_spaces() {
        let html = render_html("/", &[entry("my slide.png", false)]);
        assert!(html.contains("href=\"my%20slide.png\""));
    }

    #[tokio::test]
    async fn test_render_sorts_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("A.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();

        let response = render(dir.path(), "/presentation/").await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();

        let a = html.find("A.txt").unwrap();
        let b = html.find("b.txt").unwrap();
        let c = html.find("c/").unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn test_render_missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let result = render(&dir.path().join("gone"), "/gone/").await;

        assert!(matches!(result, Err(ServerError::FileNotFound(_))));
    }
}
