//! HTML templates with `{{title}}` / `{{body}}` substitution

use super::{RenderMode, Renderer};
use crate::error::RenderError;
use std::path::Path;
use wiki_types::Page;

const VIEW_HTML: &str = include_str!("../../assets/view.html");
const EDIT_HTML: &str = include_str!("../../assets/edit.html");

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Title,
    Body,
}

/// A template split into literal text and placeholders
#[derive(Debug, Clone)]
struct Template {
    segments: Vec<Segment>,
}

impl Template {
    fn parse(name: &str, source: &str) -> Result<Self, RenderError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| {
                RenderError::Template(format!("{name}: unclosed '{{{{' placeholder"))
            })?;
            segments.push(match after[..end].trim() {
                "title" => Segment::Title,
                "body" => Segment::Body,
                other => {
                    return Err(RenderError::Template(format!(
                        "{name}: unknown placeholder {other:?}"
                    )))
                }
            });
            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        for (required, label) in [(Segment::Title, "title"), (Segment::Body, "body")] {
            if !segments.contains(&required) {
                return Err(RenderError::Template(format!(
                    "{name}: missing {{{{{label}}}}} placeholder"
                )));
            }
        }

        Ok(Self { segments })
    }

    fn render(&self, page: &Page) -> Vec<u8> {
        let title = html_escape::encode_safe(page.title.as_str());
        let body_text = page.body_text();
        let body = html_escape::encode_safe(&body_text);

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Title => out.push_str(&title),
                Segment::Body => out.push_str(&body),
            }
        }
        out.into_bytes()
    }
}

/// Renderer backed by a view and an edit template
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    view: Template,
    edit: Template,
}

impl HtmlRenderer {
    /// Templates compiled into the binary
    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_sources(VIEW_HTML, EDIT_HTML)
    }

    /// Load `view.html` and `edit.html` from a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let dir = dir.as_ref();
        let view = std::fs::read_to_string(dir.join(RenderMode::View.template_name()))?;
        let edit = std::fs::read_to_string(dir.join(RenderMode::Edit.template_name()))?;
        tracing::info!(dir = %dir.display(), "Loaded page templates");
        Self::from_sources(&view, &edit)
    }

    pub fn from_sources(view: &str, edit: &str) -> Result<Self, RenderError> {
        Ok(Self {
            view: Template::parse(RenderMode::View.template_name(), view)?,
            edit: Template::parse(RenderMode::Edit.template_name(), edit)?,
        })
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, mode: RenderMode, page: &Page) -> Result<Vec<u8>, RenderError> {
        let template = match mode {
            RenderMode::View => &self.view,
            RenderMode::Edit => &self.edit,
        };
        Ok(template.render(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiki_types::Title;

    fn page(title: &str, body: &str) -> Page {
        Page::new(Title::parse(title).unwrap(), body)
    }

    fn render(renderer: &HtmlRenderer, mode: RenderMode, page: &Page) -> String {
        String::from_utf8(renderer.render(mode, page).unwrap()).unwrap()
    }

    #[test]
    fn test_builtin_view() {
        let renderer = HtmlRenderer::builtin().unwrap();
        let html = render(&renderer, RenderMode::View, &page("Welcome", "Hello World"));
        assert!(html.contains("<h1>Welcome</h1>"));
        assert!(html.contains("Hello World"));
        assert!(html.contains("/edit/Welcome"));
    }

    #[test]
    fn test_builtin_edit_form() {
        let renderer = HtmlRenderer::builtin().unwrap();
        let html = render(&renderer, RenderMode::Edit, &page("Welcome", ""));
        assert!(html.contains("action=\"/save/Welcome\""));
        assert!(html.contains("name=\"body\""));
        assert!(html.contains("></textarea>"));
    }

    #[test]
    fn test_body_is_escaped() {
        let renderer = HtmlRenderer::builtin().unwrap();
        let html = render(
            &renderer,
            RenderMode::View,
            &page("Xss", "<script>alert(1)</script> & more"),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp; more"));
    }

    #[test]
    fn test_custom_sources() {
        let renderer = HtmlRenderer::from_sources("V:{{title}}={{ body }}", "E:{{title}}:{{body}}").unwrap();
        assert_eq!(render(&renderer, RenderMode::View, &page("A", "b")), "V:A=b");
        assert_eq!(render(&renderer, RenderMode::Edit, &page("A", "b")), "E:A:b");
    }

    #[test]
    fn test_rejects_bad_templates() {
        assert!(matches!(
            HtmlRenderer::from_sources("{{title}}", "{{title}}{{body}}"),
            Err(RenderError::Template(_))
        ));
        assert!(matches!(
            HtmlRenderer::from_sources("{{title}}{{body}}{{author}}", "{{title}}{{body}}"),
            Err(RenderError::Template(_))
        ));
        assert!(matches!(
            HtmlRenderer::from_sources("{{title}}{{body", "{{title}}{{body}}"),
            Err(RenderError::Template(_))
        ));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("view.html"), "<p>{{title}}</p>{{body}}").unwrap();
        std::fs::write(dir.path().join("edit.html"), "<form>{{title}}{{body}}</form>").unwrap();

        let renderer = HtmlRenderer::from_dir(dir.path()).unwrap();
        assert_eq!(
            render(&renderer, RenderMode::View, &page("Home", "hi")),
            "<p>Home</p>hi"
        );
    }

    #[test]
    fn test_from_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            HtmlRenderer::from_dir(dir.path()),
            Err(RenderError::Io(_))
        ));
    }
}
