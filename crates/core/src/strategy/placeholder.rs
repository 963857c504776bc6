//! Offline image placeholders.

use crate::request::RequestDescriptor;
use crate::response::{Response, ResponseType};

/// Produces the substitute for an image that could not be fetched.
pub trait PlaceholderSource: Send + Sync + 'static {
    fn placeholder(&self, request: &RequestDescriptor) -> Response;
}

/// A grey SVG box with a centred label.
#[derive(Debug, Clone)]
pub struct SvgPlaceholder {
    pub width: u32,
    pub height: u32,
    pub label: String,
}

impl Default for SvgPlaceholder {
    fn default() -> Self {
        Self { width: 400, height: 300, label: "Offline".into() }
    }
}

impl SvgPlaceholder {
    pub fn render(&self) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                r##"<rect width="100%" height="100%" fill="#e0e0e0"/>"##,
                r##"<text x="50%" y="50%" fill="#757575" font-family="sans-serif" font-size="20" "##,
                r#"text-anchor="middle" dominant-baseline="middle">{label}</text></svg>"#
            ),
            w = self.width,
            h = self.height,
            label = escape_xml(&self.label),
        )
    }
}

impl PlaceholderSource for SvgPlaceholder {
    fn placeholder(&self, request: &RequestDescriptor) -> Response {
        Response::ok(self.render())
            .with_header("content-type", "image/svg+xml")
            .with_header("cache-control", "no-store")
            .with_url(request.url().as_str())
            .with_type(ResponseType::Basic)
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_placeholder_is_svg() {
        let descriptor = RequestDescriptor::shell(Url::parse("https://example.com/cover.jpg").unwrap());
        let response = SvgPlaceholder::default().placeholder(&descriptor);
        assert_eq!(response.status(), 200);
        assert_eq!(response.header("content-type"), Some("image/svg+xml"));
        assert_eq!(response.header("cache-control"), Some("no-store"));
        let body = response.text();
        assert!(body.starts_with("<svg"));
        assert!(body.contains(">Offline</text>"));
    }

    #[test]
    fn test_label_escaped() {
        let svg = SvgPlaceholder { label: "<b>&".into(), ..Default::default() }.render();
        assert!(svg.contains("&lt;b&gt;&amp;"));
    }
}
