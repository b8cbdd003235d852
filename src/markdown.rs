use pulldown_cmark::{html, Event, Options, Parser};

/// Render article Markdown to HTML. Raw HTML in the source is escaped.
pub fn render_markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut rendered = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut rendered, parser);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_common_constructs() {
        let html = render_markdown("# Title\n\nSome **bold** and `code`.\n\n```rust\nfn main() {}\n```\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<pre><code class=\"language-rust\">fn main() {}"));
    }

    #[test]
    fn renders_links_and_images() {
        let html = render_markdown("[site](https://example.com) ![cat](/uploads/articles/1-a.png)");
        assert!(html.contains("<a href=\"https://example.com\">site</a>"));
        assert!(html.contains("<img src=\"/uploads/articles/1-a.png\" alt=\"cat\" />"));
    }

    #[test]
    fn escapes_raw_html() {
        let html = render_markdown("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
