//! HTML to Markdown and plain text conversion

use scraper::node::Node;
use scraper::{ElementRef, Html};
use url::Url;

/// Turns fetched HTML into the formats written to disk
///
/// Implementations are shared across workers.
pub trait Converter: Send + Sync {
    /// Renders a page as Markdown
    fn convert(&self, html: &str) -> String;

    /// Normalizes a page title for display, given the page URL as fallback
    fn clean_title(&self, title: &str, url: &str) -> String;

    /// Renders a page as plain text
    fn to_text(&self, html: &str) -> String;
}

/// Elements that never contribute content
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "nav", "header", "footer",
];

/// Separators between a page title and a trailing site name
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " \u{2013} ", " \u{2014} "];

/// Default converter walking the parsed DOM
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlConverter;

impl HtmlConverter {
    pub fn new() -> Self {
        Self
    }

    fn render(&self, html: &str, style: Style) -> String {
        let document = Html::parse_document(html);
        let mut renderer = Renderer::new(style);
        renderer.children(pick_root(&document));
        renderer.finish()
    }
}

impl Converter for HtmlConverter {
    fn convert(&self, html: &str) -> String {
        self.render(html, Style::Markdown)
    }

    fn clean_title(&self, title: &str, url: &str) -> String {
        let collapsed = collapse_whitespace(title);

        let cleaned = TITLE_SEPARATORS
            .iter()
            .filter_map(|sep| collapsed.rfind(sep))
            .max()
            .filter(|&idx| idx > 0)
            .map(|idx| collapsed[..idx].trim())
            .unwrap_or(collapsed.as_str());

        if !cleaned.is_empty() {
            return cleaned.to_string();
        }

        last_path_segment(url).unwrap_or_else(|| url.to_string())
    }

    fn to_text(&self, html: &str) -> String {
        self.render(html, Style::Plain)
    }
}

/// Prefers `<main>`, then `<article>`, then `<body>`
fn pick_root(document: &Html) -> ElementRef<'_> {
    let find = |tag: &str| {
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == tag)
    };

    find("main")
        .or_else(|| find("article"))
        .or_else(|| find("body"))
        .unwrap_or_else(|| document.root_element())
}

fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Markdown,
    Plain,
}

struct Renderer {
    style: Style,
    out: String,
    list_depth: usize,
}

impl Renderer {
    fn new(style: Style) -> Self {
        Self {
            style,
            out: String::new(),
            list_depth: 0,
        }
    }

    fn markdown(&self) -> bool {
        self.style == Style::Markdown
    }

    fn children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.element(element);
                    }
                }
                _ => {}
            }
        }
    }

    fn text(&mut self, text: &str) {
        let starts_with_space = text.starts_with(char::is_whitespace);
        let ends_with_space = text.ends_with(char::is_whitespace);
        let collapsed = collapse_whitespace(text);

        if collapsed.is_empty() {
            if starts_with_space {
                self.space();
            }
            return;
        }
        if starts_with_space {
            self.space();
        }
        self.out.push_str(&collapsed);
        if ends_with_space {
            self.out.push(' ');
        }
    }

    fn space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let tag = element.value().name();
        if SKIPPED_TAGS.contains(&tag) {
            return;
        }

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.block_break();
                if self.markdown() {
                    let level = usize::from(tag.as_bytes()[1] - b'0');
                    self.out.push_str(&"#".repeat(level));
                    self.out.push(' ');
                }
                self.children(element);
                self.block_break();
            }
            "p" | "div" | "section" | "table" | "tr" | "dl" | "figure" => {
                self.block_break();
                self.children(element);
                self.block_break();
            }
            "br" => self.line_break(),
            "hr" => {
                self.block_break();
                if self.markdown() {
                    self.out.push_str("---");
                }
                self.block_break();
            }
            "pre" => self.preformatted(element),
            "code" if self.markdown() => self.wrapped(element, "`"),
            "strong" | "b" if self.markdown() => self.wrapped(element, "**"),
            "em" | "i" if self.markdown() => self.wrapped(element, "_"),
            "a" if self.markdown() => self.link(element),
            "img" if self.markdown() => {
                if let Some(src) = element.value().attr("src") {
                    let alt = element.value().attr("alt").unwrap_or("");
                    self.out.push_str(&format!("![{}]({})", alt, src));
                }
            }
            "ul" | "ol" => self.list(element, tag == "ol"),
            "blockquote" => self.blockquote(element),
            "td" | "th" => {
                self.space();
                self.children(element);
                self.space();
            }
            _ => self.children(element),
        }
    }

    fn wrapped(&mut self, element: ElementRef<'_>, marker: &str) {
        let inner = self.render_inline(element);
        if inner.is_empty() {
            return;
        }
        self.out.push_str(marker);
        self.out.push_str(&inner);
        self.out.push_str(marker);
    }

    fn link(&mut self, element: ElementRef<'_>) {
        let inner = self.render_inline(element);
        match element.value().attr("href") {
            Some(href) if !inner.is_empty() => {
                self.out.push_str(&format!("[{}]({})", inner, href));
            }
            _ => self.out.push_str(&inner),
        }
    }

    /// Renders an element's children on their own, collapsed to one line
    fn render_inline(&mut self, element: ElementRef<'_>) -> String {
        let saved = std::mem::take(&mut self.out);
        self.children(element);
        let inner = std::mem::replace(&mut self.out, saved);
        collapse_whitespace(&inner)
    }

    fn preformatted(&mut self, element: ElementRef<'_>) {
        let language = element
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "code")
            .and_then(|code| {
                code.value()
                    .classes()
                    .find_map(|c| c.strip_prefix("language-"))
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let code: String = element.text().collect();

        self.block_break();
        if self.markdown() {
            self.out.push_str("```");
            self.out.push_str(&language);
            self.out.push('\n');
            self.out.push_str(code.trim_end_matches('\n'));
            self.out.push_str("\n```");
        } else {
            self.out.push_str(code.trim_end_matches('\n'));
        }
        self.block_break();
    }

    fn list(&mut self, element: ElementRef<'_>, ordered: bool) {
        if self.list_depth == 0 {
            self.block_break();
        } else {
            self.line_break();
        }

        let indent = "  ".repeat(self.list_depth);
        self.list_depth += 1;

        let items = element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "li");

        for (idx, item) in items.enumerate() {
            self.line_break();
            self.out.push_str(&indent);
            if self.markdown() {
                if ordered {
                    self.out.push_str(&format!("{}. ", idx + 1));
                } else {
                    self.out.push_str("- ");
                }
            }
            self.children(item);
        }

        self.list_depth -= 1;
        if self.list_depth == 0 {
            self.block_break();
        }
    }

    fn blockquote(&mut self, element: ElementRef<'_>) {
        let saved = std::mem::take(&mut self.out);
        self.children(element);
        let inner = std::mem::replace(&mut self.out, saved);
        let inner = tidy(&inner);

        self.block_break();
        let prefix = if self.markdown() { "> " } else { "" };
        let quoted: Vec<String> = inner
            .lines()
            .map(|line| format!("{}{}", prefix, line).trim_end().to_string())
            .collect();
        self.out.push_str(&quoted.join("\n"));
        self.block_break();
    }

    fn line_break(&mut self) {
        trim_trailing_spaces(&mut self.out);
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn block_break(&mut self) {
        trim_trailing_spaces(&mut self.out);
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        if self.out.ends_with('\n') {
            self.out.push('\n');
        } else {
            self.out.push_str("\n\n");
        }
    }

    fn finish(self) -> String {
        let tidied = tidy(&self.out);
        if tidied.is_empty() {
            tidied
        } else {
            format!("{}\n", tidied)
        }
    }
}

fn trim_trailing_spaces(out: &mut String) {
    let trimmed = out.trim_end_matches([' ', '\t']).len();
    out.truncate(trimmed);
}

/// Trims line ends and collapses runs of blank lines outside code fences
fn tidy(input: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;
    let mut blank_run = 0;

    for line in input.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        let line = if in_fence { line } else { line.trim_end() };

        if line.is_empty() && !in_fence {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    lines.join("\n").trim_matches('\n').to_string()
}
