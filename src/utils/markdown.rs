use ammonia::Builder;
use comrak::{markdown_to_html, Options};
use std::collections::HashSet;

/// Render a message body written in Markdown to HTML that is safe to embed
/// in a page.
///
/// comrak does the parsing with the common GFM extensions, ammonia strips
/// anything a forum user should not be able to inject.
pub fn render_markdown(raw: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.render.hardbreaks = true;
    options.render.unsafe_ = true; // raw HTML is cleaned below

    sanitize(&markdown_to_html(raw, &options))
}

fn sanitize(html: &str) -> String {
    let extra_tags: HashSet<&str> = [
        "h1", "h2", "h3", "h4", "h5", "h6", "pre", "code", "blockquote", "hr", "table", "thead",
        "tbody", "tr", "th", "td", "del", "img",
    ]
    .into_iter()
    .collect();

    let url_schemes: HashSet<&str> = ["http", "https", "mailto"].into_iter().collect();

    let mut builder = Builder::default();
    builder
        .add_tags(&extra_tags)
        .add_tag_attributes("a", &["href", "title"])
        .add_tag_attributes("img", &["src", "alt", "title"])
        .add_tag_attributes("code", &["class"])
        .url_schemes(url_schemes)
        .link_rel(Some("nofollow noopener noreferrer"));

    builder.clean(html).to_string()
}
