use super::document::{DocumentParser, Element, Node};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// [`DocumentParser`] backed by the `scraper` crate (html5ever).
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl DocumentParser for HtmlParser {
    fn locate(&self, markup: &str, tag: &str) -> Option<Element> {
        let selector = match Selector::parse(tag) {
            Ok(selector) => selector,
            Err(e) => {
                debug!("Invalid tag selector '{}': {:?}", tag, e);
                return None;
            }
        };
        let document = Html::parse_document(markup);
        let found = document.select(&selector).next()?;
        Some(detach(found))
    }
}

fn detach(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let mut detached = Element::new(value.name());
    for (name, attr) in value.attrs() {
        detached.set_attribute(name, attr);
    }

    for child in element.children() {
        match child.value() {
            scraper::Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    detached.push_child(Node::Element(detach(child)));
                }
            }
            scraper::Node::Text(text) => detached.push_child(Node::Text(String::from(&*text.text))),
            scraper::Node::Comment(comment) => {
                detached.push_child(Node::Comment(String::from(&*comment.comment)))
            }
            _ => {}
        }
    }
    detached
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_first_table() {
        let markup = r#"<html><body><p>intro</p>
            <table id="first"><tr><td><a href="x">x</a></td></tr></table>
            <table id="second"></table></body></html>"#;
        let table = HtmlParser.locate(markup, "table").unwrap();
        assert_eq!(table.tag(), "table");
        assert_eq!(table.attribute("id"), Some("first"));
        assert_eq!(table.count("a"), 1);
    }

    #[test]
    fn test_locate_missing() {
        assert!(HtmlParser.locate("<html><body>nothing</body></html>", "table").is_none());
        assert!(HtmlParser.locate("", "pre").is_none());
    }

    #[test]
    fn test_pre_text_survives_round_trip() {
        let markup = "<pre>int a = b &lt; c;\n  return a;</pre>";
        let pre = HtmlParser.locate(markup, "pre").unwrap();
        assert_eq!(pre.outer_html(), "<pre>int a = b &lt; c;\n  return a;</pre>");
    }

    #[test]
    fn test_img_is_void_after_parse() {
        let markup = r#"<pre><a name="0"></a><img src="../bitmaps/tm_0_9.gif">code</pre>"#;
        let pre = HtmlParser.locate(markup, "pre").unwrap();
        assert_eq!(pre.count("img"), 1);
        assert_eq!(
            pre.outer_html(),
            r#"<pre><a name="0"></a><img src="../bitmaps/tm_0_9.gif">code</pre>"#
        );
    }
}
