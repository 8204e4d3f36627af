//! Rendering a whole page: resolve the page container's markup, run the
//! render walk over it, and hand back the finished document.

use kstring::KString;

use crate::component::{Container, Rendered};
use crate::document::Document;
use crate::element::Node;
use crate::error::MarkupError;
use crate::inherit::TemplateResolver;
use crate::render::{render, RenderCx};
use crate::util::all_whitespace;

/// The page is the root of the component tree and must own a markup
/// template. The returned document keeps the template's declaration,
/// dialect and doctype; its root is the rendered tree (or nothing, when
/// the page renders itself away).
pub fn render_page(
    resolver: &TemplateResolver<'_>,
    page: &dyn Container,
) -> Result<Document, MarkupError> {
    let class = page.markup_class().ok_or_else(|| MarkupError::NoMarkup {
        id: KString::from_ref(page.id()),
    })?;
    let mut doc = resolver.resolved_document(class)?;
    let root = match doc.root.take() {
        Some(r) => r,
        None => return Ok(doc),
    };
    let cx = RenderCx::new(resolver);
    match render(page, root, &cx)? {
        Rendered::Removed => Ok(doc),
        Rendered::Node(Node::Element(e)) => {
            doc.root = Some(e);
            Ok(doc)
        }
        Rendered::Node(Node::Text(_)) => Err(MarkupError::RootNotElement),
        Rendered::Expanded(nodes) => {
            // a sequence still has a usable root if it contains exactly
            // one element and otherwise only whitespace
            let mut significant = nodes
                .into_iter()
                .filter(|n| match n {
                    Node::Text(t) => !all_whitespace(t),
                    Node::Element(_) => true,
                })
                .collect::<Vec<_>>();
            if significant.len() == 1 {
                if let Some(Node::Element(e)) = significant.pop() {
                    doc.root = Some(e);
                    return Ok(doc);
                }
            }
            Err(MarkupError::RootNotElement)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TemplateCache;
    use crate::component::{BasicContainer, Label};
    use crate::document::Dialect;
    use crate::element::Element;
    use crate::markers::{self, MarkerAttr, MarkerTag};
    use crate::registry::ClassRegistry;
    use crate::resource::MemLoader;
    use crate::testutil::{child_names, el, mel, t0, with_child, with_id, with_marker_attr,
                          MapParser};

    struct World {
        registry: ClassRegistry,
        loader: MemLoader,
        parser: MapParser,
        cache: TemplateCache,
    }

    impl World {
        fn new() -> World {
            World {
                registry: ClassRegistry::new(),
                loader: MemLoader::new(),
                parser: MapParser::default(),
                cache: TemplateCache::new(16),
            }
        }

        fn class(
            &mut self,
            name: &str,
            supers: &[crate::registry::ClassId],
            doc: Document,
        ) -> crate::registry::ClassId {
            let path = format!("{name}.html");
            let token = format!("SRC:{name}");
            self.loader.insert(name, &path, t0(1), &token);
            self.parser.docs.insert(token, doc);
            self.registry
                .register(name, Dialect::Html, Some(&path), supers)
        }

        fn resolver(&self) -> TemplateResolver<'_> {
            TemplateResolver::new(&self.registry, &self.loader, &self.parser, &self.cache)
        }
    }

    fn base_doc() -> Document {
        Document::with_root(
            Dialect::Html,
            with_child(
                with_child(el("html"), with_child(el("head"), el("h0"))),
                with_child(el("body"), mel(MarkerTag::InsertPoint)),
            ),
        )
    }

    #[test]
    fn t_page_end_to_end() {
        // a derived page template extending a base layout, rendered
        // against a component tree with a hidden sibling and a message
        let mut w = World::new();
        let base = w.class("BasePage", &[], base_doc());
        let content = {
            let mut c = el("main");
            c.push_element(with_id(el("span"), "title"));
            c.push_element(with_id(el("span"), "missing_ok"));
            c.push_element(with_marker_attr(
                mel(MarkerTag::Message),
                MarkerAttr::Key,
                "footer",
            ));
            c
        };
        let page_doc = Document::with_root(
            Dialect::Html,
            with_child(
                with_child(
                    mel(MarkerTag::Extend),
                    with_child(mel(MarkerTag::Head), el("style")),
                ),
                content,
            ),
        );
        let page_class = w.class("HomePage", &[base], page_doc);

        let mut page = BasicContainer::new("home").with_markup(page_class);
        page.add(Label::new("title", "Welcome")).unwrap();
        page.add(Label::new("missing_ok", "x").hidden()).unwrap();
        page.add_message("footer", "bye");

        let resolver = w.resolver();
        let out = render_page(&resolver, &page).unwrap();
        let root = out.root.as_ref().unwrap();
        assert_eq!(root.name.local_name(), "html");
        let head = root.children[0].as_element().unwrap();
        assert_eq!(child_names(head), vec!["style", "h0"]);
        let body = root.children[1].as_element().unwrap();
        let main = body.children[0].as_element().unwrap();
        // hidden label dropped, message replaced by its translation
        assert_eq!(child_names(main), vec!["span", "#bye"]);
        assert_eq!(
            main.children[0].as_element().unwrap().children,
            vec![Node::text("Welcome")]
        );
        // nothing from the marker vocabulary leaks into the output
        assert_eq!(root.count(&|e| markers::is_marker_name(&e.name)), 0);
        assert_eq!(
            root.count(&|e| e
                .attrs
                .iter()
                .any(|(k, _)| markers::is_marker_name(k))),
            0
        );
    }

    #[test]
    fn t_page_without_markup() {
        let w = World::new();
        let page = BasicContainer::new("bare");
        match render_page(&w.resolver(), &page) {
            Err(MarkupError::NoMarkup { id }) => assert_eq!(id.as_str(), "bare"),
            other => panic!("expected NoMarkup, got {other:?}"),
        }
    }

    #[test]
    fn t_page_with_empty_template() {
        let mut w = World::new();
        let class = w.class("EmptyPage", &[], Document::new(Dialect::Html));
        let page = BasicContainer::new("empty").with_markup(class);
        let out = render_page(&w.resolver(), &page).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn t_page_root_component_removed() {
        let mut w = World::new();
        let class = w.class(
            "GonePage",
            &[],
            Document::with_root(Dialect::Html, with_id(el("div"), "gone")),
        );
        let mut page = BasicContainer::new("page").with_markup(class);
        page.add(Label::new("gone", "x").hidden()).unwrap();
        let out = render_page(&w.resolver(), &page).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn t_page_root_must_stay_an_element() {
        let mut w = World::new();
        let class = w.class(
            "TextPage",
            &[],
            Document::with_root(Dialect::Html, with_id(el("div"), "msg")),
        );
        let mut page = BasicContainer::new("page").with_markup(class);
        page.add(crate::testutil::Canned::new(
            "msg",
            crate::component::Rendered::Node(Node::text("oops")),
        ))
        .unwrap();
        match render_page(&w.resolver(), &page) {
            Err(MarkupError::RootNotElement) => (),
            other => panic!("expected RootNotElement, got {other:?}"),
        }
    }

    #[test]
    fn t_page_empty_expansion_rejected() {
        let mut w = World::new();
        let class = w.class(
            "WrapPage",
            &[],
            Document::with_root(Dialect::Html, with_id(el("div"), "body_only")),
        );
        let mut page = BasicContainer::new("page").with_markup(class);
        page.add(BasicContainer::new("body_only").body_only())
            .unwrap();
        // the stripped wrapper had no children, so the expansion is
        // empty and there is no root left
        match render_page(&w.resolver(), &page) {
            Err(MarkupError::RootNotElement) => (),
            other => panic!("expected RootNotElement, got {other:?}"),
        }
    }

    #[test]
    fn t_page_body_only_single_child_root() {
        let mut w = World::new();
        let wrapper = {
            let mut d = with_id(el("div"), "wrap");
            d.push_text("\n  ");
            d.push_element(Element::new(crate::element::QName::local("article")));
            d.push_text("\n");
            d
        };
        let class = w.class(
            "WrapPage",
            &[],
            Document::with_root(Dialect::Html, wrapper),
        );
        let mut page = BasicContainer::new("page").with_markup(class);
        page.add(BasicContainer::new("wrap").body_only()).unwrap();
        // surrounding whitespace does not disqualify the single element
        let out = render_page(&w.resolver(), &page).unwrap();
        assert_eq!(out.root.as_ref().unwrap().name.local_name(), "article");
    }
}
