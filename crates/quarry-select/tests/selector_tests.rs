//! Integration tests for selector parsing, specificity and filter-stage
//! matching.

use std::num::NonZeroUsize;
use std::sync::Arc;

use quarry_dom::{DomTree, NodeId};
use quarry_select::selector::{AttributeSelector, Combinator, SimpleSelector, Specificity};
use quarry_select::{
    EngineConfig, Error, FormulaCache, SelectorCompiler, SelectorEngine, SelectorProgram,
};

fn engine() -> SelectorEngine {
    SelectorEngine::new(EngineConfig::default())
}

/// ```html
/// <html>
///   <body>
///     <div id="main" class="container wide">
///       <h1>Title</h1>
///       <p class="intro">Hello</p>
///       <p lang="en-US">World</p>
///       <ul><li>one</li><li data-x="a]b">two</li><li>three</li></ul>
///     </div>
///     <p>Outside</p>
///   </body>
/// </html>
/// ```
struct Page {
    tree: DomTree,
    html: NodeId,
    div: NodeId,
    h1: NodeId,
    intro: NodeId,
    world: NodeId,
    items: Vec<NodeId>,
    outside: NodeId,
}

fn page() -> Page {
    let mut tree = DomTree::new();
    let root = tree.root();
    let html = tree.append_element(root, "html");
    let body = tree.append_element(html, "body");

    let div = tree.create_element("div", [("id", "main"), ("class", "container wide")]);
    tree.append_child(body, div);
    let h1 = tree.append_element(div, "h1");
    let _ = tree.append_text(h1, "Title");
    let intro = tree.create_element("p", [("class", "intro")]);
    tree.append_child(div, intro);
    let _ = tree.append_text(intro, "Hello");
    let world = tree.create_element("p", [("lang", "en-US")]);
    tree.append_child(div, world);
    let _ = tree.append_text(world, "World");

    let ul = tree.append_element(div, "ul");
    let mut items = Vec::new();
    for (text, attrs) in [("one", vec![]), ("two", vec![("data-x", "a]b")]), ("three", vec![])] {
        let li = tree.create_element("li", attrs);
        tree.append_child(ul, li);
        let _ = tree.append_text(li, text);
        items.push(li);
    }

    let outside = tree.append_element(body, "P");
    let _ = tree.append_text(outside, "Outside");

    Page {
        tree,
        html,
        div,
        h1,
        intro,
        world,
        items,
        outside,
    }
}

fn select(page: &Page, selector: &str) -> Vec<NodeId> {
    engine()
        .select(&page.tree, page.tree.root(), selector)
        .unwrap_or_else(|e| panic!("{selector}: {e}"))
}

#[test]
fn test_parse_compound_selector() -> anyhow::Result<()> {
    let list = engine().parse("DIV#main.container[data-x]")?;
    let [selector] = list.selectors() else {
        panic!("expected one selector");
    };
    assert!(selector.is_simple());
    assert_eq!(selector.specificity, Specificity(1, 2, 1));

    let simple = &selector.complex.subject.simple_selectors;
    assert!(matches!(&simple[0], SimpleSelector::Type(name) if name == "div"));
    assert!(matches!(&simple[1], SimpleSelector::Id(id) if id == "main"));
    assert!(matches!(&simple[2], SimpleSelector::Class(class) if class == "container"));
    assert!(matches!(
        &simple[3],
        SimpleSelector::Attribute(AttributeSelector::Exists(name)) if name == "data-x"
    ));
    Ok(())
}

#[test]
fn test_parse_combinator_chain() -> anyhow::Result<()> {
    let list = engine().parse("div > ul li + li ~ li")?;
    let [selector] = list.selectors() else {
        panic!("expected one selector");
    };
    let combinators: Vec<Combinator> =
        selector.complex.combinators.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        combinators,
        vec![
            Combinator::SubsequentSibling,
            Combinator::NextSibling,
            Combinator::Descendant,
            Combinator::Child,
        ]
    );
    assert_eq!(selector.specificity, Specificity(0, 0, 5));
    Ok(())
}

#[test]
fn test_pseudo_classes_count_as_class_specificity() -> anyhow::Result<()> {
    let list = engine().parse("li:nth-child(2n+1):not(.x), *")?;
    let specificities: Vec<_> = list.selectors().iter().map(|s| s.specificity).collect();
    assert_eq!(specificities, vec![Specificity(0, 2, 1), Specificity(0, 0, 0)]);
    Ok(())
}

#[test]
fn test_type_class_and_id() {
    let page = page();
    assert_eq!(select(&page, "p"), vec![page.intro, page.world, page.outside]);
    assert_eq!(select(&page, ".intro"), vec![page.intro]);
    assert_eq!(select(&page, "#main"), vec![page.div]);
    assert_eq!(select(&page, "div.wide.container"), vec![page.div]);
    assert!(select(&page, "div.narrow").is_empty());
}

#[test]
fn test_combinators() {
    let page = page();
    assert_eq!(select(&page, "div > p"), vec![page.intro, page.world]);
    assert_eq!(select(&page, "body p"), vec![page.intro, page.world, page.outside]);
    assert_eq!(select(&page, "h1 + p"), vec![page.intro]);
    assert_eq!(select(&page, "h1 ~ p"), vec![page.intro, page.world]);
    assert_eq!(select(&page, "html li"), page.items);
}

#[test]
fn test_descendant_combinator_backtracks() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let section = tree.append_element(root, "section");
    let outer = tree.append_element(section, "div");
    let inner = tree.append_element(outer, "div");
    let span = tree.append_element(inner, "span");

    // The nearest `div` ancestor of the span is not a child of `section`,
    // but a farther one is.
    let found = engine().select(&tree, root, "section > div span").unwrap();
    assert_eq!(found, vec![span]);
}

#[test]
fn test_moved_node_is_selected_once() -> anyhow::Result<()> {
    let mut tree = DomTree::new();
    let root = tree.root();
    let first = tree.append_element(root, "div");
    let second = tree.append_element(root, "div");
    let p = tree.append_element(first, "p");
    tree.append_child(second, p);

    assert_eq!(engine().select(&tree, root, "p")?, vec![p]);
    assert!(engine().select(&tree, root, "div:first-child > p")?.is_empty());
    assert_eq!(engine().select(&tree, root, "div:last-child > p")?, vec![p]);
    Ok(())
}

#[test]
fn test_attribute_selectors() {
    let page = page();
    assert_eq!(select(&page, "[lang|=en]"), vec![page.world]);
    assert_eq!(select(&page, "[lang^='en-']"), vec![page.world]);
    assert_eq!(select(&page, "[class~=wide]"), vec![page.div]);
    assert_eq!(select(&page, "[class*=tain]"), vec![page.div]);
    assert_eq!(select(&page, "[class$=\"wide\"]"), vec![page.div]);
    assert_eq!(select(&page, "li[data-x=\"a]b\"]"), vec![page.items[1]]);
    assert!(select(&page, "[class^='']").is_empty());
}

#[test]
fn test_groups_keep_document_order_without_duplicates() {
    let page = page();
    assert_eq!(
        select(&page, "li, h1, #main, li"),
        vec![page.div, page.h1, page.items[0], page.items[1], page.items[2]]
    );
}

#[test]
fn test_structural_pseudo_classes_in_selectors() {
    let page = page();
    assert_eq!(select(&page, "div > :first-child"), vec![page.h1]);
    assert_eq!(select(&page, "li:last-child"), vec![page.items[2]]);
    assert_eq!(select(&page, "div > p:first-of-type"), vec![page.intro]);
    assert_eq!(select(&page, "li:nth-child(odd)"), vec![page.items[0], page.items[2]]);
    assert_eq!(select(&page, "li:nth-last-child(1)"), vec![page.items[2]]);
    assert_eq!(select(&page, ":root"), vec![page.html]);
    assert_eq!(select(&page, "p:contains(\"Wor\")"), vec![page.world]);
    assert_eq!(select(&page, "body > p:only-of-type"), vec![page.outside]);
}

#[test]
fn test_not_filters_the_current_stage() {
    let page = page();
    assert_eq!(select(&page, "li:not(:first-child)"), vec![page.items[1], page.items[2]]);
    assert_eq!(select(&page, "p:not(.intro)"), vec![page.world, page.outside]);
    assert_eq!(select(&page, "li:not(:nth-child(2n+1))"), vec![page.items[1]]);
    assert_eq!(select(&page, "li:not([data-x], :last-child)"), vec![page.items[0]]);
}

#[test]
fn test_program_applies_to_given_candidates_only() -> anyhow::Result<()> {
    let page = page();
    let engine = engine();
    let program = engine.compile("li:first-child")?;
    let candidates = [page.items[2], page.items[0], page.intro];
    assert_eq!(program.apply(&page.tree, page.div, &candidates), vec![page.items[0]]);
    assert!(program.apply(&page.tree, page.div, &[]).is_empty());
    Ok(())
}

#[test]
fn test_invalid_selectors() {
    let engine = engine();
    let invalid = [
        "", "   ", "> p", "p >", "p,", "div..x", "[a", "[a!=b]", "p:hover", "li:nth-child(3x)",
        ":not()", "p )",
    ];
    for text in invalid {
        assert!(engine.parse(text).is_err(), "{text:?} should not parse");
    }
    assert!(matches!(engine.parse("li:nth-child(3x)"), Err(Error::InvalidSelector(_))));
    assert!(matches!(engine.parse("p:first-child(1)"), Err(Error::InvalidSelector(_))));
    assert!(matches!(engine.parse("[a"), Err(Error::UnexpectedToken { .. })));
}

#[test]
fn test_apostrophes_need_quoting_in_arguments() {
    let engine = engine();
    assert!(engine.parse("p[title=it's]").is_err());
    assert!(engine.parse("p:contains(don't)").is_err());
    assert!(engine.parse("p[title=\"it's\"]").is_ok());
    assert!(engine.parse("p:contains(\"don't\")").is_ok());
}

#[test]
fn test_engine_cache_isolation() -> anyhow::Result<()> {
    let page = page();
    let first = engine();
    let second = engine();
    let _ = first.select(&page.tree, page.tree.root(), "li:nth-child(3n+1)")?;
    assert_eq!(first.cache().len(), 1);
    assert!(second.cache().is_empty());

    let shared = Arc::new(FormulaCache::new());
    let a = SelectorEngine::with_cache(EngineConfig::default(), Arc::clone(&shared));
    let b = SelectorEngine::with_cache(EngineConfig::default(), Arc::clone(&shared));
    let _ = a.parse(":nth-child(n+5)")?;
    let _ = b.parse(":nth-of-type(n+5)")?;
    assert_eq!(shared.len(), 1);
    Ok(())
}

#[test]
fn test_config_from_json() -> anyhow::Result<()> {
    let config: EngineConfig = serde_json::from_str("{}")?;
    assert_eq!(config, EngineConfig::default());
    assert!(config.case_sensitive_contains);
    assert_eq!(config.formula_cache_capacity, None);

    let config: EngineConfig = serde_json::from_str(r#"{ "formula_cache_capacity": 2 }"#)?;
    assert_eq!(config.formula_cache_capacity, NonZeroUsize::new(2));
    let engine = SelectorEngine::new(config);
    assert!(engine.cache().is_bounded());
    for formula in ["n+1", "n+2", "n+3"] {
        let _ = engine.nth().compile(formula)?;
    }
    assert_eq!(engine.cache().len(), 2);

    assert!(serde_json::from_str::<EngineConfig>(r#"{ "formula_cache_capacity": 0 }"#).is_err());
    Ok(())
}

#[test]
fn test_default_engine_uses_global_cache() -> anyhow::Result<()> {
    let engine = SelectorEngine::default();
    let _ = engine.nth().compile("17n+13")?;
    assert!(!FormulaCache::global().is_empty());
    assert!(std::ptr::eq(engine.cache(), FormulaCache::global().as_ref()));
    Ok(())
}
