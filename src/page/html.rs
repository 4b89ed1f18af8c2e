// src/page/html.rs
// =============================================================================
// This module finds the links on a downloaded page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Is built on html5ever (Mozilla's HTML parser)
// - Never fails on bad markup; it repairs it the way a browser would
//
// Every <a> element with a non-empty href becomes a CrawlTarget one level
// deeper than the page it was found on. We do NOT decide here whether a
// link belongs to the site; the coordinator does that.
//
// Rust concepts:
// - Iterators: discover_links() is lazy, nothing happens until it is consumed
// - Lifetimes: the iterator borrows the document, so it can't outlive it
// =============================================================================

use crate::crawl::CrawlTarget;
use scraper::Html;

// Walks the whole document (every descendant, in document order) and
// yields one target per anchor with a non-empty href
//
// Parameters:
//   document: the parsed page
//   depth: the depth the page itself was fetched at
//
// Example:
//   <p><a href="/docs">Docs</a></p> fetched at depth 1
//   -> CrawlTarget { url: "/docs", depth: 2 }
pub fn discover_links(document: &Html, depth: usize) -> impl Iterator<Item = CrawlTarget> + '_ {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .filter(|element| element.name() == "a")
        .filter_map(|element| element.attr("href"))
        .filter(|href| !href.is_empty())
        .map(move |href| CrawlTarget::new(href, depth + 1))
}

// Parses `body` and collects the targets found on it
//
// scraper's Html can't be sent between threads, so callers in async code
// use this to parse and drop the document before their next .await.
pub fn parse_links(body: &str, depth: usize) -> Vec<CrawlTarget> {
    let document = Html::parse_document(body);
    discover_links(&document, depth).collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not a CSS selector like "a[href]"?
//    - A plain walk over the tree needs no selector parsing (and no unwrap)
//    - descendants() visits the node, then its children, recursively
//      (a "pre-order" walk), which is the order links appear in the page
//
// 2. What does `impl Iterator<Item = CrawlTarget> + '_` mean?
//    - "some iterator of CrawlTargets"; the exact type is hidden
//    - '_ says it borrows from `document`
//
// 3. Why `move` in the last closure?
//    - The closure keeps its own copy of `depth` after the function returns
// -----------------------------------------------------------------------------
