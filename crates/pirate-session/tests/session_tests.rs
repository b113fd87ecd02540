//! Session store tests against mock collaborators: the full
//! capture/load/compute flow, cache invalidation on navigation, and the
//! generation guard for stale in-flight results.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tokio::sync::Notify;

use pirate_common::{InspectedPayload, PageStyleSheet, StyleSheetDescriptor};
use pirate_css::SEPARATOR;
use pirate_net::UncssError;
use pirate_session::{CaptureError, Inspector, Session, Simplifier, StyleFetcher};

struct StubInspector {
    element: String,
    full_html: String,
    href: Rc<RefCell<String>>,
    listing: Vec<PageStyleSheet>,
}

impl Inspector for StubInspector {
    async fn last_inspected(&self) -> Result<InspectedPayload, CaptureError> {
        Ok(InspectedPayload {
            element: self.element.clone(),
            full_html: self.full_html.clone(),
            href: self.href.borrow().clone(),
        })
    }

    async fn style_sheets(&self) -> Vec<PageStyleSheet> {
        self.listing.clone()
    }
}

struct FailingInspector;

impl Inspector for FailingInspector {
    async fn last_inspected(&self) -> Result<InspectedPayload, CaptureError> {
        Err(CaptureError::NoSelection)
    }

    async fn style_sheets(&self) -> Vec<PageStyleSheet> {
        Vec::new()
    }
}

/// Counts calls and resolves hrefs from a canned body map; entries missing
/// from the map are dropped, like a failed fetch.
struct StubFetcher {
    bodies: HashMap<String, String>,
    calls: Rc<Cell<usize>>,
}

impl StyleFetcher for StubFetcher {
    async fn fetch_all(&self, sheets: &[PageStyleSheet]) -> Vec<StyleSheetDescriptor> {
        self.calls.set(self.calls.get() + 1);
        let mut internal_seq = 0usize;
        let mut descriptors = Vec::new();
        for sheet in sheets {
            let (source, is_internal, text) = match (&sheet.href, &sheet.css_text) {
                (None, Some(text)) => {
                    let source = format!("internal_{internal_seq}");
                    internal_seq += 1;
                    (source, true, Some(text.clone()))
                }
                (Some(href), _) => (href.clone(), false, self.bodies.get(href).cloned()),
                _ => continue,
            };
            let Some(css_text) = text else { continue };
            descriptors.push(StyleSheetDescriptor {
                filename: source.clone(),
                source,
                is_internal,
                css_text,
                selected: true,
            });
        }
        descriptors
    }
}

/// Passes the merged CSS straight back: merge/split must round-trip.
struct IdentitySimplifier;

impl Simplifier for IdentitySimplifier {
    async fn simplify(&self, _input_html: &str, input_css: &str) -> Result<String, UncssError> {
        Ok(input_css.to_string())
    }
}

/// Drops every rule whose selector tag does not occur in the input HTML,
/// piece by piece, the way the real service drops unused selectors.
struct TagFilterSimplifier;

impl Simplifier for TagFilterSimplifier {
    async fn simplify(&self, input_html: &str, input_css: &str) -> Result<String, UncssError> {
        let pieces: Vec<String> = input_css
            .split(SEPARATOR)
            .map(|piece| {
                piece
                    .split('}')
                    .filter(|rule| rule.contains('{'))
                    .filter(|rule| {
                        let tag = rule.split('{').next().unwrap_or("").trim();
                        input_html.contains(&format!("<{tag}"))
                    })
                    .map(|rule| format!("{}}}", rule.trim()))
                    .collect::<String>()
            })
            .collect();
        Ok(pieces.join(SEPARATOR))
    }
}

/// Parks until notified, so a test can change session state mid-flight.
struct GatedSimplifier {
    gate: Rc<Notify>,
}

impl Simplifier for GatedSimplifier {
    async fn simplify(&self, _input_html: &str, input_css: &str) -> Result<String, UncssError> {
        self.gate.notified().await;
        Ok(input_css.to_string())
    }
}

fn nested_page_inspector(listing: Vec<PageStyleSheet>) -> StubInspector {
    StubInspector {
        element: "<p id=\"x\">hi</p>".to_string(),
        full_html: "<body><div><p id=\"x\">hi</p></div></body>".to_string(),
        href: Rc::new(RefCell::new("https://site.test/page.html".to_string())),
        listing,
    }
}

fn counting_fetcher(bodies: &[(&str, &str)]) -> (StubFetcher, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let fetcher = StubFetcher {
        bodies: bodies
            .iter()
            .map(|(href, body)| (href.to_string(), body.to_string()))
            .collect(),
        calls: calls.clone(),
    };
    (fetcher, calls)
}

fn external(href: &str) -> PageStyleSheet {
    PageStyleSheet {
        href: Some(href.to_string()),
        css_text: None,
    }
}

fn inline(css: &str) -> PageStyleSheet {
    PageStyleSheet {
        href: None,
        css_text: Some(css.to_string()),
    }
}

#[tokio::test]
async fn end_to_end_extracts_only_used_rules() {
    let inspector = nested_page_inspector(vec![external("https://site.test/a.css")]);
    let (fetcher, _) = counting_fetcher(&[(
        "https://site.test/a.css",
        "p{color:red} div{color:blue}",
    )]);
    let session = Session::new(inspector, fetcher, TagFilterSimplifier);

    session.capture_snapshot().await.unwrap();
    let snapshot = session.snapshot().unwrap();
    assert_eq!(snapshot.element_tree_depth, 1);
    assert_eq!(snapshot.full_tree_depth, 3);

    let sheets = session.load_stylesheets().await;
    assert_eq!(sheets.len(), 1);

    // Window the input down to just the <p>.
    session.set_depth_window(2, 3);
    assert_eq!(session.input_html().as_deref(), Some("<p id=\"x\">hi</p>"));

    assert!(session.compute_result().await.unwrap());
    let pieces = session.css_pieces();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].source, "https://site.test/a.css");
    assert_eq!(pieces[0].css_text, "p{color:red}");

    let combined = session.combined_css(false);
    assert!(combined.contains("color:red"));
    assert!(!combined.contains("color:blue"));

    let document = session.result_document(false).unwrap();
    assert!(document.contains(&format!("<div class=\"{}\">", session.scope())));
    assert!(document.contains(&format!(".{} p", session.scope())));
    assert!(!document.contains("color: blue"));
}

#[tokio::test]
async fn merge_split_round_trips_through_an_identity_service() {
    let inspector = nested_page_inspector(vec![
        inline(".x { margin: 0 }"),
        external("https://site.test/a.css"),
    ]);
    let (fetcher, _) = counting_fetcher(&[("https://site.test/a.css", "a { color: red }")]);
    let session = Session::new(inspector, fetcher, IdentitySimplifier);

    session.capture_snapshot().await.unwrap();
    session.load_stylesheets().await;
    assert!(session.compute_result().await.unwrap());

    let pieces = session.css_pieces();
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].source, "internal_0");
    assert!(pieces[0].is_internal);
    assert_eq!(pieces[0].css_text, ".x { margin: 0 }");
    assert_eq!(pieces[1].source, "https://site.test/a.css");
    assert_eq!(pieces[1].css_text, "a { color: red }");
}

#[tokio::test]
async fn stylesheets_are_cached_until_navigation() {
    let inspector = nested_page_inspector(vec![inline("a{}")]);
    let (fetcher, calls) = counting_fetcher(&[]);
    let session = Session::new(inspector, fetcher, IdentitySimplifier);

    session.capture_snapshot().await.unwrap();
    session.load_stylesheets().await;
    session.load_stylesheets().await;
    assert_eq!(calls.get(), 1);

    session.navigated();
    session.load_stylesheets().await;
    assert_eq!(calls.get(), 2);
}

#[tokio::test]
async fn capturing_on_a_different_page_drops_the_cache() {
    let href = Rc::new(RefCell::new("https://a.test/".to_string()));
    let inspector = StubInspector {
        element: "<p>hi</p>".to_string(),
        full_html: "<body><p>hi</p></body>".to_string(),
        href: href.clone(),
        listing: vec![inline("a{}")],
    };
    let (fetcher, calls) = counting_fetcher(&[]);
    let session = Session::new(inspector, fetcher, IdentitySimplifier);

    session.capture_snapshot().await.unwrap();
    session.load_stylesheets().await;
    assert_eq!(calls.get(), 1);

    // Same page: a re-capture keeps the cache.
    session.capture_snapshot().await.unwrap();
    session.load_stylesheets().await;
    assert_eq!(calls.get(), 1);

    *href.borrow_mut() = "https://b.test/".to_string();
    session.capture_snapshot().await.unwrap();
    session.load_stylesheets().await;
    assert_eq!(calls.get(), 2);
}

#[tokio::test]
async fn stale_in_flight_result_is_discarded() {
    let gate = Rc::new(Notify::new());
    let inspector = nested_page_inspector(vec![inline("a{color:red}")]);
    let (fetcher, _) = counting_fetcher(&[]);
    let session = Session::new(inspector, fetcher, GatedSimplifier { gate: gate.clone() });

    session.capture_snapshot().await.unwrap();
    session.load_stylesheets().await;

    let (committed, ()) = tokio::join!(session.compute_result(), async {
        // Runs once the computation has parked on the gate: move the
        // session on, then let the stale round trip finish.
        session.set_depth_window(0, 1);
        gate.notify_one();
    });

    assert!(!committed.unwrap());
    assert!(session.css_pieces().is_empty());
}

#[tokio::test]
async fn compute_is_a_no_op_until_inputs_are_ready() {
    let inspector = nested_page_inspector(vec![inline("a{}")]);
    let (fetcher, _) = counting_fetcher(&[]);
    let session = Session::new(inspector, fetcher, IdentitySimplifier);

    // No snapshot, no stylesheets.
    assert!(!session.can_pirate());
    assert!(!session.compute_result().await.unwrap());

    // Snapshot alone is not enough.
    session.capture_snapshot().await.unwrap();
    assert!(!session.can_pirate());
    assert!(!session.compute_result().await.unwrap());
}

#[tokio::test]
async fn window_start_at_max_depth_selects_no_content() {
    let inspector = nested_page_inspector(vec![inline("a{}")]);
    let (fetcher, _) = counting_fetcher(&[]);
    let session = Session::new(inspector, fetcher, IdentitySimplifier);

    session.capture_snapshot().await.unwrap();
    session.load_stylesheets().await;

    session.set_depth_window(3, 3);
    assert_eq!(session.input_html(), None);
    assert!(!session.can_pirate());
    assert!(!session.compute_result().await.unwrap());
}

#[tokio::test]
async fn a_failed_sheet_does_not_abort_the_batch() {
    let inspector = nested_page_inspector(vec![
        external("https://site.test/gone.css"),
        inline(".x { margin: 0 }"),
    ]);
    // gone.css has no canned body: the stub drops it like a failed fetch.
    let (fetcher, _) = counting_fetcher(&[]);
    let session = Session::new(inspector, fetcher, IdentitySimplifier);

    session.capture_snapshot().await.unwrap();
    let sheets = session.load_stylesheets().await;
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].source, "internal_0");

    assert!(session.compute_result().await.unwrap());
    assert_eq!(session.css_pieces().len(), 1);
}

#[tokio::test]
async fn deselecting_a_sheet_invalidates_the_result() {
    let inspector = nested_page_inspector(vec![inline("a{color:red}")]);
    let (fetcher, _) = counting_fetcher(&[]);
    let session = Session::new(inspector, fetcher, IdentitySimplifier);

    session.capture_snapshot().await.unwrap();
    session.load_stylesheets().await;
    assert!(session.compute_result().await.unwrap());
    assert_eq!(session.css_pieces().len(), 1);

    assert!(session.set_selected("internal_0", false));
    assert!(session.css_pieces().is_empty());
    assert!(!session.can_pirate());
}

#[tokio::test]
async fn capture_failure_propagates_and_leaves_no_snapshot() {
    let (fetcher, _) = counting_fetcher(&[]);
    let session = Session::new(FailingInspector, fetcher, IdentitySimplifier);

    assert_eq!(
        session.capture_snapshot().await.unwrap_err(),
        CaptureError::NoSelection
    );
    assert!(session.snapshot().is_none());
}
