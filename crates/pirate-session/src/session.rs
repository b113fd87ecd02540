//! The session data store.
//!
//! One instance owns all mutable state of the pipeline: the captured
//! snapshot, the stylesheet descriptors with their selection flags, the
//! depth window with its derived input HTML, and the computed CSS pieces.
//! Everything else in the system is pure functions over these values.
//!
//! # Staleness
//!
//! The store runs single-threaded and cooperative; overlapping
//! recomputations are serialized by a generation counter rather than locks.
//! Every input change bumps the generation; a recomputation captures the
//! generation when it starts and commits its pieces only if the generation
//! is still current when it finishes, otherwise the result is discarded
//! silently. Interior mutability borrows are never held across await points.

use std::cell::{Cell, RefCell};

use log::debug;

use pirate_common::{CssPiece, StyleSheetDescriptor};
use pirate_css::{combine_pieces, merge, minify, rewrite_urls, scope_class, scope_selectors, split_simplified};
use pirate_dom::{measure_depth, normalize_html, slice_levels};

use crate::collab::{Inspector, Simplifier, StyleFetcher};
use crate::error::{CaptureError, PirateError};

/// A captured, immutable copy of the inspected element and its page.
///
/// Superseded wholesale by the next capture, never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedSnapshot {
    /// Normalized `outerHTML` of the selected element.
    pub element_html: String,
    /// Normalized ancestor-chain HTML from `<body>` down to the element.
    pub full_page_html: String,
    /// Location of the inspected page at capture time.
    pub page_url: String,
    /// Element tree depth of `element_html`.
    pub element_tree_depth: usize,
    /// Element tree depth of `full_page_html`.
    pub full_tree_depth: usize,
}

#[derive(Default)]
struct State {
    snapshot: Option<InspectedSnapshot>,
    /// Full-page HTML pruned to the depth window; `None` until a snapshot
    /// exists or when the window selects no content.
    input_html: Option<String>,
    window: Option<(usize, usize)>,
    sheets: Option<Vec<StyleSheetDescriptor>>,
    /// Page the cached stylesheet set was loaded for.
    sheets_page: Option<String>,
    pieces: Vec<CssPiece>,
}

/// The session data store, generic over its injected collaborators.
pub struct Session<I, F, C> {
    inspector: I,
    fetcher: F,
    simplifier: C,
    scope: String,
    state: RefCell<State>,
    generation: Cell<u64>,
}

impl<I: Inspector, F: StyleFetcher, C: Simplifier> Session<I, F, C> {
    /// Create a store around its collaborators, with a fresh scoping class.
    pub fn new(inspector: I, fetcher: F, simplifier: C) -> Self {
        Session {
            inspector,
            fetcher,
            simplifier,
            scope: scope_class(),
            state: RefCell::new(State::default()),
            generation: Cell::new(0),
        }
    }

    fn bump_generation(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    /// Capture the currently inspected element and its page.
    ///
    /// Normalizes both HTML forms (scripts stripped, pretty-printed,
    /// relative references rebased against the page URL), measures both
    /// tree depths, and resets the depth window to the full range. A
    /// capture on a different page than the cached stylesheet set counts
    /// as navigation and drops that cache.
    ///
    /// # Errors
    ///
    /// Propagates [`CaptureError`] from the inspector, and reports
    /// [`CaptureError::NoSelection`] for an empty payload.
    pub async fn capture_snapshot(&self) -> Result<(), CaptureError> {
        let payload = self.inspector.last_inspected().await?;
        if payload.element.is_empty() || payload.full_html.is_empty() {
            return Err(CaptureError::NoSelection);
        }
        let base = (!payload.href.is_empty()).then_some(payload.href.as_str());
        let element_html = normalize_html(&payload.element, base);
        let full_page_html = normalize_html(&payload.full_html, base);
        let snapshot = InspectedSnapshot {
            element_tree_depth: measure_depth(&element_html),
            full_tree_depth: measure_depth(&full_page_html),
            element_html,
            full_page_html,
            page_url: payload.href,
        };
        debug!(
            "captured snapshot: element depth {}, page depth {}",
            snapshot.element_tree_depth, snapshot.full_tree_depth
        );

        let mut state = self.state.borrow_mut();
        if state.sheets_page.as_deref() != Some(snapshot.page_url.as_str()) {
            state.sheets = None;
            state.sheets_page = None;
        }
        state.window = Some((0, snapshot.full_tree_depth));
        state.input_html = Some(snapshot.full_page_html.clone());
        state.snapshot = Some(snapshot);
        state.pieces.clear();
        drop(state);
        self.bump_generation();
        Ok(())
    }

    /// Note a page navigation: drops the stylesheet cache and any computed
    /// result. The stale snapshot stays visible until the next capture.
    pub fn navigated(&self) {
        let mut state = self.state.borrow_mut();
        state.sheets = None;
        state.sheets_page = None;
        state.pieces.clear();
        drop(state);
        self.bump_generation();
    }

    /// Load the page's stylesheets through the fetcher.
    ///
    /// Idempotent per page: a second call for the same page returns the
    /// cached descriptors without touching the fetcher. [`Self::navigated`]
    /// clears the cache.
    pub async fn load_stylesheets(&self) -> Vec<StyleSheetDescriptor> {
        let page = {
            let state = self.state.borrow();
            let page = state
                .snapshot
                .as_ref()
                .map(|snapshot| snapshot.page_url.clone());
            if let Some(sheets) = &state.sheets {
                if state.sheets_page == page {
                    debug!("stylesheet cache hit");
                    return sheets.clone();
                }
            }
            page
        };
        let listing = self.inspector.style_sheets().await;
        let descriptors = self.fetcher.fetch_all(&listing).await;
        let mut state = self.state.borrow_mut();
        state.sheets = Some(descriptors.clone());
        state.sheets_page = page;
        state.pieces.clear();
        drop(state);
        self.bump_generation();
        descriptors
    }

    /// Set the inclusive depth window over the captured page tree and
    /// recompute the derived input HTML.
    ///
    /// A `level_start` at or past the maximum depth selects no content; the
    /// slice is skipped and the input becomes empty rather than an error.
    /// No-op until a snapshot exists.
    pub fn set_depth_window(&self, level_start: usize, level_end: usize) {
        let mut state = self.state.borrow_mut();
        let Some(snapshot) = &state.snapshot else {
            return;
        };
        let max_depth = snapshot.full_tree_depth;
        let level_end = level_end.min(max_depth);
        let input_html = if level_start >= max_depth {
            None
        } else if level_start == 0 && level_end == max_depth {
            Some(snapshot.full_page_html.clone())
        } else {
            Some(slice_levels(
                &snapshot.full_page_html,
                level_start,
                level_end,
            ))
        };
        state.window = Some((level_start, level_end));
        state.input_html = input_html;
        state.pieces.clear();
        drop(state);
        self.bump_generation();
    }

    /// Toggle whether the stylesheet with this `source` key is included in
    /// the extraction. Returns `false` when no such sheet is loaded.
    pub fn set_selected(&self, source: &str, selected: bool) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(sheets) = &mut state.sheets else {
            return false;
        };
        let Some(sheet) = sheets.iter_mut().find(|sheet| sheet.source == source) else {
            return false;
        };
        if sheet.selected == selected {
            return true;
        }
        sheet.selected = selected;
        state.pieces.clear();
        drop(state);
        self.bump_generation();
        true
    }

    /// Whether a recomputation has everything it needs: a non-empty input
    /// window and at least one selected stylesheet.
    #[must_use]
    pub fn can_pirate(&self) -> bool {
        let state = self.state.borrow();
        state.input_html.is_some()
            && state
                .sheets
                .as_ref()
                .is_some_and(|sheets| sheets.iter().any(|sheet| sheet.selected))
    }

    /// Run one simplification round trip and commit the resulting pieces.
    ///
    /// A no-op returning `Ok(false)` when [`Self::can_pirate`] is false. The
    /// result is committed only if the session generation is unchanged since
    /// the request started; a stale result is discarded silently and
    /// `Ok(false)` returned. On failure the previous pieces are preserved.
    ///
    /// # Errors
    ///
    /// [`PirateError`] when the service call fails or its response does not
    /// split back into the expected pieces.
    pub async fn compute_result(&self) -> Result<bool, PirateError> {
        if !self.can_pirate() {
            return Ok(false);
        }
        let (input_html, selected) = {
            let state = self.state.borrow();
            let Some(input_html) = state.input_html.clone() else {
                return Ok(false);
            };
            let selected: Vec<StyleSheetDescriptor> = state
                .sheets
                .iter()
                .flatten()
                .filter(|sheet| sheet.selected)
                .cloned()
                .collect();
            (input_html, selected)
        };
        let generation = self.generation.get();
        let merged = merge(&selected);
        let output = self.simplifier.simplify(&input_html, &merged).await?;
        let pieces = split_simplified(&output, &selected)?;
        if self.generation.get() != generation {
            debug!("discarding stale simplification result");
            return Ok(false);
        }
        debug!("committed {} simplified pieces", pieces.len());
        self.state.borrow_mut().pieces = pieces;
        Ok(true)
    }

    /// The current snapshot, if one has been captured.
    #[must_use]
    pub fn snapshot(&self) -> Option<InspectedSnapshot> {
        self.state.borrow().snapshot.clone()
    }

    /// The depth-window-derived input HTML, if any.
    #[must_use]
    pub fn input_html(&self) -> Option<String> {
        self.state.borrow().input_html.clone()
    }

    /// The current inclusive depth window, set at capture or by
    /// [`Self::set_depth_window`].
    #[must_use]
    pub fn depth_window(&self) -> Option<(usize, usize)> {
        self.state.borrow().window
    }

    /// The currently loaded stylesheet descriptors.
    #[must_use]
    pub fn style_sheets(&self) -> Vec<StyleSheetDescriptor> {
        self.state.borrow().sheets.clone().unwrap_or_default()
    }

    /// The committed simplified pieces, one per contributing source.
    #[must_use]
    pub fn css_pieces(&self) -> Vec<CssPiece> {
        self.state.borrow().pieces.clone()
    }

    /// The scoping class namespacing the extracted CSS.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The simplified pieces combined under per-source banner comments.
    #[must_use]
    pub fn combined_css(&self, minify_css: bool) -> String {
        combine_pieces(&self.state.borrow().pieces, minify_css)
    }

    /// The combined CSS with `url(...)` references rebased against the page
    /// and every selector namespaced under the scoping class.
    #[must_use]
    pub fn scoped_css(&self, minify_css: bool) -> String {
        let (combined, base) = {
            let state = self.state.borrow();
            let combined = combine_pieces(&state.pieces, false);
            let base = state
                .snapshot
                .as_ref()
                .map(|snapshot| snapshot.page_url.clone());
            (combined, base)
        };
        let rebased = match base.filter(|base| !base.is_empty()) {
            Some(base) => rewrite_urls(&combined, &base),
            None => combined,
        };
        let scoped = scope_selectors(&rebased, &format!(".{}", self.scope));
        if minify_css { minify(&scoped) } else { scoped }
    }

    /// The final self-contained result document: the scoped stylesheet in
    /// the head and the sliced snippet wrapped in a scope-classed `<div>`.
    ///
    /// `None` until a successful round trip has committed pieces for the
    /// current inputs.
    #[must_use]
    pub fn result_document(&self, minify_css: bool) -> Option<String> {
        let input_html = {
            let state = self.state.borrow();
            if state.pieces.is_empty() {
                return None;
            }
            state.input_html.clone()?
        };
        let style = self.scoped_css(minify_css);
        Some(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{style}\n</style>\n</head>\n<body>\n<div class=\"{}\">\n{input_html}\n</div>\n</body>\n</html>\n",
            self.scope
        ))
    }
}
