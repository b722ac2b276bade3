use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of entities shown on a single page, for both pagination strategies.
pub const PAGE_SIZE: u64 = 25;

/// Start of year 1 in Unix seconds. Nothing stored is older, so a cursor at
/// or below it cannot match anything.
const EARLIEST_CURSOR: i64 = -62_135_596_800;

/// Pages always linked at each end of the windowed page list.
const EDGE_PAGES: u64 = 2;
/// Pages linked on each side of the current page.
const WINDOW_RADIUS: u64 = 2;

/// Page-number paginator with random access by page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: u64,
    entity_count: u64,
    page_count: u64,
}

impl Paginator {
    /// Build a paginator from the raw `page` query value.
    ///
    /// Missing, non-numeric and non-positive values all select the first page.
    /// There is no upper clamp: a page past the end yields an empty result set.
    pub fn new(page: Option<&str>, entity_count: u64) -> Self {
        let page = page
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .map(|p| p as u64)
            .unwrap_or(1);

        Self {
            page,
            entity_count,
            page_count: entity_count.div_ceil(PAGE_SIZE),
        }
    }

    pub fn current_page(&self) -> u64 {
        self.page
    }

    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    pub fn first_page(&self) -> u64 {
        1
    }

    pub fn is_last(&self) -> bool {
        self.page == self.page_count
    }

    pub fn last_page(&self) -> u64 {
        self.page_count
    }

    pub fn has_next(&self) -> bool {
        self.entity_count > self.page.saturating_mul(PAGE_SIZE)
    }

    pub fn next_page(&self) -> u64 {
        self.page.saturating_add(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn prev_page(&self) -> u64 {
        self.page - 1
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }

    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }

    /// 1-based position in the whole collection of the `index`-th row of this page.
    pub fn position(&self, index: usize) -> u64 {
        self.offset() + index as u64 + 1
    }

    fn is_visible(&self, number: u64) -> bool {
        number <= EDGE_PAGES
            || number + EDGE_PAGES > self.page_count
            || number.abs_diff(self.page) <= WINDOW_RADIUS
    }

    /// Page links for a "1 2 … 7 8 9 … 20 21" style navigation.
    ///
    /// Each run of hidden pages collapses into a single disabled gap marker.
    /// A run of one page is linked directly, since the marker would take the
    /// same room as the page it hides.
    pub fn page_links(&self) -> Vec<PageLink> {
        let mut links = Vec::new();
        let mut number = 1;

        while number <= self.page_count {
            if self.is_visible(number) {
                links.push(PageLink::page(number, number == self.page));
                number += 1;
                continue;
            }

            let run_start = number;
            while number <= self.page_count && !self.is_visible(number) {
                number += 1;
            }

            if number - run_start == 1 {
                links.push(PageLink::page(run_start, run_start == self.page));
            } else {
                links.push(PageLink::gap());
            }
        }

        links
    }

    /// Serializable snapshot for templates.
    pub fn nav(&self) -> PageNav {
        PageNav {
            current: self.page,
            page_count: self.page_count,
            is_first: self.is_first(),
            is_last: self.is_last(),
            has_next: self.has_next(),
            has_prev: self.has_prev(),
            first_page: self.first_page(),
            last_page: self.last_page(),
            next_page: self.next_page(),
            prev_page: self.page.saturating_sub(1),
            pages: self.page_links(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// Target page, `None` for the gap marker.
    pub number: Option<u64>,
    pub label: String,
    pub disabled: bool,
    pub active: bool,
}

impl PageLink {
    fn page(number: u64, active: bool) -> Self {
        Self {
            number: Some(number),
            label: number.to_string(),
            disabled: false,
            active,
        }
    }

    fn gap() -> Self {
        Self {
            number: None,
            label: "...".to_string(),
            disabled: true,
            active: false,
        }
    }

    pub fn is_gap(&self) -> bool {
        self.number.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageNav {
    pub current: u64,
    pub page_count: u64,
    pub is_first: bool,
    pub is_last: bool,
    pub has_next: bool,
    pub has_prev: bool,
    pub first_page: u64,
    pub last_page: u64,
    pub next_page: u64,
    pub prev_page: u64,
    pub pages: Vec<PageLink>,
}

/// Forward-only "older than" paginator for feeds ordered by last update.
///
/// `current` is the exclusive upper bound (Unix seconds) of the page being
/// served, `next` the bound for the following page when one may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CursorPaginator {
    pub current: i64,
    pub next: Option<i64>,
    #[serde(skip)]
    now: i64,
}

impl CursorPaginator {
    pub fn new(now: DateTime<Utc>) -> Self {
        let now = now.timestamp();
        Self {
            current: now,
            next: None,
            now,
        }
    }

    /// Apply the raw `off` query value; non-numeric values are ignored.
    pub fn with_offset(mut self, off: Option<&str>) -> Self {
        if let Some(off) = off.and_then(|raw| raw.trim().parse::<i64>().ok()) {
            self.current = off;
        }
        self
    }

    /// Upper bound of the current page as a timestamp, saturating at the
    /// representable range in the direction of the raw value.
    pub fn current_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.current, 0).unwrap_or(if self.current < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }

    /// True when the cursor lies before anything that can be stored, so the
    /// page is empty without asking the data layer.
    pub fn is_exhausted(&self) -> bool {
        self.current <= EARLIEST_CURSOR
    }

    /// Exclusive bound to query with. On the first page it lies one second
    /// past `now`, so items written earlier in the current second show up.
    pub fn upper_bound(&self) -> DateTime<Utc> {
        if self.is_first() {
            self.current_time() + chrono::TimeDelta::seconds(1)
        } else {
            self.current_time()
        }
    }

    /// Record what the data layer returned for the current page.
    ///
    /// Only a full page can be followed by another one, starting right below
    /// the oldest item seen.
    pub fn observe(&mut self, fetched: usize, oldest: Option<i64>) {
        self.next = if fetched as u64 == PAGE_SIZE {
            oldest
        } else {
            None
        };
    }

    pub fn is_first(&self) -> bool {
        self.current == self.now
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn next_page(&self) -> Option<i64> {
        self.next
    }

    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(p: &Paginator) -> Vec<String> {
        p.page_links().into_iter().map(|l| l.label).collect()
    }

    fn paginator(page: u64, pages: u64) -> Paginator {
        Paginator::new(Some(&page.to_string()), pages * PAGE_SIZE)
    }

    #[test]
    fn page_defaults_to_first() {
        assert_eq!(Paginator::new(None, 100).current_page(), 1);
        assert_eq!(Paginator::new(Some("abc"), 100).current_page(), 1);
        assert_eq!(Paginator::new(Some("0"), 100).current_page(), 1);
        assert_eq!(Paginator::new(Some("-4"), 100).current_page(), 1);
        assert_eq!(Paginator::new(Some("3"), 100).current_page(), 3);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(Paginator::new(None, 0).page_count(), 0);
        assert_eq!(Paginator::new(None, 1).page_count(), 1);
        assert_eq!(Paginator::new(None, 25).page_count(), 1);
        assert_eq!(Paginator::new(None, 26).page_count(), 2);
        assert_eq!(Paginator::new(None, 250).page_count(), 10);
    }

    #[test]
    fn offset_and_limit() {
        for page in 1..=4u64 {
            let p = Paginator::new(Some(&page.to_string()), 100);
            assert_eq!(p.offset(), (page - 1) * PAGE_SIZE);
            assert_eq!(p.limit(), PAGE_SIZE);
        }
    }

    #[test]
    fn first_page_flags() {
        let p = Paginator::new(None, 60);
        assert!(p.is_first());
        assert!(!p.has_prev());
        assert!(p.has_next());
        assert!(!p.is_last());
    }

    #[test]
    fn last_page_flags() {
        let p = Paginator::new(Some("3"), 60);
        assert!(p.is_last());
        assert!(!p.has_next());
        assert!(p.has_prev());
        assert_eq!(p.prev_page(), 2);
    }

    #[test]
    fn exact_multiple_has_no_next_on_last_page() {
        let p = Paginator::new(Some("2"), 50);
        assert!(p.is_last());
        assert!(!p.has_next());
    }

    #[test]
    fn page_past_the_end_is_accepted() {
        let p = Paginator::new(Some("9"), 30);
        assert_eq!(p.current_page(), 9);
        assert_eq!(p.offset(), 8 * PAGE_SIZE);
        assert!(!p.is_last());
        assert!(!p.has_next());
    }

    #[test]
    fn positions_continue_across_pages() {
        let p = Paginator::new(Some("2"), 60);
        assert_eq!(p.position(0), 26);
        assert_eq!(p.position(4), 30);
    }

    #[test]
    fn small_page_counts_show_every_page() {
        for pages in 0..=6u64 {
            for page in 1..=pages.max(1) {
                let links = paginator(page, pages).page_links();
                assert_eq!(links.len() as u64, pages, "pages={pages} page={page}");
                assert!(links.iter().all(|l| !l.is_gap()));
            }
        }
    }

    #[test]
    fn window_in_the_middle() {
        let p = paginator(10, 21);
        assert_eq!(
            labels(&p),
            ["1", "2", "...", "8", "9", "10", "11", "12", "...", "20", "21"]
        );
    }

    #[test]
    fn window_at_the_start() {
        let p = paginator(1, 10);
        assert_eq!(labels(&p), ["1", "2", "3", "...", "9", "10"]);
    }

    #[test]
    fn window_at_the_end() {
        let p = paginator(10, 10);
        assert_eq!(labels(&p), ["1", "2", "...", "8", "9", "10"]);
    }

    #[test]
    fn single_hidden_page_is_linked() {
        let p = paginator(6, 11);
        assert_eq!(
            labels(&p),
            ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11"]
        );

        let p = paginator(1, 7);
        assert_eq!(labels(&p), ["1", "2", "3", "...", "6", "7"]);
    }

    #[test]
    fn gaps_are_never_adjacent() {
        for pages in 0..=40u64 {
            for page in 1..=pages.max(1) {
                let links = paginator(page, pages).page_links();
                for pair in links.windows(2) {
                    assert!(
                        !(pair[0].is_gap() && pair[1].is_gap()),
                        "pages={pages} page={page}"
                    );
                }
            }
        }
    }

    #[test]
    fn active_page_is_marked() {
        let links = paginator(5, 21).page_links();
        let active: Vec<_> = links.iter().filter(|l| l.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].number, Some(5));
    }

    #[test]
    fn gap_is_disabled() {
        let links = paginator(1, 30).page_links();
        let gap = links.iter().find(|l| l.is_gap()).unwrap();
        assert!(gap.disabled);
        assert!(!gap.active);
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn cursor_starts_at_now() {
        let p = CursorPaginator::new(at(1_000_000));
        assert_eq!(p.current, 1_000_000);
        assert!(p.is_first());
        assert!(!p.has_next());
        assert_eq!(p.limit(), PAGE_SIZE);
    }

    #[test]
    fn cursor_offset_overrides_current() {
        let p = CursorPaginator::new(at(1_000_000)).with_offset(Some("999"));
        assert_eq!(p.current, 999);
        assert!(!p.is_first());
        assert_eq!(p.current_time(), at(999));

        let p = CursorPaginator::new(at(1_000_000)).with_offset(Some("nope"));
        assert_eq!(p.current, 1_000_000);
    }

    #[test]
    fn first_page_bound_covers_current_second() {
        let p = CursorPaginator::new(at(1_000_000));
        assert_eq!(p.upper_bound(), at(1_000_001));

        let p = p.with_offset(Some("500"));
        assert_eq!(p.upper_bound(), at(500));
    }

    #[test]
    fn out_of_range_cursor_saturates_towards_its_sign() {
        let p = CursorPaginator::new(at(1_000_000)).with_offset(Some("-99999999999999999"));
        assert_eq!(p.current_time(), DateTime::<Utc>::MIN_UTC);
        assert!(p.is_exhausted());

        let p = CursorPaginator::new(at(1_000_000)).with_offset(Some("99999999999999999"));
        assert_eq!(p.current_time(), DateTime::<Utc>::MAX_UTC);
        assert!(!p.is_exhausted());
    }

    #[test]
    fn only_cursors_before_year_one_are_exhausted() {
        let p = CursorPaginator::new(at(1_000_000));
        assert!(!p.is_exhausted());
        assert!(!p.with_offset(Some("-1")).is_exhausted());
        assert!(!p.with_offset(Some("-62135596799")).is_exhausted());
        assert!(p.with_offset(Some("-62135596800")).is_exhausted());
    }

    #[test]
    fn cursor_full_page_points_at_oldest() {
        let mut p = CursorPaginator::new(at(1_000_000));
        p.observe(PAGE_SIZE as usize, Some(123));
        assert!(p.has_next());
        assert_eq!(p.next_page(), Some(123));
    }

    #[test]
    fn cursor_short_page_ends_feed() {
        let mut p = CursorPaginator::new(at(1_000_000));
        p.observe(PAGE_SIZE as usize - 1, Some(123));
        assert!(!p.has_next());

        p.observe(0, None);
        assert_eq!(p.next_page(), None);
    }
}
