//! Grid pipeline: filter → sort → paginate over the client-held collection,
//! plus the pure reducer for grid interactions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::RegistrationRow;
use crate::paginate::{self, Page};

/// Rows per grid page.
pub const GRID_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    #[default]
    All,
    Name,
    Email,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Email,
    City,
}

impl SortKey {
    fn value(self, row: &RegistrationRow) -> String {
        match self {
            SortKey::Name => row.full_name(),
            SortKey::Email => row.email.clone(),
            SortKey::City => row.city.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Interaction state, held apart from the raw collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    pub search_term: String,
    pub search_field: SearchField,
    pub sort_key: Option<SortKey>,
    pub sort_direction: SortDirection,
    /// 1-based.
    pub current_page: usize,
}

impl Default for GridState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            search_field: SearchField::All,
            sort_key: None,
            sort_direction: SortDirection::Asc,
            current_page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    SetSearchTerm(String),
    SetSearchField(SearchField),
    /// Same key toggles the direction; a new key starts ascending.
    SortBy(SortKey),
    GoToPage(usize),
    NextPage,
    PrevPage,
}

/// Rows matching the term on the selected field(s), in input order.
/// Matching is a case-insensitive substring test of the term as typed,
/// whitespace included; only an empty term keeps all.
pub fn filter<'a>(
    rows: &'a [RegistrationRow],
    term: &str,
    field: SearchField,
) -> Vec<&'a RegistrationRow> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }

    let hit = |s: &str| s.to_lowercase().contains(&needle);
    rows.iter()
        .filter(|row| match field {
            SearchField::All => hit(&row.full_name()) || hit(&row.email) || hit(&row.city),
            SearchField::Name => hit(&row.full_name()),
            SearchField::Email => hit(&row.email),
            SearchField::City => hit(&row.city),
        })
        .collect()
}

/// Stable sort on the key's string as stored (byte order, so case matters).
/// Ties keep their incoming order in both directions.
pub fn sort(
    mut rows: Vec<&RegistrationRow>,
    key: Option<SortKey>,
    direction: SortDirection,
) -> Vec<&RegistrationRow> {
    let Some(key) = key else {
        return rows;
    };

    rows.sort_by_cached_key(|row| key.value(row));
    if direction == SortDirection::Desc {
        // reverse runs of equal keys back so ties stay in filtered order
        rows = reverse_keeping_ties(rows, |a, b| key.value(a).cmp(&key.value(b)));
    }
    rows
}

fn reverse_keeping_ties<'a>(
    sorted: Vec<&'a RegistrationRow>,
    cmp: impl Fn(&RegistrationRow, &RegistrationRow) -> Ordering,
) -> Vec<&'a RegistrationRow> {
    let mut groups: Vec<Vec<&RegistrationRow>> = Vec::new();
    for row in sorted {
        match groups.last_mut() {
            Some(group) if cmp(group[0], row) == Ordering::Equal => group.push(row),
            _ => groups.push(vec![row]),
        }
    }
    groups.into_iter().rev().flatten().collect()
}

/// Filtered then sorted rows for `state`; the input to both the grid page
/// and the report.
pub fn arrange<'a>(rows: &'a [RegistrationRow], state: &GridState) -> Vec<&'a RegistrationRow> {
    sort(
        filter(rows, &state.search_term, state.search_field),
        state.sort_key,
        state.sort_direction,
    )
}

/// Number of grid pages for `rows` under `state`.
pub fn grid_page_count(rows: &[RegistrationRow], state: &GridState) -> usize {
    paginate::page_count(
        filter(rows, &state.search_term, state.search_field).len(),
        GRID_PAGE_SIZE,
    )
}

/// Apply one interaction. Search and sort changes go back to page 1; page
/// moves are clamped to the pages the current filter produces.
pub fn reduce(state: &GridState, action: GridAction, rows: &[RegistrationRow]) -> GridState {
    let mut next = state.clone();
    match action {
        GridAction::SetSearchTerm(term) => {
            next.search_term = term;
            next.current_page = 1;
        }
        GridAction::SetSearchField(field) => {
            next.search_field = field;
            next.current_page = 1;
        }
        GridAction::SortBy(key) => {
            next.sort_direction = if state.sort_key == Some(key) {
                state.sort_direction.toggled()
            } else {
                SortDirection::Asc
            };
            next.sort_key = Some(key);
            next.current_page = 1;
        }
        GridAction::GoToPage(page) => {
            next.current_page = paginate::clamp_page(page, grid_page_count(rows, state));
        }
        GridAction::NextPage => {
            next.current_page = paginate::clamp_page(
                state.current_page.saturating_add(1),
                grid_page_count(rows, state),
            );
        }
        GridAction::PrevPage => {
            next.current_page = paginate::clamp_page(
                state.current_page.saturating_sub(1),
                grid_page_count(rows, state),
            );
        }
    }
    next
}

/// What the grid shows for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView<'a> {
    pub page: Page<&'a RegistrationRow>,
    pub page_count: usize,
    /// Rows left after filtering, across all pages.
    pub total_matches: usize,
    pub sort_key: Option<SortKey>,
    pub sort_direction: SortDirection,
}

impl GridView<'_> {
    pub fn current_page(&self) -> usize {
        self.page.number
    }

    pub fn is_empty(&self) -> bool {
        self.total_matches == 0
    }
}

/// Run the pipeline for `state`. The stored page may be stale (for example
/// after a refresh shrank the collection); the rendered page is clamped.
pub fn render<'a>(rows: &'a [RegistrationRow], state: &GridState) -> GridView<'a> {
    let arranged = arrange(rows, state);
    let total_matches = arranged.len();
    GridView {
        page: paginate::page_at(&arranged, GRID_PAGE_SIZE, state.current_page),
        page_count: paginate::page_count(total_matches, GRID_PAGE_SIZE),
        total_matches,
        sort_key: state.sort_key,
        sort_direction: state.sort_direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, first: &str, last: &str, email: &str, city: &str) -> RegistrationRow {
        RegistrationRow {
            id: id.into(),
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: Some("1990-01-01".into()),
            email: email.into(),
            phone: "+12345678".into(),
            city: city.into(),
            created_at: None,
            updated_at: None,
        }
    }

    fn sample() -> Vec<RegistrationRow> {
        vec![
            row("1", "Ana", "Lee", "ana@x.com", "Riyadh"),
            row("2", "Omar", "Saleh", "omar@mail.com", "Jeddah"),
            row("3", "Badr", "Hassan", "badr@site.org", "Dammam"),
            row("4", "Lina", "Odeh", "lina@x.com", "Makkah"),
            row("5", "Zaid", "Ali", "zaid@post.net", "Riyadh"),
            row("6", "Huda", "Nasser", "huda@x.com", "Jeddah"),
            row("7", "Karim", "Fahd", "karim@box.io", "Riyadh"),
        ]
    }

    fn ids(rows: &[&RegistrationRow]) -> Vec<String> {
        rows.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn empty_term_keeps_everything_in_order() {
        let rows = sample();
        let all: Vec<&RegistrationRow> = rows.iter().collect();
        assert_eq!(ids(&filter(&rows, "", SearchField::Email)), ids(&all));
    }

    #[test]
    fn whitespace_in_term_is_part_of_the_match() {
        let mut rows = sample();
        rows.push(row("8", "Banana", "Lee", "b@x.com", "Dammam"));
        rows.push(row("9", "Anastasia", "Ray", "ar@x.com", "Makkah"));

        assert!(filter(&rows, " ", SearchField::Email).is_empty());
        assert_eq!(ids(&filter(&rows, "ana", SearchField::Name)), vec!["1", "8", "9"]);
        assert_eq!(ids(&filter(&rows, "ana ", SearchField::Name)), vec!["1", "8"]);
        assert_eq!(ids(&filter(&rows, " lee", SearchField::Name)), vec!["1", "8"]);
        assert_eq!(ids(&filter(&rows, "nana l", SearchField::Name)), vec!["8"]);
    }

    #[test]
    fn email_filter_is_case_insensitive_and_order_preserving() {
        let rows = sample();
        let hits = filter(&rows, "A", SearchField::Email);

        let expected: Vec<String> = rows
            .iter()
            .filter(|r| r.email.to_lowercase().contains('a'))
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(ids(&hits), expected);
    }

    #[test]
    fn name_filter_spans_first_and_last() {
        let rows = sample();
        assert_eq!(ids(&filter(&rows, "ana lee", SearchField::Name)), vec!["1"]);
        assert!(filter(&rows, "ana lee", SearchField::Email).is_empty());
    }

    #[test]
    fn all_field_matches_any_of_name_email_city() {
        let rows = sample();
        let hits = filter(&rows, "riyadh", SearchField::All);
        assert_eq!(ids(&hits), vec!["1", "5", "7"]);
        let hits = filter(&rows, "SALEH", SearchField::All);
        assert_eq!(ids(&hits), vec!["2"]);
    }

    #[test]
    fn name_sort_directions_are_exact_reverses() {
        let rows = sample();
        let asc = sort(rows.iter().collect(), Some(SortKey::Name), SortDirection::Asc);
        let desc = sort(rows.iter().collect(), Some(SortKey::Name), SortDirection::Desc);

        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
        assert_eq!(asc[0].first_name, "Ana");
    }

    #[test]
    fn ties_keep_filtered_order_in_both_directions() {
        let rows = sample();
        let asc = sort(rows.iter().collect(), Some(SortKey::City), SortDirection::Asc);
        let desc = sort(rows.iter().collect(), Some(SortKey::City), SortDirection::Desc);

        // Riyadh rows are 1, 5, 7 in filtered order
        let riyadh = |v: &[&RegistrationRow]| -> Vec<String> {
            v.iter()
                .filter(|r| r.city == "Riyadh")
                .map(|r| r.id.clone())
                .collect()
        };
        assert_eq!(riyadh(&asc), vec!["1", "5", "7"]);
        assert_eq!(riyadh(&desc), vec!["1", "5", "7"]);
        assert_eq!(desc[0].city, "Riyadh");
        assert_eq!(asc[0].city, "Dammam");
    }

    #[test]
    fn sort_compares_raw_strings() {
        let rows = vec![
            row("b", "Bo", "Li", "beta@x.com", "Riyadh"),
            row("a", "Al", "Li", "alpha@x.com", "Riyadh"),
            row("Z", "Zo", "Li", "Zed@x.com", "Riyadh"),
        ];
        let asc = sort(rows.iter().collect(), Some(SortKey::Email), SortDirection::Asc);
        assert_eq!(ids(&asc), vec!["Z", "a", "b"]);
    }

    #[test]
    fn no_sort_key_keeps_filtered_order() {
        let rows = sample();
        let sorted = sort(rows.iter().collect(), None, SortDirection::Desc);
        assert_eq!(ids(&sorted), vec!["1", "2", "3", "4", "5", "6", "7"]);
    }

    #[test]
    fn sort_toggles_between_two_states_only() {
        let rows = sample();
        let s0 = GridState::default();

        let s1 = reduce(&s0, GridAction::SortBy(SortKey::Name), &rows);
        assert_eq!((s1.sort_key, s1.sort_direction), (Some(SortKey::Name), SortDirection::Asc));

        let s2 = reduce(&s1, GridAction::SortBy(SortKey::Name), &rows);
        assert_eq!(s2.sort_direction, SortDirection::Desc);

        let s3 = reduce(&s2, GridAction::SortBy(SortKey::Name), &rows);
        assert_eq!(s3.sort_direction, SortDirection::Asc);

        let s4 = reduce(&s2, GridAction::SortBy(SortKey::Email), &rows);
        assert_eq!((s4.sort_key, s4.sort_direction), (Some(SortKey::Email), SortDirection::Asc));
    }

    #[test]
    fn search_and_sort_reset_to_first_page() {
        let rows = sample();
        let on_two = GridState {
            current_page: 2,
            ..GridState::default()
        };

        for action in [
            GridAction::SetSearchTerm("a".into()),
            GridAction::SetSearchField(SearchField::City),
            GridAction::SortBy(SortKey::City),
        ] {
            assert_eq!(reduce(&on_two, action, &rows).current_page, 1);
        }
    }

    #[test]
    fn page_moves_are_clamped() {
        let rows = sample(); // 7 rows -> 2 pages of 5
        let s = GridState::default();

        assert_eq!(reduce(&s, GridAction::PrevPage, &rows).current_page, 1);
        let s = reduce(&s, GridAction::NextPage, &rows);
        assert_eq!(s.current_page, 2);
        assert_eq!(reduce(&s, GridAction::NextPage, &rows).current_page, 2);
        assert_eq!(reduce(&s, GridAction::GoToPage(9), &rows).current_page, 2);
        assert_eq!(reduce(&s, GridAction::GoToPage(0), &rows).current_page, 1);
    }

    #[test]
    fn reducer_does_not_mutate_input_state() {
        let rows = sample();
        let s = GridState::default();
        let _ = reduce(&s, GridAction::SetSearchTerm("zzz".into()), &rows);
        assert_eq!(s, GridState::default());
    }

    #[test]
    fn render_clamps_stale_page() {
        let rows = sample();
        let state = GridState {
            current_page: 4,
            ..GridState::default()
        };

        let view = render(&rows, &state);

        assert_eq!(view.current_page(), 2);
        assert_eq!(view.page_count, 2);
        assert_eq!(view.page.items.len(), 2);
        assert_eq!(view.page.items[0].rank, 6);
    }

    #[test]
    fn render_with_no_matches_has_single_empty_page() {
        let rows = sample();
        let state = GridState {
            search_term: "nobody".into(),
            ..GridState::default()
        };

        let view = render(&rows, &state);

        assert!(view.is_empty());
        assert_eq!(view.page_count, 1);
        assert!(view.page.items.is_empty());
    }
}
