// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Client-side table engine.
//!
//! A [`ViewState`] is an immutable value: every user interaction produces a
//! new one through a reducer method, and [`project`] derives the visible rows
//! from the raw collection with a fixed pipeline: filter, then sort, then
//! paginate.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Buyer, Field, PartyRecord, PartyStatus, Seller, SortDirection, WireEnum};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const LOADING_PLACEHOLDER: &str = "Loading...";
pub const EMPTY_PLACEHOLDER: &str = "No results.";

pub const SELECT_COLUMN: &str = "select";
pub const ACTIONS_COLUMN: &str = "actions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Choice(Option<&'static str>),
    Flag(bool),
    Menu,
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Choice(Some(label)) => (*label).to_owned(),
            Self::Choice(None) => String::new(),
            Self::Flag(true) => "[x]".to_owned(),
            Self::Flag(false) => "[ ]".to_owned(),
            Self::Menu => "...".to_owned(),
        }
    }

    fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => natural_cmp(left, right),
            (Self::Choice(left), Self::Choice(right)) => left.cmp(right),
            _ => natural_cmp(&self.display(), &other.display()),
        }
    }
}

/// Case-insensitive order where digit runs compare by numeric value, so
/// "Buyer 2" sorts before "Buyer 10".
fn natural_cmp(left: &str, right: &str) -> Ordering {
    let left = left.to_lowercase();
    let right = right.to_lowercase();
    let mut left_chunks = chunks(&left);
    let mut right_chunks = chunks(&right);
    loop {
        match (left_chunks.next(), right_chunks.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => {
                let ordering = cmp_chunk(a, b);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Splits `text` into alternating runs of ASCII digits and everything else.
fn chunks(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        let digit = rest.chars().next()?.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}

fn cmp_chunk(left: &str, right: &str) -> Ordering {
    let numeric = |chunk: &str| chunk.starts_with(|c: char| c.is_ascii_digit());
    if numeric(left) && numeric(right) {
        let left = left.trim_start_matches('0');
        let right = right.trim_start_matches('0');
        left.len().cmp(&right.len()).then_with(|| left.cmp(right))
    } else {
        left.cmp(right)
    }
}

/// Per-row state a computed column may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct LabelColumn<R> {
    pub id: &'static str,
    pub header: String,
    pub accessor: fn(&R) -> CellValue,
    pub sortable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputedKind {
    Select,
    Actions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedColumn {
    pub id: &'static str,
    pub kind: ComputedKind,
}

/// Either a data column read straight off the record, or a column whose
/// content comes from table state. Computed columns are never sortable
/// and never hideable.
#[derive(Debug, Clone)]
pub enum Column<R> {
    Label(LabelColumn<R>),
    Computed(ComputedColumn),
}

impl<R> Column<R> {
    pub fn label(id: &'static str, header: impl Into<String>, accessor: fn(&R) -> CellValue) -> Self {
        Self::Label(LabelColumn {
            id,
            header: header.into(),
            accessor,
            sortable: false,
        })
    }

    pub fn sortable(id: &'static str, header: impl Into<String>, accessor: fn(&R) -> CellValue) -> Self {
        Self::Label(LabelColumn {
            id,
            header: header.into(),
            accessor,
            sortable: true,
        })
    }

    pub const fn select() -> Self {
        Self::Computed(ComputedColumn {
            id: SELECT_COLUMN,
            kind: ComputedKind::Select,
        })
    }

    pub const fn actions() -> Self {
        Self::Computed(ComputedColumn {
            id: ACTIONS_COLUMN,
            kind: ComputedKind::Actions,
        })
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Label(column) => column.id,
            Self::Computed(column) => column.id,
        }
    }

    pub fn header(&self) -> &str {
        match self {
            Self::Label(column) => &column.header,
            Self::Computed(_) => "",
        }
    }

    pub fn is_sortable(&self) -> bool {
        matches!(self, Self::Label(column) if column.sortable)
    }

    pub fn can_hide(&self) -> bool {
        matches!(self, Self::Label(_))
    }

    pub fn value(&self, record: &R, context: RowContext) -> CellValue {
        match self {
            Self::Label(column) => (column.accessor)(record),
            Self::Computed(column) => match column.kind {
                ComputedKind::Select => CellValue::Flag(context.selected),
                ComputedKind::Actions => CellValue::Menu,
            },
        }
    }
}

/// A record the table engine can project.
pub trait TableRecord: Sized {
    fn row_key(&self) -> &str;

    /// Name shown in confirmations and status messages.
    fn display_name(&self) -> &str;

    /// Global-filter predicate over this entity's searchable fields.
    /// `needle` is already lowercased and non-empty.
    fn matches_search(&self, needle: &str) -> bool;

    fn columns() -> Vec<Column<Self>>;
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn party_columns<P: PartyRecord>() -> Vec<Column<P>> {
    let noun = P::KIND.noun();
    vec![
        Column::select(),
        Column::sortable("name", format!("{noun} Name"), |record: &P| {
            CellValue::Text(record.name().to_owned())
        }),
        Column::label("email", format!("{noun} Email"), |record: &P| {
            CellValue::Text(record.email().to_owned())
        }),
        Column::label("phone", format!("{noun} Phone"), |record: &P| {
            CellValue::Text(record.phone().to_owned())
        }),
        Column::label("status", "Status", |record: &P| {
            CellValue::Choice(record.status().map(PartyStatus::label))
        }),
        Column::actions(),
    ]
}

macro_rules! party_table_record {
    ($record:ty) => {
        impl TableRecord for $record {
            fn row_key(&self) -> &str {
                self.id.as_str()
            }

            fn display_name(&self) -> &str {
                &self.name
            }

            fn matches_search(&self, needle: &str) -> bool {
                contains_folded(&self.name, needle) || contains_folded(&self.phone, needle)
            }

            fn columns() -> Vec<Column<Self>> {
                party_columns::<Self>()
            }
        }
    };
}

party_table_record!(Buyer);
party_table_record!(Seller);

impl TableRecord for Field {
    fn row_key(&self) -> &str {
        self.id.as_str()
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_folded(&self.title, needle)
            || contains_folded(&self.description, needle)
            || self
                .category
                .is_some_and(|category| category.as_str().contains(needle))
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::select(),
            Column::sortable("title", "Title", |field: &Field| {
                CellValue::Text(field.title.clone())
            }),
            Column::label("description", "Description", |field: &Field| {
                CellValue::Text(field.description.clone())
            }),
            Column::label("category", "Category", |field: &Field| {
                CellValue::Choice(field.category.map(|category| category.label()))
            }),
            Column::label("type", "Type", |field: &Field| {
                CellValue::Choice(field.field_type.map(|field_type| field_type.label()))
            }),
            Column::actions(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// At most one entry; kept as a list to match the sort-state shape.
    pub sorting: Vec<SortSpec>,
    pub column_filters: BTreeMap<&'static str, String>,
    pub global_filter: String,
    pub hidden_columns: BTreeSet<&'static str>,
    pub selection: BTreeSet<String>,
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sorting: Vec::new(),
            column_filters: BTreeMap::new(),
            global_filter: String::new(),
            hidden_columns: BTreeSet::new(),
            selection: BTreeSet::new(),
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    pub fn with_global_filter(self, value: impl Into<String>) -> Self {
        Self {
            global_filter: value.into(),
            page_index: 0,
            ..self
        }
    }

    pub fn with_column_filter(mut self, column: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            self.column_filters.remove(column);
        } else {
            self.column_filters.insert(column, value);
        }
        Self {
            page_index: 0,
            ..self
        }
    }

    /// Header click: ascending first, then alternating on the same column.
    /// Non-sortable columns leave the state unchanged.
    pub fn toggle_sort<R>(self, columns: &[Column<R>], column: &str) -> Self {
        let Some(target) = columns
            .iter()
            .find(|candidate| candidate.id() == column && candidate.is_sortable())
        else {
            return self;
        };
        let direction = match self.sort() {
            Some(current) if current.column == target.id() => current.direction.flipped(),
            _ => SortDirection::Asc,
        };
        Self {
            sorting: vec![SortSpec {
                column: target.id(),
                direction,
            }],
            page_index: 0,
            ..self
        }
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sorting.first().copied()
    }

    pub fn toggle_column<R>(mut self, columns: &[Column<R>], column: &str) -> Self {
        let Some(target) = columns
            .iter()
            .find(|candidate| candidate.id() == column && candidate.can_hide())
        else {
            return self;
        };
        if !self.hidden_columns.remove(target.id()) {
            self.hidden_columns.insert(target.id());
        }
        self
    }

    pub fn is_column_visible(&self, column: &str) -> bool {
        !self.hidden_columns.contains(column)
    }

    pub fn toggle_row(mut self, key: &str) -> Self {
        if !self.selection.remove(key) {
            self.selection.insert(key.to_owned());
        }
        self
    }

    /// Selects every row on the page unless all of them already are, in
    /// which case the page is cleared.
    pub fn toggle_page_rows<'k>(mut self, page_keys: impl IntoIterator<Item = &'k str>) -> Self {
        let keys: Vec<&str> = page_keys.into_iter().collect();
        let all_selected = !keys.is_empty() && keys.iter().all(|key| self.selection.contains(*key));
        for key in keys {
            if all_selected {
                self.selection.remove(key);
            } else {
                self.selection.insert(key.to_owned());
            }
        }
        self
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.contains(key)
    }

    pub fn next_page(self, filtered_count: usize) -> Self {
        if !self.can_next_page(filtered_count) {
            return self;
        }
        Self {
            page_index: self.page_index + 1,
            ..self
        }
    }

    pub fn previous_page(self) -> Self {
        Self {
            page_index: self.page_index.saturating_sub(1),
            ..self
        }
    }

    pub fn page_count(&self, filtered_count: usize) -> usize {
        filtered_count.div_ceil(self.page_size.max(1)).max(1)
    }

    pub fn can_next_page(&self, filtered_count: usize) -> bool {
        self.page_index + 1 < self.page_count(filtered_count)
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    /// Selection and paging do not survive a wholesale data replacement.
    pub fn on_data_replaced(self) -> Self {
        Self {
            selection: BTreeSet::new(),
            page_index: 0,
            ..self
        }
    }

    /// Drops a removed row from the selection and keeps the page in range.
    pub fn on_row_removed(mut self, key: &str, remaining: usize) -> Self {
        self.selection.remove(key);
        self.clamp_page(remaining)
    }

    pub fn clamp_page(self, filtered_count: usize) -> Self {
        let last_page = self.page_count(filtered_count) - 1;
        Self {
            page_index: self.page_index.min(last_page),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMark {
    Unchecked,
    Indeterminate,
    Checked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody<'a, R> {
    Loading,
    NoResults,
    Rows(Vec<&'a R>),
}

impl<R> TableBody<'_, R> {
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some(LOADING_PLACEHOLDER),
            Self::NoResults => Some(EMPTY_PLACEHOLDER),
            Self::Rows(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableView<'a, R> {
    pub columns: Vec<&'a Column<R>>,
    pub body: TableBody<'a, R>,
    pub filtered_count: usize,
    pub selected_count: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub header_mark: SelectionMark,
}

impl<R> TableView<'_, R> {
    pub fn rows(&self) -> &[&R] {
        match &self.body {
            TableBody::Rows(rows) => rows,
            TableBody::Loading | TableBody::NoResults => &[],
        }
    }

    pub fn selection_summary(&self) -> String {
        format!(
            "{} of {} row(s) selected.",
            self.selected_count, self.filtered_count
        )
    }
}

fn row_passes_filters<R: TableRecord>(
    record: &R,
    columns: &[Column<R>],
    state: &ViewState,
    needle: &str,
) -> bool {
    if !needle.is_empty() && !record.matches_search(needle) {
        return false;
    }
    state.column_filters.iter().all(|(column_id, value)| {
        let Some(column) = columns.iter().find(|column| column.id() == *column_id) else {
            return true;
        };
        let cell = column.value(record, RowContext { selected: false });
        contains_folded(&cell.display(), &value.to_lowercase())
    })
}

/// Rows surviving the filter stage, in source order.
pub fn filtered_rows<'a, R: TableRecord>(
    records: &'a [R],
    columns: &[Column<R>],
    state: &ViewState,
) -> Vec<&'a R> {
    let needle = state.global_filter.to_lowercase();
    records
        .iter()
        .filter(|record| row_passes_filters(*record, columns, state, &needle))
        .collect()
}

fn sort_rows<R: TableRecord>(rows: &mut [&R], columns: &[Column<R>], sort: Option<SortSpec>) {
    let Some(sort) = sort else {
        return;
    };
    let Some(column) = columns
        .iter()
        .find(|column| column.id() == sort.column && column.is_sortable())
    else {
        return;
    };
    let unselected = RowContext { selected: false };
    // slice::sort_by is stable, so ties keep their filtered order.
    rows.sort_by(|left, right| {
        let order = column
            .value(left, unselected)
            .cmp_value(&column.value(right, unselected));
        match sort.direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    });
}

pub fn project<'a, R: TableRecord>(
    records: &'a [R],
    columns: &'a [Column<R>],
    state: &ViewState,
    loading: bool,
) -> TableView<'a, R> {
    let mut rows = filtered_rows(records, columns, state);
    let filtered_count = rows.len();
    let selected_count = rows
        .iter()
        .filter(|record| state.is_selected(record.row_key()))
        .count();

    sort_rows(&mut rows, columns, state.sort());

    let page_count = state.page_count(filtered_count);
    let page_index = state.page_index.min(page_count - 1);
    let page_size = state.page_size.max(1);
    let page: Vec<&R> = rows
        .into_iter()
        .skip(page_index * page_size)
        .take(page_size)
        .collect();

    let page_selected = page
        .iter()
        .filter(|record| state.is_selected(record.row_key()))
        .count();
    let header_mark = if page.is_empty() || page_selected == 0 {
        SelectionMark::Unchecked
    } else if page_selected == page.len() {
        SelectionMark::Checked
    } else {
        SelectionMark::Indeterminate
    };

    let body = if loading {
        TableBody::Loading
    } else if page.is_empty() {
        TableBody::NoResults
    } else {
        TableBody::Rows(page)
    };

    TableView {
        columns: columns
            .iter()
            .filter(|column| !column.can_hide() || state.is_column_visible(column.id()))
            .collect(),
        body,
        filtered_count,
        selected_count,
        page_index,
        page_count,
        can_previous: page_index > 0,
        can_next: page_index + 1 < page_count,
        header_mark,
    }
}

/// Entries for the column-visibility menu: hideable columns only.
pub fn visibility_menu<R>(columns: &[Column<R>], state: &ViewState) -> Vec<(&'static str, String, bool)> {
    columns
        .iter()
        .filter(|column| column.can_hide())
        .map(|column| {
            (
                column.id(),
                column.header().to_owned(),
                state.is_column_visible(column.id()),
            )
        })
        .collect()
}
