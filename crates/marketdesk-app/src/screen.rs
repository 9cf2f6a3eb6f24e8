// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{info, warn};

use crate::actions::{MenuInput, MenuOutcome, RowActionMenu, RowIntent};
use crate::collection::{FetchOutcome, RemoteCollection};
use crate::dialogs::{DeleteClosePolicy, DeleteDialog, DialogFate};
use crate::error::{FetchError, MutationError};
use crate::ids::FieldId;
use crate::model::{Buyer, Field, PartyKind, Seller, TabKind};
use crate::requests::{Notification, Request};
use crate::table::{Column, TableRecord, TableView, ViewState, filtered_rows, project};

/// How a successful write reaches the on-screen collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Re-run the list fetch and replace everything.
    Refetch,
    /// Apply the change to the held records without a round trip.
    PatchLocal,
}

/// Per-entity behavior of a table screen.
pub trait ScreenEntity: TableRecord + Clone {
    const TAB: TabKind;
    const NOUN: &'static str;
    const DELETE_CLOSE: DeleteClosePolicy;
    const DELETE_STRATEGY: WriteStrategy;

    fn delete_request(key: &str) -> Request;
}

impl ScreenEntity for Buyer {
    const TAB: TabKind = TabKind::Buyers;
    const NOUN: &'static str = "Buyer";
    const DELETE_CLOSE: DeleteClosePolicy = DeleteClosePolicy::Always;
    const DELETE_STRATEGY: WriteStrategy = WriteStrategy::Refetch;

    fn delete_request(key: &str) -> Request {
        Request::DeleteParty {
            kind: PartyKind::Buyer,
            id: key.to_owned(),
        }
    }
}

impl ScreenEntity for Seller {
    const TAB: TabKind = TabKind::Sellers;
    const NOUN: &'static str = "Seller";
    const DELETE_CLOSE: DeleteClosePolicy = DeleteClosePolicy::Always;
    const DELETE_STRATEGY: WriteStrategy = WriteStrategy::Refetch;

    fn delete_request(key: &str) -> Request {
        Request::DeleteParty {
            kind: PartyKind::Seller,
            id: key.to_owned(),
        }
    }
}

impl ScreenEntity for Field {
    const TAB: TabKind = TabKind::Fields;
    const NOUN: &'static str = "Field";
    const DELETE_CLOSE: DeleteClosePolicy = DeleteClosePolicy::OnSuccess;
    const DELETE_STRATEGY: WriteStrategy = WriteStrategy::PatchLocal;

    fn delete_request(key: &str) -> Request {
        Request::DeleteField(FieldId::new(key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    CursorUp,
    CursorDown,
    NextPage,
    PrevPage,
    ToggleSort,
    ToggleRow,
    TogglePage,
    SetGlobalFilter(String),
    SetColumnFilter {
        column: &'static str,
        value: String,
    },
    ToggleColumn(&'static str),
    OpenRowMenu,
    Menu(MenuInput),
    ConfirmDelete,
    CancelDelete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEffect {
    Request(Request),
    Notify(Notification),
    /// The row's edit action was chosen.
    Edit(String),
}

/// One tab: its fetched records, table view state, and open overlays.
#[derive(Debug, Clone)]
pub struct TableScreen<R> {
    pub collection: RemoteCollection<R>,
    pub view: ViewState,
    pub menu: Option<RowActionMenu>,
    pub delete: Option<DeleteDialog>,
    columns: Vec<Column<R>>,
    cursor: usize,
    mounted: bool,
}

impl<R: ScreenEntity> Default for TableScreen<R> {
    fn default() -> Self {
        Self {
            collection: RemoteCollection::default(),
            view: ViewState::default(),
            menu: None,
            delete: None,
            columns: R::columns(),
            cursor: 0,
            mounted: false,
        }
    }
}

impl<R: ScreenEntity> TableScreen<R> {
    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn projection(&self) -> TableView<'_, R> {
        project(
            self.collection.records(),
            &self.columns,
            &self.view,
            self.collection.is_loading(),
        )
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// True while a modal overlay owns input.
    pub fn has_overlay(&self) -> bool {
        self.menu.is_some() || self.delete.is_some()
    }

    fn cursor_row(&self) -> Option<(String, String)> {
        let view = self.projection();
        view.rows()
            .get(self.cursor)
            .map(|row| (row.row_key().to_owned(), row.display_name().to_owned()))
    }

    fn page_keys(&self) -> Vec<String> {
        self.projection()
            .rows()
            .iter()
            .map(|row| row.row_key().to_owned())
            .collect()
    }

    fn filtered_count(&self) -> usize {
        filtered_rows(self.collection.records(), &self.columns, &self.view).len()
    }

    fn clamp_cursor(&mut self) {
        let rows = self.projection().rows().len();
        self.cursor = self.cursor.min(rows.saturating_sub(1));
    }

    /// First activation fetches; later activations reuse what is held.
    pub fn mount(&mut self) -> Vec<ScreenEffect> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        self.refresh()
    }

    pub fn refresh(&mut self) -> Vec<ScreenEffect> {
        self.mounted = true;
        self.collection.begin_fetch();
        info!(entity = R::TAB.label(), "fetching collection");
        vec![ScreenEffect::Request(Request::list(R::TAB))]
    }

    pub fn finish_fetch(&mut self, result: Result<Vec<R>, FetchError>) -> Vec<ScreenEffect> {
        match self.collection.finish_fetch(result) {
            FetchOutcome::Replaced { count } => {
                info!(entity = R::TAB.label(), count, "collection replaced");
                self.view = std::mem::take(&mut self.view).on_data_replaced();
                self.cursor = 0;
                Vec::new()
            }
            FetchOutcome::Failed(error) => {
                warn!(entity = R::TAB.label(), %error, "fetch failed");
                self.clamp_cursor();
                vec![ScreenEffect::Notify(Notification::error(format!(
                    "Failed to fetch {}",
                    R::TAB.label()
                )))]
            }
        }
    }

    pub fn apply(&mut self, command: TableCommand) -> Vec<ScreenEffect> {
        if self.delete.is_some() {
            return self.apply_delete_dialog(command);
        }
        if self.menu.is_some() {
            return self.apply_menu(command);
        }

        let view = std::mem::take(&mut self.view);
        self.view = match command {
            TableCommand::CursorUp => {
                self.cursor = self.cursor.saturating_sub(1);
                view
            }
            TableCommand::CursorDown => {
                self.cursor += 1;
                view
            }
            TableCommand::NextPage => {
                self.cursor = 0;
                let filtered = filtered_rows(self.collection.records(), &self.columns, &view).len();
                view.next_page(filtered)
            }
            TableCommand::PrevPage => {
                self.cursor = 0;
                view.previous_page()
            }
            TableCommand::ToggleSort => {
                match self.columns.iter().find(|column| column.is_sortable()) {
                    Some(column) => view.toggle_sort(&self.columns, column.id()),
                    None => view,
                }
            }
            TableCommand::ToggleRow => {
                self.view = view;
                match self.cursor_row() {
                    Some((key, _)) => std::mem::take(&mut self.view).toggle_row(&key),
                    None => std::mem::take(&mut self.view),
                }
            }
            TableCommand::TogglePage => {
                self.view = view;
                let keys = self.page_keys();
                std::mem::take(&mut self.view).toggle_page_rows(keys.iter().map(String::as_str))
            }
            TableCommand::SetGlobalFilter(value) => {
                self.cursor = 0;
                view.with_global_filter(value)
            }
            TableCommand::SetColumnFilter { column, value } => {
                self.cursor = 0;
                view.with_column_filter(column, value)
            }
            TableCommand::ToggleColumn(column) => view.toggle_column(&self.columns, column),
            TableCommand::OpenRowMenu => {
                self.view = view;
                if let Some((key, name)) = self.cursor_row() {
                    self.menu = Some(RowActionMenu::open(key, name));
                }
                std::mem::take(&mut self.view)
            }
            TableCommand::Menu(_) | TableCommand::ConfirmDelete | TableCommand::CancelDelete => {
                view
            }
        };
        self.clamp_cursor();
        Vec::new()
    }

    /// The menu consumes every command while open, so nothing reaches row
    /// selection underneath it.
    fn apply_menu(&mut self, command: TableCommand) -> Vec<ScreenEffect> {
        let TableCommand::Menu(input) = command else {
            return Vec::new();
        };
        let Some(menu) = self.menu.as_mut() else {
            return Vec::new();
        };
        match menu.handle(input) {
            MenuOutcome::Open => Vec::new(),
            MenuOutcome::Closed => {
                self.menu = None;
                Vec::new()
            }
            MenuOutcome::Chosen(RowIntent::Edit { key }) => {
                self.menu = None;
                vec![ScreenEffect::Edit(key)]
            }
            MenuOutcome::Chosen(RowIntent::ConfirmDelete { key, name }) => {
                self.menu = None;
                self.delete = Some(DeleteDialog::new(key, name, R::DELETE_CLOSE));
                Vec::new()
            }
        }
    }

    fn apply_delete_dialog(&mut self, command: TableCommand) -> Vec<ScreenEffect> {
        let Some(dialog) = self.delete.as_mut() else {
            return Vec::new();
        };
        match command {
            TableCommand::ConfirmDelete => match dialog.confirm() {
                Some(key) => {
                    info!(entity = R::TAB.label(), id = %key, "deleting record");
                    vec![ScreenEffect::Request(R::delete_request(&key))]
                }
                None => Vec::new(),
            },
            TableCommand::CancelDelete if !dialog.is_in_flight() => {
                self.delete = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn finish_delete(
        &mut self,
        key: &str,
        result: Result<(), MutationError>,
    ) -> Vec<ScreenEffect> {
        let fate = match self.delete.as_mut() {
            Some(dialog) if dialog.key == key => dialog.finish(&result),
            _ => DialogFate::Close,
        };
        if fate == DialogFate::Close && self.delete.as_ref().is_some_and(|d| d.key == key) {
            self.delete = None;
        }

        match result {
            Ok(()) => {
                info!(entity = R::TAB.label(), id = key, "record deleted");
                let mut effects = vec![ScreenEffect::Notify(Notification::success(format!(
                    "{} deleted successfully",
                    R::NOUN
                )))];
                match R::DELETE_STRATEGY {
                    WriteStrategy::Refetch => effects.extend(self.refresh()),
                    WriteStrategy::PatchLocal => self.remove_local(key),
                }
                effects
            }
            Err(error) => {
                warn!(entity = R::TAB.label(), id = key, %error, "delete failed");
                let fallback = format!("Failed to delete {}", R::NOUN.to_lowercase());
                vec![ScreenEffect::Notify(Notification::error(
                    error.user_message(&fallback),
                ))]
            }
        }
    }

    fn remove_local(&mut self, key: &str) {
        if self.collection.remove(key) {
            let remaining = self.filtered_count();
            self.view = std::mem::take(&mut self.view).on_row_removed(key, remaining);
        }
        self.clamp_cursor();
    }

    /// Replaces one held record in place. The patched row may drop out of
    /// the active filters, so the page and cursor are pulled back in range.
    pub fn patch_local(&mut self, record: R) -> bool {
        if !self.collection.patch(record) {
            return false;
        }
        let filtered = self.filtered_count();
        self.view = std::mem::take(&mut self.view).clamp_page(filtered);
        self.clamp_cursor();
        true
    }
}
