// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{info, warn};

use crate::dialogs::{EditorMode, FieldDialog, FieldSubmission, PartyEditor};
use crate::error::{FetchError, MutationError};
use crate::model::{Buyer, Field, PartyDraft, PartyKind, Seller, TabKind};
use crate::requests::{Notification, Request, Response};
use crate::screen::{ScreenEffect, TableCommand, TableScreen};

#[derive(Debug, Clone)]
pub struct AppState {
    pub active_tab: TabKind,
    pub buyers: TableScreen<Buyer>,
    pub sellers: TableScreen<Seller>,
    pub fields: TableScreen<Field>,
    pub editor: Option<PartyEditor>,
    pub field_dialog: Option<FieldDialog>,
    pub notification: Option<Notification>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TabKind::Buyers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Mounts the starting tab.
    Start,
    NextTab,
    PrevTab,
    SelectTab(TabKind),
    Refresh,
    OpenAdd,
    Table(TableCommand),
    SubmitEditor,
    CloseEditor,
    SubmitFieldDialog,
    CloseFieldDialog,
    ClearNotification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    TabChanged(TabKind),
    Requested(Request),
    Notified(Notification),
    EditorOpened(PartyKind),
    EditorClosed,
    FieldDialogOpened,
    FieldDialogClosed,
    NotificationCleared,
}

impl AppState {
    pub fn new(start_tab: TabKind) -> Self {
        Self {
            active_tab: start_tab,
            buyers: TableScreen::default(),
            sellers: TableScreen::default(),
            fields: TableScreen::default(),
            editor: None,
            field_dialog: None,
            notification: None,
        }
    }

    /// Requests carried by `events`, in order.
    pub fn requests(events: &[AppEvent]) -> Vec<Request> {
        events
            .iter()
            .filter_map(|event| match event {
                AppEvent::Requested(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_overlay(&self) -> bool {
        self.editor.is_some()
            || self.field_dialog.is_some()
            || match self.active_tab {
                TabKind::Buyers => self.buyers.has_overlay(),
                TabKind::Sellers => self.sellers.has_overlay(),
                TabKind::Fields => self.fields.has_overlay(),
            }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Start => self.mount_active(),
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::SelectTab(tab) => self.select_tab(tab),
            AppCommand::Refresh => {
                let effects = match self.active_tab {
                    TabKind::Buyers => self.buyers.refresh(),
                    TabKind::Sellers => self.sellers.refresh(),
                    TabKind::Fields => self.fields.refresh(),
                };
                self.absorb(effects)
            }
            AppCommand::OpenAdd => self.open_add(),
            AppCommand::Table(command) => {
                let effects = match self.active_tab {
                    TabKind::Buyers => self.buyers.apply(command),
                    TabKind::Sellers => self.sellers.apply(command),
                    TabKind::Fields => self.fields.apply(command),
                };
                self.absorb(effects)
            }
            AppCommand::SubmitEditor => self.submit_editor(),
            AppCommand::CloseEditor => {
                let submitting = self
                    .editor
                    .as_ref()
                    .is_some_and(|editor| editor.form.is_submitting());
                if submitting || self.editor.take().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::EditorClosed]
            }
            AppCommand::SubmitFieldDialog => self.submit_field_dialog(),
            AppCommand::CloseFieldDialog => {
                if self.field_dialog.take().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::FieldDialogClosed]
            }
            AppCommand::ClearNotification => {
                self.notification = None;
                vec![AppEvent::NotificationCleared]
            }
        }
    }

    pub fn apply(&mut self, response: Response) -> Vec<AppEvent> {
        match response {
            Response::Buyers(result) => {
                let effects = self.buyers.finish_fetch(result);
                self.absorb(effects)
            }
            Response::Sellers(result) => {
                let effects = self.sellers.finish_fetch(result);
                self.absorb(effects)
            }
            Response::Fields(result) => {
                let effects = self.fields.finish_fetch(result);
                self.absorb(effects)
            }
            Response::PartyLoaded { kind, id, result } => self.party_loaded(kind, &id, result),
            Response::PartyAdded { kind, result } => {
                self.party_saved(kind, result, "added", &format!("Failed to add {}", lower(kind)))
            }
            Response::PartyUpdated { kind, id, result } => {
                info!(entity = kind.plural(), id = %id, ok = result.is_ok(), "update finished");
                self.party_saved(
                    kind,
                    result,
                    "updated",
                    &format!("Failed to update {}", lower(kind)),
                )
            }
            Response::PartyDeleted { kind, id, result } => {
                let effects = match kind {
                    PartyKind::Buyer => self.buyers.finish_delete(&id, result),
                    PartyKind::Seller => self.sellers.finish_delete(&id, result),
                };
                self.absorb(effects)
            }
            Response::FieldAdded(result) => self.field_added(result),
            Response::FieldUpdated { field, result } => self.field_updated(field, result),
            Response::FieldDeleted { id, result } => {
                let effects = self.fields.finish_delete(id.as_str(), result);
                self.absorb(effects)
            }
        }
    }

    fn absorb(&mut self, effects: Vec<ScreenEffect>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        for effect in effects {
            match effect {
                ScreenEffect::Request(request) => events.push(AppEvent::Requested(request)),
                ScreenEffect::Notify(notification) => events.push(self.notify(notification)),
                ScreenEffect::Edit(key) => events.extend(self.open_edit(&key)),
            }
        }
        events
    }

    fn notify(&mut self, notification: Notification) -> AppEvent {
        self.notification = Some(notification.clone());
        AppEvent::Notified(notification)
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.select_tab(tabs[next])
    }

    fn select_tab(&mut self, tab: TabKind) -> Vec<AppEvent> {
        if tab == self.active_tab && self.is_mounted(tab) {
            return Vec::new();
        }
        self.active_tab = tab;
        let mut events = vec![AppEvent::TabChanged(tab)];
        events.extend(self.mount_active());
        events
    }

    fn is_mounted(&self, tab: TabKind) -> bool {
        match tab {
            TabKind::Buyers => self.buyers.is_mounted(),
            TabKind::Sellers => self.sellers.is_mounted(),
            TabKind::Fields => self.fields.is_mounted(),
        }
    }

    fn mount_active(&mut self) -> Vec<AppEvent> {
        let effects = match self.active_tab {
            TabKind::Buyers => self.buyers.mount(),
            TabKind::Sellers => self.sellers.mount(),
            TabKind::Fields => self.fields.mount(),
        };
        self.absorb(effects)
    }

    fn refresh_party(&mut self, kind: PartyKind) -> Vec<AppEvent> {
        let effects = match kind {
            PartyKind::Buyer => self.buyers.refresh(),
            PartyKind::Seller => self.sellers.refresh(),
        };
        self.absorb(effects)
    }

    fn open_add(&mut self) -> Vec<AppEvent> {
        match self.active_tab.party_kind() {
            Some(kind) => {
                self.editor = Some(PartyEditor::add(kind));
                vec![AppEvent::EditorOpened(kind)]
            }
            None => {
                self.field_dialog = Some(FieldDialog::add());
                vec![AppEvent::FieldDialogOpened]
            }
        }
    }

    fn open_edit(&mut self, key: &str) -> Vec<AppEvent> {
        match self.active_tab.party_kind() {
            Some(kind) => {
                self.editor = Some(PartyEditor::edit(kind, key));
                vec![
                    AppEvent::EditorOpened(kind),
                    AppEvent::Requested(Request::LoadParty {
                        kind,
                        id: key.to_owned(),
                    }),
                ]
            }
            None => match self.fields.collection.find(key) {
                Some(field) => {
                    self.field_dialog = Some(FieldDialog::edit(field.clone()));
                    vec![AppEvent::FieldDialogOpened]
                }
                None => Vec::new(),
            },
        }
    }

    fn party_loaded(
        &mut self,
        kind: PartyKind,
        id: &str,
        result: Result<PartyDraft, FetchError>,
    ) -> Vec<AppEvent> {
        let Some(editor) = self.editor.as_mut() else {
            return Vec::new();
        };
        let waiting = editor.kind() == kind
            && matches!(&editor.mode, EditorMode::Edit { id: editing } if editing == id);
        if !waiting {
            return Vec::new();
        }
        match result {
            Ok(draft) => {
                editor.loaded(draft);
                Vec::new()
            }
            Err(error) => {
                warn!(entity = kind.plural(), id, %error, "record load failed");
                self.editor = None;
                vec![
                    self.notify(Notification::error(format!(
                        "Failed to fetch {} details",
                        lower(kind)
                    ))),
                    AppEvent::EditorClosed,
                ]
            }
        }
    }

    fn submit_editor(&mut self) -> Vec<AppEvent> {
        let Some(editor) = self.editor.as_mut() else {
            return Vec::new();
        };
        if editor.is_loading() {
            return Vec::new();
        }
        let kind = editor.kind();
        let Some(draft) = editor.form.begin_submit() else {
            return Vec::new();
        };
        let request = match &editor.mode {
            EditorMode::Add => Request::AddParty { kind, draft },
            EditorMode::Edit { id } => Request::UpdateParty {
                kind,
                id: id.clone(),
                draft,
            },
        };
        vec![AppEvent::Requested(request)]
    }

    /// Add and update share one outcome: success leaves the editor and
    /// refetches the list; failure keeps the editor with its inputs.
    fn party_saved(
        &mut self,
        kind: PartyKind,
        result: Result<(), MutationError>,
        verb: &str,
        fallback: &str,
    ) -> Vec<AppEvent> {
        match result {
            Ok(()) => {
                let mut events = vec![self.notify(Notification::success(format!(
                    "{} {verb} successfully",
                    kind.noun()
                )))];
                if self.editor.take().is_some() {
                    events.push(AppEvent::EditorClosed);
                }
                events.extend(self.refresh_party(kind));
                events
            }
            Err(error) => {
                warn!(entity = kind.plural(), %error, "save failed");
                if let Some(editor) = self.editor.as_mut() {
                    editor.form.finish_submit();
                }
                vec![self.notify(Notification::error(error.user_message(fallback)))]
            }
        }
    }

    fn submit_field_dialog(&mut self) -> Vec<AppEvent> {
        let Some(dialog) = self.field_dialog.as_mut() else {
            return Vec::new();
        };
        match dialog.submit() {
            Some(FieldSubmission::Add(draft)) => vec![AppEvent::Requested(Request::AddField(draft))],
            // The edit dialog closes on save; the outcome arrives as a notification.
            Some(FieldSubmission::Update(field)) => {
                self.field_dialog = None;
                vec![
                    AppEvent::FieldDialogClosed,
                    AppEvent::Requested(Request::UpdateField(field)),
                ]
            }
            None => Vec::new(),
        }
    }

    fn field_added(&mut self, result: Result<(), MutationError>) -> Vec<AppEvent> {
        match result {
            Ok(()) => {
                let mut events = vec![self.notify(Notification::success("Field added successfully"))];
                if self.field_dialog.take().is_some() {
                    events.push(AppEvent::FieldDialogClosed);
                }
                let effects = self.fields.refresh();
                events.extend(self.absorb(effects));
                events
            }
            Err(error) => {
                warn!(entity = "fields", %error, "add failed");
                if let Some(dialog) = self.field_dialog.as_mut() {
                    dialog.form.finish_submit();
                }
                vec![self.notify(Notification::error(error.user_message("Failed to add field")))]
            }
        }
    }

    fn field_updated(&mut self, field: Field, result: Result<(), MutationError>) -> Vec<AppEvent> {
        match result {
            Ok(()) => {
                self.fields.patch_local(field);
                vec![self.notify(Notification::success("Field updated successfully"))]
            }
            Err(error) => {
                warn!(entity = "fields", id = %field.id, %error, "update failed");
                vec![self.notify(Notification::error(
                    error.user_message("Failed to update field"),
                ))]
            }
        }
    }
}

fn lower(kind: PartyKind) -> String {
    kind.noun().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::actions::MenuInput;
    use crate::dialogs::EditorMode;
    use crate::error::ApiError;
    use crate::forms::PartyInput;
    use crate::ids::{BuyerId, FieldId};
    use crate::model::{Buyer, Field, FieldType, PartyDraft, PartyKind, TabKind};
    use crate::requests::{Notification, Request, Response};
    use crate::screen::TableCommand;
    use time::OffsetDateTime;

    fn buyer(id: &str, name: &str) -> Buyer {
        Buyer {
            id: BuyerId::new(id),
            name: name.to_owned(),
            email: String::new(),
            phone: "5551234567".to_owned(),
            status: None,
            about: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn field(id: &str, title: &str) -> Field {
        Field {
            id: FieldId::new(id),
            title: title.to_owned(),
            description: String::new(),
            category: None,
            field_type: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            revision: Some(0),
        }
    }

    fn failure() -> ApiError {
        ApiError::Transport {
            url: "http://127.0.0.1:9".to_owned(),
            reason: "connection refused".to_owned(),
        }
    }

    fn table(state: &mut AppState, command: TableCommand) -> Vec<AppEvent> {
        state.dispatch(AppCommand::Table(command))
    }

    #[test]
    fn start_mounts_only_the_active_tab() {
        let mut state = AppState::new(TabKind::Sellers);
        let events = state.dispatch(AppCommand::Start);
        assert_eq!(events, vec![AppEvent::Requested(Request::ListSellers)]);
        assert!(!state.buyers.is_mounted());
    }

    #[test]
    fn tab_rotation_wraps_and_mounts_each_tab_once() {
        let mut state = AppState::new(TabKind::Fields);
        state.dispatch(AppCommand::Start);

        let events = state.dispatch(AppCommand::NextTab);
        assert_eq!(state.active_tab, TabKind::Buyers);
        assert_eq!(
            events,
            vec![
                AppEvent::TabChanged(TabKind::Buyers),
                AppEvent::Requested(Request::ListBuyers),
            ]
        );

        let events = state.dispatch(AppCommand::PrevTab);
        assert_eq!(events, vec![AppEvent::TabChanged(TabKind::Fields)]);
    }

    #[test]
    fn refresh_refetches_active_tab() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Start);
        state.apply(Response::Buyers(Ok(vec![buyer("b1", "Ada")])));
        let events = state.dispatch(AppCommand::Refresh);
        assert_eq!(AppState::requests(&events), vec![Request::ListBuyers]);
        assert!(state.buyers.collection.is_loading());
    }

    #[test]
    fn fetch_failure_sets_notification() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Start);
        let events = state.apply(Response::Buyers(Err(failure())));
        let expected = Notification::error("Failed to fetch buyers");
        assert_eq!(events, vec![AppEvent::Notified(expected.clone())]);
        assert_eq!(state.notification, Some(expected));

        state.dispatch(AppCommand::ClearNotification);
        assert!(state.notification.is_none());
    }

    #[test]
    fn add_buyer_refetches_on_success() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Start);
        state.apply(Response::Buyers(Ok(Vec::new())));

        assert_eq!(
            state.dispatch(AppCommand::OpenAdd),
            vec![AppEvent::EditorOpened(PartyKind::Buyer)]
        );
        let editor = state.editor.as_mut().expect("editor open");
        editor.form.set_text(PartyInput::Name, "Ada");
        editor.form.set_text(PartyInput::Phone, "555-123-4567");

        let events = state.dispatch(AppCommand::SubmitEditor);
        let requests = AppState::requests(&events);
        let [Request::AddParty { kind, draft }] = requests.as_slice() else {
            panic!("expected one add request, got {events:?}");
        };
        assert_eq!(*kind, PartyKind::Buyer);
        assert_eq!(draft.name, "Ada");

        let events = state.apply(Response::PartyAdded {
            kind: PartyKind::Buyer,
            result: Ok(()),
        });
        assert_eq!(
            events,
            vec![
                AppEvent::Notified(Notification::success("Buyer added successfully")),
                AppEvent::EditorClosed,
                AppEvent::Requested(Request::ListBuyers),
            ]
        );
    }

    #[test]
    fn add_seller_failure_keeps_editor_open() {
        let mut state = AppState::new(TabKind::Sellers);
        state.dispatch(AppCommand::OpenAdd);
        let editor = state.editor.as_mut().expect("editor open");
        editor.form.set_text(PartyInput::Name, "Bo");
        editor.form.set_text(PartyInput::Phone, "5551234567");
        state.dispatch(AppCommand::SubmitEditor);

        let events = state.apply(Response::PartyAdded {
            kind: PartyKind::Seller,
            result: Err(failure()),
        });
        assert_eq!(
            events,
            vec![AppEvent::Notified(Notification::error("Failed to add seller"))]
        );
        let editor = state.editor.as_ref().expect("editor still open");
        assert_eq!(editor.form.draft().name, "Bo");
        assert!(editor.form.submit_enabled());
    }

    #[test]
    fn edit_buyer_loads_then_updates_and_returns_to_list() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Start);
        state.apply(Response::Buyers(Ok(vec![buyer("b1", "Ada")])));

        table(&mut state, TableCommand::OpenRowMenu);
        let events = table(&mut state, TableCommand::Menu(MenuInput::Choose));
        assert_eq!(
            events,
            vec![
                AppEvent::EditorOpened(PartyKind::Buyer),
                AppEvent::Requested(Request::LoadParty {
                    kind: PartyKind::Buyer,
                    id: "b1".to_owned(),
                }),
            ]
        );
        assert!(state.editor.as_ref().is_some_and(|editor| editor.is_loading()));
        assert!(state.dispatch(AppCommand::SubmitEditor).is_empty());

        state.apply(Response::PartyLoaded {
            kind: PartyKind::Buyer,
            id: "b1".to_owned(),
            result: Ok(PartyDraft {
                name: "Ada".to_owned(),
                phone: "5551234567".to_owned(),
                ..PartyDraft::default()
            }),
        });
        let events = state.dispatch(AppCommand::SubmitEditor);
        assert!(matches!(
            AppState::requests(&events).as_slice(),
            [Request::UpdateParty { id, .. }] if id == "b1"
        ));

        let events = state.apply(Response::PartyUpdated {
            kind: PartyKind::Buyer,
            id: "b1".to_owned(),
            result: Ok(()),
        });
        assert!(state.editor.is_none());
        assert_eq!(
            events,
            vec![
                AppEvent::Notified(Notification::success("Buyer updated successfully")),
                AppEvent::EditorClosed,
                AppEvent::Requested(Request::ListBuyers),
            ]
        );
    }

    #[test]
    fn edit_load_failure_returns_to_list() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Start);
        state.apply(Response::Buyers(Ok(vec![buyer("b1", "Ada")])));
        table(&mut state, TableCommand::OpenRowMenu);
        table(&mut state, TableCommand::Menu(MenuInput::Choose));
        assert!(matches!(
            state.editor.as_ref().map(|editor| &editor.mode),
            Some(EditorMode::Edit { .. })
        ));

        let events = state.apply(Response::PartyLoaded {
            kind: PartyKind::Buyer,
            id: "b1".to_owned(),
            result: Err(failure()),
        });
        assert_eq!(
            events,
            vec![
                AppEvent::Notified(Notification::error("Failed to fetch buyer details")),
                AppEvent::EditorClosed,
            ]
        );
        assert!(state.editor.is_none());
    }

    #[test]
    fn field_edit_patches_locally_without_refetch() {
        let mut state = AppState::new(TabKind::Fields);
        state.dispatch(AppCommand::Start);
        state.apply(Response::Fields(Ok(vec![field("f1", "Budget"), field("f2", "Notes")])));

        table(&mut state, TableCommand::OpenRowMenu);
        let events = table(&mut state, TableCommand::Menu(MenuInput::Choose));
        assert_eq!(events, vec![AppEvent::FieldDialogOpened]);

        let dialog = state.field_dialog.as_mut().expect("edit dialog open");
        dialog.type_char('s');
        dialog.form.check_type(FieldType::Upload);
        let events = state.dispatch(AppCommand::SubmitFieldDialog);
        let requests = AppState::requests(&events);
        let [Request::UpdateField(updated)] = requests.as_slice() else {
            panic!("expected update request, got {events:?}");
        };
        let updated = updated.clone();
        assert!(state.field_dialog.is_none());
        assert_eq!(updated.title, "Budgets");

        let events = state.apply(Response::FieldUpdated {
            field: updated,
            result: Ok(()),
        });
        assert_eq!(
            events,
            vec![AppEvent::Notified(Notification::success("Field updated successfully"))]
        );
        let titles: Vec<&str> = state
            .fields
            .collection
            .records()
            .iter()
            .map(|field| field.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Budgets", "Notes"]);
    }

    #[test]
    fn field_add_failure_keeps_dialog_inputs() {
        let mut state = AppState::new(TabKind::Fields);
        state.dispatch(AppCommand::Start);
        state.dispatch(AppCommand::OpenAdd);
        state
            .field_dialog
            .as_mut()
            .expect("add dialog open")
            .type_char('Z');
        let events = state.dispatch(AppCommand::SubmitFieldDialog);
        assert_eq!(AppState::requests(&events).len(), 1);

        let events = state.apply(Response::FieldAdded(Err(failure())));
        assert_eq!(
            events,
            vec![AppEvent::Notified(Notification::error("Failed to add field"))]
        );
        let dialog = state.field_dialog.as_ref().expect("dialog stays open");
        assert_eq!(dialog.form.draft().title, "Z");

        state.dispatch(AppCommand::SubmitFieldDialog);
        let events = state.apply(Response::FieldAdded(Ok(())));
        assert_eq!(
            events,
            vec![
                AppEvent::Notified(Notification::success("Field added successfully")),
                AppEvent::FieldDialogClosed,
                AppEvent::Requested(Request::ListFields),
            ]
        );
    }

    #[test]
    fn field_delete_routes_to_fields_screen() {
        let mut state = AppState::new(TabKind::Fields);
        state.dispatch(AppCommand::Start);
        state.apply(Response::Fields(Ok(vec![field("f1", "Budget"), field("f2", "Notes")])));
        table(&mut state, TableCommand::OpenRowMenu);
        table(&mut state, TableCommand::Menu(MenuInput::Down));
        table(&mut state, TableCommand::Menu(MenuInput::Choose));
        assert!(state.has_overlay());
        table(&mut state, TableCommand::ConfirmDelete);

        state.apply(Response::FieldDeleted {
            id: FieldId::new("f1"),
            result: Ok(()),
        });
        assert_eq!(state.fields.collection.records().len(), 1);
        assert!(!state.has_overlay());
    }
}
