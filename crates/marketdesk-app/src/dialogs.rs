// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::MutationError;
use crate::forms::{FieldForm, FieldInput, PartyForm, PartyInput};
use crate::model::{Field, FieldDraft, FieldType, PartyDraft, PartyKind};

/// When a delete confirmation closes after its request finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteClosePolicy {
    /// Close whether the delete worked or not.
    Always,
    /// Close on success; stay open on failure so the user can retry.
    OnSuccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogFate {
    Close,
    StayOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub key: String,
    pub name: String,
    policy: DeleteClosePolicy,
    in_flight: bool,
}

impl DeleteDialog {
    pub fn new(key: impl Into<String>, name: impl Into<String>, policy: DeleteClosePolicy) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            policy,
            in_flight: false,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn delete_enabled(&self) -> bool {
        !self.in_flight
    }

    /// Returns the key to delete, or `None` while a request is outstanding.
    pub fn confirm(&mut self) -> Option<String> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(self.key.clone())
    }

    pub fn finish(&mut self, result: &Result<(), MutationError>) -> DialogFate {
        self.in_flight = false;
        match (result, self.policy) {
            (Ok(()), _) | (Err(_), DeleteClosePolicy::Always) => DialogFate::Close,
            (Err(_), DeleteClosePolicy::OnSuccess) => DialogFate::StayOpen,
        }
    }
}

fn step<T: Copy + PartialEq>(items: &[T], current: T, delta: isize) -> T {
    let len = items.len() as isize;
    let index = items.iter().position(|item| *item == current).unwrap_or(0) as isize;
    items[(index + delta).rem_euclid(len) as usize]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDialogMode {
    Add,
    Edit(Field),
}

/// Add or edit dialog over the fields table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDialog {
    pub mode: FieldDialogMode,
    pub form: FieldForm,
    pub focus: FieldInput,
    type_cursor: FieldType,
}

impl FieldDialog {
    pub fn add() -> Self {
        Self {
            mode: FieldDialogMode::Add,
            form: FieldForm::new(),
            focus: FieldInput::Title,
            type_cursor: FieldType::ALL[0],
        }
    }

    pub fn edit(field: Field) -> Self {
        Self {
            form: FieldForm::from_record(&field),
            type_cursor: field.field_type.unwrap_or(FieldType::ALL[0]),
            mode: FieldDialogMode::Edit(field),
            focus: FieldInput::Title,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FieldDialogMode::Add => "New Field",
            FieldDialogMode::Edit(_) => "Edit Field",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FieldDialogMode::Add => "Add",
            FieldDialogMode::Edit(_) => "Save",
        }
    }

    pub fn type_cursor(&self) -> FieldType {
        self.type_cursor
    }

    pub fn focus_next(&mut self) {
        self.focus = step(&FieldInput::ALL, self.focus, 1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = step(&FieldInput::ALL, self.focus, -1);
    }

    pub fn type_char(&mut self, ch: char) {
        self.form.push_char(self.focus, ch);
    }

    pub fn backspace(&mut self) {
        self.form.pop_char(self.focus);
    }

    /// Left/right inside the type checkboxes.
    pub fn move_type_cursor(&mut self, delta: isize) {
        self.type_cursor = step(&FieldType::ALL, self.type_cursor, delta);
    }

    /// Space on a choice input: cycles the category, or checks the type
    /// under the cursor.
    pub fn toggle_choice(&mut self) {
        match self.focus {
            FieldInput::Category => self.form.cycle_category(),
            FieldInput::Type => self.form.check_type(self.type_cursor),
            FieldInput::Title | FieldInput::Description => {}
        }
    }
}

/// Payload leaving a field dialog on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSubmission {
    Add(FieldDraft),
    Update(Field),
}

impl FieldDialog {
    pub fn submit(&mut self) -> Option<FieldSubmission> {
        let draft = self.form.begin_submit()?;
        Some(match &self.mode {
            FieldDialogMode::Add => FieldSubmission::Add(draft),
            FieldDialogMode::Edit(field) => FieldSubmission::Update(draft.apply_to(field)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Add,
    Edit { id: String },
}

/// Full-screen add/edit view for a buyer or seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyEditor {
    pub mode: EditorMode,
    pub form: PartyForm,
    pub focus: PartyInput,
    loading: bool,
}

impl PartyEditor {
    pub fn add(kind: PartyKind) -> Self {
        Self {
            mode: EditorMode::Add,
            form: PartyForm::new(kind),
            focus: PartyInput::Name,
            loading: false,
        }
    }

    /// Starts in the loading state until the record arrives.
    pub fn edit(kind: PartyKind, id: impl Into<String>) -> Self {
        Self {
            mode: EditorMode::Edit { id: id.into() },
            form: PartyForm::new(kind),
            focus: PartyInput::Name,
            loading: true,
        }
    }

    pub fn kind(&self) -> PartyKind {
        self.form.kind
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn title(&self) -> String {
        let noun = self.kind().noun();
        match self.mode {
            EditorMode::Add => format!("Add {noun}"),
            EditorMode::Edit { .. } => format!("Edit {noun}"),
        }
    }

    pub fn loaded(&mut self, draft: PartyDraft) {
        self.form = PartyForm::with_draft(self.kind(), draft);
        self.loading = false;
    }

    pub fn focus_next(&mut self) {
        self.focus = step(&PartyInput::ALL, self.focus, 1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = step(&PartyInput::ALL, self.focus, -1);
    }

    pub fn type_char(&mut self, ch: char) {
        if self.loading {
            return;
        }
        match self.focus {
            PartyInput::Status => {
                if ch == ' ' {
                    self.form.cycle_status();
                }
            }
            input => self.form.push_char(input, ch),
        }
    }

    pub fn backspace(&mut self) {
        if !self.loading && self.focus.is_text() {
            self.form.pop_char(self.focus);
        }
    }

    pub fn submit_enabled(&self) -> bool {
        !self.loading && self.form.submit_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DeleteClosePolicy, DeleteDialog, DialogFate, EditorMode, FieldDialog, FieldSubmission,
        PartyEditor,
    };
    use crate::error::ApiError;
    use crate::forms::{FieldInput, PartyInput};
    use crate::ids::FieldId;
    use crate::model::{Field, FieldCategory, FieldType, PartyDraft, PartyKind};
    use time::OffsetDateTime;

    fn failure() -> Result<(), ApiError> {
        Err(ApiError::Status {
            code: 500,
            message: None,
        })
    }

    #[test]
    fn delete_is_disabled_while_in_flight() {
        let mut dialog = DeleteDialog::new("b1", "Ada", DeleteClosePolicy::Always);
        assert_eq!(dialog.confirm(), Some("b1".to_owned()));
        assert!(!dialog.delete_enabled());
        assert_eq!(dialog.confirm(), None);
    }

    #[test]
    fn close_policy_differs_on_failure_only() {
        let mut always = DeleteDialog::new("b1", "Ada", DeleteClosePolicy::Always);
        always.confirm();
        assert_eq!(always.finish(&failure()), DialogFate::Close);

        let mut on_success = DeleteDialog::new("f1", "Budget", DeleteClosePolicy::OnSuccess);
        on_success.confirm();
        assert_eq!(on_success.finish(&failure()), DialogFate::StayOpen);
        assert!(on_success.delete_enabled());
        on_success.confirm();
        assert_eq!(on_success.finish(&Ok(())), DialogFate::Close);
    }

    #[test]
    fn edit_dialog_submits_full_replacement_record() {
        let field = Field {
            id: FieldId::new("f1"),
            title: "Budget".to_owned(),
            description: "max".to_owned(),
            category: Some(FieldCategory::Buyer),
            field_type: Some(FieldType::Input),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            revision: Some(3),
        };
        let mut dialog = FieldDialog::edit(field);
        dialog.type_char('!');
        dialog.focus = FieldInput::Type;
        dialog.move_type_cursor(1);
        dialog.toggle_choice();

        let Some(FieldSubmission::Update(updated)) = dialog.submit() else {
            panic!("edit dialog should submit an update");
        };
        assert_eq!(updated.id.as_str(), "f1");
        assert_eq!(updated.title, "Budget!");
        assert_eq!(updated.field_type, Some(FieldType::Textarea));
        assert_eq!(updated.revision, Some(3));
    }

    #[test]
    fn focus_wraps_around_inputs() {
        let mut dialog = FieldDialog::add();
        dialog.focus_prev();
        assert_eq!(dialog.focus, FieldInput::Type);
        dialog.focus_next();
        assert_eq!(dialog.focus, FieldInput::Title);
    }

    #[test]
    fn editor_ignores_typing_until_loaded() {
        let mut editor = PartyEditor::edit(PartyKind::Seller, "s1");
        assert_eq!(editor.mode, EditorMode::Edit { id: "s1".to_owned() });
        editor.type_char('x');
        assert!(editor.form.draft().name.is_empty());
        assert!(!editor.submit_enabled());

        editor.loaded(PartyDraft {
            name: "Bo".to_owned(),
            phone: "5551234567".to_owned(),
            ..PartyDraft::default()
        });
        assert!(editor.submit_enabled());
        editor.focus = PartyInput::Phone;
        editor.backspace();
        assert!(!editor.submit_enabled());
        assert_eq!(editor.title(), "Edit Seller");
    }
}
