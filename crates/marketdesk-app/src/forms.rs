// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::model::{
    Field, FieldCategory, FieldDraft, FieldType, PartyDraft, PartyKind, PartyRecord, PartyStatus,
};
use crate::validation::{is_valid_email, is_valid_phone};

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const PHONE_REQUIRED: &str = "Phone number is required";
pub const PHONE_INVALID: &str = "Please enter a valid 10-digit phone number";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartyInput {
    Name,
    Email,
    Phone,
    Status,
    About,
}

impl PartyInput {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Status,
        Self::About,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Status => "Status",
            Self::About => "About",
        }
    }

    pub const fn is_text(self) -> bool {
        !matches!(self, Self::Status)
    }

    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::About)
    }
}

/// Inline validation messages, at most one per input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<PartyInput, &'static str>);

impl FieldErrors {
    pub fn get(&self, input: PartyInput) -> Option<&'static str> {
        self.0.get(&input).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn set(&mut self, input: PartyInput, error: Option<&'static str>) {
        match error {
            Some(message) => {
                self.0.insert(input, message);
            }
            None => {
                self.0.remove(&input);
            }
        }
    }
}

pub fn validate_party_input(input: PartyInput, draft: &PartyDraft) -> Option<&'static str> {
    match input {
        PartyInput::Name if draft.name.trim().is_empty() => Some(NAME_REQUIRED),
        PartyInput::Email if !is_valid_email(&draft.email) => Some(EMAIL_INVALID),
        PartyInput::Phone if draft.phone.trim().is_empty() => Some(PHONE_REQUIRED),
        PartyInput::Phone if !is_valid_phone(&draft.phone) => Some(PHONE_INVALID),
        _ => None,
    }
}

/// Validates every input at once, as on a submit attempt.
pub fn validate_party(draft: &PartyDraft) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for input in PartyInput::ALL {
        errors.set(input, validate_party_input(input, draft));
    }
    errors
}

/// Buyer or seller add/edit form.
///
/// Each edit re-validates only the input that changed; untouched inputs stay
/// quiet until the first submit attempt validates everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyForm {
    pub kind: PartyKind,
    draft: PartyDraft,
    errors: FieldErrors,
    submitting: bool,
}

impl PartyForm {
    pub fn new(kind: PartyKind) -> Self {
        Self {
            kind,
            draft: PartyDraft::default(),
            errors: FieldErrors::default(),
            submitting: false,
        }
    }

    pub fn from_record<R: PartyRecord>(record: &R) -> Self {
        Self::with_draft(R::KIND, PartyDraft::from_record(record))
    }

    pub fn with_draft(kind: PartyKind, draft: PartyDraft) -> Self {
        Self {
            draft,
            ..Self::new(kind)
        }
    }

    pub fn draft(&self) -> &PartyDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn text(&self, input: PartyInput) -> &str {
        match input {
            PartyInput::Name => &self.draft.name,
            PartyInput::Email => &self.draft.email,
            PartyInput::Phone => &self.draft.phone,
            PartyInput::About => &self.draft.about,
            PartyInput::Status => self.draft.status.map(PartyStatus::label).unwrap_or(""),
        }
    }

    pub fn set_text(&mut self, input: PartyInput, value: impl Into<String>) {
        let value = value.into();
        match input {
            PartyInput::Name => self.draft.name = value,
            PartyInput::Email => self.draft.email = value,
            PartyInput::Phone => self.draft.phone = value,
            PartyInput::About => self.draft.about = value,
            PartyInput::Status => return,
        }
        self.errors.set(input, validate_party_input(input, &self.draft));
    }

    pub fn push_char(&mut self, input: PartyInput, ch: char) {
        let mut value = self.text(input).to_owned();
        value.push(ch);
        self.set_text(input, value);
    }

    pub fn pop_char(&mut self, input: PartyInput) {
        let mut value = self.text(input).to_owned();
        value.pop();
        self.set_text(input, value);
    }

    pub fn set_status(&mut self, status: Option<PartyStatus>) {
        self.draft.status = status;
    }

    /// Steps through unset, then each status in order, wrapping around.
    pub fn cycle_status(&mut self) {
        let next = match self.draft.status {
            None => Some(PartyStatus::ALL[0]),
            Some(current) => PartyStatus::ALL
                .iter()
                .position(|status| *status == current)
                .and_then(|index| PartyStatus::ALL.get(index + 1).copied()),
        };
        self.set_status(next);
    }

    /// Any inline error, or a required input still blank.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
            || self.draft.name.trim().is_empty()
            || self.draft.phone.trim().is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_enabled(&self) -> bool {
        !self.has_errors() && !self.submitting
    }

    /// Validates everything and, when clean, marks the form in flight and
    /// hands back the draft to send. Returns `None` while a request is
    /// already outstanding.
    pub fn begin_submit(&mut self) -> Option<PartyDraft> {
        if self.submitting {
            return None;
        }
        self.errors = validate_party(&self.draft);
        if self.has_errors() {
            return None;
        }
        self.submitting = true;
        Some(self.draft.clone())
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldInput {
    Title,
    Description,
    Category,
    Type,
}

impl FieldInput {
    pub const ALL: [Self; 4] = [Self::Title, Self::Description, Self::Category, Self::Type];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Category => "Category",
            Self::Type => "Type",
        }
    }
}

/// Field add/edit form. No validation: whatever is entered is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldForm {
    draft: FieldDraft,
    submitting: bool,
}

impl FieldForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(field: &Field) -> Self {
        Self {
            draft: FieldDraft::from_record(field),
            submitting: false,
        }
    }

    pub fn draft(&self) -> &FieldDraft {
        &self.draft
    }

    pub fn text(&self, input: FieldInput) -> &str {
        match input {
            FieldInput::Title => &self.draft.title,
            FieldInput::Description => &self.draft.description,
            FieldInput::Category => self.draft.category.map(FieldCategory::label).unwrap_or(""),
            FieldInput::Type => self.draft.field_type.map(FieldType::label).unwrap_or(""),
        }
    }

    pub fn push_char(&mut self, input: FieldInput, ch: char) {
        match input {
            FieldInput::Title => self.draft.title.push(ch),
            FieldInput::Description => self.draft.description.push(ch),
            FieldInput::Category | FieldInput::Type => {}
        }
    }

    pub fn pop_char(&mut self, input: FieldInput) {
        match input {
            FieldInput::Title => {
                self.draft.title.pop();
            }
            FieldInput::Description => {
                self.draft.description.pop();
            }
            FieldInput::Category | FieldInput::Type => {}
        }
    }

    pub fn cycle_category(&mut self) {
        self.draft.category = match self.draft.category {
            None | Some(FieldCategory::Seller) => Some(FieldCategory::Buyer),
            Some(FieldCategory::Buyer) => Some(FieldCategory::Seller),
        };
    }

    /// Checking a type box always selects that type, so at most one box is
    /// ever checked and a checked box cannot be cleared by clicking it.
    pub fn check_type(&mut self, field_type: FieldType) {
        self.draft.field_type = Some(field_type);
    }

    pub fn is_type_checked(&self, field_type: FieldType) -> bool {
        self.draft.field_type == Some(field_type)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn begin_submit(&mut self) -> Option<FieldDraft> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        Some(self.draft.clone())
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
