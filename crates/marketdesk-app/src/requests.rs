// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::{FetchError, MutationError};
use crate::ids::FieldId;
use crate::model::{Buyer, Field, FieldDraft, PartyDraft, PartyKind, Seller, TabKind};

/// One outbound API call the front end must perform for the app state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListBuyers,
    ListSellers,
    ListFields,
    LoadParty {
        kind: PartyKind,
        id: String,
    },
    AddParty {
        kind: PartyKind,
        draft: PartyDraft,
    },
    UpdateParty {
        kind: PartyKind,
        id: String,
        draft: PartyDraft,
    },
    DeleteParty {
        kind: PartyKind,
        id: String,
    },
    AddField(FieldDraft),
    /// Full replacement record.
    UpdateField(Field),
    DeleteField(FieldId),
}

impl Request {
    pub fn list(tab: TabKind) -> Self {
        match tab {
            TabKind::Buyers => Self::ListBuyers,
            TabKind::Sellers => Self::ListSellers,
            TabKind::Fields => Self::ListFields,
        }
    }
}

/// The result of a [`Request`], fed back into the app state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Buyers(Result<Vec<Buyer>, FetchError>),
    Sellers(Result<Vec<Seller>, FetchError>),
    Fields(Result<Vec<Field>, FetchError>),
    PartyLoaded {
        kind: PartyKind,
        id: String,
        result: Result<PartyDraft, FetchError>,
    },
    PartyAdded {
        kind: PartyKind,
        result: Result<(), MutationError>,
    },
    PartyUpdated {
        kind: PartyKind,
        id: String,
        result: Result<(), MutationError>,
    },
    PartyDeleted {
        kind: PartyKind,
        id: String,
        result: Result<(), MutationError>,
    },
    FieldAdded(Result<(), MutationError>),
    FieldUpdated {
        field: Field,
        result: Result<(), MutationError>,
    },
    FieldDeleted {
        id: FieldId,
        result: Result<(), MutationError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
