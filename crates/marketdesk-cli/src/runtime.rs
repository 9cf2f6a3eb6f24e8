// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use marketdesk_api::Client;
use marketdesk_app::{
    Buyer, FetchError, Field, FieldDraft, FieldId, MutationError, PartyDraft, PartyKind, Seller,
};
use tracing::{info, warn};

/// Terminal runtime backed by the live REST API.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn log_fetch<T>(entity: &str, result: &Result<Vec<T>, FetchError>) {
    match result {
        Ok(records) => info!(entity, count = records.len(), "fetched"),
        Err(error) => warn!(entity, %error, "fetch failed"),
    }
}

fn log_write(entity: &str, action: &str, result: &Result<(), MutationError>) {
    match result {
        Ok(()) => info!(entity, action, "write ok"),
        Err(error) => warn!(entity, action, %error, "write failed"),
    }
}

impl marketdesk_tui::AppRuntime for ApiRuntime {
    fn list_buyers(&mut self) -> Result<Vec<Buyer>, FetchError> {
        let result = self.client.list_buyers();
        log_fetch("buyers", &result);
        result
    }

    fn list_sellers(&mut self) -> Result<Vec<Seller>, FetchError> {
        let result = self.client.list_sellers();
        log_fetch("sellers", &result);
        result
    }

    fn list_fields(&mut self) -> Result<Vec<Field>, FetchError> {
        let result = self.client.list_fields();
        log_fetch("fields", &result);
        result
    }

    fn load_party(&mut self, kind: PartyKind, id: &str) -> Result<PartyDraft, FetchError> {
        self.client.get_party_draft(kind, id)
    }

    fn add_party(&mut self, kind: PartyKind, draft: &PartyDraft) -> Result<(), MutationError> {
        let result = self.client.add_party(kind, draft);
        log_write(kind.plural(), "add", &result);
        result
    }

    fn update_party(
        &mut self,
        kind: PartyKind,
        id: &str,
        draft: &PartyDraft,
    ) -> Result<(), MutationError> {
        let result = self.client.update_party(kind, id, draft);
        log_write(kind.plural(), "update", &result);
        result
    }

    fn delete_party(&mut self, kind: PartyKind, id: &str) -> Result<(), MutationError> {
        let result = self.client.delete_party(kind, id);
        log_write(kind.plural(), "delete", &result);
        result
    }

    fn add_field(&mut self, draft: &FieldDraft) -> Result<(), MutationError> {
        let result = self.client.add_field(draft);
        log_write("fields", "add", &result);
        result
    }

    fn update_field(&mut self, field: &Field) -> Result<(), MutationError> {
        let result = self.client.update_field(field);
        log_write("fields", "update", &result);
        result
    }

    fn delete_field(&mut self, id: &FieldId) -> Result<(), MutationError> {
        let result = self.client.delete_field(id);
        log_write("fields", "delete", &result);
        result
    }
}
