// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// Failure of a single request against the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("cannot reach {url}: {reason}")]
    Transport { url: String, reason: String },
    #[error("server returned {code}{}", status_suffix(.message))]
    Status { code: u16, message: Option<String> },
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

fn status_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl ApiError {
    /// Server-provided text when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_owned(),
        }
    }
}

/// A failed read. The collection stays as it was.
pub type FetchError = ApiError;

/// A failed add, update, or delete. Local state is left untouched.
pub type MutationError = ApiError;
