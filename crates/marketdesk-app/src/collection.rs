// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::FetchError;
use crate::table::TableRecord;

/// What a finished fetch did to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Replaced { count: usize },
    Failed(FetchError),
}

/// Records fetched from one list endpoint, plus its loading flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCollection<R> {
    records: Vec<R>,
    loading: bool,
}

impl<R> Default for RemoteCollection<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: false,
        }
    }
}

impl<R: TableRecord> RemoteCollection<R> {
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// A success replaces the records wholesale; a failure keeps whatever
    /// was there. Either way the loading flag clears.
    pub fn finish_fetch(&mut self, result: Result<Vec<R>, FetchError>) -> FetchOutcome {
        self.loading = false;
        match result {
            Ok(records) => {
                let count = records.len();
                self.records = records;
                FetchOutcome::Replaced { count }
            }
            Err(error) => FetchOutcome::Failed(error),
        }
    }

    pub fn find(&self, key: &str) -> Option<&R> {
        self.records.iter().find(|record| record.row_key() == key)
    }

    /// Swaps in `record` for the entry with the same key.
    pub fn patch(&mut self, record: R) -> bool {
        match self
            .records
            .iter_mut()
            .find(|existing| existing.row_key() == record.row_key())
        {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.row_key() != key);
        self.records.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchOutcome, RemoteCollection};
    use crate::error::ApiError;
    use crate::ids::FieldId;
    use crate::model::Field;
    use time::OffsetDateTime;

    fn field(id: &str, title: &str) -> Field {
        Field {
            id: FieldId::new(id),
            title: title.to_owned(),
            description: String::new(),
            category: None,
            field_type: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            revision: None,
        }
    }

    fn transport_error() -> ApiError {
        ApiError::Transport {
            url: "http://127.0.0.1:9/fields/get-fields".to_owned(),
            reason: "connection refused".to_owned(),
        }
    }

    #[test]
    fn failed_fetch_keeps_previous_records() {
        let mut collection = RemoteCollection::default();
        collection.begin_fetch();
        let outcome = collection.finish_fetch(Ok(vec![field("f1", "Budget")]));
        assert_eq!(outcome, FetchOutcome::Replaced { count: 1 });

        collection.begin_fetch();
        assert!(collection.is_loading());
        let outcome = collection.finish_fetch(Err(transport_error()));
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert!(!collection.is_loading());
        assert_eq!(collection.records().len(), 1);
    }

    #[test]
    fn first_failure_leaves_collection_empty() {
        let mut collection: RemoteCollection<Field> = RemoteCollection::default();
        collection.begin_fetch();
        collection.finish_fetch(Err(transport_error()));
        assert!(collection.records().is_empty());
        assert!(!collection.is_loading());
    }

    #[test]
    fn patch_and_remove_match_by_key() {
        let mut collection = RemoteCollection::default();
        collection.finish_fetch(Ok(vec![field("f1", "Budget"), field("f2", "Notes")]));

        assert!(collection.patch(field("f2", "Remarks")));
        assert!(!collection.patch(field("f9", "Missing")));
        assert_eq!(collection.find("f2").map(|f| f.title.as_str()), Some("Remarks"));

        assert!(collection.remove("f1"));
        assert!(!collection.remove("f1"));
        let ids: Vec<&str> = collection.records().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f2"]);
    }
}
