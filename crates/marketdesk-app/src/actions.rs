// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-row action menu.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

impl RowAction {
    pub const ALL: [Self; 2] = [Self::Edit, Self::Delete];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Delete => "Delete",
        }
    }
}

/// What choosing a row action asks the owning screen to do. Neither intent
/// touches the network directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIntent {
    Edit { key: String },
    ConfirmDelete { key: String, name: String },
}

pub fn dispatch_row_action(action: RowAction, key: &str, name: &str) -> RowIntent {
    match action {
        RowAction::Edit => RowIntent::Edit {
            key: key.to_owned(),
        },
        RowAction::Delete => RowIntent::ConfirmDelete {
            key: key.to_owned(),
            name: name.to_owned(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuInput {
    Up,
    Down,
    Choose,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Open,
    Closed,
    Chosen(RowIntent),
}

/// Open action menu for one row. While it is open it consumes every input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActionMenu {
    pub row_key: String,
    pub row_name: String,
    cursor: usize,
}

impl RowActionMenu {
    pub fn open(row_key: impl Into<String>, row_name: impl Into<String>) -> Self {
        Self {
            row_key: row_key.into(),
            row_name: row_name.into(),
            cursor: 0,
        }
    }

    pub fn highlighted(&self) -> RowAction {
        RowAction::ALL[self.cursor.min(RowAction::ALL.len() - 1)]
    }

    pub fn handle(&mut self, input: MenuInput) -> MenuOutcome {
        match input {
            MenuInput::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                MenuOutcome::Open
            }
            MenuInput::Down => {
                self.cursor = (self.cursor + 1).min(RowAction::ALL.len() - 1);
                MenuOutcome::Open
            }
            MenuInput::Choose => MenuOutcome::Chosen(dispatch_row_action(
                self.highlighted(),
                &self.row_key,
                &self.row_name,
            )),
            MenuInput::Close => MenuOutcome::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MenuInput, MenuOutcome, RowAction, RowActionMenu, RowIntent};

    #[test]
    fn menu_offers_exactly_edit_and_delete() {
        assert_eq!(RowAction::ALL, [RowAction::Edit, RowAction::Delete]);
    }

    #[test]
    fn choosing_delete_asks_for_confirmation() {
        let mut menu = RowActionMenu::open("b7", "Ada");
        assert_eq!(menu.highlighted(), RowAction::Edit);
        assert_eq!(menu.handle(MenuInput::Down), MenuOutcome::Open);
        assert_eq!(menu.handle(MenuInput::Down), MenuOutcome::Open);
        assert_eq!(
            menu.handle(MenuInput::Choose),
            MenuOutcome::Chosen(RowIntent::ConfirmDelete {
                key: "b7".to_owned(),
                name: "Ada".to_owned(),
            })
        );
    }

    #[test]
    fn choosing_edit_targets_the_row_key() {
        let mut menu = RowActionMenu::open("f1", "Budget");
        menu.handle(MenuInput::Up);
        assert_eq!(
            menu.handle(MenuInput::Choose),
            MenuOutcome::Chosen(RowIntent::Edit {
                key: "f1".to_owned()
            })
        );
        assert_eq!(menu.handle(MenuInput::Close), MenuOutcome::Closed);
    }
}
