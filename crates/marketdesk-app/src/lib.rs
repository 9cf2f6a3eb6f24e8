// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod actions;
pub mod collection;
pub mod dialogs;
pub mod error;
pub mod forms;
pub mod ids;
pub mod model;
pub mod requests;
pub mod screen;
pub mod state;
pub mod table;
pub mod validation;

pub use actions::*;
pub use collection::*;
pub use dialogs::*;
pub use error::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use requests::*;
pub use screen::*;
pub use state::*;
pub use table::*;
pub use validation::*;
