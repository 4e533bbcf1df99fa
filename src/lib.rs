//! Display order for task surfaces that survives changes to the data
//! underneath it.
//!
//! An [`OrderEngine`](ops::engine::OrderEngine) keeps a user-chosen order of
//! items per container (a calendar day, a kanban cell, a sidebar folder, a
//! project list), reconciles it against every new snapshot of the
//! authoritative collection, and turns drag gestures into optimistic moves
//! plus container-change requests.

pub mod adapter;
pub mod model;
pub mod ops;

pub mod io {
    pub mod config_io;
    pub mod script;
    pub mod store;
    pub mod watcher;
}

pub mod cli {
    pub mod commands;
    pub mod handlers;
    pub mod output;
}

pub mod util {
    pub mod unicode;
}
