//! Application state container shared across Axum route handlers and services.
//!
//! This struct holds shared resources such as the database connection and the
//! realtime event broker. It is cheap to clone and passed into route handlers
//! via Axum's `State<T>` extractor.

use crate::events::EventBroker;
use sea_orm::DatabaseConnection;

/// Central application state shared across the server.
///
/// This includes:
/// - A cloned, thread-safe database connection for use with SeaORM.
/// - The `EventBroker` that fans lifecycle events out to live subscribers.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    events: EventBroker,
}

impl AppState {
    /// Creates a new `AppState` with the given database connection and event broker.
    pub fn new(db: DatabaseConnection, events: EventBroker) -> Self {
        Self { db, events }
    }

    /// Returns a shared reference to the internal `DatabaseConnection`.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns a shared reference to the internal `EventBroker`.
    pub fn events(&self) -> &EventBroker {
        &self.events
    }

    /// Returns a cloned copy of the database connection.
    ///
    /// Useful for async contexts or spawning tasks that require ownership.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Returns a cloned instance of the `EventBroker`.
    pub fn events_clone(&self) -> EventBroker {
        self.events.clone()
    }
}
