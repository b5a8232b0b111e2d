//! External collaborator interfaces and their default implementations.
//!
//! The blob store and Discord notifier are collaborator boundaries: the
//! engine only depends on the traits here. Transcript rendering is a pure
//! local service.

pub mod blob;
pub mod notifier;
pub mod transcript;
