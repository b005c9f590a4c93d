// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod audio;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod keymap;
pub mod runtime;
pub mod selector;
pub mod session;
pub mod settings;

pub use catalog::{Catalog, ChordRecord};
pub use engine::SessionEngine;
pub use session::{Action, Phase, Snapshot, Transition};
pub use settings::{Settings, SettingsUpdate};
