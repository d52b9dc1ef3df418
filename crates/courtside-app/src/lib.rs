// Application layer: the persisted document, its storage, the debounced
// writer, preset seeding and the session loop a front end talks to.

pub mod preset;
pub mod protocol;
pub mod saver;
pub mod session;
pub mod state;
pub mod store;

pub use protocol::{UiUpdate, UserCommand};
pub use state::{AppData, PredictField, StateError};
pub use store::{SqliteStateStore, StateStore};
