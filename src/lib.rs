pub mod cli;
pub mod config;
pub mod journal;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod preferences;
pub mod session;
pub mod store;
pub mod tui;
pub mod utils;
pub mod view;

pub use config::Config;
pub use journal::{IndexTarget, Journal};
pub use lifecycle::Transition;
pub use models::{DatedEntry, Entry, EntryKind, Scope};
pub use preferences::Preferences;
pub use session::Session;
pub use store::{DayStore, FsStore};
pub use utils::Profile;
pub use view::Filters;
