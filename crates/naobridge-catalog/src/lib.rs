//! Command catalog: maps game message keys to robot speech, audio and
//! gesture commands, keyed by study condition and gesture style.

pub mod catalog;
pub mod condition;
pub mod session;

pub use catalog::{AudioEntry, Catalog, GestureEntry, GestureScope, SpeechEntry};
pub use condition::{Condition, GestureStyle};
pub use session::SessionContext;
