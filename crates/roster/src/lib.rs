//! The roster of guests a batch personalizes for.

pub mod error;
pub mod list;

pub use error::NameListError;
pub use list::{NameEntry, NameList};
