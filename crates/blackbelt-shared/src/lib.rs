//! Quest data layer shared by the terminal and browser front ends.
//!
//! Everything in this crate is free of I/O: persistence goes through the
//! [`KeyValueStorage`] trait, which each front end implements for its own
//! backend.

pub mod belt;
pub mod error;
pub mod presentation;
pub mod quest;
pub mod storage;
pub mod store;

pub use belt::{BELTS, Belt, BeltLabel, belt_index};
pub use error::{QuestError, StorageError};
pub use presentation::{AddButtonPlacement, DuplicateNotice};
pub use quest::{Quest, QuestStatus, StatusFilter, normalize_name};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use store::{NameMatch, QuestStore, TASKS_KEY, VISITED_KEY};
