//! Operations on the user's files collection.

mod favorite;
mod mkcol;
mod read;
mod search;

pub use favorite::ToggleFavorite;
pub use mkcol::{CreateFolder, E2E_TOKEN};
pub use read::{CountChildren, ReadFile, ReadFolder};
pub use search::Search;
