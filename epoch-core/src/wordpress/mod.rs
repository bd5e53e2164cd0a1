//! WordPress REST client and payload types.

mod categories;
mod client;
mod editor;
mod types;

pub use categories::CategoryIndex;
pub use client::WordPressClient;
pub use editor::{Media, NewPost, PostChanges, PostStatus};
pub(crate) use client::fetch_list;
pub use types::{
    Category, Embedded, EmbeddedAuthor, EmbeddedMedia, PostQuery, RawPost, Rendered, Term,
};
