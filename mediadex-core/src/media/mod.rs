//! Media nodes and the containers that order, group and update them.

mod collect;
mod collection;
mod filter;
mod group;
mod node;
mod view;

pub use collect::{CollectBy, CollectEntry, CollectKey};
pub use collection::MediaCollection;
pub use filter::{Discriminant, HashFilter, ResultFilter};
pub use group::{MediaGroup, MediaResults};
pub use node::{MediaNode, MediaSingleton};
pub use view::MediaView;
