//! # Mediadex Core
//!
//! In-memory media index backing search results, thumbnail grids and
//! collection views.
//!
//! ## Overview
//!
//! - **Records**: per-file metadata with tag, location and rating state per service
//! - **Groups**: ordered singletons and collections scoped to one file service
//! - **Collections**: grouping by namespace or rating with live aggregates
//! - **Sorting**: stable sorts with a configurable fallback for ties
//! - **Updates**: content and service updates applied incrementally, with
//!   deletions removing files only from the views they no longer belong in
//! - **Loading**: chunked, cancellable loading of search results
//!
//! ## Architecture
//!
//! - [`record`]: the [`MediaRecord`] and its sub-states
//! - [`media`]: nodes, groups, collections and the listening [`MediaView`]
//! - [`sorting`]: sort criteria and key extraction
//! - [`index`]: the ordered container everything is kept in
//! - [`loader`]: worker-side query execution
//!
//! ## Example
//!
//! ```no_run
//! use mediadex_core::{IndexContext, MediaRecord, MediaView};
//! use mediadex_core::sorting::{SortOrder, SortSpec, SystemSort};
//! use mediadex_model::{FileHash, FileMetadata, Mime, ServiceKey};
//!
//! let ctx = IndexContext::standalone();
//! let record = MediaRecord::from_file(
//!     FileMetadata::new(FileHash::of_content(b"cat"), Mime::ImageJpeg).with_size(1024),
//! );
//! let mut view = MediaView::with_records(ctx, ServiceKey::LOCAL_FILE, [record]);
//! view.group_mut()
//!     .sort(Some(SortSpec::system(SystemSort::FileSize, SortOrder::Descending)));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod context;
pub mod duplicates;
pub mod error;
pub mod format;
pub mod index;
pub mod loader;
pub mod locations;
pub mod media;
pub mod options;
pub mod ratings;
pub mod record;
pub mod services;
pub mod siblings;
pub mod sorting;
pub mod tags;
pub mod visibility;

pub use context::IndexContext;
pub use error::{IndexError, Result};
pub use locations::LocationState;
pub use media::{MediaCollection, MediaGroup, MediaNode, MediaSingleton, MediaView};
pub use options::{LoaderSettings, MediaShowAction, ViewOptions};
pub use ratings::RatingState;
pub use record::{MediaRecord, SharedRecord};
pub use services::{CachedServiceDirectory, InMemoryServiceDirectory, ServiceDirectory};
pub use siblings::{NoSiblings, SiblingResolver, StaticSiblings};
pub use tags::{StatusesToTags, TagState};
