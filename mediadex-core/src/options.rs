//! User-facing knobs that change how views behave.

use std::collections::HashMap;

use mediadex_model::Mime;
use serde::{Deserialize, Serialize};

use crate::sorting::{SortOrder, SortSpec, SortType, SystemSort};

/// What activating a file of a given mime should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaShowAction {
    #[default]
    ShowInViewer,
    OpenExternally,
    DoNotShow,
}

impl MediaShowAction {
    pub fn is_viewable(&self) -> bool {
        matches!(self, MediaShowAction::ShowInViewer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Trashing a file also drops it from other local views.
    pub remove_trashed_files: bool,
    /// Applied before the view's own sort so ties have a stable order.
    pub fallback_sort: SortSpec,
    pub default_sort: SortSpec,
    pub media_show_actions: HashMap<Mime, MediaShowAction>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            remove_trashed_files: false,
            fallback_sort: SortSpec::new(
                SortType::System(SystemSort::ImportTime),
                SortOrder::Ascending,
            ),
            default_sort: SortSpec::new(
                SortType::System(SystemSort::FileSize),
                SortOrder::Ascending,
            ),
            media_show_actions: HashMap::from([
                (Mime::ApplicationPdf, MediaShowAction::OpenExternally),
                (Mime::ApplicationZip, MediaShowAction::DoNotShow),
            ]),
        }
    }
}

impl ViewOptions {
    pub fn media_show_action(&self, mime: Mime) -> MediaShowAction {
        self.media_show_actions.get(&mime).copied().unwrap_or_default()
    }
}

/// How a search result is pulled from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    pub chunk_size: usize,
    pub shuffle: bool,
    pub limit: Option<usize>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            shuffle: true,
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ViewOptions::default();
        assert!(!options.remove_trashed_files);
        assert_eq!(options.media_show_action(Mime::ImagePng), MediaShowAction::ShowInViewer);
        assert!(!options.media_show_action(Mime::ApplicationZip).is_viewable());
        assert_eq!(LoaderSettings::default().chunk_size, 256);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let options: ViewOptions =
            serde_json::from_str(r#"{"remove_trashed_files": true}"#).unwrap();
        assert!(options.remove_trashed_files);
        assert_eq!(options.default_sort, ViewOptions::default().default_sort);
    }
}
