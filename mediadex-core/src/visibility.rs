//! When a file deletion makes a record disappear from a view.

use mediadex_model::{ServiceKey, ServiceType};
use tracing::debug;

use crate::context::IndexContext;

/// Whether deleting from `deleted_from` drops the file from a view scoped
/// to `view_scope`.
///
/// Three cases remove it:
/// 1. Deleted from the trash while the view shows any local domain, the
///    combined local domain or the trash.
/// 2. Trashed from a non-trash local domain, the view is such a domain too,
///    and trashed files are configured to disappear.
/// 3. Deleted from a remote service and the view is that same service.
pub fn deletion_hides_from_view(
    ctx: &IndexContext,
    deleted_from: ServiceKey,
    view_scope: ServiceKey,
) -> bool {
    let mut non_trash_local = ctx
        .services()
        .service_keys_of_types(&[ServiceType::LocalFileDomain]);
    non_trash_local.insert(ServiceKey::COMBINED_LOCAL_FILE);

    let is_local = |key: &ServiceKey| non_trash_local.contains(key) || *key == ServiceKey::TRASH;

    let purged_from_local_view = deleted_from == ServiceKey::TRASH && is_local(&view_scope);
    let trashed_from_local_view = ctx.options().remove_trashed_files
        && non_trash_local.contains(&deleted_from)
        && non_trash_local.contains(&view_scope);
    let deleted_from_remote_view = !is_local(&deleted_from) && view_scope == deleted_from;

    let hides = purged_from_local_view || trashed_from_local_view || deleted_from_remote_view;
    debug!(
        ?deleted_from,
        ?view_scope,
        purged_from_local_view,
        trashed_from_local_view,
        deleted_from_remote_view,
        "evaluated deletion visibility"
    );
    hides
}
