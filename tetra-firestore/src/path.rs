//! Slash-separated resource paths.

use tetra_core::Status;

fn segments(path: &str) -> Result<Vec<&str>, Status> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(Status::invalid_argument(format!(
            "path {path:?} has an empty segment"
        )));
    }
    Ok(parts)
}

/// Checks a document path: `collection/id`, possibly nested.
pub(crate) fn document(path: &str) -> Result<(), Status> {
    if segments(path)?.len() % 2 != 0 {
        return Err(Status::invalid_argument(format!(
            "{path:?} is not a document path"
        )));
    }
    Ok(())
}

/// Checks a collection path: `collection`, or `collection/id/sub`.
pub(crate) fn collection(path: &str) -> Result<(), Status> {
    if segments(path)?.len() % 2 != 1 {
        return Err(Status::invalid_argument(format!(
            "{path:?} is not a collection path"
        )));
    }
    Ok(())
}

/// The collection a document path belongs to.
pub(crate) fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// The last segment of a path.
pub(crate) fn id(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, id)| id)
}
