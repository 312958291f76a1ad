//! Resource tree reconciliation

use super::api::{ProvisioningApi, Resource};
use super::ProvisionError;
use std::collections::HashMap;

/// Split `/a/{b}/c` into `["a", "{b}", "c"]`. `/` yields no segments.
pub fn split_path(path: &str) -> Result<Vec<&str>, ProvisionError> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(ProvisionError::InvalidPath(path.to_string()));
    };
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(ProvisionError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Make sure every segment of `path` exists and return the id of the last one.
///
/// The existing tree is listed once and indexed by full path. Segments are
/// then walked left to right; missing ones are created under their parent and
/// added to the index, so a child is never created before its parent. Path
/// variables such as `{spaceId}` are ordinary path parts here.
pub async fn ensure_path(
    api: &dyn ProvisioningApi,
    rest_api_id: &str,
    path: &str,
) -> Result<String, ProvisionError> {
    let segments = split_path(path)?;

    let mut existing: HashMap<String, Resource> = api
        .list_resources(rest_api_id)
        .await?
        .into_iter()
        .map(|resource| (resource.path.clone(), resource))
        .collect();

    for (i, path_part) in segments.iter().enumerate() {
        let sub_path = format!("/{}", segments[..=i].join("/"));
        let parent_path = format!("/{}", segments[..i].join("/"));

        let Some(parent) = existing.get(&parent_path) else {
            return Err(ProvisionError::MissingParent {
                parent: parent_path,
                path: sub_path,
            });
        };

        if existing.contains_key(&sub_path) {
            tracing::debug!("Resource {} already exists", sub_path);
            continue;
        }

        let parent_id = parent.id.clone();
        let created = api
            .create_resource(rest_api_id, &parent_id, path_part)
            .await?;
        tracing::info!("Created resource {} ({})", created.path, created.id);
        existing.insert(created.path.clone(), created);
    }

    existing
        .get(path)
        .map(|resource| resource.id.clone())
        .ok_or_else(|| ProvisionError::Unresolved(path.to_string()))
}
