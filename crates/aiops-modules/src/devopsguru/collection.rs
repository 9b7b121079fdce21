//! Resource collection membership deltas
//!
//! `UpdateResourceCollection` takes an ADD or REMOVE action together with
//! the entries to add or remove, never the full desired collection. The
//! planners compare desired membership with the live collection and
//! return the smallest delta, or `None` when nothing changes.

use serde::Serialize;

use super::types::{CloudFormationCollection, CollectionAction, ResourceCollection, TagCollection};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CollectionUpdate {
    pub action: CollectionAction,
    pub resource_collection: ResourceCollection,
}

impl CollectionUpdate {
    fn new(action: CollectionAction, resource_collection: ResourceCollection) -> Self {
        Self {
            action,
            resource_collection,
        }
    }
}

/// Plan a CloudFormation stack membership change
///
/// Present adds the missing stack names. Absent removes the named stacks
/// that are live; an empty list removes every live stack.
pub fn plan_stack_update(live: &ResourceCollection, desired: &[String], present: bool) -> Option<CollectionUpdate> {
    let live_stacks = live.stack_names();

    let (action, names): (_, Vec<String>) = if present {
        let missing = desired
            .iter()
            .filter(|name| !live_stacks.contains(name))
            .fold(Vec::new(), push_unique);
        (CollectionAction::Add, missing)
    } else if desired.is_empty() {
        (CollectionAction::Remove, live_stacks.to_vec())
    } else {
        let live_named = desired
            .iter()
            .filter(|name| live_stacks.contains(name))
            .fold(Vec::new(), push_unique);
        (CollectionAction::Remove, live_named)
    };

    if names.is_empty() {
        return None;
    }
    Some(CollectionUpdate::new(action, ResourceCollection::stacks(names)))
}

/// Plan a tag-based membership change
///
/// Present adds the tag values missing under each key. Absent removes the
/// named values that are live; an empty `tag_values` removes every live
/// value of that key, and an empty list removes every live tag.
pub fn plan_tag_update(live: &ResourceCollection, desired: &[TagCollection], present: bool) -> Option<CollectionUpdate> {
    let live_tags = live.tag_list();

    let (action, tags) = if present {
        let tags = desired
            .iter()
            .map(|tag| {
                let current = live_values(live_tags, &tag.app_boundary_key);
                let missing = tag
                    .tag_values
                    .iter()
                    .filter(|value| !current.contains(value))
                    .fold(Vec::new(), push_unique);
                TagCollection {
                    app_boundary_key: tag.app_boundary_key.clone(),
                    tag_values: missing,
                }
            })
            .collect::<Vec<_>>();
        (CollectionAction::Add, tags)
    } else if desired.is_empty() {
        (CollectionAction::Remove, live_tags.to_vec())
    } else {
        let tags = desired
            .iter()
            .map(|tag| {
                let current = live_values(live_tags, &tag.app_boundary_key);
                let values = if tag.tag_values.is_empty() {
                    current.to_vec()
                } else {
                    tag.tag_values
                        .iter()
                        .filter(|value| current.contains(value))
                        .fold(Vec::new(), push_unique)
                };
                TagCollection {
                    app_boundary_key: tag.app_boundary_key.clone(),
                    tag_values: values,
                }
            })
            .collect::<Vec<_>>();
        (CollectionAction::Remove, tags)
    };

    let tags: Vec<_> = tags.into_iter().filter(|tag| !tag.tag_values.is_empty()).collect();
    if tags.is_empty() {
        return None;
    }
    Some(CollectionUpdate::new(action, ResourceCollection::tags(tags)))
}

/// Tag list after applying `changes` with `action`
pub fn update_tags(current: &[TagCollection], changes: &[TagCollection], action: CollectionAction) -> Vec<TagCollection> {
    let mut updated = current.to_vec();

    for change in changes {
        let position = updated
            .iter()
            .position(|tag| tag.app_boundary_key == change.app_boundary_key);

        match (action, position) {
            (CollectionAction::Add, Some(i)) => {
                for value in &change.tag_values {
                    if !updated[i].tag_values.contains(value) {
                        updated[i].tag_values.push(value.clone());
                    }
                }
            }
            (CollectionAction::Add, None) => updated.push(change.clone()),
            (CollectionAction::Remove, Some(i)) => {
                updated[i].tag_values.retain(|value| !change.tag_values.contains(value));
                if updated[i].tag_values.is_empty() {
                    updated.remove(i);
                }
            }
            (CollectionAction::Remove, None) => {}
        }
    }

    updated
}

/// Collection the service will report once `update` is applied
pub fn apply_update(live: &ResourceCollection, update: &CollectionUpdate) -> ResourceCollection {
    let mut result = live.clone();
    let changes = &update.resource_collection;

    if changes.cloud_formation.is_some() {
        let mut stacks = live.stack_names().to_vec();
        match update.action {
            CollectionAction::Add => {
                for name in changes.stack_names() {
                    if !stacks.contains(name) {
                        stacks.push(name.clone());
                    }
                }
            }
            CollectionAction::Remove => stacks.retain(|name| !changes.stack_names().contains(name)),
        }
        result.cloud_formation = Some(CloudFormationCollection { stack_names: stacks });
    }

    if changes.tags.is_some() {
        result.tags = Some(update_tags(live.tag_list(), changes.tag_list(), update.action));
    }

    result
}

fn live_values<'a>(tags: &'a [TagCollection], key: &str) -> &'a [String] {
    tags.iter()
        .find(|tag| tag.app_boundary_key == key)
        .map(|tag| tag.tag_values.as_slice())
        .unwrap_or_default()
}

fn push_unique(mut acc: Vec<String>, value: &String) -> Vec<String> {
    if !acc.contains(value) {
        acc.push(value.clone());
    }
    acc
}
