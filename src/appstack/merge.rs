// ABOUTME: Merging application manifests into appstack application properties.
// ABOUTME: Values declared in the appstack always win over manifest values.

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use super::app::{AppConfig, NAME_KEY};
use super::AppStack;

/// Manifest properties keyed by artifact name.
pub type Manifests = BTreeMap<String, Mapping>;

/// Merge an application's manifest into its appstack properties.
///
/// Per key:
/// - mappings on both sides merge one level down, appstack entries winning;
/// - sequences on both sides are joined (manifest first) without duplicates;
/// - a key only the manifest sets (or the appstack leaves empty) is adopted as is;
/// - anything else keeps the appstack value.
///
/// `name` defaults to the application name when neither side sets it.
pub fn merge_manifest(app: &AppConfig, manifest: &Mapping) -> AppConfig {
    let mut merged = app.clone();
    let properties = &mut merged.app_properties;

    for (key, manifest_value) in manifest {
        let merged_value = match (manifest_value, properties.get(key)) {
            (Value::Mapping(from_manifest), Some(Value::Mapping(from_stack))) => {
                let mut map = from_manifest.clone();
                for (k, v) in from_stack {
                    map.insert(k.clone(), v.clone());
                }
                Value::Mapping(map)
            }
            (Value::Sequence(from_manifest), Some(Value::Sequence(from_stack))) => {
                let mut items: Vec<Value> = Vec::with_capacity(from_manifest.len() + from_stack.len());
                for item in from_manifest.iter().chain(from_stack) {
                    if !items.contains(item) {
                        items.push(item.clone());
                    }
                }
                Value::Sequence(items)
            }
            (_, None | Some(Value::Null)) => manifest_value.clone(),
            (_, Some(from_stack)) => {
                if std::mem::discriminant(from_stack) != std::mem::discriminant(manifest_value) {
                    tracing::warn!(
                        app = %app.name,
                        key = ?key,
                        "manifest value type differs from appstack, keeping appstack value"
                    );
                }
                continue;
            }
        };
        properties.insert(key.clone(), merged_value);
    }

    if !properties.contains_key(NAME_KEY) {
        properties.insert(NAME_KEY.into(), app.name.as_str().into());
    }

    merged
}

impl AppStack {
    /// Merge artifact manifests into every application, producing a new stack.
    ///
    /// Applications whose artifact has no manifest merge against an empty one,
    /// which still fills in the default `name` property.
    pub fn merge_manifests(&self, manifests: &Manifests) -> AppStack {
        tracing::info!("merging application manifests into appstack");
        let empty = Mapping::new();

        let apps = self
            .apps
            .iter()
            .map(|app| {
                let manifest = manifests.get(&app.artifact_name).unwrap_or_else(|| {
                    tracing::debug!(artifact = %app.artifact_name, "artifact has no manifest");
                    &empty
                });
                tracing::debug!(
                    artifact = %app.artifact_name,
                    app = %app.name,
                    "merging manifest"
                );
                merge_manifest(app, manifest)
            })
            .collect();

        AppStack {
            apps,
            ..self.clone()
        }
    }
}
