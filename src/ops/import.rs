use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::model::task::Task;
use crate::ops::store::TaskStore;

/// Browser storage keys of a local-storage export
pub const BRAIN_DUMP_KEY: &str = "mindflow_brainDump";
pub const PROJECTS_KEY: &str = "mindflow_projects";
pub const PROJECT_ORDER_KEY: &str = "mindflow_projectOrder";
pub const NOW_LIST_KEY: &str = "mindflow_nowList";
pub const NOTES_KEY: &str = "mindflow_notes";

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not parse import file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("import file must be a JSON object of storage keys")]
    NotAnObject,
    #[error("could not decode {key}: {source}")]
    Field {
        key: String,
        source: serde_json::Error,
    },
}

/// Build a store from a local-storage export.
///
/// Each key may hold the serialized string local storage keeps, or the
/// decoded value itself. Missing keys load empty. Projects follow the
/// stored order first, then any remaining projects in object order; empty
/// projects are dropped.
pub fn import_local_storage(json: &str) -> Result<TaskStore, ImportError> {
    let root: Value = serde_json::from_str(json)?;
    let Value::Object(obj) = root else {
        return Err(ImportError::NotAnObject);
    };

    let inbox: Vec<Task> = field(&obj, BRAIN_DUMP_KEY)?;
    let mut projects: IndexMap<String, Vec<Task>> = field(&obj, PROJECTS_KEY)?;
    let order: Vec<String> = field(&obj, PROJECT_ORDER_KEY)?;
    let now: Vec<Task> = field(&obj, NOW_LIST_KEY)?;
    let notes: String = field(&obj, NOTES_KEY)?;

    let mut ordered = IndexMap::with_capacity(projects.len());
    for name in order {
        if let Some(tasks) = projects.shift_remove(&name) {
            ordered.insert(name, tasks);
        }
    }
    ordered.extend(projects);

    Ok(TaskStore::from_parts(inbox, ordered, now, notes))
}

fn field<T: DeserializeOwned + Default>(obj: &Map<String, Value>, key: &str) -> Result<T, ImportError> {
    let decoded = match obj.get(key) {
        None | Some(Value::Null) => return Ok(T::default()),
        // Local storage holds JSON text; a plain string is also accepted
        // for string-valued keys such as the notes.
        Some(Value::String(raw)) => serde_json::from_str(raw)
            .or_else(|_| serde_json::from_value(Value::String(raw.clone()))),
        Some(value) => serde_json::from_value(value.clone()),
    };
    decoded.map_err(|e| ImportError::Field {
        key: key.to_string(),
        source: e,
    })
}
