use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_runtime::{Options, ReactiveObject, Value, ViewModel};

use crate::error::{CliError, Result};

fn default_el() -> String {
    "#app".to_string()
}

/// JSON app file: the declarative stand-in for a view model's options.
///
/// ```json
/// {
///   "el": "#app",
///   "data": { "msg": "hi" },
///   "methods": { "reset": [{ "op": "clear", "key": "msg" }] },
///   "mounted": [{ "op": "set", "key": "msg", "value": "ready" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_el")]
    pub el: String,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub methods: BTreeMap<String, Vec<Action>>,
    pub mounted: Vec<Action>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            el: default_el(),
            data: serde_json::Map::new(),
            methods: BTreeMap::new(),
            mounted: Vec::new(),
        }
    }
}

/// One scripted step of a method or the mounted hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// Write a JSON value to a key.
    Set {
        key: String,
        value: serde_json::Value,
    },
    /// Write the current value of `from` to `to`.
    Copy { from: String, to: String },
    /// Write the empty string to a key.
    Clear { key: String },
}

impl Action {
    pub fn apply(&self, vm: &ViewModel) -> tether_runtime::Result<()> {
        match self {
            Action::Set { key, value } => vm.set(key, Value::from(value.clone())),
            Action::Copy { from, to } => vm.set(to, vm.get(from)),
            Action::Clear { key } => vm.set(key, ""),
        }
    }
}

fn apply_all(actions: &[Action], vm: &ViewModel) -> tether_runtime::Result<()> {
    actions.iter().try_for_each(|action| action.apply(vm))
}

impl AppConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str::<Self>(&content)?)
    }

    /// The data object, as a fresh (not yet instrumented) reactive object.
    #[must_use]
    pub fn data_object(&self) -> ReactiveObject {
        self.data
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value.clone())))
            .collect()
    }

    /// View model options with scripted methods and mounted hook.
    #[must_use]
    pub fn to_options(&self) -> Options {
        let mut options = Options::new().el(self.el.clone()).data(self.data_object());
        for (name, actions) in &self.methods {
            let actions = actions.clone();
            options = options.method(name.clone(), move |vm, _event| apply_all(&actions, vm));
        }
        if !self.mounted.is_empty() {
            let actions = self.mounted.clone();
            options = options.mounted(move |vm| apply_all(&actions, vm));
        }
        options
    }
}
