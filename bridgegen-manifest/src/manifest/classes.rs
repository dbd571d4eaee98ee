use serde::Deserialize;

/// The `[handler]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Handler {
    /// Class whose public method bodies are generated
    pub class: String,

    /// Name of the out-parameter Thrift uses for aggregate return values
    pub return_argument: String,

    /// Field of the return aggregate that receives the manager's result
    pub retval_field: String,
}

impl Default for Handler {
    fn default() -> Self {
        Self {
            class: "RemoteManagerHandler".into(),
            return_argument: "_return".into(),
            retval_field: "retval".into(),
        }
    }
}

/// The `[manager]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manager {
    /// Library class calls are forwarded to (may be namespace-qualified)
    pub class: String,

    /// Static member returning the singleton instance
    pub singleton_accessor: String,

    /// Local variable holding the singleton in generated bodies
    pub variable: String,

    /// Methods deliberately not exposed over RPC
    pub ignored_methods: Vec<String>,
}

impl Default for Manager {
    fn default() -> Self {
        Self {
            class: "OpenZWave::Manager".into(),
            singleton_accessor: "Get".into(),
            variable: "mgr".into(),
            ignored_methods: [
                "Create",
                "Get",
                "Destroy",
                "GetOptions",
                "AddDriver",
                "RemoveDriver",
                "AddWatcher",
                "RemoveWatcher",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Manager {
    /// Class name without its namespace, as written in generated code.
    pub fn short_name(&self) -> &str {
        self.class.rsplit("::").next().unwrap_or(&self.class)
    }
}
