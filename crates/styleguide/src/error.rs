/// Fatal configuration failures. Unlike document problems, these halt the
/// run with a message naming the offending file or identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("circular `extends`: '{uri}' is reached through itself")]
    ExtendsCycle { uri: String },

    #[error("failed to read config '{uri}': {detail}")]
    Fetch { uri: String, detail: String },

    #[error("failed to parse config '{uri}': {detail}")]
    Parse { uri: String, detail: String },

    #[error("unknown preset or config reference '{name}' in `extends`")]
    UnknownExtend { name: String },

    #[error("unknown plugin '{id}'")]
    UnknownPlugin { id: String },

    #[error("Plugin {plugin} doesn't export assertions function with name {function}")]
    MissingAssertionFunction { plugin: String, function: String },

    #[error("unknown assertion predicate '{name}'")]
    UnknownPredicate { name: String },

    #[error("invalid assertion option for '{predicate}': {detail}")]
    InvalidAssertion { predicate: String, detail: String },

    #[error("rule '{id}' is not a built-in rule or an exported plugin rule")]
    UnknownRule { id: String },

    #[error("invalid API root '{root}': {detail}")]
    InvalidApiRoot { root: String, detail: String },
}
