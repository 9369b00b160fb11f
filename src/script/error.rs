use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{origin}: {}", errors.join("; "))]
    Parse { origin: String, errors: Vec<String> },

    #[error("interrupted")]
    Interrupted,

    #[error("{0} is not supported")]
    Unsupported(String),

    #[error("function nesting deeper than {0} calls")]
    TooDeep(usize),
}
