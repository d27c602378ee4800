use serde::Serialize;

/// What a successful dispatch did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A process was spawned and ran to completion
    Executed {
        command: String,
        status: Option<i32>,
        /// Combined stdout and stderr
        output: String,
    },
    /// A url was handed to the browser
    Opened { url: String },
}

impl Outcome {
    /// Captured process output, empty for browser opens
    pub fn output(&self) -> &str {
        match self {
            Outcome::Executed { output, .. } => output,
            Outcome::Opened { .. } => "",
        }
    }
}
