use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidRule,
    ConfigDuplicateSymbol,

    ValidationInvalidArgument,

    ManifestConsistency,
    FileWriteFailed,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidRule => "config.invalid_rule",
            ErrorCode::ConfigDuplicateSymbol => "config.duplicate_symbol",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::ManifestConsistency => "manifest.consistency",
            ErrorCode::FileWriteFailed => "file.write_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRuleDetails {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSymbolDetails {
    pub symbol: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyDetails {
    pub path: String,
    pub line_number: usize,
    pub expected: String,
    pub found: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileWriteDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn config_invalid_rule(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let details = serde_json::to_value(InvalidRuleDetails {
            symbol: symbol.clone(),
            error: error.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidRule,
            format!("Rename rule '{}' did not compile", symbol),
            details,
        )
    }

    pub fn config_duplicate_symbol(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let details = serde_json::to_value(DuplicateSymbolDetails {
            symbol: symbol.clone(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigDuplicateSymbol,
            format!("Rename table lists '{}' more than once", symbol),
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let problem = problem.into();
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.clone(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::ValidationInvalidArgument, problem, details)
    }

    pub fn manifest_consistency(
        path: impl Into<String>,
        line_number: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let details = serde_json::to_value(ConsistencyDetails {
            path: path.clone(),
            line_number,
            expected: expected.into(),
            found: found.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ManifestConsistency,
            format!(
                "Manifest line {} in {} changed since scanning; file left untouched",
                line_number, path
            ),
            details,
        )
    }

    pub fn file_write(path: impl Into<String>, error: &std::io::Error) -> Self {
        let path = path.into();
        let message = if error.kind() == std::io::ErrorKind::PermissionDenied {
            format!(
                "Unable to update file due to permission error {}: {}",
                path, error
            )
        } else {
            format!("Unable to update file {}: {}", path, error)
        };
        let details = serde_json::to_value(FileWriteDetails {
            path,
            error: error.to_string(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::FileWriteFailed, message, details)
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalIoErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": error.into(),
            "context": context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
