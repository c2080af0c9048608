use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("Unrecognized value for '{field}': {value}")]
    UnrecognizedConfiguration { field: String, value: String },
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },
    #[error("Unhashable argument at {position}: every hashing strategy declined")]
    UnhashableArgument { position: String },
    #[error("Year {year} is outside the available range {first}..={last}")]
    YearOutOfRange { year: i32, first: i32, last: i32 },
    #[error("Shape mismatch in {context}: {details}")]
    ShapeMismatch { context: String, details: String },
    #[error("Expected exactly one included custom adoption source named '{name}', found {matches}")]
    CustomAdoptionMatch { name: String, matches: usize },
    #[error("No data source matches '{selector}' for region {region}")]
    MissingDataSource { selector: String, region: String },
    #[error("Input '{variable}' required by stage '{stage}' is neither produced by a stage nor supplied exogenously")]
    MissingInput { variable: String, stage: String },
    #[error("Variable '{variable}' is produced by both '{first}' and '{second}'")]
    DuplicateProducer {
        variable: String,
        first: String,
        second: String,
    },
    #[error("Variable '{variable}' is declared as '{producer_unit}' by '{producer}' but '{consumer_unit}' by '{consumer}'")]
    UnitMismatch {
        variable: String,
        producer: String,
        producer_unit: String,
        consumer: String,
        consumer_unit: String,
    },
    #[error("Stage dependencies form a cycle")]
    CyclicDependency,
    #[error("No value stored for variable '{0}'")]
    MissingVariable(String),
    #[error("Variable '{variable}' holds a {found}, expected a {expected}")]
    WrongStateType {
        variable: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed table '{path}': {details}")]
    Csv { path: String, details: String },
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl ModelError {
    pub fn unrecognized(field: &str, value: impl ToString) -> Self {
        ModelError::UnrecognizedConfiguration {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl ToString) -> Self {
        ModelError::InvalidParameter {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience type for `Result<T, ModelError>`.
pub type ModelResult<T> = Result<T, ModelError>;
