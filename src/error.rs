use thiserror::Error;

pub type Result<T> = std::result::Result<T, GroupingError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupingError {
    /// A student attribute that is not one of the accepted codes.
    #[error("Invalid gender {value:?}: please provide gender as 'm' or 'f'")]
    InvalidAttribute { value: String },

    #[error("Unknown student: {0}")]
    UnknownStudent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Could not form valid groups after {attempts} attempt(s): {reason}")]
    UnsatisfiableComposition { attempts: usize, reason: String },

    #[error("Duplicate student id in roster: {0}")]
    DuplicateStudent(String),

    #[error("Malformed roster line {line}: {reason}")]
    MalformedRoster { line: usize, reason: String },
}
