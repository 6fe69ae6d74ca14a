use std::fmt;

#[derive(Debug)]
pub enum AppError {
    InvalidSnapshotPair(String),
    UnknownConnectorType(String),
    ConnectorDispatchFailure(String),
    Throw(String),
    InternalServerError(anyhow::Error),
}

impl AppError {
    pub fn invalid_snapshot_pair<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::InvalidSnapshotPair(t.to_string())
    }

    pub fn unknown_connector_type<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::UnknownConnectorType(t.to_string())
    }

    pub fn connector_dispatch_failure<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::ConnectorDispatchFailure(t.to_string())
    }

    pub fn throw<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::Throw(t.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidSnapshotPair(err) => write!(f, "invalid snapshot pair: {err}"),
            AppError::UnknownConnectorType(err) => write!(f, "unknown connector type: {err}"),
            AppError::ConnectorDispatchFailure(err) => {
                write!(f, "connector dispatch failure: {err}")
            }
            AppError::Throw(err) => write!(f, "{err}"),
            AppError::InternalServerError(err) => write!(f, "{err:#}"),
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::InternalServerError(err.into())
    }
}
