//! Response Envelope
//!
//! Uniform `{result, status, data, errors}` wrapper returned by every
//! hierarchy operation.

use serde::{Serialize, Serializer};

/// HTTP-style status code carried by an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    Conflict,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::Conflict => 409,
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

/// Overall outcome, derived from the presence of errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope<T> {
    pub result: Outcome,
    pub status: Status,
    pub data: Option<T>,
    pub errors: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    /// `result` is `failure` iff `errors` is present.
    pub fn new(status: Status, data: Option<T>, errors: Option<String>) -> Self {
        let result = if errors.is_some() {
            Outcome::Failure
        } else {
            Outcome::Success
        };
        Self {
            result,
            status,
            data,
            errors,
        }
    }

    pub fn success(status: Status, data: T) -> Self {
        Self::new(status, Some(data), None)
    }

    pub fn empty(status: Status) -> Self {
        Self::new(status, None, None)
    }

    pub fn failure(status: Status, errors: impl Into<String>) -> Self {
        Self::new(status, None, Some(errors.into()))
    }

    pub fn is_success(&self) -> bool {
        self.result == Outcome::Success
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
