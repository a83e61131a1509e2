pub mod error;

pub use error::{ClientError, ClientResult, Result, ServiceError, SubmitError};
