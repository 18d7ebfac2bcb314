pub mod support_api;

pub use support_api::{CreateOutcome, SupportApi, ValidationErrors};
