//! Client-side form pipeline: synchronous rules, the debounced remote name
//! check, the Thing form that gates saving on both, and the list screen model.

pub mod controller;
pub mod list;
pub mod rules;
pub mod validator;

pub use controller::ThingForm;
pub use list::ThingList;
pub use rules::FieldMessage;
pub use validator::{AsyncFieldValidator, CheckPhase, FieldCheck, FieldVerdict};
