use super::rules::{self, FieldMessage};
use super::validator::{AsyncFieldValidator, FieldCheck, FieldVerdict};
use crate::client::ThingApi;
use crate::config::ValidatorConfig;
use crate::core::{ClientResult, SubmitError};
use crate::model::Thing;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name uniqueness as seen from one Thing: the form's own id rides along so
/// the server can exclude the Thing's own row.
struct NameUniqueCheck {
    api: Arc<dyn ThingApi>,
    id: i32,
}

#[async_trait]
impl FieldCheck<String> for NameUniqueCheck {
    async fn check(&self, name: String) -> ClientResult<bool> {
        let probe = Thing {
            id: self.id,
            name,
            description: String::new(),
        };
        self.api.check_name_unique(&probe).await
    }
}

/// Edit form for one Thing.
///
/// The name field runs the synchronous rules on every edit and, when they
/// pass, feeds the value to a remote uniqueness check. The form is
/// submittable only while the rules pass and the check has resolved valid for
/// the current name.
pub struct ThingForm {
    id: i32,
    name: String,
    description: String,
    name_check: AsyncFieldValidator<String>,
    api: Arc<dyn ThingApi>,
    error: Option<SubmitError>,
}

impl ThingForm {
    /// Opens a form on `thing`. A non-empty name is checked right away, without
    /// waiting for the debounce window.
    pub fn open(thing: Thing, api: Arc<dyn ThingApi>, config: &ValidatorConfig) -> Self {
        let check: Arc<dyn FieldCheck<String>> = Arc::new(NameUniqueCheck {
            api: Arc::clone(&api),
            id: thing.id,
        });
        let mut name_check = AsyncFieldValidator::new(check, config);
        if rules::apply(rules::NAME_RULES, &thing.name).is_empty() {
            name_check.check_now(thing.name.clone());
        }

        Self {
            id: thing.id,
            name: thing.name,
            description: thing.description,
            name_check,
            api,
            error: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        if rules::apply(rules::NAME_RULES, &self.name).is_empty() {
            self.name_check.edit(self.name.clone());
        } else {
            self.name_check.reset();
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_new(&self) -> bool {
        self.id <= 0
    }

    /// Current field values as a Thing.
    pub fn value(&self) -> Thing {
        Thing {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    pub fn name_verdict(&self) -> FieldVerdict {
        self.name_check.verdict(&self.name)
    }

    pub fn name_validator(&self) -> &AsyncFieldValidator<String> {
        &self.name_check
    }

    /// Messages to show under the name field. Empty while a check is pending.
    pub fn name_messages(&self) -> Vec<FieldMessage> {
        let mut messages = rules::apply(rules::NAME_RULES, &self.name);
        if messages.is_empty() && self.name_verdict() == FieldVerdict::Invalid {
            messages.push(FieldMessage::NameTaken);
        }
        messages
    }

    pub fn is_pending(&self) -> bool {
        rules::apply(rules::NAME_RULES, &self.name).is_empty()
            && self.name_verdict() == FieldVerdict::Pending
    }

    pub fn is_submittable(&self) -> bool {
        rules::apply(rules::NAME_RULES, &self.name).is_empty()
            && self.name_verdict() == FieldVerdict::Valid
    }

    /// Waits for the name check to settle.
    pub async fn settled(&self) {
        self.name_check.settle().await
    }

    /// Error from the last failed submit, cleared by a successful one.
    pub fn error(&self) -> Option<&SubmitError> {
        self.error.as_ref()
    }

    /// Sends the Thing to the server if the form is submittable at this
    /// instant; otherwise returns `Ok(None)` without a request.
    ///
    /// The server revalidates before writing, so a form that looked valid here
    /// can still come back as [`SubmitError::WriteRejected`]. On error the form
    /// keeps its values.
    pub async fn submit(&mut self) -> Result<Option<Thing>, SubmitError> {
        if !self.is_submittable() {
            debug!(id = self.id, "submit ignored, form not submittable");
            return Ok(None);
        }

        let result = match self.api.persist(&self.value()).await {
            Ok(Some(saved)) => Ok(Some(saved)),
            Ok(None) => Err(SubmitError::NotSaved),
            Err(err) => Err(SubmitError::from(err)),
        };

        match &result {
            Ok(_) => self.error = None,
            Err(err) => {
                warn!(id = self.id, error = %err, "save failed");
                self.error = Some(err.clone());
            }
        }
        result
    }
}
