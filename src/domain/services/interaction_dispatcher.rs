#[cfg(test)]
#[path = "interaction_dispatcher_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::AffordanceValue;
use crate::domain::models::InputAffordance;
use crate::domain::models::InputType;
use crate::domain::models::InteractionDescriptor;
use crate::domain::models::OutboundPayload;
use crate::domain::models::PurchaseOutcome;
use crate::domain::models::ValidationError;

static CHECKCODE: Lazy<Regex> =
    Lazy::new(|| return Regex::new(r"^[0-9]{4}$").expect("valid regex"));

fn non_empty(text: String) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    return Ok(trimmed.to_string());
}

pub struct InteractionDispatcher {}

impl InteractionDispatcher {
    pub fn render(descriptor: &InteractionDescriptor) -> InputAffordance {
        match descriptor {
            InteractionDescriptor::Continue { label } => {
                return InputAffordance::NextButton {
                    label: label.to_string(),
                };
            }
            InteractionDescriptor::Buttons { buttons } => {
                return InputAffordance::ButtonGroup {
                    options: buttons.clone(),
                };
            }
            InteractionDescriptor::Input { placeholder } => {
                return InputAffordance::TextBox {
                    placeholder: placeholder.to_string(),
                    ask: false,
                };
            }
            InteractionDescriptor::Ask { placeholder } => {
                return InputAffordance::TextBox {
                    placeholder: placeholder.to_string(),
                    ask: true,
                };
            }
            InteractionDescriptor::Phone { placeholder } => {
                return InputAffordance::PhoneField {
                    placeholder: placeholder.to_string(),
                };
            }
            InteractionDescriptor::Checkcode { placeholder } => {
                return InputAffordance::CodeField {
                    placeholder: placeholder.to_string(),
                };
            }
            InteractionDescriptor::Order { order_id } => {
                return InputAffordance::PurchaseModal {
                    order_id: order_id.clone(),
                    dismissable: false,
                };
            }
            InteractionDescriptor::NonblockOrder { order_id } => {
                return InputAffordance::PurchaseModal {
                    order_id: order_id.clone(),
                    dismissable: true,
                };
            }
            InteractionDescriptor::RequireLogin { label } => {
                return InputAffordance::LoginGate {
                    label: label.to_string(),
                };
            }
        }
    }

    pub fn validate_checkcode(code: &str) -> Result<String, ValidationError> {
        if !CHECKCODE.is_match(code) {
            return Err(ValidationError::Checkcode);
        }

        return Ok(code.to_string());
    }

    /// Maps the learner's answer to the payload of the next run request.
    /// Errors are meant to be shown to the learner; nothing should be sent.
    pub fn submit(
        affordance: &InputAffordance,
        value: AffordanceValue,
    ) -> Result<OutboundPayload, ValidationError> {
        match (affordance, value) {
            (InputAffordance::NextButton { label }, AffordanceValue::Next) => {
                return Ok(OutboundPayload::new(
                    InputType::Continue,
                    Some(label.to_string()),
                ));
            }
            (InputAffordance::ButtonGroup { options }, AffordanceValue::Selected(selected)) => {
                if !options.iter().any(|e| return e.value == selected) {
                    return Err(ValidationError::UnknownOption(selected));
                }

                return Ok(OutboundPayload::new(InputType::Select, Some(selected)));
            }
            (InputAffordance::TextBox { ask, .. }, AffordanceValue::Text(text)) => {
                let input_type = if *ask { InputType::Ask } else { InputType::Text };
                return Ok(OutboundPayload::new(input_type, Some(non_empty(text)?)));
            }
            (InputAffordance::PhoneField { .. }, AffordanceValue::Phone(phone)) => {
                return Ok(OutboundPayload::new(
                    InputType::Phone,
                    Some(non_empty(phone)?),
                ));
            }
            (InputAffordance::CodeField { .. }, AffordanceValue::Code(code)) => {
                let code = InteractionDispatcher::validate_checkcode(&code)?;
                return Ok(OutboundPayload::new(InputType::Checkcode, Some(code)));
            }
            (InputAffordance::PurchaseModal { dismissable, .. }, AffordanceValue::Purchase(outcome)) => {
                match outcome {
                    PurchaseOutcome::Paid(order_id) => {
                        return Ok(OutboundPayload::new(InputType::Order, Some(order_id)));
                    }
                    PurchaseOutcome::Dismissed => {
                        if !dismissable {
                            return Err(ValidationError::NotDismissable);
                        }

                        return Ok(OutboundPayload::new(InputType::Order, None));
                    }
                }
            }
            (InputAffordance::LoginGate { .. }, AffordanceValue::LoggedIn) => {
                return Ok(OutboundPayload::new(InputType::RequireLogin, None));
            }
            _ => {
                return Err(ValidationError::Mismatch);
            }
        }
    }
}
