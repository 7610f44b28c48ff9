use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonOption {
    pub label: String,
    pub value: String,
}

/// What the server asks the learner to do once the current turn has been
/// streamed. Exactly one is pending at a time, replaced on each new turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionDescriptor {
    Continue { label: String },
    Buttons { buttons: Vec<ButtonOption> },
    Input { placeholder: String },
    Ask { placeholder: String },
    Phone { placeholder: String },
    Checkcode { placeholder: String },
    Order { order_id: Option<String> },
    NonblockOrder { order_id: Option<String> },
    RequireLogin { label: String },
}

/// Terminal input rendered for an [`InteractionDescriptor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputAffordance {
    NextButton {
        label: String,
    },
    ButtonGroup {
        options: Vec<ButtonOption>,
    },
    TextBox {
        placeholder: String,
        ask: bool,
    },
    PhoneField {
        placeholder: String,
    },
    CodeField {
        placeholder: String,
    },
    PurchaseModal {
        order_id: Option<String>,
        /// Non-blocking orders may be closed without paying.
        dismissable: bool,
    },
    LoginGate {
        label: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Paid(String),
    Dismissed,
}

/// The learner's answer to an [`InputAffordance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AffordanceValue {
    Next,
    Selected(String),
    Text(String),
    Phone(String),
    Code(String),
    Purchase(PurchaseOutcome),
    LoggedIn,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InputType {
    Start,
    Continue,
    Select,
    Text,
    Ask,
    Phone,
    Checkcode,
    Order,
    RequireLogin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundPayload {
    pub input: Option<String>,
    pub input_type: InputType,
}

impl OutboundPayload {
    pub fn new(input_type: InputType, input: Option<String>) -> OutboundPayload {
        return OutboundPayload { input, input_type };
    }
}
