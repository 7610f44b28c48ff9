use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::InputType;

/// Body of a lesson-run stream request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub course_id: String,
    pub lesson_id: String,
    pub input: Option<String>,
    pub input_type: InputType,
    pub script_id: Option<String>,
    pub preview_mode: bool,
}
