#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    pub mobile: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResult {
    pub token: String,
    #[serde(rename = "userInfo", alias = "user_info")]
    pub user_info: UserProfile,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonNode {
    pub lesson_id: String,
    pub lesson_name: String,
    pub status: String,
    pub children: Vec<LessonNode>,
}

impl LessonNode {
    pub const STATUS_COMPLETED: &'static str = "completed";
    pub const STATUS_LOCKED: &'static str = "locked";

    pub fn is_open(&self) -> bool {
        return self.status != LessonNode::STATUS_COMPLETED
            && self.status != LessonNode::STATUS_LOCKED;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonTree {
    pub course_id: String,
    pub course_name: String,
    pub lessons: Vec<LessonNode>,
}

impl LessonTree {
    fn find_leaf<F: Fn(&LessonNode) -> bool>(
        nodes: &[LessonNode],
        accept: &F,
    ) -> Option<LessonNode> {
        for node in nodes {
            if node.children.is_empty() {
                if accept(node) {
                    return Some(node.clone());
                }
                continue;
            }
            if let Some(leaf) = LessonTree::find_leaf(&node.children, accept) {
                return Some(leaf);
            }
        }
        return None;
    }

    /// Depth first, the first leaf lesson that is neither completed nor
    /// locked. Falls back to the first leaf of the course.
    pub fn first_open_lesson(&self) -> Option<LessonNode> {
        return LessonTree::find_leaf(&self.lessons, &|node| return node.is_open())
            .or_else(|| return LessonTree::find_leaf(&self.lessons, &|_| return true));
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRecordItem {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub script_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyRecord {
    pub records: Vec<StudyRecordItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub order_id: String,
    pub status: i64,
    pub price: String,
    pub pay_url: String,
}

impl Order {
    pub const STATUS_PAID: i64 = 502;

    pub fn is_paid(&self) -> bool {
        return self.status == Order::STATUS_PAID;
    }
}

/// Request/response calls the learner client makes next to the lesson
/// stream.
#[async_trait]
pub trait LearnerApi {
    async fn send_sms_code(&self, mobile: &str) -> Result<()>;

    /// Exchanges a phone number and the SMS code sent to it for a session
    /// token.
    async fn verify_sms_code(&self, mobile: &str, code: &str) -> Result<LoginResult>;

    async fn user_info(&self) -> Result<UserProfile>;

    async fn lesson_tree(&self, course_id: &str) -> Result<LessonTree>;

    async fn study_record(&self, lesson_id: &str) -> Result<StudyRecord>;

    /// Discards the learner's progress within one chapter server side.
    async fn reset_chapter(&self, chapter_id: &str) -> Result<()>;

    async fn init_order(&self, course_id: &str) -> Result<Order>;

    async fn query_order(&self, order_id: &str) -> Result<Order>;

    async fn submit_feedback(&self, text: &str) -> Result<()>;
}

pub type LearnerApiBox = std::sync::Arc<dyn LearnerApi + Send + Sync>;
