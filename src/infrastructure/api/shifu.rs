#[cfg(test)]
#[path = "shifu_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::json;
use serde_json::Value;
use uuid::Uuid;

use crate::configuration::ClientSettings;
use crate::domain::models::ApiError;
use crate::domain::models::LearnerApi;
use crate::domain::models::LessonTree;
use crate::domain::models::LoginResult;
use crate::domain::models::Order;
use crate::domain::models::StudyRecord;
use crate::domain::models::UserProfile;
use crate::domain::services::UserStore;

/// Response codes meaning the session token is missing, expired or invalid.
const AUTH_CODES: [i64; 3] = [1001, 1004, 1005];

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

pub struct ShifuApi {
    client: reqwest::Client,
    url: String,
    user: UserStore,
}

impl ShifuApi {
    pub fn new(settings: &ClientSettings, user: UserStore) -> ShifuApi {
        return ShifuApi {
            client: reqwest::Client::new(),
            url: settings.api_url.trim_end_matches('/').to_string(),
            user,
        };
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Option<T>> {
        let request_id = Uuid::new_v4().to_string();
        let mut req = self
            .client
            .request(method, format!("{url}{path}", url = self.url))
            .header("X-Request-ID", &request_id)
            .query(query);

        let token = self.user.token();
        if !token.is_empty() {
            req = req.bearer_auth(&token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await?;
        let status = res.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(path = path, status = status.as_u16(), "Session rejected");
            self.user.logout();
            bail!(ApiError::Unauthorized(status.to_string()));
        }
        if !status.is_success() {
            tracing::error!(
                path = path,
                status = status.as_u16(),
                request_id = request_id,
                "Request failed"
            );
            bail!(format!("Request to {path} failed with status {status}"));
        }

        let envelope = res.json::<Envelope<T>>().await?;
        if AUTH_CODES.contains(&envelope.code) {
            tracing::warn!(path = path, code = envelope.code, "Session rejected");
            self.user.logout();
            bail!(ApiError::Unauthorized(envelope.message));
        }
        if envelope.code != 0 {
            tracing::error!(
                path = path,
                code = envelope.code,
                error_message = envelope.message.as_str(),
                "Request returned an error"
            );
            bail!(ApiError::Server {
                code: envelope.code,
                message: envelope.message,
            });
        }

        return Ok(envelope.data);
    }

    async fn get<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let data = self.request::<T>(Method::GET, path, query, None).await?;
        return Ok(data.unwrap_or_default());
    }

    async fn post<T: DeserializeOwned + Default>(&self, path: &str, body: Value) -> Result<T> {
        let data = self.request::<T>(Method::POST, path, &[], Some(body)).await?;
        return Ok(data.unwrap_or_default());
    }
}

#[async_trait]
impl LearnerApi for ShifuApi {
    #[allow(clippy::implicit_return)]
    async fn send_sms_code(&self, mobile: &str) -> Result<()> {
        self.post::<Value>("/api/user/send_sms_code", json!({ "mobile": mobile }))
            .await?;
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn verify_sms_code(&self, mobile: &str, code: &str) -> Result<LoginResult> {
        let res: LoginResult = self
            .post(
                "/api/user/verify_sms_code",
                json!({ "mobile": mobile, "sms_code": code }),
            )
            .await?;
        if res.token.is_empty() {
            bail!("Login did not return a session token");
        }

        return Ok(res);
    }

    #[allow(clippy::implicit_return)]
    async fn user_info(&self) -> Result<UserProfile> {
        return self.get("/api/user/info", &[]).await;
    }

    #[allow(clippy::implicit_return)]
    async fn lesson_tree(&self, course_id: &str) -> Result<LessonTree> {
        return self
            .get("/api/lesson/get_lesson_tree", &[("course_id", course_id)])
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn study_record(&self, lesson_id: &str) -> Result<StudyRecord> {
        return self
            .get(
                "/api/study/get_lesson_study_record",
                &[("lesson_id", lesson_id)],
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn reset_chapter(&self, chapter_id: &str) -> Result<()> {
        self.post::<Value>(
            "/api/study/reset-study-progress",
            json!({ "lesson_id": chapter_id }),
        )
        .await?;
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn init_order(&self, course_id: &str) -> Result<Order> {
        return self
            .post("/api/order/init-order", json!({ "course_id": course_id }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn query_order(&self, order_id: &str) -> Result<Order> {
        return self
            .post("/api/order/query-order", json!({ "order_id": order_id }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn submit_feedback(&self, text: &str) -> Result<()> {
        self.post::<Value>(
            "/api/feedback/submit-feedback",
            json!({ "feedback": text }),
        )
        .await?;
        return Ok(());
    }
}
