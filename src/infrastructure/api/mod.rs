pub mod shifu;

use crate::configuration::ClientSettings;
use crate::domain::models::LearnerApiBox;
use crate::domain::services::UserStore;

pub struct ApiManager {}

impl ApiManager {
    pub fn get(settings: &ClientSettings, user: UserStore) -> LearnerApiBox {
        return std::sync::Arc::new(shifu::ShifuApi::new(settings, user));
    }
}
