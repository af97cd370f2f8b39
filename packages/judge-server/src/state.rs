use std::sync::Arc;

use crate::config::AppConfig;
use crate::judge::JudgeEngine;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub judge: JudgeEngine,
}
