use std::sync::Arc;

use crate::fetch::CwlSource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn CwlSource>,

    /// League used for medals instead of the one the data names
    pub league_override: Option<String>,

    pub cors_origin: String,
}

impl AppState {
    pub fn new(source: Arc<dyn CwlSource>) -> Self {
        Self {
            source,
            league_override: None,
            cors_origin: "*".to_string(),
        }
    }
}
