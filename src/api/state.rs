use std::sync::Arc;
use crate::pipeline::pipeline::BodyShapePipeline;

/// Shared application state, one pipeline for every request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<BodyShapePipeline>,
}

impl AppState {
    pub fn new(pipeline: BodyShapePipeline) -> Self {
        AppState { pipeline: Arc::new(pipeline) }
    }
}
