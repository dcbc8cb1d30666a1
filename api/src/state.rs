use std::sync::Arc;

use crowdgate_core::Resolver;

use crate::upstream::ReqwestTransport;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver<ReqwestTransport>>,
}

impl AppState {
    pub fn new(resolver: Resolver<ReqwestTransport>) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}
