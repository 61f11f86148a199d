use std::sync::Arc;

use crate::store::{DocumentStore, EMAILS_COLLECTION};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub collection: String,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            collection: EMAILS_COLLECTION.to_string(),
        }
    }
}
