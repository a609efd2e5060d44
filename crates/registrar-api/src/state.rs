use std::sync::Arc;

use registrar_core::services::StudentUseCases;

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentUseCases>,
}

impl AppState {
    pub fn new(students: Arc<dyn StudentUseCases>) -> Self {
        Self { students }
    }
}
