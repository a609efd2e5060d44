// ============================================================================
// Registrar Infrastructure - In-Memory Student Repository
// File: crates/registrar-infrastructure/src/database/memory/student_repo_impl.rs
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use registrar_core::domain::{Student, ValidatedStudent};
use registrar_core::error::DomainError;
use registrar_core::repositories::StudentRepository;

#[derive(Default)]
pub struct InMemoryStudentRepository {
    students: RwLock<HashMap<Uuid, Student>>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.students.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.read().is_empty()
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn create(&self, student: &ValidatedStudent) -> Result<Student, DomainError> {
        let student = student.student();
        let mut students = self.students.write();

        if students.contains_key(&student.student_id) {
            return Err(DomainError::StudentAlreadyExists(student.student_id));
        }

        students.insert(student.student_id, student.clone());
        Ok(student.clone())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Student>, DomainError> {
        Ok(self.students.read().get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Student>, DomainError> {
        let mut all: Vec<Student> = self.students.read().values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.student_id.cmp(&b.student_id))
        });
        Ok(all)
    }

    async fn update(&self, student: &ValidatedStudent) -> Result<Student, DomainError> {
        let incoming = student.student();
        let mut students = self.students.write();

        let stored = students
            .get_mut(&incoming.student_id)
            .ok_or(DomainError::StudentNotFound(incoming.student_id))?;

        stored.date_of_birth = incoming.date_of_birth;
        stored.phone = incoming.phone.clone();
        stored.major = incoming.major.clone();
        stored.updated_at = incoming.updated_at;

        Ok(stored.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.students
            .write()
            .remove(id)
            .ok_or(DomainError::StudentNotFound(*id))?;

        info!("Student entry removed: {}", id);
        Ok(())
    }
}
