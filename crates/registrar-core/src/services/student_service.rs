// ============================================================================
// Registrar Core - Student Service
// File: crates/registrar-core/src/services/student_service.rs
// ============================================================================
//! Student command/query service with idempotent create and update
//!
//! A keyed write claims its key with a pending [`IdempotencyRecord`] before
//! touching the student store, and completes that record once the write
//! succeeds. Only the request holding the claim mutates; every other request
//! with the same key replays the completed result or is told the original is
//! still in flight.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use registrar_shared::constants::{STATUS_CREATED, STATUS_OK};
use registrar_shared::utils::mask_email;

use crate::domain::{IdempotencyRecord, Student, ValidatedStudent};
use crate::error::DomainError;
use crate::repositories::{IdempotencyRepository, StudentRepository};

use super::commands::{
    CommandOutcome, CreateStudentCommand, CreateStudentCommandResult, StudentQueryListResult,
    StudentQueryResult, StudentResult, UpdateStudentCommand, UpdateStudentCommandResult,
};

/// Operations the HTTP layer drives
#[async_trait]
pub trait StudentUseCases: Send + Sync {
    async fn create_student(
        &self,
        command: CreateStudentCommand,
    ) -> Result<CommandOutcome<CreateStudentCommandResult>, DomainError>;

    async fn find_all_student(&self) -> Result<StudentQueryListResult, DomainError>;

    async fn find_student_by_id(&self, id: Uuid) -> Result<StudentQueryResult, DomainError>;

    async fn update_student(
        &self,
        command: UpdateStudentCommand,
    ) -> Result<CommandOutcome<UpdateStudentCommandResult>, DomainError>;

    async fn delete_student(&self, id: Uuid) -> Result<(), DomainError>;
}

/// Result of trying to claim an idempotency key
enum Claim<T> {
    /// This request owns the key; complete or release the record.
    Acquired(IdempotencyRecord),
    /// Another request completed first.
    Replay(CommandOutcome<T>),
    /// The idempotency store could not be written; run unprotected.
    Skipped,
}

/// Student service backed by an entity store and an idempotency store
pub struct StudentService<S: StudentRepository, I: IdempotencyRepository> {
    student_repo: Arc<S>,
    idempotency_repo: Arc<I>,
    clock: Arc<dyn Clock + Send + Sync>,
}

fn idempotency_key(raw: &str) -> Option<&str> {
    (!raw.is_empty()).then_some(raw)
}

impl<S: StudentRepository, I: IdempotencyRepository> StudentService<S, I> {
    pub fn new(
        student_repo: Arc<S>,
        idempotency_repo: Arc<I>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            student_repo,
            idempotency_repo,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn stored_outcome<T: DeserializeOwned>(
        record: &IdempotencyRecord,
    ) -> Result<CommandOutcome<T>, DomainError> {
        if !record.has_response() {
            debug!(idempotency_key = %record.key, "Idempotency key is claimed by a running request");
            return Err(DomainError::IdempotencyKeyInFlight(record.key.clone()));
        }

        let result: T = serde_json::from_str(&record.response).map_err(|e| {
            error!(idempotency_key = %record.key, record_id = %record.id, "Stored response is unreadable: {}", e);
            DomainError::Serialization(e.to_string())
        })?;

        debug!(idempotency_key = %record.key, status_code = record.status_code, "Replaying stored response");
        Ok(CommandOutcome::replayed(result, record.status_code))
    }

    /// Stored outcome for `key`, if any. Lookup errors are surfaced so a
    /// failing store never lets a mutation run twice.
    async fn replay<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<CommandOutcome<T>>, DomainError> {
        self.idempotency_repo
            .find_by_key(key)
            .await?
            .map(|record| Self::stored_outcome(&record))
            .transpose()
    }

    /// Store a pending record for `key` before the mutation runs.
    async fn claim<C, T>(&self, key: &str, command: &C) -> Result<Claim<T>, DomainError>
    where
        C: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = match serde_json::to_string(command) {
            Ok(request) => request,
            Err(e) => {
                error!(idempotency_key = key, "Failed to serialize request: {}", e);
                return Ok(Claim::Skipped);
            }
        };
        let record = IdempotencyRecord::new(key.to_string(), request, self.now());

        match self.idempotency_repo.create(&record).await {
            Ok(_) => {
                debug!(idempotency_key = key, record_id = %record.id, "Idempotency key claimed");
                Ok(Claim::Acquired(record))
            }
            Err(DomainError::IdempotencyKeyExists(_)) => {
                warn!(idempotency_key = key, "Idempotency key claimed concurrently");
                match self.replay(key).await? {
                    Some(winner) => Ok(Claim::Replay(winner)),
                    // The other claim was released between our write and the re-read
                    None => Err(DomainError::IdempotencyKeyInFlight(key.to_string())),
                }
            }
            Err(e) => {
                error!(
                    idempotency_key = key,
                    "Failed to claim idempotency key, running without replay protection: {}", e
                );
                Ok(Claim::Skipped)
            }
        }
    }

    async fn claim_for<C, T>(
        &self,
        key: Option<&str>,
        command: &C,
    ) -> Result<Claim<T>, DomainError>
    where
        C: Serialize + Sync,
        T: DeserializeOwned,
    {
        match key {
            Some(key) => self.claim(key, command).await,
            None => Ok(Claim::Skipped),
        }
    }

    /// Fill in the claimed record. Never fails the command; a record that
    /// cannot be completed is released so retries re-execute.
    async fn complete<T>(&self, mut record: IdempotencyRecord, result: &T, status_code: u16)
    where
        T: Serialize + Sync,
    {
        let response = match serde_json::to_string(result) {
            Ok(response) => response,
            Err(e) => {
                error!(idempotency_key = %record.key, "Failed to serialize response: {}", e);
                self.release(record).await;
                return;
            }
        };
        record.set_response(response, status_code);

        match self.idempotency_repo.update(&record).await {
            Ok(_) => debug!(idempotency_key = %record.key, record_id = %record.id, "Idempotency record completed"),
            Err(e) => {
                error!(idempotency_key = %record.key, "Failed to store idempotency response: {}", e);
                self.release(record).await;
            }
        }
    }

    /// Drop a claim whose command did not go through.
    async fn release(&self, record: IdempotencyRecord) {
        match self.idempotency_repo.delete(&record.id).await {
            Ok(()) => debug!(idempotency_key = %record.key, "Idempotency key released"),
            Err(e) => error!(
                idempotency_key = %record.key,
                record_id = %record.id,
                "Failed to release idempotency key, retries will report it in flight: {}", e
            ),
        }
    }
}

#[async_trait]
impl<S: StudentRepository, I: IdempotencyRepository> StudentUseCases for StudentService<S, I> {
    async fn create_student(
        &self,
        command: CreateStudentCommand,
    ) -> Result<CommandOutcome<CreateStudentCommandResult>, DomainError> {
        let key = idempotency_key(&command.idempotency_key);

        // 1. Replay a previous outcome for the same key
        if let Some(key) = key {
            if let Some(outcome) = self.replay(key).await? {
                return Ok(outcome);
            }
        }

        // 2. Build and validate
        let now = self.now();
        let student = Student::new(
            command.first_name.clone(),
            command.last_name.clone(),
            command.date_of_birth,
            command.email.clone(),
            command.phone.clone(),
            command.major.clone(),
            command.enrollment_date,
            now,
        );

        let validated = ValidatedStudent::new(student, now).map_err(|e| {
            warn!(email = %mask_email(&command.email), "Create rejected: {}", e);
            e
        })?;

        // 3. Claim the key
        let claim = match self.claim_for(key, &command).await? {
            Claim::Acquired(record) => Some(record),
            Claim::Replay(winner) => return Ok(winner),
            Claim::Skipped => None,
        };

        // 4. Persist
        let created = match self.student_repo.create(&validated).await {
            Ok(created) => created,
            Err(e) => {
                if let Some(record) = claim {
                    self.release(record).await;
                }
                return Err(e);
            }
        };
        info!(student_id = %created.student_id, email = %mask_email(&created.email), "Student created");

        let result = CreateStudentCommandResult {
            result: StudentResult::from(&created),
        };

        // 5. Complete the claim
        if let Some(record) = claim {
            self.complete(record, &result, STATUS_CREATED).await;
        }

        Ok(CommandOutcome::executed(result, STATUS_CREATED))
    }

    async fn find_all_student(&self) -> Result<StudentQueryListResult, DomainError> {
        let students = self.student_repo.find_all().await?;

        Ok(StudentQueryListResult {
            result: students.iter().map(StudentResult::from).collect(),
        })
    }

    async fn find_student_by_id(&self, id: Uuid) -> Result<StudentQueryResult, DomainError> {
        let student = self
            .student_repo
            .find_by_id(&id)
            .await?
            .ok_or(DomainError::StudentNotFound(id))?;

        Ok(StudentQueryResult {
            result: StudentResult::from(&student),
        })
    }

    async fn update_student(
        &self,
        command: UpdateStudentCommand,
    ) -> Result<CommandOutcome<UpdateStudentCommandResult>, DomainError> {
        let key = idempotency_key(&command.idempotency_key);

        // 1. Replay a previous outcome for the same key
        if let Some(key) = key {
            if let Some(outcome) = self.replay(key).await? {
                return Ok(outcome);
            }
        }

        // 2. Load the stored student
        let stored = self
            .student_repo
            .find_by_id(&command.student_id)
            .await?
            .ok_or_else(|| {
                warn!(student_id = %command.student_id, "Update rejected: student not found");
                DomainError::StudentNotFound(command.student_id)
            })?;

        // 3. Sanity gate on data at rest
        let now = self.now();
        let mut student = ValidatedStudent::new(stored, now)
            .map_err(|e| {
                error!(student_id = %command.student_id, "Stored student fails validation: {}", e);
                e
            })?
            .into_inner();

        // 4. Apply the change; validity must be re-derived afterwards
        student
            .update_fields(
                command.date_of_birth,
                command.phone.clone(),
                command.major.clone(),
                now,
            )
            .map_err(|e| {
                warn!(student_id = %command.student_id, "Update rejected: {}", e);
                e
            })?;
        let validated = ValidatedStudent::new(student, now)?;

        // 5. Claim the key
        let claim = match self.claim_for(key, &command).await? {
            Claim::Acquired(record) => Some(record),
            Claim::Replay(winner) => return Ok(winner),
            Claim::Skipped => None,
        };

        // 6. Persist
        let updated = match self.student_repo.update(&validated).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(record) = claim {
                    self.release(record).await;
                }
                return Err(e);
            }
        };
        info!(student_id = %updated.student_id, "Student updated");

        let result = UpdateStudentCommandResult {
            result: StudentResult::from(&updated),
        };

        // 7. Complete the claim
        if let Some(record) = claim {
            self.complete(record, &result, STATUS_OK).await;
        }

        Ok(CommandOutcome::executed(result, STATUS_OK))
    }

    async fn delete_student(&self, id: Uuid) -> Result<(), DomainError> {
        self.student_repo.delete(&id).await?;
        info!(student_id = %id, "Student deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockIdempotencyRepository, MockStudentRepository};
    use chrono::{Duration, Local, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    fn fixture_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
    }

    fn service(
        students: MockStudentRepository,
        idempotency: MockIdempotencyRepository,
    ) -> StudentService<MockStudentRepository, MockIdempotencyRepository> {
        StudentService::new(
            Arc::new(students),
            Arc::new(idempotency),
            Arc::new(FixtureClock { utc_now: fixture_now() }),
        )
    }

    fn create_command(key: &str) -> CreateStudentCommand {
        CreateStudentCommand {
            idempotency_key: key.to_string(),
            first_name: "tran".to_string(),
            last_name: "vu".to_string(),
            date_of_birth: None,
            email: "tranvu123@gmail.com".to_string(),
            phone: None,
            major: None,
            enrollment_date: Utc.with_ymd_and_hms(2023, 3, 11, 0, 0, 0).unwrap(),
        }
    }

    fn update_command(key: &str, student_id: Uuid) -> UpdateStudentCommand {
        UpdateStudentCommand {
            idempotency_key: key.to_string(),
            student_id,
            date_of_birth: None,
            phone: Some("0931239991".to_string()),
            major: None,
        }
    }

    fn stored_student() -> Student {
        Student {
            student_id: Uuid::new_v4(),
            first_name: "tran".to_string(),
            last_name: "vu".to_string(),
            date_of_birth: None,
            email: "tranvu123@gmail.com".to_string(),
            phone: Some("0947531799".to_string()),
            major: Some("Computer Science".to_string()),
            enrollment_date: Utc.with_ymd_and_hms(2023, 3, 11, 0, 0, 0).unwrap(),
            created_at: fixture_now() - Duration::days(30),
            updated_at: fixture_now() - Duration::days(30),
        }
    }

    fn stored_record<T: Serialize>(key: &str, result: &T, status_code: u16) -> IdempotencyRecord {
        let mut record = IdempotencyRecord::new(key.to_string(), "{}".to_string(), fixture_now());
        record.set_response(serde_json::to_string(result).unwrap(), status_code);
        record
    }

    fn pending_record(key: &str) -> IdempotencyRecord {
        IdempotencyRecord::new(key.to_string(), "{}".to_string(), fixture_now())
    }

    fn echo_create(students: &mut MockStudentRepository) {
        students
            .expect_create()
            .times(1)
            .returning(|validated| Ok(validated.student().clone()));
    }

    /// First lookup misses, later lookups see `record`.
    fn miss_then_find(idempotency: &mut MockIdempotencyRepository, record: IdempotencyRecord) {
        let lookups = AtomicUsize::new(0);
        idempotency
            .expect_find_by_key()
            .times(2)
            .returning(move |_| {
                if lookups.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(None)
                } else {
                    Ok(Some(record.clone()))
                }
            });
    }

    #[tokio::test]
    async fn test_create_without_key_skips_idempotency_store() {
        let mut students = MockStudentRepository::new();
        echo_create(&mut students);
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency.expect_find_by_key().never();
        idempotency.expect_create().never();
        idempotency.expect_update().never();

        let outcome = service(students, idempotency)
            .create_student(create_command(""))
            .await
            .unwrap();

        assert_eq!(outcome.status_code, STATUS_CREATED);
        assert!(!outcome.replayed);
        assert_eq!(outcome.result.result.email, "tranvu123@gmail.com");
        assert_eq!(outcome.result.result.created_at, fixture_now());
    }

    #[tokio::test]
    async fn test_create_with_new_key_claims_then_completes_record() {
        let mut students = MockStudentRepository::new();
        echo_create(&mut students);
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency
            .expect_find_by_key()
            .withf(|key: &str| key == "k1")
            .times(1)
            .returning(|_| Ok(None));
        idempotency
            .expect_create()
            .withf(|record: &IdempotencyRecord| {
                let request: CreateStudentCommand = serde_json::from_str(&record.request).unwrap();
                record.key == "k1" && !record.has_response() && request.idempotency_key == "k1"
            })
            .times(1)
            .returning(|record| Ok(record.clone()));
        idempotency
            .expect_update()
            .withf(|record: &IdempotencyRecord| {
                record.key == "k1"
                    && record.status_code == STATUS_CREATED
                    && serde_json::from_str::<CreateStudentCommandResult>(&record.response).is_ok()
            })
            .times(1)
            .returning(|record| Ok(record.clone()));
        idempotency.expect_delete().never();

        let outcome = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap();

        assert!(!outcome.replayed);
        assert_eq!(outcome.status_code, STATUS_CREATED);
    }

    #[tokio::test]
    async fn test_create_replays_stored_result() {
        let original = CreateStudentCommandResult {
            result: StudentResult::from(&stored_student()),
        };
        let record = stored_record("k1", &original, STATUS_CREATED);

        let mut students = MockStudentRepository::new();
        students.expect_create().never();
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency
            .expect_find_by_key()
            .times(1)
            .returning(move |_| Ok(Some(record.clone())));
        idempotency.expect_create().never();

        let mut retry = create_command("k1");
        retry.email = "someone.else@gmail.com".to_string();

        let outcome = service(students, idempotency)
            .create_student(retry)
            .await
            .unwrap();

        assert!(outcome.replayed);
        assert_eq!(outcome.status_code, STATUS_CREATED);
        assert_eq!(outcome.result, original);
        assert_eq!(outcome.result.result.email, "tranvu123@gmail.com");
    }

    #[tokio::test]
    async fn test_create_with_pending_key_is_in_flight() {
        let record = pending_record("k1");

        let mut students = MockStudentRepository::new();
        students.expect_create().never();
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency
            .expect_find_by_key()
            .returning(move |_| Ok(Some(record.clone())));
        idempotency.expect_create().never();

        let err = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::IdempotencyKeyInFlight("k1".to_string()));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email_before_claim() {
        let mut students = MockStudentRepository::new();
        students.expect_create().never();
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency.expect_find_by_key().returning(|_| Ok(None));
        idempotency.expect_create().never();

        let mut command = create_command("k1");
        command.email = "not-an-email".to_string();

        let err = service(students, idempotency)
            .create_student(command)
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::validation("Invalid email"));
    }

    #[tokio::test]
    async fn test_create_rejects_future_date_of_birth() {
        let mut students = MockStudentRepository::new();
        students.expect_create().never();
        let idempotency = MockIdempotencyRepository::new();

        let mut command = create_command("");
        command.date_of_birth = Some(fixture_now() + Duration::seconds(1));

        let err = service(students, idempotency)
            .create_student(command)
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::validation("Invalid date of birth"));
    }

    #[tokio::test]
    async fn test_create_store_failure_releases_claim() {
        let mut students = MockStudentRepository::new();
        students
            .expect_create()
            .returning(|_| Err(DomainError::Database("connection reset".to_string())));
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency.expect_find_by_key().returning(|_| Ok(None));
        idempotency
            .expect_create()
            .times(1)
            .returning(|record| Ok(record.clone()));
        idempotency.expect_update().never();
        idempotency.expect_delete().times(1).returning(|_| Ok(()));

        let err = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::Database("connection reset".to_string()));
    }

    #[tokio::test]
    async fn test_create_lookup_failure_is_surfaced() {
        let mut students = MockStudentRepository::new();
        students.expect_create().never();
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency
            .expect_find_by_key()
            .returning(|_| Err(DomainError::Database("timeout".to_string())));

        let err = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::Database("timeout".to_string()));
    }

    #[tokio::test]
    async fn test_create_runs_when_claim_cannot_be_written() {
        let mut students = MockStudentRepository::new();
        echo_create(&mut students);
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency.expect_find_by_key().times(1).returning(|_| Ok(None));
        idempotency
            .expect_create()
            .times(1)
            .returning(|_| Err(DomainError::Database("disk full".to_string())));
        idempotency.expect_update().never();
        idempotency.expect_delete().never();

        let outcome = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap();

        assert!(!outcome.replayed);
        assert_eq!(outcome.status_code, STATUS_CREATED);
    }

    #[tokio::test]
    async fn test_create_releases_claim_when_completion_fails() {
        let mut students = MockStudentRepository::new();
        echo_create(&mut students);
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency.expect_find_by_key().returning(|_| Ok(None));
        idempotency
            .expect_create()
            .returning(|record| Ok(record.clone()));
        idempotency
            .expect_update()
            .times(1)
            .returning(|_| Err(DomainError::Database("disk full".to_string())));
        idempotency.expect_delete().times(1).returning(|_| Ok(()));

        let outcome = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap();

        assert!(!outcome.replayed);
        assert_eq!(outcome.status_code, STATUS_CREATED);
    }

    #[tokio::test]
    async fn test_create_corrupted_record_is_serialization_error() {
        let mut record = IdempotencyRecord::new("k1".to_string(), "{}".to_string(), fixture_now());
        record.set_response("{\"unexpected\":true}".to_string(), STATUS_CREATED);

        let mut students = MockStudentRepository::new();
        students.expect_create().never();
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency
            .expect_find_by_key()
            .returning(move |_| Ok(Some(record.clone())));

        let err = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_create_lost_claim_replays_winner_without_inserting() {
        let winner = CreateStudentCommandResult {
            result: StudentResult::from(&stored_student()),
        };

        let mut students = MockStudentRepository::new();
        students.expect_create().never();
        students.expect_delete().never();

        let mut idempotency = MockIdempotencyRepository::new();
        miss_then_find(&mut idempotency, stored_record("k1", &winner, STATUS_CREATED));
        idempotency
            .expect_create()
            .times(1)
            .returning(|record| Err(DomainError::IdempotencyKeyExists(record.key.clone())));
        idempotency.expect_update().never();

        let outcome = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap();

        assert!(outcome.replayed);
        assert_eq!(outcome.result, winner);
    }

    #[tokio::test]
    async fn test_create_lost_claim_to_running_request_is_in_flight() {
        let mut students = MockStudentRepository::new();
        students.expect_create().never();

        let mut idempotency = MockIdempotencyRepository::new();
        miss_then_find(&mut idempotency, pending_record("k1"));
        idempotency
            .expect_create()
            .returning(|record| Err(DomainError::IdempotencyKeyExists(record.key.clone())));

        let err = service(students, idempotency)
            .create_student(create_command("k1"))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::IdempotencyKeyInFlight("k1".to_string()));
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let stored = stored_student();
        let id = stored.student_id;
        let before = stored.clone();

        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_id()
            .withf(move |candidate: &Uuid| *candidate == id)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        students
            .expect_update()
            .withf(move |validated: &ValidatedStudent| {
                let s = validated.student();
                validated.is_valid()
                    && s.student_id == before.student_id
                    && s.first_name == before.first_name
                    && s.last_name == before.last_name
                    && s.email == before.email
                    && s.enrollment_date == before.enrollment_date
                    && s.created_at == before.created_at
                    && s.phone.as_deref() == Some("0931239991")
                    && s.major.as_deref() == Some("CNTT")
                    && s.date_of_birth.is_none()
                    && s.updated_at == fixture_now()
            })
            .times(1)
            .returning(|validated| Ok(validated.student().clone()));
        let idempotency = MockIdempotencyRepository::new();

        let mut command = update_command("", id);
        command.major = Some("CNTT".to_string());

        let outcome = service(students, idempotency)
            .update_student(command)
            .await
            .unwrap();

        assert_eq!(outcome.status_code, STATUS_OK);
        assert_eq!(outcome.result.result.first_name, "tran");
        assert_eq!(outcome.result.result.major.as_deref(), Some("CNTT"));
    }

    #[tokio::test]
    async fn test_update_with_new_key_completes_record_with_ok_status() {
        let stored = stored_student();
        let id = stored.student_id;

        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        students
            .expect_update()
            .times(1)
            .returning(|validated| Ok(validated.student().clone()));
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency.expect_find_by_key().returning(|_| Ok(None));
        idempotency
            .expect_create()
            .withf(|record: &IdempotencyRecord| record.key == "k2" && !record.has_response())
            .times(1)
            .returning(|record| Ok(record.clone()));
        idempotency
            .expect_update()
            .withf(|record: &IdempotencyRecord| record.key == "k2" && record.status_code == STATUS_OK)
            .times(1)
            .returning(|record| Ok(record.clone()));

        let outcome = service(students, idempotency)
            .update_student(update_command("k2", id))
            .await
            .unwrap();

        assert!(!outcome.replayed);
        assert_eq!(outcome.status_code, STATUS_OK);
    }

    #[tokio::test]
    async fn test_update_missing_student_writes_no_record() {
        let mut students = MockStudentRepository::new();
        students.expect_find_by_id().returning(|_| Ok(None));
        students.expect_update().never();
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency.expect_find_by_key().returning(|_| Ok(None));
        idempotency.expect_create().never();

        let id = Uuid::new_v4();
        let err = service(students, idempotency)
            .update_student(update_command("k2", id))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::StudentNotFound(id));
    }

    #[tokio::test]
    async fn test_update_rejects_future_date_of_birth() {
        let stored = stored_student();
        let id = stored.student_id;

        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        students.expect_update().never();
        let idempotency = MockIdempotencyRepository::new();

        let mut command = update_command("", id);
        command.date_of_birth = Some(fixture_now() + Duration::days(1));

        let err = service(students, idempotency)
            .update_student(command)
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::validation("Invalid date of birth"));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_stored_student() {
        let mut stored = stored_student();
        stored.email = "Broken@Example.com".to_string();

        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        students.expect_update().never();
        let idempotency = MockIdempotencyRepository::new();

        let err = service(students, idempotency)
            .update_student(update_command("", Uuid::new_v4()))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::validation("Invalid email"));
    }

    #[tokio::test]
    async fn test_update_replays_stored_result() {
        let original = UpdateStudentCommandResult {
            result: StudentResult::from(&stored_student()),
        };
        let record = stored_record("k3", &original, STATUS_OK);

        let mut students = MockStudentRepository::new();
        students.expect_find_by_id().never();
        students.expect_update().never();
        let mut idempotency = MockIdempotencyRepository::new();
        idempotency
            .expect_find_by_key()
            .returning(move |_| Ok(Some(record.clone())));

        let outcome = service(students, idempotency)
            .update_student(update_command("k3", Uuid::new_v4()))
            .await
            .unwrap();

        assert!(outcome.replayed);
        assert_eq!(outcome.status_code, STATUS_OK);
        assert_eq!(outcome.result, original);
    }

    #[tokio::test]
    async fn test_update_lost_claim_replays_winner_without_writing() {
        let stored = stored_student();
        let id = stored.student_id;
        let winner = UpdateStudentCommandResult {
            result: StudentResult::from(&stored),
        };

        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        students.expect_update().never();

        let mut idempotency = MockIdempotencyRepository::new();
        miss_then_find(&mut idempotency, stored_record("k4", &winner, STATUS_OK));
        idempotency
            .expect_create()
            .times(1)
            .returning(|record| Err(DomainError::IdempotencyKeyExists(record.key.clone())));
        idempotency.expect_update().never();

        let outcome = service(students, idempotency)
            .update_student(update_command("k4", id))
            .await
            .unwrap();

        assert!(outcome.replayed);
        assert_eq!(outcome.status_code, STATUS_OK);
        assert_eq!(outcome.result, winner);
    }

    #[tokio::test]
    async fn test_find_student_by_id_not_found() {
        let mut students = MockStudentRepository::new();
        students.expect_find_by_id().returning(|_| Ok(None));

        let id = Uuid::new_v4();
        let err = service(students, MockIdempotencyRepository::new())
            .find_student_by_id(id)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_find_all_student_maps_results() {
        let first = stored_student();
        let second = stored_student();
        let expected = vec![StudentResult::from(&first), StudentResult::from(&second)];

        let mut students = MockStudentRepository::new();
        students
            .expect_find_all()
            .returning(move || Ok(vec![first.clone(), second.clone()]));

        let list = service(students, MockIdempotencyRepository::new())
            .find_all_student()
            .await
            .unwrap();

        assert_eq!(list.result, expected);
    }

    #[tokio::test]
    async fn test_delete_student_propagates_not_found() {
        let id = Uuid::new_v4();
        let mut students = MockStudentRepository::new();
        students
            .expect_delete()
            .returning(|id| Err(DomainError::StudentNotFound(*id)));

        let err = service(students, MockIdempotencyRepository::new())
            .delete_student(id)
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::StudentNotFound(id));
    }
}
