//! Record service
//!
//! Orchestrates the create/update/delete/find flow for a single payload:
//!
//! ```text
//! payload → RecordValidator → (status change?) StatusTransitionGuard → RecordStore
//! ```
//!
//! Validation runs before any store call. The transition check runs inside
//! the store's update, against the locked record, so a rejected payload
//! never leaves a partial write behind.
//!
//! The HTTP envelopes the routing layer sends back (`{ data }` on success,
//! `{ message }` with a 4xx status on failure) are built by [`respond`].

use crate::core::traits::{RecordQuery, RecordStore};
use crate::core::transition_guard::StatusTransitionGuard;
use crate::core::validator::{validator, RecordValidator};
use crate::types::{ImportRow, Record, RecordError, RecordPatch, RecordPayload, RowOutcome};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Validated access to a [`RecordStore`]
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    validator: &'static RecordValidator,
    guard: StatusTransitionGuard<'static>,
}

impl RecordService {
    /// Service using the standard validator and status rules
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            validator: validator(),
            guard: StatusTransitionGuard::standard(),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Create a record from a full payload
    ///
    /// # Errors
    ///
    /// `Format` or `MissingField` for a bad payload, `DuplicateKey` from
    /// the store.
    pub fn create(&self, payload: &RecordPayload) -> Result<Record, RecordError> {
        self.validator.validate(payload)?;
        let record = RecordPatch::from_payload(payload)?.into_record(Utc::now())?;
        self.store.create(record)
    }

    /// Apply a partial update to the record `id`
    ///
    /// Only fields present in the payload are validated and changed. A
    /// status change is checked against the transition table using the
    /// stored status.
    ///
    /// # Errors
    ///
    /// `Format` (including an attempt to change the identifier),
    /// `NotFound`, `IllegalTransition`, `UnknownStatus`, `DuplicateKey`.
    pub fn update(&self, id: &str, payload: &RecordPayload) -> Result<Record, RecordError> {
        self.validator.validate(payload)?;

        if let Some(new_id) = payload.get("id") {
            if new_id.trim() != id {
                return Err(RecordError::format("id", "identifier cannot be changed"));
            }
        }

        let patch = RecordPatch::from_payload(payload)?;
        let requested = payload.get("status").map(str::trim);

        // The guard sees the status the patch is applied to
        self.store
            .update_checked(id, &patch, &|current: &Record| match requested {
                Some(requested) => self.guard.can_transition(current.status.as_str(), requested),
                None => Ok(()),
            })
    }

    /// Update the record named by the payload's `id`, or create it
    ///
    /// # Errors
    ///
    /// `MissingField` if the payload has no `id`; otherwise as
    /// [`update`](Self::update) / [`create`](Self::create).
    pub fn upsert(&self, payload: &RecordPayload) -> Result<Record, RecordError> {
        self.validator.validate(payload)?;

        let id = payload
            .get("id")
            .map(str::trim)
            .ok_or_else(|| RecordError::missing_field("id"))?;

        if self.store.get(id).is_some() {
            tracing::debug!(id, "updating existing record");
            self.update(id, payload)
        } else {
            tracing::debug!(id, "creating record");
            self.create(payload)
        }
    }

    /// Upsert one numbered import row, logging the outcome
    pub fn import_row(&self, row: usize, payload: &ImportRow) -> RowOutcome {
        let result = self.upsert(payload).map(|record| record.id);

        match &result {
            Ok(id) => tracing::debug!(row, id = %id, "row imported"),
            Err(e) => tracing::warn!(row, error = %e, "row rejected"),
        }

        RowOutcome { row, result }
    }

    pub fn delete(&self, id: &str) -> Result<(), RecordError> {
        self.store.delete(id)
    }

    pub fn get(&self, id: &str) -> Result<Record, RecordError> {
        self.store.get(id).ok_or_else(|| RecordError::not_found(id))
    }

    pub fn find(&self, query: &RecordQuery) -> Vec<Record> {
        self.store.find(query)
    }
}

/// Success body: `{ "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Failure body: `{ "message": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl From<&RecordError> for MessageResponse {
    fn from(error: &RecordError) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// Turn a service result into an HTTP status and JSON body
pub fn respond<T: Serialize>(result: Result<T, RecordError>) -> (u16, serde_json::Value) {
    let encoded = match &result {
        Ok(data) => serde_json::to_value(DataResponse { data }).map(|body| (200, body)),
        Err(error) => {
            serde_json::to_value(MessageResponse::from(error)).map(|body| (error.status_code(), body))
        }
    };

    encoded.unwrap_or_else(|e| {
        (
            500,
            serde_json::json!({ "message": format!("Failed to encode response: {}", e) }),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record_store::MemoryRecordStore;
    use crate::types::StudentStatus;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Barrier;

    fn service() -> RecordService {
        RecordService::new(Arc::new(MemoryRecordStore::new()))
    }

    fn payload(id: &str, email: &str, status: &str) -> RecordPayload {
        RecordPayload::from_pairs([
            ("id", id),
            ("full_name", "Phạm Minh Châu"),
            ("date_of_birth", "2003-07-21"),
            ("gender", "Female"),
            ("faculty", "Khoa Tiếng Nhật"),
            ("course", "K2021"),
            ("program", "Chất lượng cao"),
            ("address", "Thủ Đức"),
            ("email", email),
            ("phone", "0912345678"),
            ("status", status),
        ])
    }

    fn status_only(status: &str) -> RecordPayload {
        RecordPayload::from_pairs([("status", status)])
    }

    #[test]
    fn test_create_then_get() {
        let service = service();
        let created = service
            .create(&payload("SV1", "chau@example.com", "Đang học"))
            .unwrap();

        assert_eq!(created.status, StudentStatus::Studying);
        assert_eq!(service.get("SV1").unwrap(), created);
    }

    #[test]
    fn test_create_rejects_bad_payload_before_store() {
        let service = service();
        let err = service
            .create(&payload("SV1", "not-an-email", "Đang học"))
            .unwrap_err();

        assert_eq!(err.field(), Some("email"));
        assert!(service.store().get("SV1").is_none());
    }

    #[test]
    fn test_create_requires_fields() {
        let mut partial = payload("SV1", "chau@example.com", "Đang học");
        partial.remove("program");

        let err = service().create(&partial).unwrap_err();
        assert_eq!(err, RecordError::missing_field("program"));
    }

    #[rstest]
    #[case::allowed("Bảo lưu", true)]
    #[case::same("Đang học", true)]
    #[case::graduate("Đã tốt nghiệp", true)]
    #[case::unknown("Tạm dừng học", false)]
    fn test_update_status_from_studying(#[case] status: &str, #[case] ok: bool) {
        let service = service();
        service
            .create(&payload("SV1", "chau@example.com", "Đang học"))
            .unwrap();

        assert_eq!(service.update("SV1", &status_only(status)).is_ok(), ok);
    }

    #[test]
    fn test_update_illegal_transition_leaves_record_unchanged() {
        let service = service();
        service
            .create(&payload("SV1", "chau@example.com", "Đã tốt nghiệp"))
            .unwrap();

        let mut change = status_only("Đang học");
        change.insert("phone", "0999999999");
        let err = service.update("SV1", &change).unwrap_err();

        assert_eq!(
            err,
            RecordError::illegal_transition("Đã tốt nghiệp", "Đang học")
        );
        let stored = service.get("SV1").unwrap();
        assert_eq!(stored.phone, "0912345678");
        assert_eq!(stored.status, StudentStatus::Graduated);
    }

    /// Updates racing from Đang học to a terminal and a non-terminal status
    /// never chain through the terminal one
    #[test]
    fn test_concurrent_status_updates_respect_terminal_state() {
        for _ in 0..50 {
            let service = service();
            service
                .create(&payload("SV1", "chau@example.com", "Đang học"))
                .unwrap();
            let barrier = Barrier::new(8);

            let applied: Vec<(StudentStatus, bool)> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|i| {
                        let (service, barrier) = (&service, &barrier);
                        let target = if i % 2 == 0 {
                            StudentStatus::Graduated
                        } else {
                            StudentStatus::Deferred
                        };
                        scope.spawn(move || {
                            barrier.wait();
                            let ok = service
                                .update("SV1", &status_only(target.as_str()))
                                .is_ok();
                            (target, ok)
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            let winners: Vec<StudentStatus> = applied
                .iter()
                .filter(|(_, ok)| *ok)
                .map(|(target, _)| *target)
                .collect();
            let last = service.get("SV1").unwrap().status;
            assert!(!winners.is_empty());
            assert!(
                winners.iter().all(|target| *target == last),
                "applied {:?}, stored {:?}",
                winners,
                last
            );
        }
    }

    #[test]
    fn test_import_row_reports_outcome() {
        let service = service();

        let created = service.import_row(1, &payload("SV1", "chau@example.com", "Đang học"));
        assert_eq!(created.result, Ok("SV1".to_string()));

        let rejected = service.import_row(2, &payload("SV2", "CHAU@example.com", "Đang học"));
        assert_eq!(rejected.row, 2);
        assert_eq!(rejected.result.unwrap_err().field(), Some("email"));
    }

    #[test]
    fn test_update_partial_fields_only() {
        let service = service();
        service
            .create(&payload("SV1", "chau@example.com", "Đang học"))
            .unwrap();

        let updated = service
            .update("SV1", &RecordPayload::from_pairs([("address", "Quận 1")]))
            .unwrap();
        assert_eq!(updated.address, "Quận 1");
        assert_eq!(updated.email, "chau@example.com");
    }

    #[test]
    fn test_update_cannot_change_id() {
        let service = service();
        service
            .create(&payload("SV1", "chau@example.com", "Đang học"))
            .unwrap();

        let err = service
            .update("SV1", &RecordPayload::from_pairs([("id", "SV2")]))
            .unwrap_err();
        assert_eq!(err.field(), Some("id"));
    }

    #[test]
    fn test_update_missing_record() {
        let err = service().update("SV404", &status_only("Đang học")).unwrap_err();
        assert_eq!(err, RecordError::not_found("SV404"));
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let service = service();
        service
            .upsert(&payload("SV1", "chau@example.com", "Đang học"))
            .unwrap();
        let updated = service
            .upsert(&payload("SV1", "chau@example.com", "Bảo lưu"))
            .unwrap();

        assert_eq!(updated.status, StudentStatus::Deferred);
        assert_eq!(service.find(&RecordQuery::default()).len(), 1);
    }

    #[test]
    fn test_upsert_requires_id() {
        let mut no_id = payload("SV1", "chau@example.com", "Đang học");
        no_id.remove("id");

        assert_eq!(
            service().upsert(&no_id).unwrap_err(),
            RecordError::missing_field("id")
        );
    }

    #[test]
    fn test_delete() {
        let service = service();
        service
            .create(&payload("SV1", "chau@example.com", "Đang học"))
            .unwrap();

        service.delete("SV1").unwrap();
        assert_eq!(service.get("SV1").unwrap_err(), RecordError::not_found("SV1"));
    }

    #[test]
    fn test_respond_success_envelope() {
        let (status, body) = respond(Ok(vec!["SV1"]));
        assert_eq!(status, 200);
        assert_eq!(body, json!({ "data": ["SV1"] }));
    }

    #[rstest]
    #[case(RecordError::format("phone", "too short"), 400)]
    #[case(RecordError::illegal_transition("Đã thôi học", "Đang học"), 400)]
    #[case(RecordError::duplicate_key("email", "a@b.vn"), 409)]
    #[case(RecordError::not_found("SV1"), 404)]
    fn test_respond_error_envelope(#[case] error: RecordError, #[case] expected: u16) {
        let message = error.to_string();
        let (status, body) = respond::<Record>(Err(error));

        assert_eq!(status, expected);
        assert_eq!(body, json!({ "message": message }));
    }

    #[test]
    fn test_request_body_round_trip() {
        let service = service();
        let body = json!({
            "id": "SV7",
            "full_name": "Võ Thị Dung",
            "date_of_birth": "2002-11-02",
            "gender": "Female",
            "faculty": "Khoa Tiếng Pháp",
            "course": "K2020",
            "program": "Chính quy",
            "email": "dung@example.com",
            "phone": "0934567890",
            "status": "Đình chỉ"
        });

        let result = RecordPayload::from_json_value(&body).and_then(|p| service.create(&p));
        let (status, response) = respond(result);

        assert_eq!(status, 200);
        assert_eq!(response["data"]["id"], "SV7");
        assert_eq!(response["data"]["status"], "Đình chỉ");
        assert_eq!(response["data"]["address"], "");
    }
}
