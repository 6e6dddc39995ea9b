use std::sync::Arc;

use chrono::{Local, TimeZone};

use super::common::{body, payload, MemoryRepository, UnavailableRepository};
use crate::registrations::{
    IntakeError, RegistrationId, RegistrationService, RegistrationServiceError,
    RegistrationStatus, RepositoryError, SqliteRegistrationStore,
};

#[tokio::test]
async fn submit_persists_pending_registration_with_encoded_partners() {
    let repository = Arc::new(MemoryRepository::default());
    let service = RegistrationService::new(Arc::clone(&repository));

    let id = service
        .submit(&body(&payload(" Ana@Example.COM ")))
        .await
        .expect("submission accepted");

    let rows = repository.rows();
    assert_eq!(rows.len(), 1);
    let stored = &rows[0];
    assert_eq!(stored.id, id);
    assert_eq!(stored.email, "ana@example.com");
    assert_eq!(stored.status, RegistrationStatus::Pending);
    assert!(stored.terms_accepted);
    assert_eq!(stored.partner_companies(), vec!["Beta, S.A.", "Gama"]);
}

#[tokio::test]
async fn submit_rejects_missing_field_without_touching_repository() {
    let repository = Arc::new(MemoryRepository::default());
    let service = RegistrationService::new(Arc::clone(&repository));

    let mut incomplete = payload("ana@example.com");
    incomplete["telefone"] = serde_json::Value::String("   ".to_string());

    let error = service.submit(&body(&incomplete)).await.unwrap_err();
    assert!(matches!(
        error,
        RegistrationServiceError::Intake(IntakeError::MissingField("telefone"))
    ));
    assert!(repository.rows().is_empty());
}

#[tokio::test]
async fn duplicate_email_surfaces_conflict() {
    let store = Arc::new(SqliteRegistrationStore::in_memory().await.expect("store"));
    let service = RegistrationService::new(store);

    service
        .submit(&body(&payload("ana@example.com")))
        .await
        .expect("first submission");
    let error = service
        .submit(&body(&payload("ANA@example.com")))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        RegistrationServiceError::Repository(RepositoryError::Conflict)
    ));
    assert_eq!(service.list().await.expect("list").len(), 1);
}

#[tokio::test]
async fn invalid_status_leaves_row_unchanged() {
    let repository = Arc::new(MemoryRepository::default());
    let service = RegistrationService::new(Arc::clone(&repository));
    let id = service
        .submit(&body(&payload("ana@example.com")))
        .await
        .expect("submission accepted");

    let error = service.set_status(id, "archived").await.unwrap_err();
    assert!(matches!(error, RegistrationServiceError::InvalidStatus(_)));
    assert_eq!(repository.rows()[0].status, RegistrationStatus::Pending);

    let status = service.set_status(id, "aprovado").await.expect("valid status");
    assert_eq!(status, RegistrationStatus::Approved);
    assert_eq!(repository.rows()[0].status, RegistrationStatus::Approved);
}

#[tokio::test]
async fn review_operations_on_unknown_id_report_not_found() {
    let service = RegistrationService::new(Arc::new(MemoryRepository::default()));

    let status = service
        .set_status(RegistrationId(404), "rejeitado")
        .await
        .unwrap_err();
    let notes = service
        .set_notes(RegistrationId(404), "sem retorno")
        .await
        .unwrap_err();

    assert!(matches!(
        status,
        RegistrationServiceError::Repository(RepositoryError::NotFound)
    ));
    assert!(matches!(
        notes,
        RegistrationServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn notes_replace_previous_text() {
    let repository = Arc::new(MemoryRepository::default());
    let service = RegistrationService::new(Arc::clone(&repository));
    let id = service
        .submit(&body(&payload("ana@example.com")))
        .await
        .expect("submission accepted");

    service.set_notes(id, "ligar segunda").await.expect("notes");
    service.set_notes(id, "").await.expect("cleared notes");

    assert_eq!(repository.rows()[0].notes, "");
}

#[tokio::test]
async fn export_lists_header_and_rows_newest_first() {
    let store = Arc::new(SqliteRegistrationStore::in_memory().await.expect("store"));
    let service = RegistrationService::new(store);
    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        service
            .submit(&body(&payload(email)))
            .await
            .expect("submission accepted");
    }

    let at = Local
        .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
        .single()
        .expect("unambiguous local time");
    let export = service.export(at).await.expect("export");

    assert_eq!(export.filename, "cadastros_20240305_140709.csv");
    let lines: Vec<&str> = export.body.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("id,nome,email,telefone,cnpj"));
    assert!(lines[1].contains("c@example.com"));
    assert!(lines[3].contains("a@example.com"));
}

#[tokio::test]
async fn export_without_rows_is_a_single_blank_line() {
    let service = RegistrationService::new(Arc::new(MemoryRepository::default()));
    let export = service.export(Local::now()).await.expect("export");
    assert_eq!(export.body, "\r\n");
}

#[tokio::test]
async fn unavailable_store_propagates() {
    let service = RegistrationService::new(Arc::new(UnavailableRepository));
    let error = service
        .submit(&body(&payload("ana@example.com")))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        RegistrationServiceError::Repository(RepositoryError::Unavailable(_))
    ));
}
