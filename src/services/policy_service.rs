use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::policy::{Policy, PolicyInput};
use crate::database::policies;
use crate::services::storage::{ObjectStorage, StorageError};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Policy not found with id {0}")]
    NotFound(i64),

    #[error("Policy creation failed. Rolled back.")]
    CreationFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to upload policy documents")]
    UploadFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// One file received for a document slot
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The four optional document slots a policy can carry. Slot tags are fixed
/// and become part of the storage path.
#[derive(Debug, Default)]
pub struct PolicyDocuments {
    pub contract: Option<DocumentUpload>,
    pub terms: Option<DocumentUpload>,
    pub claim_form: Option<DocumentUpload>,
    pub annexure: Option<DocumentUpload>,
}

impl PolicyDocuments {
    /// Assign an upload to the slot named by `tag`. Unknown tags are ignored
    /// so stray multipart fields do not fail the request.
    pub fn insert(&mut self, tag: &str, upload: DocumentUpload) {
        match tag {
            "contract" => self.contract = Some(upload),
            "terms" => self.terms = Some(upload),
            "claim_form" => self.claim_form = Some(upload),
            "annexure" => self.annexure = Some(upload),
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contract.is_none()
            && self.terms.is_none()
            && self.claim_form.is_none()
            && self.annexure.is_none()
    }
}

/// Suffix of the original file name from the last `.` inclusive, empty when
/// the name has no extension.
fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => "",
    }
}

/// Storage path for one attachment. The policy id must already be
/// store-assigned because it anchors the object's directory.
fn object_path(policy_id: i64, tag: &str, file_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    format!(
        "policies/{}/{}_{}{}",
        policy_id,
        tag,
        millis,
        file_extension(file_name)
    )
}

/// Upload every populated, non-empty slot sequentially and attach the
/// returned public URLs to the in-memory policy. On failure, URLs attached
/// so far remain set; the caller decides whether the record is persisted.
async fn attach_documents<S: ObjectStorage>(
    storage: &S,
    policy: &mut Policy,
    documents: PolicyDocuments,
) -> Result<(), StorageError> {
    let policy_id = policy.id;
    let slots: [(&str, Option<DocumentUpload>, &mut Option<String>); 4] = [
        ("contract", documents.contract, &mut policy.contract_url),
        ("terms", documents.terms, &mut policy.terms_url),
        ("claim_form", documents.claim_form, &mut policy.claim_form_url),
        ("annexure", documents.annexure, &mut policy.annexure_url),
    ];

    for (tag, upload, url_slot) in slots {
        let Some(upload) = upload else { continue };
        if upload.bytes.is_empty() {
            continue;
        }

        let path = object_path(policy_id, tag, &upload.file_name);
        let url = storage.upload(&path, upload.bytes).await?;
        *url_slot = Some(url);
    }

    Ok(())
}

/// Policy persistence and document ingestion.
pub struct PolicyService<S: ObjectStorage> {
    pool: PgPool,
    storage: S,
}

impl<S: ObjectStorage> PolicyService<S> {
    pub fn new(pool: PgPool, storage: S) -> Self {
        Self { pool, storage }
    }

    /// Create a policy and its documents as one unit of work.
    ///
    /// The record is inserted first so uploads can derive paths from the
    /// store-assigned id, then re-persisted with whatever URLs were
    /// attached. Both persists share a transaction: any failure rolls them
    /// back and surfaces as `CreationFailed`. Remote objects uploaded before
    /// the fault are not removed.
    pub async fn create_policy_with_documents(
        &self,
        input: PolicyInput,
        documents: PolicyDocuments,
    ) -> Result<Policy, PolicyError> {
        let result: Result<Policy, Box<dyn std::error::Error + Send + Sync>> = async {
            let mut tx = self.pool.begin().await?;

            let mut policy = policies::insert_policy(&mut *tx, &input).await?;
            attach_documents(&self.storage, &mut policy, documents).await?;
            let saved = policies::update_policy(&mut *tx, &policy).await?;

            tx.commit().await?;
            Ok(saved)
        }
        .await;

        match result {
            Ok(policy) => {
                info!("Created policy id={} with documents", policy.id);
                Ok(policy)
            }
            Err(cause) => Err(PolicyError::CreationFailed(cause)),
        }
    }

    /// Attach documents to an existing policy, without the create-then-
    /// rollback guarantee: a failure leaves the record in whatever state the
    /// preceding uploads produced.
    pub async fn upload_documents(
        &self,
        id: i64,
        documents: PolicyDocuments,
    ) -> Result<Policy, PolicyError> {
        let mut policy = policies::find_policy(&self.pool, id)
            .await?
            .ok_or(PolicyError::NotFound(id))?;

        let result: Result<Policy, Box<dyn std::error::Error + Send + Sync>> = async {
            attach_documents(&self.storage, &mut policy, documents).await?;
            Ok(policies::update_policy(&self.pool, &policy).await?)
        }
        .await;

        result.map_err(PolicyError::UploadFailed)
    }

    pub async fn get_policy(&self, id: i64) -> Result<Policy, PolicyError> {
        policies::find_policy(&self.pool, id)
            .await?
            .ok_or(PolicyError::NotFound(id))
    }

    pub async fn get_all_policies(&self) -> Result<Vec<Policy>, PolicyError> {
        Ok(policies::list_policies(&self.pool).await?)
    }

    pub async fn get_active_policies(&self) -> Result<Vec<Policy>, PolicyError> {
        Ok(policies::list_policies_by_status(&self.pool, "Active").await?)
    }

    /// Replace the business fields of a policy; document URLs are untouched.
    pub async fn update_policy(&self, id: i64, input: PolicyInput) -> Result<Policy, PolicyError> {
        let mut policy = policies::find_policy(&self.pool, id)
            .await?
            .ok_or(PolicyError::NotFound(id))?;

        policy.policy_number = input.policy_number;
        policy.policy_name = input.policy_name;
        policy.policy_type = input.policy_type;
        policy.provider_name = input.provider_name;
        policy.coverage_amount = input.coverage_amount;
        policy.monthly_premium = input.monthly_premium;
        policy.start_date = input.start_date;
        policy.renewal_date = input.renewal_date;
        policy.policy_status = input.policy_status;
        policy.policy_description = input.policy_description;

        Ok(policies::update_policy(&self.pool, &policy).await?)
    }

    pub async fn delete_policy(&self, id: i64) -> Result<(), PolicyError> {
        if !policies::delete_policy(&self.pool, id).await? {
            return Err(PolicyError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records uploaded paths and returns deterministic public URLs; can be
    /// told to fail from a given upload onward.
    #[derive(Default)]
    struct MockStorage {
        uploads: Mutex<Vec<String>>,
        fail_after: Option<usize>,
    }

    impl MockStorage {
        fn failing_after(count: usize) -> Self {
            Self {
                uploads: Mutex::new(Vec::new()),
                fail_after: Some(count),
            }
        }

        fn uploaded_paths(&self) -> Vec<String> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectStorage for MockStorage {
        async fn upload(&self, path: &str, _bytes: Vec<u8>) -> Result<String, StorageError> {
            let mut uploads = self.uploads.lock().unwrap();
            if let Some(limit) = self.fail_after {
                if uploads.len() >= limit {
                    return Err(StorageError::UploadRejected(
                        reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    ));
                }
            }
            uploads.push(path.to_string());
            Ok(format!("https://storage.test/public/{}", path))
        }
    }

    fn policy(id: i64) -> Policy {
        Policy {
            id,
            policy_number: "PN-100".to_string(),
            policy_name: "Group Health".to_string(),
            policy_type: "Health".to_string(),
            provider_name: "Acme Mutual".to_string(),
            coverage_amount: "500000".parse().unwrap(),
            monthly_premium: "129.50".parse().unwrap(),
            start_date: "2026-01-01".parse().unwrap(),
            renewal_date: "2027-01-01".parse().unwrap(),
            policy_status: "Active".to_string(),
            policy_description: None,
            contract_url: None,
            terms_url: None,
            claim_form_url: None,
            annexure_url: None,
        }
    }

    fn upload(name: &str) -> DocumentUpload {
        DocumentUpload {
            file_name: name.to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    #[test]
    fn extension_is_taken_from_the_last_dot() {
        assert_eq!(file_extension("contract.pdf"), ".pdf");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("no_extension"), "");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn object_path_embeds_id_tag_and_extension() {
        let path = object_path(7, "contract", "signed copy.pdf");
        assert!(path.starts_with("policies/7/contract_"));
        assert!(path.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn populated_slots_upload_and_attach_urls() {
        let storage = MockStorage::default();
        let mut policy = policy(7);
        let documents = PolicyDocuments {
            contract: Some(upload("contract.pdf")),
            claim_form: Some(upload("claim_form.docx")),
            ..Default::default()
        };

        attach_documents(&storage, &mut policy, documents)
            .await
            .unwrap();

        let paths = storage.uploaded_paths();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].starts_with("policies/7/contract_"));
        assert!(paths[1].starts_with("policies/7/claim_form_"));

        assert!(policy.contract_url.as_deref().unwrap().contains("policies/7/contract_"));
        assert!(policy.claim_form_url.is_some());
        assert!(policy.terms_url.is_none());
        assert!(policy.annexure_url.is_none());
    }

    #[tokio::test]
    async fn empty_files_are_skipped() {
        let storage = MockStorage::default();
        let mut policy = policy(4);
        let documents = PolicyDocuments {
            terms: Some(DocumentUpload {
                file_name: "terms.pdf".to_string(),
                bytes: Vec::new(),
            }),
            ..Default::default()
        };

        attach_documents(&storage, &mut policy, documents)
            .await
            .unwrap();

        assert!(storage.uploaded_paths().is_empty());
        assert!(policy.terms_url.is_none());
    }

    #[tokio::test]
    async fn a_failed_upload_keeps_earlier_urls_and_halts() {
        let storage = MockStorage::failing_after(1);
        let mut policy = policy(9);
        let documents = PolicyDocuments {
            contract: Some(upload("contract.pdf")),
            terms: Some(upload("terms.pdf")),
            annexure: Some(upload("annexure.pdf")),
            ..Default::default()
        };

        let result = attach_documents(&storage, &mut policy, documents).await;

        assert!(matches!(result, Err(StorageError::UploadRejected(_))));
        // First slot succeeded before the fault; later slots were not tried
        assert_eq!(storage.uploaded_paths().len(), 1);
        assert!(policy.contract_url.is_some());
        assert!(policy.terms_url.is_none());
        assert!(policy.annexure_url.is_none());
    }

    #[test]
    fn document_slots_fill_by_tag_and_ignore_unknown_tags() {
        let mut documents = PolicyDocuments::default();
        assert!(documents.is_empty());

        documents.insert("annexure", upload("annexure.pdf"));
        documents.insert("signature", upload("sig.png"));

        assert!(!documents.is_empty());
        assert!(documents.annexure.is_some());
        assert!(documents.contract.is_none());
    }
}
