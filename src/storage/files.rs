//! On-disk storage for worker documents.
//!
//! Files are named `<company_id>/<rut>_<kind><ext>` inside the uploads
//! directory, so a new upload of the same kind replaces the previous one.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::config::UploadsConfig;
use crate::domain::DocumentKind;
use crate::error::{HrError, HrResult};

/// Writes worker documents below a root directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    max_bytes: usize,
}

impl DocumentStore {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            root: PathBuf::from(&config.dir),
            max_bytes: config.max_file_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store a document and return the path it was written to.
    pub async fn save(
        &self,
        company_id: Uuid,
        rut: &str,
        kind: DocumentKind,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> HrResult<String> {
        if bytes.is_empty() {
            return Err(HrError::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(HrError::PayloadTooLarge(format!(
                "Files are limited to {} bytes",
                self.max_bytes
            )));
        }

        let dir = self.root.join(company_id.to_string());
        let file_name = format!("{}_{}{}", rut, kind, extension_of(original_name));
        let target = dir.join(&file_name);

        fs::create_dir_all(&dir).await?;

        // Write next to the target, then rename over it.
        let partial = dir.join(format!("{}.partial", file_name));
        fs::write(&partial, bytes).await?;
        if let Err(e) = fs::rename(&partial, &target).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::debug!(path = %target.display(), size = bytes.len(), "Stored worker document");
        Ok(path_string(&target))
    }

    /// Remove a document replaced by an upload stored under another name.
    ///
    /// Only paths below the uploads root are touched. A missing file is not an error.
    pub async fn discard(&self, previous: &str, current: &str) {
        if previous == current || !Path::new(previous).starts_with(&self.root) {
            return;
        }
        match fs::remove_file(previous).await {
            Ok(()) => tracing::debug!(path = %previous, "Removed replaced worker document"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %previous, error = %e, "Failed to remove replaced worker document"),
        }
    }
}

/// Extension of the uploaded file name, lowercased, with its dot.
///
/// Anything that is not a short alphanumeric extension is dropped.
fn extension_of(original_name: Option<&str>) -> String {
    original_name
        .map(Path::new)
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path, max_bytes: usize) -> DocumentStore {
        DocumentStore::new(&UploadsConfig {
            dir: dir.to_string_lossy().into_owned(),
            max_file_bytes: max_bytes,
        })
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Some("CV Ana.PDF")), ".pdf");
        assert_eq!(extension_of(Some("scan.tar.gz")), ".gz");
        assert_eq!(extension_of(Some("noext")), "");
        assert_eq!(extension_of(Some("evil.p$p")), "");
        assert_eq!(extension_of(None), "");
    }

    #[tokio::test]
    async fn test_save_names_file_by_rut_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), 1024);
        let company_id = Uuid::new_v4();

        let path = store
            .save(company_id, "12345678-5", DocumentKind::AfpCertificate, Some("certificado.pdf"), b"%PDF-1.4")
            .await
            .unwrap();
        assert!(path.ends_with(&format!("{}/12345678-5_afp_certificate.pdf", company_id)));
        assert_eq!(fs::read(&path).await.unwrap(), b"%PDF-1.4");

        // A second upload of the same kind replaces the first.
        store
            .save(company_id, "12345678-5", DocumentKind::AfpCertificate, Some("otro.pdf"), b"v2")
            .await
            .unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_rejects_oversized_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), 4);

        let company_id = Uuid::new_v4();

        let too_big = store.save(company_id, "1-9", DocumentKind::Cv, Some("cv.pdf"), b"12345").await;
        assert!(matches!(too_big, Err(HrError::PayloadTooLarge(_))));

        let empty = store.save(company_id, "1-9", DocumentKind::Cv, Some("cv.pdf"), b"").await;
        assert!(matches!(empty, Err(HrError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_same_rut_in_two_companies_is_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), 1024);

        let a = store
            .save(Uuid::new_v4(), "11111111-1", DocumentKind::Cv, Some("cv.pdf"), b"A")
            .await
            .unwrap();
        let b = store
            .save(Uuid::new_v4(), "11111111-1", DocumentKind::Cv, Some("cv.pdf"), b"B")
            .await
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(fs::read(&a).await.unwrap(), b"A");
        assert_eq!(fs::read(&b).await.unwrap(), b"B");
    }

    #[tokio::test]
    async fn test_discard_removes_replaced_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), 1024);
        let company_id = Uuid::new_v4();

        let pdf = store
            .save(company_id, "1-9", DocumentKind::Cv, Some("cv.pdf"), b"old")
            .await
            .unwrap();
        let docx = store
            .save(company_id, "1-9", DocumentKind::Cv, Some("cv.docx"), b"new")
            .await
            .unwrap();

        store.discard(&docx, &docx).await;
        assert!(fs::metadata(&docx).await.is_ok());

        store.discard(&pdf, &docx).await;
        assert!(fs::metadata(&pdf).await.is_err());
        assert!(fs::metadata(&docx).await.is_ok());

        // Already gone, and outside the root.
        store.discard(&pdf, &docx).await;
        store.discard("/nonexistent/1-9_cv.pdf", &docx).await;
    }
}
