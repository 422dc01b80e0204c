/// Profile picture uploads
///
/// Uploaded files are accepted only with an image extension, renamed to a
/// filesystem-safe name and written under the configured upload directory.
/// The user record keeps just the filename.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions accepted for profile pictures (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Body limit for the multipart settings forms
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// True if `filename` has one of [`ALLOWED_EXTENSIONS`]
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Reduces a client-supplied filename to `[A-Za-z0-9._-]`
///
/// Path separators and whitespace become `_`, everything else outside the
/// set is dropped, and leading or trailing dots and underscores are trimmed.
/// Returns `None` when nothing usable is left.
pub fn secure_filename(filename: &str) -> Option<String> {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A validated file waiting to be written
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PendingUpload {
    /// Accepts a raw upload, or `None` for empty or disallowed files
    pub fn accept(raw_name: Option<&str>, bytes: Vec<u8>) -> Option<Self> {
        let filename = secure_filename(raw_name?)?;

        if bytes.is_empty() || !allowed_file(&filename) {
            debug!(filename = %filename, size = bytes.len(), "Ignoring upload");
            return None;
        }

        Some(Self { filename, bytes })
    }

    /// Writes the file into `dir`, creating the directory if needed
    pub async fn store(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;

        debug!(path = %path.display(), size = self.bytes.len(), "Stored upload");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("me.png"));
        assert!(allowed_file("me.JPEG"));
        assert!(allowed_file("archive.tar.gif"));
        assert!(!allowed_file("me.bmp"));
        assert!(!allowed_file("png"));
        assert!(!allowed_file("me."));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Photo.png").as_deref(), Some("My_Photo.png"));
        assert_eq!(secure_filename("../../etc/passwd").as_deref(), Some("etc_passwd"));
        assert_eq!(secure_filename("C:\\Users\\me\\pic.jpg").as_deref(), Some("C_Users_me_pic.jpg"));
        assert_eq!(secure_filename("café.gif").as_deref(), Some("caf.gif"));
        assert_eq!(secure_filename(".hidden.png").as_deref(), Some("hidden.png"));
        assert_eq!(secure_filename("...").as_deref(), None);
        assert_eq!(secure_filename("").as_deref(), None);
    }

    #[test]
    fn test_accept_rejects_empty_and_disallowed() {
        assert!(PendingUpload::accept(Some("me.png"), Vec::new()).is_none());
        assert!(PendingUpload::accept(Some("me.exe"), vec![1]).is_none());
        assert!(PendingUpload::accept(None, vec![1]).is_none());

        let upload = PendingUpload::accept(Some("my pic.PNG"), vec![1, 2]).unwrap();
        assert_eq!(upload.filename, "my_pic.PNG");
    }

    #[tokio::test]
    async fn test_store_writes_into_dir() {
        let dir = std::env::temp_dir().join(format!("rentease-upload-{}", unique_suffix()));
        let upload = PendingUpload::accept(Some("me.png"), b"png-bytes".to_vec()).unwrap();

        let path = upload.store(&dir).await.unwrap();
        assert_eq!(path, dir.join("me.png"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"png-bytes");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    fn unique_suffix() -> String {
        format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        )
    }
}
