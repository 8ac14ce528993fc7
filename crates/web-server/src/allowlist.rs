use crate::error::AppError;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Trims and lower-cases an address. Blank input is not an address.
pub fn normalize(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    AlreadyPresent,
    Added,
}

/// A newline-delimited list of authorized e-mail addresses on disk.
///
/// A missing file is an empty list. Appends are serialized so that two concurrent requests
/// for the same address cannot both add it.
#[derive(Debug)]
pub struct Allowlist {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Allowlist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_raw(&self) -> Result<String, AppError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(AppError::ReadAllowlist(e)),
        }
    }

    fn entries(text: &str) -> impl Iterator<Item = String> + '_ {
        text.lines().filter_map(normalize)
    }

    /// Whether the already-normalized `email` is on the list.
    pub async fn contains(&self, email: &str) -> Result<bool, AppError> {
        let text = self.read_raw().await?;
        Ok(Self::entries(&text).any(|entry| entry == email))
    }

    /// Adds the already-normalized `email` unless it is present.
    pub async fn append(&self, email: &str) -> Result<AppendOutcome, AppError> {
        let _guard = self.write_lock.lock().await;

        let text = self.read_raw().await?;
        if Self::entries(&text).any(|entry| entry == email) {
            return Ok(AppendOutcome::AlreadyPresent);
        }

        let separator = if text.is_empty() || text.ends_with('\n') { "" } else { "\n" };
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(AppError::AppendAllowlist)?;
        file.write_all(format!("{separator}{email}\n").as_bytes())
            .await
            .map_err(AppError::AppendAllowlist)?;
        file.flush().await.map_err(AppError::AppendAllowlist)?;

        tracing::info!(email, "Added address to the allow-list.");
        Ok(AppendOutcome::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(
            normalize("  Jane.Doe@Example.COM \r"),
            Some("jane.doe@example.com".to_string())
        );
        assert_eq!(normalize("   "), None);
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let list = Allowlist::new(dir.path().join("emails.csv"));
        assert!(!list.contains("a@b.c").await.unwrap());
    }

    #[tokio::test]
    async fn append_is_idempotent_and_keeps_one_entry_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emails.csv");
        std::fs::write(&path, "First@Example.com").unwrap();
        let list = Allowlist::new(&path);

        assert_eq!(list.append("first@example.com").await.unwrap(), AppendOutcome::AlreadyPresent);
        assert_eq!(list.append("second@example.com").await.unwrap(), AppendOutcome::Added);
        assert_eq!(list.append("second@example.com").await.unwrap(), AppendOutcome::AlreadyPresent);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "First@Example.com\nsecond@example.com\n");
        assert!(list.contains("second@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn unreadable_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let list = Allowlist::new(dir.path());
        assert!(matches!(list.contains("a@b.c").await, Err(AppError::ReadAllowlist(_))));
    }
}
