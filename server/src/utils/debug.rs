//! Debug mode helper for recording compiled report queries as JSON lines

use std::path::Path;
use std::sync::LazyLock;

use chrono::Utc;
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File that receives one entry per report request in debug mode
pub const DEBUG_QUERIES_FILE: &str = "queries.jsonl";

/// Serializes appends so concurrent requests never interleave lines
static WRITE_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Serialize)]
struct DebugEntry<'a, T: Serialize> {
    timestamp: String,
    endpoint: &'a str,
    data: &'a T,
}

/// Append a debug entry to `<debug_dir>/<filename>`.
///
/// Fire-and-forget: failures are logged and never fail the request.
pub async fn write_debug<T: Serialize>(debug_dir: &Path, filename: &str, endpoint: &str, data: &T) {
    let file_path = debug_dir.join(filename);
    let entry = DebugEntry {
        timestamp: Utc::now().to_rfc3339(),
        endpoint,
        data,
    };

    let json = match serde_json::to_string(&entry) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!(error = %e, filename, "Failed to serialize debug entry");
            return;
        }
    };

    let _guard = WRITE_LOCK.lock().await;

    let result = async {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;
        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok::<_, std::io::Error>(())
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(
            error = %e,
            path = %file_path.display(),
            "Failed to write debug entry"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_debug_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let data = serde_json::json!({"filter": "country:eq:France"});

        write_debug(temp_dir.path(), DEBUG_QUERIES_FILE, "blog-views", &data).await;
        write_debug(temp_dir.path(), DEBUG_QUERIES_FILE, "top", &data).await;

        let content = std::fs::read_to_string(temp_dir.path().join(DEBUG_QUERIES_FILE)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["endpoint"], "blog-views");
        assert_eq!(first["data"]["filter"], "country:eq:France");
    }

    #[tokio::test]
    async fn test_write_debug_missing_dir_does_not_panic() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        write_debug(&missing, DEBUG_QUERIES_FILE, "top", &1).await;
        assert!(!missing.exists());
    }
}
