//! Dated, append-only record of every reasoning prompt and reply.
//!
//! One file per local day: `{dir}/llm_prompt_logs_YYYYMMDD.txt`. Writing is
//! best effort. A failed write is logged and the pipeline carries on.

use chrono::Local;
use parking_lot::Mutex;
use pantry_core::Stage;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SEPARATOR: &str = "==================================================";

/// Append-only prompt log.
///
/// Cheap to clone. File writes run on the blocking pool.
#[derive(Debug, Clone)]
pub struct PromptLog {
    inner: Arc<LogFile>,
}

#[derive(Debug)]
struct LogFile {
    dir: PathBuf,
    // Serializes appends so concurrent pipelines never interleave entries
    lock: Mutex<()>,
}

impl PromptLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(LogFile {
                dir: dir.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Today's log file.
    pub fn current_file(&self) -> PathBuf {
        self.inner.current_file()
    }

    /// Record a prompt before it is sent.
    pub async fn record_prompt(
        &self,
        stage: Stage,
        query: &str,
        context: &serde_json::Value,
        prompt: &str,
    ) {
        let context = serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
        let entry = format!(
            "\n{sep}\nTIMESTAMP: {ts}\n{stage}\nQUERY: {query}\nCONTEXT:\n{context}\n\nPROMPT:\n{prompt}\n{sep}\n",
            sep = SEPARATOR,
            ts = timestamp(),
            stage = stage,
        );
        self.append(entry).await;
    }

    /// Record the reply, or the error that replaced it.
    pub async fn record_response(&self, stage: Stage, outcome: Result<&str, &str>) {
        let body = match outcome {
            Ok(text) => format!("RESPONSE:\n{}", text),
            Err(error) => format!("ERROR:\n{}", error),
        };
        let entry = format!(
            "\n{sep}\nTIMESTAMP: {ts}\n{stage} (response)\n{body}\n{sep}\n",
            sep = SEPARATOR,
            ts = timestamp(),
            stage = stage,
        );
        self.append(entry).await;
    }

    async fn append(&self, entry: String) {
        let file = Arc::clone(&self.inner);
        match tokio::task::spawn_blocking(move || file.append(&entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(path = %self.current_file().display(), error = %e, "Failed to write prompt log");
            }
            Err(e) => tracing::warn!(error = %e, "Prompt log writer did not finish"),
        }
    }
}

impl LogFile {
    fn current_file(&self) -> PathBuf {
        self.dir
            .join(format!("llm_prompt_logs_{}.txt", Local::now().format("%Y%m%d")))
    }

    fn append(&self, entry: &str) -> io::Result<()> {
        let _guard = self.lock.lock();
        write_entry(&self.dir, &self.current_file(), entry)
    }
}

fn write_entry(dir: &Path, path: &Path, entry: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(entry.as_bytes())
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pantry-prompt-log-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_name_is_dated() {
        let log = PromptLog::new("logs");
        let name = log.current_file().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("llm_prompt_logs_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "llm_prompt_logs_YYYYMMDD.txt".len());
    }

    #[tokio::test]
    async fn test_prompt_and_response_appended() {
        let dir = scratch_dir("append");
        let log = PromptLog::new(&dir);

        log.record_prompt(
            Stage::FindRecipes,
            "chicken, rice",
            &json!({"stage": 1}),
            "full prompt",
        )
        .await;
        log.record_response(Stage::FindRecipes, Ok("model reply")).await;
        log.record_response(Stage::FindRecipes, Err("LLM analysis failed: timeout")).await;

        let contents = fs::read_to_string(log.current_file()).unwrap();
        assert!(contents.contains("Stage 1: Find Recipes"));
        assert!(contents.contains("QUERY: chicken, rice"));
        assert!(contents.contains("\"stage\": 1"));
        assert!(contents.contains("PROMPT:\nfull prompt"));
        assert!(contents.contains("RESPONSE:\nmodel reply"));
        assert!(contents.contains("ERROR:\nLLM analysis failed: timeout"));

        let prompt_at = contents.find("full prompt").unwrap();
        let reply_at = contents.find("model reply").unwrap();
        assert!(prompt_at < reply_at);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = scratch_dir("concurrent");
        let log = PromptLog::new(&dir);

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                tokio::spawn(async move {
                    let reply = format!("reply {}", i);
                    log.record_response(Stage::MissingIngredients, Ok(&reply)).await;
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let contents = fs::read_to_string(log.current_file()).unwrap();
        for i in 0..8 {
            assert!(contents.contains(&format!("RESPONSE:\nreply {}\n{}", i, SEPARATOR)));
        }
        assert_eq!(log.dir(), dir.as_path());

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_unwritable_dir_does_not_panic() {
        let dir = scratch_dir("blocked");
        fs::create_dir_all(dir.parent().unwrap()).unwrap();
        // A regular file where the directory should be
        fs::write(&dir, b"not a directory").unwrap();

        let log = PromptLog::new(&dir);
        log.record_response(Stage::SendList, Ok("ignored")).await;

        let _ = fs::remove_file(&dir);
    }
}
