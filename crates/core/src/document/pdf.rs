//! PDF conversion through a headless Chrome/Chromium subprocess.
//!
//! Each conversion launches its own browser with a throwaway profile
//! directory, so requests never share browser state. A semaphore bounds how
//! many browsers run at once and a timeout kills stuck ones.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Semaphore;

/// Executable names tried on `PATH` when no browser is configured.
pub const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Errors from a single PDF conversion.
#[derive(Debug, Error)]
pub enum PdfError {
    /// No usable browser executable.
    #[error("Chrome/Chromium not found; set pdf.chrome_path or install a browser")]
    BrowserNotFound,

    /// The browser could not be started.
    #[error("Failed to launch browser: {0}")]
    Launch(#[source] std::io::Error),

    /// The browser ran past the configured timeout and was killed.
    #[error("PDF rendering timed out after {0} seconds")]
    Timeout(u64),

    /// The browser exited unsuccessfully.
    #[error("Browser exited with {status}: {stderr}")]
    BrowserFailed {
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The browser reported success but wrote no PDF.
    #[error("Browser produced no PDF output")]
    EmptyOutput,

    /// Scratch directory or output file handling failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The concurrency limiter was shut down.
    #[error("PDF converter is shutting down")]
    Closed,
}

/// Turns a page URL into PDF bytes.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    /// Loads `url` and prints it to PDF.
    async fn convert(&self, url: &str) -> Result<Vec<u8>, PdfError>;
}

/// Settings for [`ChromePdfConverter`].
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Explicit browser executable. `PATH` is searched when unset.
    pub executable: Option<PathBuf>,
    /// Time allowed for one conversion.
    pub timeout: Duration,
    /// Maximum browsers running at once.
    pub max_concurrent: usize,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            executable: None,
            timeout: Duration::from_secs(60),
            max_concurrent: 2,
        }
    }
}

/// Headless Chrome/Chromium converter.
#[derive(Debug, Clone)]
pub struct ChromePdfConverter {
    options: ChromeOptions,
    permits: Arc<Semaphore>,
}

impl ChromePdfConverter {
    /// Creates a converter. The browser is located lazily on each call.
    #[must_use]
    pub fn new(options: ChromeOptions) -> Self {
        let permits = Arc::new(Semaphore::new(options.max_concurrent.max(1)));
        Self { options, permits }
    }

    /// Resolves the browser executable: configured path first, then `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `BrowserNotFound` if nothing usable exists.
    pub fn locate_browser(&self) -> Result<PathBuf, PdfError> {
        if let Some(path) = &self.options.executable {
            return if path.is_file() {
                Ok(path.clone())
            } else {
                Err(PdfError::BrowserNotFound)
            };
        }
        let path_var = std::env::var_os("PATH").ok_or(PdfError::BrowserNotFound)?;
        find_on_path(&path_var, BROWSER_CANDIDATES).ok_or(PdfError::BrowserNotFound)
    }

    fn browser_args(profile_dir: &Path, output: &Path, url: &str) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--no-first-run".to_string(),
            "--no-pdf-header-footer".to_string(),
            "--run-all-compositor-stages-before-draw".to_string(),
            format!("--user-data-dir={}", profile_dir.display()),
            format!("--print-to-pdf={}", output.display()),
            url.to_string(),
        ]
    }
}

/// Searches each directory of a `PATH`-style value for the first candidate.
fn find_on_path(path_var: &std::ffi::OsStr, candidates: &[&str]) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = std::env::split_paths(path_var).collect();
    candidates.iter().find_map(|name| {
        dirs.iter().find_map(|dir| {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
            let exe = dir.join(format!("{name}.exe"));
            exe.is_file().then_some(exe)
        })
    })
}

#[async_trait]
impl PdfConverter for ChromePdfConverter {
    async fn convert(&self, url: &str) -> Result<Vec<u8>, PdfError> {
        let browser = self.locate_browser()?;
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PdfError::Closed)?;

        let profile = tempfile::Builder::new().prefix("invoicer-pdf-").tempdir()?;
        let output = profile.path().join("out.pdf");
        let args = Self::browser_args(profile.path(), &output, url);

        tracing::debug!(
            browser = %browser.display(),
            url = %url,
            timeout_secs = self.options.timeout.as_secs(),
            "Launching headless browser"
        );

        let mut cmd = Command::new(&browser);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(PdfError::Launch)?;
        let result = tokio::time::timeout(self.options.timeout, child.wait_with_output())
            .await
            .map_err(|_| PdfError::Timeout(self.options.timeout.as_secs()))??;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            tracing::error!(
                browser = %browser.display(),
                status = %result.status,
                stderr = %stderr,
                "Headless browser failed"
            );
            return Err(PdfError::BrowserFailed {
                status: result.status.to_string(),
                stderr,
            });
        }

        let bytes = read_output(&output).await.inspect_err(|e| {
            tracing::error!(output = %output.display(), error = %e, "Reading PDF output failed");
        })?;

        tracing::debug!(url = %url, size = bytes.len(), "PDF rendered");
        Ok(bytes)
    }
}

/// Reads the file the browser printed to. A missing or empty file means the
/// browser gave up without an error status.
async fn read_output(path: &Path) -> Result<Vec<u8>, PdfError> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => Err(PdfError::EmptyOutput),
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PdfError::EmptyOutput),
        Err(e) => Err(PdfError::Io(e)),
    }
}

/// Builds a safe attachment filename from a user-supplied label.
#[must_use]
pub fn attachment_filename(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | ' ') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "invoice.pdf".to_string()
    } else {
        format!("{trimmed}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Invoice-250114A", "Invoice-250114A.pdf")]
    #[case("../etc/passwd", "_etc_passwd.pdf")]
    #[case("a\"b\r\nc", "a_b__c.pdf")]
    #[case("   ", "invoice.pdf")]
    fn test_attachment_filename(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(attachment_filename(label), expected);
    }

    #[test]
    fn test_configured_browser_must_exist() {
        let converter = ChromePdfConverter::new(ChromeOptions {
            executable: Some(PathBuf::from("/definitely/not/here/chrome")),
            ..ChromeOptions::default()
        });
        assert!(matches!(
            converter.locate_browser(),
            Err(PdfError::BrowserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_missing_browser_is_reported_per_request() {
        let converter = ChromePdfConverter::new(ChromeOptions {
            executable: Some(PathBuf::from("/definitely/not/here/chrome")),
            ..ChromeOptions::default()
        });
        let result = converter.convert("http://127.0.0.1:5000/api/invoices/1/preview").await;
        assert!(matches!(result, Err(PdfError::BrowserNotFound)));
    }

    #[tokio::test]
    async fn test_read_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");

        assert!(matches!(read_output(&output).await, Err(PdfError::EmptyOutput)));

        std::fs::write(&output, b"").unwrap();
        assert!(matches!(read_output(&output).await, Err(PdfError::EmptyOutput)));

        std::fs::write(&output, b"%PDF-1.4").unwrap();
        assert_eq!(read_output(&output).await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_read_output_surfaces_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory fails with something other than NotFound.
        let result = read_output(dir.path()).await;
        assert!(matches!(result, Err(PdfError::Io(_))), "{result:?}");
    }

    #[test]
    fn test_find_on_path_picks_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("google-chrome"), b"").unwrap();
        std::fs::write(dir.path().join("chromium"), b"").unwrap();

        let found = find_on_path(dir.path().as_os_str(), BROWSER_CANDIDATES).unwrap();
        assert_eq!(found, dir.path().join("chromium"));
    }

    #[test]
    fn test_find_on_path_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_on_path(dir.path().as_os_str(), BROWSER_CANDIDATES).is_none());
    }

    #[test]
    fn test_browser_args_isolate_profile() {
        let args = ChromePdfConverter::browser_args(
            Path::new("/tmp/profile"),
            Path::new("/tmp/profile/out.pdf"),
            "http://127.0.0.1:5000/api/invoices/3/preview",
        );
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert!(args.contains(&"--print-to-pdf=/tmp/profile/out.pdf".to_string()));
        assert_eq!(
            args.last().map(String::as_str),
            Some("http://127.0.0.1:5000/api/invoices/3/preview")
        );
    }
}
