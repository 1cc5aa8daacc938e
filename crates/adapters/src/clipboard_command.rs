//! Clipboard adapter that shells out to a platform command

use async_trait::async_trait;
use opensesame_domain::{Clipboard, ClipboardError, Password};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Clipboard backed by a command that reads the new contents from stdin,
/// such as `wl-copy`, `xclip -selection clipboard` or `pbcopy`.
pub struct CommandClipboard {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandClipboard {
    pub fn new(command: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command,
            args,
            timeout,
        }
    }

    async fn pipe(&self, contents: &str) -> Result<(), ClipboardError> {
        let mut command = Command::new(&self.command);
        command.args(&self.args);
        command.stdin(Stdio::piped());
        command.stdout(Stdio::null());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            ClipboardError::Unavailable(format!("Failed to spawn {}: {}", self.command, e))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(contents.as_bytes())
                .await
                .map_err(|e| ClipboardError::Command(format!("Failed to write to stdin: {}", e)))?;
            // Dropping stdin closes the pipe so the command sees EOF.
        }

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(result) => result.map_err(|e| ClipboardError::Command(e.to_string()))?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(ClipboardError::Timeout);
            }
        };

        if !status.success() {
            let mut stderr_bytes = Vec::new();
            if let Some(mut stderr) = child.stderr.take() {
                let _ = stderr.read_to_end(&mut stderr_bytes).await;
            }
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ClipboardError::Command(format!(
                "{} exited with {}: {}",
                self.command,
                status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn copy(&self, password: &Password) -> Result<(), ClipboardError> {
        self.pipe(password.as_str()).await
    }

    async fn clear(&self) -> Result<(), ClipboardError> {
        self.pipe("").await
    }

    fn name(&self) -> &str {
        &self.command
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use opensesame_domain::PolicyFlags;
    use tempfile::TempDir;

    fn password() -> Password {
        let flags = PolicyFlags::new(true, false, true, false);
        opensesame_domain::generate(flags, "email", "correcthorse").expect("valid input")
    }

    fn shell(script: String) -> CommandClipboard {
        CommandClipboard::new(
            "sh".to_string(),
            vec!["-c".to_string(), script],
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_copy_pipes_password_to_stdin() {
        let dir = TempDir::new().expect("temp dir");
        let target = dir.path().join("clipboard.txt");
        let clipboard = shell(format!("cat > '{}'", target.display()));

        clipboard.copy(&password()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "pvup6trvty");

        clipboard.clear().await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let clipboard = CommandClipboard::new(
            "opensesame-no-such-clipboard".to_string(),
            vec![],
            Duration::from_secs(5),
        );

        let result = clipboard.copy(&password()).await;
        assert!(matches!(result, Err(ClipboardError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_failing_command_reports_stderr() {
        let clipboard = shell("cat > /dev/null; echo 'no display' >&2; exit 3".to_string());

        let result = clipboard.copy(&password()).await;
        match result {
            Err(ClipboardError::Command(message)) => assert!(message.contains("no display")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_command_times_out() {
        let clipboard = CommandClipboard::new(
            "sh".to_string(),
            vec!["-c".to_string(), "sleep 5".to_string()],
            Duration::from_millis(100),
        );

        let result = clipboard.copy(&password()).await;
        assert!(matches!(result, Err(ClipboardError::Timeout)));
    }
}
