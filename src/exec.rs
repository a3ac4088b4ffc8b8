//! Subprocess execution with bounded output capture.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub max_buffer: usize,
    pub timeout: Option<Duration>,
}

/// Runs `program` with `args` (no shell) and returns its stdout.
///
/// Stderr is captured separately and only used to describe a nonzero exit.
pub async fn execute(program: &str, args: &[OsString], opts: &ExecOptions) -> Result<String> {
    let command = command_line(program, args);
    debug!("executing command: {command} max_buffer={}", opts.max_buffer);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| Error::Spawn {
            command: command.clone(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let max_buffer = opts.max_buffer;

    let run = async move {
        // Both pipes are drained together so a chatty stderr can't stall the
        // child while we wait on stdout.
        let (out, err) = tokio::join!(
            read_bounded(stdout, max_buffer),
            read_bounded(stderr, max_buffer)
        );
        let status = child.wait().await;
        (out, err, status)
    };

    let (out, err, status) = match opts.timeout {
        Some(limit) => match tokio::time::timeout(limit, run).await {
            Ok(res) => res,
            Err(_) => {
                return Err(Error::Timeout {
                    command,
                    secs: limit.as_secs(),
                });
            }
        },
        None => run.await,
    };

    let status = status.map_err(|e| Error::io(format!("waiting for {command}"), e))?;
    let out = out.map_err(|e| Error::io(format!("reading stdout of {command}"), e))?;
    let err = err.map_err(|e| Error::io(format!("reading stderr of {command}"), e))?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&err.bytes);
        return Err(exit_error(status, stderr.trim_end(), command));
    }

    if out.overflowed {
        return Err(Error::OutputLimit {
            command,
            max_buffer,
        });
    }

    if !err.bytes.is_empty() {
        debug!(
            "stderr from {command}: {}",
            String::from_utf8_lossy(&err.bytes).trim()
        );
    }

    Ok(String::from_utf8_lossy(&out.bytes).into_owned())
}

fn exit_error(status: ExitStatus, stderr: &str, command: String) -> Error {
    let exit_code = status.code();
    let signal = exit_signal(&status);
    let message = if !stderr.is_empty() {
        stderr.to_string()
    } else {
        let code = exit_code.map_or_else(|| "none".to_string(), |c| c.to_string());
        match signal {
            Some(sig) => format!("Process exited with code {code} (signal: {sig})"),
            None => format!("Process exited with code {code}"),
        }
    };
    Error::Subprocess {
        message,
        command,
        exit_code,
        signal,
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Program and arguments joined by spaces, for diagnostics only.
pub fn command_line(program: &str, args: &[OsString]) -> String {
    let mut line = program.to_string();
    for a in args {
        line.push(' ');
        line.push_str(&a.to_string_lossy());
    }
    line
}

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    overflowed: bool,
}

/// Reads to EOF, keeping at most `limit` bytes. Bytes past the limit are
/// still drained so the writer never blocks on a full pipe.
async fn read_bounded<R: AsyncRead + Unpin>(
    reader: Option<R>,
    limit: usize,
) -> std::io::Result<Captured> {
    let mut captured = Captured::default();
    let Some(mut reader) = reader else {
        return Ok(captured);
    };
    let mut buf = vec![0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(captured.bytes.len());
        if n > room {
            captured.overflowed = true;
        }
        captured.bytes.extend_from_slice(&buf[..n.min(room)]);
    }
    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_read_keeps_prefix_and_flags_overflow() {
        let data: &[u8] = b"0123456789";
        let c = read_bounded(Some(data), 4).await.unwrap();
        assert_eq!(c.bytes, b"0123");
        assert!(c.overflowed);

        let c = read_bounded(Some(data), 10).await.unwrap();
        assert_eq!(c.bytes, data);
        assert!(!c.overflowed);
    }

    #[tokio::test]
    async fn missing_pipe_reads_nothing() {
        let c = read_bounded::<&[u8]>(None, 4).await.unwrap();
        assert!(c.bytes.is_empty());
    }

    #[test]
    fn command_line_joins_args() {
        let args: Vec<OsString> = vec!["--html".into(), "/tmp/a b.pdf".into()];
        assert_eq!(command_line("tika", &args), "tika --html /tmp/a b.pdf");
    }

    #[tokio::test]
    async fn missing_executable_is_spawn_error() {
        let err = execute(
            "/definitely/not/a/real/tool",
            &["--text".into()],
            &ExecOptions {
                max_buffer: 1024,
                timeout: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert_eq!(err.command(), Some("/definitely/not/a/real/tool --text"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_prefers_stderr() {
        let args: Vec<OsString> = vec!["-c".into(), "echo oops >&2; exit 7".into()];
        let err = execute("sh", &args, &ExecOptions { max_buffer: 1024, timeout: None })
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(7));
        assert_eq!(err.to_string(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_without_stderr_reports_code() {
        let args: Vec<OsString> = vec!["-c".into(), "exit 3".into()];
        let err = execute("sh", &args, &ExecOptions { max_buffer: 1024, timeout: None })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Process exited with code 3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn success_ignores_stderr() {
        let args: Vec<OsString> = vec!["-c".into(), "echo warn >&2; printf hello".into()];
        let out = execute("sh", &args, &ExecOptions { max_buffer: 1024, timeout: None })
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_over_max_buffer_fails() {
        let args: Vec<OsString> = vec!["-c".into(), "printf 0123456789".into()];
        let err = execute("sh", &args, &ExecOptions { max_buffer: 4, timeout: None })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::OutputLimit { max_buffer: 4, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_process_times_out() {
        let args: Vec<OsString> = vec!["-c".into(), "sleep 5".into()];
        let opts = ExecOptions {
            max_buffer: 1024,
            timeout: Some(Duration::from_millis(200)),
        };
        let err = execute("sh", &args, &opts).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
