use afl_monitor_collector::{
    BoxFuture,
    Consumer,
    Snapshot,
};
use chrono::Local;
use eyre::{
    eyre,
    Context as _,
    Result,
};
use std::process::Stdio;
use tokio::{
    io::AsyncWriteExt as _,
    process::Command,
};

/// Runs a shell command whenever a cycle reports new crashes.
///
/// The command gets a short text summary on stdin.
pub struct CrashNotifier {
    command: String,
}

impl CrashNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn message(snapshot: &Snapshot) -> String {
        let summary = &snapshot.summary;
        format!(
            "AFL Monitor - New Crash Detected!\n\n\
             Timestamp: {}\n\
             Total Crashes: {}\n\
             New Crashes: {}\n\
             Active Fuzzers: {}/{}\n\
             Coverage: {:.2}%\n",
            snapshot.collected_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            summary.total_crashes,
            summary.new_crashes,
            summary.alive_fuzzers,
            summary.total_fuzzers,
            summary.max_coverage,
        )
    }

    #[instrument(level = "debug", skip(self, message), fields(command = %self.command))]
    async fn run(&self, message: &str) -> Result<()> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .wrap_err_with(|| format!("Failed to start notification command {:?}", self.command))?;

        if let Some(mut stdin) = child.stdin.take() {
            // The command may exit without reading its input.
            if let Err(e) = stdin.write_all(message.as_bytes()).await {
                debug!(error = %e, "Notification command did not take the summary");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for notification command")?;
        if !output.status.success() {
            return Err(eyre!(
                "Notification command failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        info!("Notification command executed successfully");
        Ok(())
    }
}

impl Consumer for CrashNotifier {
    fn consume<'a>(&'a mut self, snapshot: &'a Snapshot) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if snapshot.summary.new_crashes == 0 {
                return Ok(());
            }
            self.run(&Self::message(snapshot)).await
        })
    }

    fn name(&self) -> &'static str {
        "crash-notifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afl_monitor_collector::CampaignSummary;
    use temp_dir::TempDir;

    fn snapshot(new_crashes: u64) -> Snapshot {
        let summary = CampaignSummary {
            total_fuzzers: 3,
            alive_fuzzers: 2,
            total_crashes: 5,
            new_crashes,
            max_coverage: 12.5,
            ..Default::default()
        };
        Snapshot::new("/sync".into(), Vec::new(), summary)
    }

    #[test]
    fn message_lists_crash_counts() {
        let message = CrashNotifier::message(&snapshot(3));
        assert!(message.starts_with("AFL Monitor - New Crash Detected!"));
        assert!(message.contains("Total Crashes: 5\n"));
        assert!(message.contains("New Crashes: 3\n"));
        assert!(message.contains("Active Fuzzers: 2/3\n"));
        assert!(message.contains("Coverage: 12.50%\n"));
    }

    #[tokio::test]
    async fn command_receives_summary_on_stdin() {
        let dir = TempDir::new().unwrap();
        let out = dir.child("notified.txt");
        let mut notifier = CrashNotifier::new(format!("cat > '{}'", out.display()));

        notifier.consume(&snapshot(3)).await.unwrap();
        let received = std::fs::read_to_string(&out).unwrap();
        assert!(received.contains("New Crashes: 3"));
    }

    #[tokio::test]
    async fn no_new_crashes_runs_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.child("notified.txt");
        let mut notifier = CrashNotifier::new(format!("cat > '{}'", out.display()));

        notifier.consume(&snapshot(0)).await.unwrap();
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn failing_command_is_an_error() {
        let mut notifier = CrashNotifier::new("exit 3");
        assert!(notifier.consume(&snapshot(1)).await.is_err());
    }
}
