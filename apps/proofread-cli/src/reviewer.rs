//! Reviewer backed by an external command

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context};
use review_core::{Reviewer, SYSTEM_PROMPT};
use tracing::debug;

/// Characters of the command's stderr quoted in a failure
const STDERR_PREVIEW: usize = 500;

/// Runs a shell command once per chunk.
///
/// The command reads the system prompt, a blank line and the chunk prompt on
/// stdin and prints its raw reply on stdout. A non-zero exit is an error.
#[derive(Debug, Clone)]
pub struct CommandReviewer {
    command: String,
    system_prompt: String,
}

impl CommandReviewer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    fn input(&self, prompt: &str) -> String {
        format!("{}\n\n{}", self.system_prompt, prompt)
    }
}

impl Reviewer for CommandReviewer {
    fn review(&mut self, prompt: &str) -> anyhow::Result<String> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start reviewer command: {}", self.command))?;

        let input = self.input(prompt);
        let mut stdin = child
            .stdin
            .take()
            .context("reviewer command has no stdin")?;
        // Fed while stdout is drained
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .context("Failed to wait for reviewer command")?;
        match writer.join() {
            Ok(Ok(())) => {}
            // Reviewer stopped reading early
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e).context("Failed to send prompt to reviewer command"),
            Err(_) => bail!("prompt writer thread panicked"),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "reviewer command exited with {}: {}",
                output.status,
                stderr.trim().chars().take(STDERR_PREVIEW).collect::<String>()
            );
        }

        let reply = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(reply_chars = reply.chars().count(), "reviewer replied");
        Ok(reply)
    }
}
