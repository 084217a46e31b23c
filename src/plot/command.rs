//! External command plot driver

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::Plotter;
use crate::config::PlotConfig;
use crate::error::{Result, SheetListError};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Plots by running a configured program once per layout.
///
/// Arguments may contain the placeholders `{drawing}`, `{layout}` and
/// `{output}`. After the program exits successfully the output file is
/// polled until it exists and is non-empty, or the timeout elapses. Failed
/// attempts are retried up to the configured count.
#[derive(Debug, Clone)]
pub struct CommandPlotter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    retries: u32,
    poll_interval: Duration,
}

impl CommandPlotter {
    pub fn new(program: impl Into<String>) -> Self {
        let defaults = PlotConfig::default();
        Self {
            program: program.into(),
            args: defaults.args,
            timeout: Duration::from_secs(defaults.timeout_secs),
            retries: defaults.retries,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Build from the `[plot]` section, `None` when no command is set
    pub fn from_config(config: &PlotConfig) -> Option<Self> {
        let program = config.command.as_deref().map(str::trim).filter(|c| !c.is_empty())?;
        Some(Self {
            program: program.to_string(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            retries: config.retries,
            poll_interval: POLL_INTERVAL,
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    fn expand_args(&self, drawing: &Path, layout: &str, output: &Path) -> Vec<String> {
        let drawing = drawing.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{drawing}", &drawing)
                    .replace("{layout}", layout)
                    .replace("{output}", &output)
            })
            .collect()
    }

    fn wait_for_output(&self, output: &Path) -> bool {
        let started = Instant::now();
        loop {
            if fs::metadata(output).map(|m| m.len() > 0).unwrap_or(false) {
                return true;
            }
            if started.elapsed() >= self.timeout {
                return false;
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn attempt(&self, drawing: &Path, layout: &str, output: &Path) -> Result<()> {
        match fs::remove_file(output) {
            Ok(()) => debug!(path = %output.display(), "removed stale PDF"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(SheetListError::io(output, e)),
        }

        let args = self.expand_args(drawing, layout, output);
        debug!(program = %self.program, ?args, "running plot command");
        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| SheetListError::Plot(format!("cannot run '{}': {}", self.program, e)))?;

        if !status.success() {
            return Err(SheetListError::Plot(format!(
                "'{}' exited with {}",
                self.program, status
            )));
        }
        if !self.wait_for_output(output) {
            return Err(SheetListError::Plot(format!(
                "no PDF at {} after {}s",
                output.display(),
                self.timeout.as_secs()
            )));
        }
        Ok(())
    }
}

impl Plotter for CommandPlotter {
    fn plot(&mut self, drawing: &Path, layout: &str, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SheetListError::io(parent, e))?;
        }

        let mut attempt = 0;
        loop {
            match self.attempt(drawing, layout, output) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(layout, attempt, error = %e, "plot failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
