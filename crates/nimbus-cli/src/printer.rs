//! Operator-facing output.
//!
//! The [`Printer`] is the only place commands write to. Results go to the
//! output stream; prompts, messages and the spinner go to the error stream.
//! Both streams and the prompt input can be swapped for buffers in tests.

use std::collections::BTreeMap;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use indicatif::ProgressBar;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CliError;
use crate::globals::{OutputFormat, Verbosity};
use crate::spinner;

/// A writer shared between the printer and its test buffers.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

type SharedReader = Arc<Mutex<Box<dyn BufRead + Send>>>;

/// Keys whose values never appear in debug output.
const SECRET_KEYS: [&str; 4] = ["token", "password", "secret", "kubeconfig"];

/// Output sink for a single invocation.
pub struct Printer {
    out: SharedWriter,
    err: SharedWriter,
    input: SharedReader,
    verbosity: Verbosity,
    spinner_enabled: bool,
}

impl std::fmt::Debug for Printer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Printer")
            .field("verbosity", &self.verbosity)
            .field("spinner_enabled", &self.spinner_enabled)
            .finish_non_exhaustive()
    }
}

impl Printer {
    /// A printer on the process's standard streams.
    #[must_use]
    pub fn stdio(verbosity: Verbosity) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(io::stdout()))),
            err: Arc::new(Mutex::new(Box::new(io::stderr()))),
            input: Arc::new(Mutex::new(Box::new(io::BufReader::new(io::stdin())))),
            verbosity,
            spinner_enabled: io::stderr().is_terminal(),
        }
    }

    /// A printer writing into buffers and reading prompt answers from `input`.
    #[must_use]
    pub fn buffered(out: &SharedBuffer, err: &SharedBuffer, input: &str) -> Self {
        Self {
            out: out.writer(),
            err: err.writer(),
            input: Arc::new(Mutex::new(Box::new(io::Cursor::new(input.as_bytes().to_vec())))),
            verbosity: Verbosity::Info,
            spinner_enabled: false,
        }
    }

    /// Read prompt answers from `input` instead.
    #[must_use]
    pub fn with_input(mut self, input: impl BufRead + Send + 'static) -> Self {
        self.input = Arc::new(Mutex::new(Box::new(input)));
        self
    }

    /// Change the verbosity.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Write a line to the output stream.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn outputln(&self, line: &str) -> Result<(), CliError> {
        let mut out = self.out.lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }

    /// Write to the output stream through a closure.
    ///
    /// # Errors
    ///
    /// Returns an error if the closure or flushing fails.
    pub fn output_with<F>(&self, write: F) -> Result<(), CliError>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let mut out = self.out.lock();
        write(&mut **out)?;
        out.flush()?;
        Ok(())
    }

    /// Print an informational message unless the verbosity is below info.
    pub fn info(&self, message: &str) {
        if self.verbosity >= Verbosity::Info {
            self.diagnostic(format_args!("{message}"));
        }
    }

    /// Print a warning unless the verbosity is error.
    pub fn warn(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            self.diagnostic(format_args!("Warning: {message}"));
        }
    }

    fn diagnostic(&self, message: std::fmt::Arguments<'_>) {
        let mut err = self.err.lock();
        if let Err(e) = writeln!(err, "{message}").and_then(|()| err.flush()) {
            debug!(error = %e, "Could not write to the error stream");
        }
    }

    /// Ask a yes/no question. Only `y`, `Y` and `yes` count as yes.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be written or the answer read.
    pub fn confirm(&self, message: &str) -> io::Result<bool> {
        self.ask(message)?;
        let answer = read_answer(&self.input)?;
        Ok(is_yes(&answer))
    }

    /// Ask for confirmation and fail unless the operator agrees.
    ///
    /// The answer is read on a blocking thread so that `cancel` can end the
    /// prompt.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Aborted`] when declined and
    /// [`CliError::Cancelled`] when `cancel` fires first.
    pub async fn prompt_for_confirmation(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<(), CliError> {
        self.ask(message)?;
        let input = Arc::clone(&self.input);
        let answer = tokio::task::spawn_blocking(move || read_answer(&input));
        let answer = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Prompt interrupted");
                return Err(CliError::Cancelled);
            }
            joined = answer => joined.map_err(io::Error::other)??,
        };
        if is_yes(&answer) {
            Ok(())
        } else {
            Err(CliError::Aborted)
        }
    }

    fn ask(&self, message: &str) -> io::Result<()> {
        let mut err = self.err.lock();
        write!(err, "{message} [y/N] ")?;
        err.flush()
    }

    /// Render `value` in `format`. `pretty` renders the human-readable form.
    ///
    /// JSON is indented by two spaces. YAML uses the same field names as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn output_result<T, F>(
        &self,
        format: OutputFormat,
        value: &T,
        pretty: F,
    ) -> Result<(), CliError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&Self) -> Result<(), CliError>,
    {
        match format {
            OutputFormat::Json => {
                let mut out = self.out.lock();
                serde_json::to_writer_pretty(&mut *out, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(out)?;
                out.flush()?;
            }
            OutputFormat::Yaml => {
                let rendered = serde_yaml::to_string(value)
                    .map_err(|e| CliError::Format(format!("YAML serialization failed: {e}")))?;
                let mut out = self.out.lock();
                write!(out, "{rendered}")?;
                out.flush()?;
            }
            OutputFormat::Pretty => pretty(self)?,
            OutputFormat::None => {}
        }
        Ok(())
    }

    /// Log the parsed input of `command` at debug level with secrets masked.
    pub fn debug_input_model<T: Serialize>(&self, command: &str, model: &T) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        match serde_json::to_value(model) {
            Ok(value) => debug!(command, model = %render_model(&value), "Parsed input"),
            Err(e) => debug!(command, error = %e, "Could not render input model"),
        }
    }

    /// A spinner on the error stream, drawing only on a terminal.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.spinner_enabled {
            spinner::start(message)
        } else {
            spinner::hidden()
        }
    }
}

fn read_answer(input: &SharedReader) -> io::Result<String> {
    let mut answer = String::new();
    input.lock().read_line(&mut answer)?;
    Ok(answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes")
}

/// Render a model as `[key: value, ...]`.
///
/// Nested objects are flattened with dotted keys, keys are sorted, empty
/// values are skipped and secret values are masked.
#[must_use]
pub fn render_model(value: &Value) -> String {
    let mut fields = BTreeMap::new();
    flatten("", value, &mut fields);
    let body = fields
        .into_iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{body}]")
}

fn flatten(prefix: &str, value: &Value, fields: &mut BTreeMap<String, String>) {
    let Value::Object(map) = value else {
        if let Some(rendered) = scalar(value).filter(|_| !prefix.is_empty()) {
            fields.insert(prefix.to_string(), rendered);
        }
        return;
    };
    for (key, inner) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if is_secret(key) && scalar(inner).is_some() {
            fields.insert(path, "***".to_string());
        } else {
            flatten(&path, inner, fields);
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(_) | Value::Object(_) | Value::Number(_) | Value::Bool(_) => {
            Some(value.to_string())
        }
    }
}

fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SECRET_KEYS.iter().any(|s| key.contains(s))
}

// ============================================================================
// Test buffers
// ============================================================================

/// An in-memory stream that can be handed to a [`Printer`] and read back.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// A writer appending to this buffer.
    #[must_use]
    pub fn writer(&self) -> SharedWriter {
        Arc::new(Mutex::new(Box::new(self.clone())))
    }

    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    use crate::commands::test_support::pending_input;

    fn printer(input: &str) -> (Printer, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        (Printer::buffered(&out, &err, input), out, err)
    }

    #[test_case("y\n", true ; "short yes")]
    #[test_case("Y\n", true ; "upper yes")]
    #[test_case("yes\n", true ; "long yes")]
    #[test_case("n\n", false ; "no")]
    #[test_case("\n", false ; "empty answer")]
    #[test_case("", false ; "eof")]
    #[test_case("YES\n", false ; "shouted yes")]
    fn confirmation_answers(input: &str, expected: bool) {
        let (printer, _, err) = printer(input);
        assert_eq!(printer.confirm("Proceed?").expect("prompt"), expected);
        assert_eq!(err.contents(), "Proceed? [y/N] ");
    }

    #[tokio::test]
    async fn declined_prompt_aborts() {
        let (printer, _, err) = printer("n\n");
        assert!(matches!(
            printer
                .prompt_for_confirmation("Proceed?", &CancellationToken::new())
                .await,
            Err(CliError::Aborted)
        ));
        assert_eq!(err.contents(), "Proceed? [y/N] ");
    }

    #[tokio::test]
    async fn accepted_prompt_continues() {
        let (printer, _, _) = printer("yes\n");
        printer
            .prompt_for_confirmation("Proceed?", &CancellationToken::new())
            .await
            .expect("confirmed");
    }

    #[tokio::test]
    async fn interrupt_ends_a_pending_prompt() {
        let (release, pending) = pending_input();
        let (printer, _, err) = printer("");
        let printer = printer.with_input(pending);
        let cancel = CancellationToken::new();

        let interrupt = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            interrupt.cancel();
        });
        let result = printer.prompt_for_confirmation("Proceed?", &cancel).await;

        assert!(matches!(result, Err(CliError::Cancelled)));
        assert_eq!(err.contents(), "Proceed? [y/N] ");
        drop(release);
    }

    #[test]
    fn buffered_printer_hides_the_spinner() {
        let (printer, _, _) = printer("");
        let bar = printer.spinner("Creating instance");
        assert!(bar.is_hidden());
        bar.finish_and_clear();
    }

    /// Counts flushes of the error stream.
    #[derive(Clone, Default)]
    struct FlushCounter(Arc<std::sync::atomic::AtomicUsize>);

    impl Write for FlushCounter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn diagnostics_are_flushed() {
        let counter = FlushCounter::default();
        let out = SharedBuffer::default();
        let printer = Printer {
            err: Arc::new(Mutex::new(Box::new(counter.clone()))),
            ..Printer::buffered(&out, &out, "")
        };
        printer.info("one");
        printer.warn("two");
        assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn json_output_is_indented() {
        let (printer, out, _) = printer("");
        printer
            .output_result(OutputFormat::Json, &json!({"id": "abc"}), |_| Ok(()))
            .expect("output");
        assert_eq!(out.contents(), "{\n  \"id\": \"abc\"\n}\n");
    }

    #[test]
    fn yaml_output_uses_wire_names() {
        let (printer, out, _) = printer("");
        let value = json!({"displayName": "edge01", "status": "ACTIVE"});
        printer
            .output_result(OutputFormat::Yaml, &value, |_| Ok(()))
            .expect("output");
        assert_eq!(out.contents(), "displayName: edge01\nstatus: ACTIVE\n");
    }

    #[test]
    fn pretty_runs_the_renderer_and_none_prints_nothing() {
        let (printer, out, _) = printer("");
        printer
            .output_result(OutputFormat::Pretty, &(), |p| p.outputln("hello"))
            .expect("output");
        printer
            .output_result(OutputFormat::None, &(), |p| p.outputln("never"))
            .expect("output");
        assert_eq!(out.contents(), "hello\n");
    }

    #[test]
    fn messages_respect_verbosity() {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let printer = Printer::buffered(&out, &err, "").with_verbosity(Verbosity::Error);
        printer.info("info");
        printer.warn("warn");
        assert_eq!(err.contents(), "");

        let printer = Printer::buffered(&out, &err, "");
        printer.warn("careful");
        assert_eq!(err.contents(), "Warning: careful\n");
    }

    #[test]
    fn model_rendering_sorts_masks_and_skips() {
        let model = json!({
            "region": "eu01",
            "description": "",
            "token": "s3cr3t",
            "global": {"project_id": "p", "async": false},
            "limit": null,
        });
        assert_eq!(
            render_model(&model),
            "[global.async: false, global.project_id: p, region: eu01, token: ***]"
        );
    }
}
