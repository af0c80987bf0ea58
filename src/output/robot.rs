//! Robot mode JSON output implementation.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::config::LoadReport;
use crate::error::ConfError;
use crate::snippet::{Snippet, Value};

use super::{Output, RobotFormat, ValueRow, VersionInfo};

/// JSON output implementation for scripting.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    fn to_json<T: Serialize + ?Sized>(&self, data: &T) -> String {
        let json = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        json.unwrap_or_else(|e| {
            serde_json::json!({ "error": true, "message": format!("serialization failed: {e}") })
                .to_string()
        })
    }

    /// Output any serializable data as JSON to stdout.
    #[instrument(skip(self, data), fields(format = ?self.format))]
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        let json = self.to_json(data);
        trace!(json_len = json.len(), "JSON serialized");
        println!("{json}");
    }
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn success(&self, message: &str) {
        debug!(message, "Robot: success");
        self.output_json(&serde_json::json!({
            "success": true,
            "message": message
        }));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &ConfError) {
        debug!(error = %error, "Robot: error");
        let json = self.to_json(&serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        }));
        eprintln!("{json}");
    }

    #[instrument(skip(self))]
    fn warning(&self, message: &str) {
        debug!(message, "Robot: warning");
        self.output_json(&serde_json::json!({
            "warning": true,
            "message": message
        }));
    }

    #[instrument(skip(self, report, values), fields(count = values.len()))]
    fn load_report(&self, path: &Path, report: &LoadReport, values: &[ValueRow<'_>]) {
        debug!("Robot: load_report");
        self.output_json(&serde_json::json!({
            "path": path.display().to_string(),
            "report": report,
            "values": values,
        }));
    }

    #[instrument(skip(self, row), fields(key = row.key))]
    fn value(&self, row: &ValueRow<'_>) {
        debug!("Robot: value");
        self.output_json(row);
    }

    #[instrument(skip(self, args, result))]
    fn call_result(&self, key: &str, args: &[Value], result: &Value) {
        debug!("Robot: call_result");
        self.output_json(&serde_json::json!({
            "key": key,
            "args": args,
            "result": result,
            "type": result.type_name(),
        }));
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    fn rendered(&self, text: &str) {
        debug!("Robot: rendered");
        self.output_json(&serde_json::json!({ "text": text }));
    }

    #[instrument(skip(self, snippet))]
    fn snippet_compiled(&self, snippet: &Snippet) {
        debug!("Robot: snippet_compiled");
        self.output_json(&serde_json::json!({
            "ok": true,
            "snippet": snippet,
        }));
    }

    #[instrument(skip(self, info))]
    fn version_info(&self, info: &VersionInfo) {
        debug!("Robot: version_info");
        self.output_json(info);
    }
}
