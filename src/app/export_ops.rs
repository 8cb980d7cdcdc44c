use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{AppError, AppResult};

use super::core::App;

const SCHEMA_SUFFIX: &str = "schema.txt";
const DATA_SUFFIX: &str = "export.json";

impl App {
    pub(crate) fn export_schema(&mut self) {
        let path = self.document.source().sibling_path(SCHEMA_SUFFIX);
        let mut body = self.document.outline().join("\n");
        body.push('\n');
        let written = write_export(&path, &body).map(|()| path);
        self.finish_export("schema", written);
    }

    /// Writes whatever the content pane shows: the jq result while one is
    /// displayed, otherwise the loaded document.
    pub(crate) fn export_data(&mut self) {
        let path = self.document.source().sibling_path(DATA_SUFFIX);
        let written = self
            .export_payload()
            .and_then(|body| write_export(&path, &body))
            .map(|()| path);
        self.finish_export("data", written);
    }

    fn export_payload(&self) -> AppResult<String> {
        let rendered = match self.shown_jq_output() {
            Some(output) => match output.values.as_slice() {
                [single] => serde_json::to_string_pretty(single),
                many => serde_json::to_string_pretty(many),
            },
            None => serde_json::to_string_pretty(self.document.value().as_ref()),
        };
        let mut body = rendered
            .map_err(|err| AppError::json_with_context(err, "failed to serialize export"))?;
        body.push('\n');
        Ok(body)
    }

    fn finish_export(&mut self, what: &str, written: AppResult<PathBuf>) {
        match written {
            Ok(path) => {
                info!(what, path = %path.display(), "export written");
                self.state.status.message = format!("exported {what} to {}", path.display());
            }
            Err(err) => {
                warn!(what, error = %err, "export failed");
                self.state.status.message = format!("export failed: {err}");
            }
        }
    }
}

fn write_export(path: &Path, body: &str) -> AppResult<()> {
    fs::write(path, body).map_err(|err| {
        AppError::io_with_context(err, format!("failed to write {}", path.display()))
    })
}
