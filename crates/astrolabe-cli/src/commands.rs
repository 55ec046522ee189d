//! Subcommand handlers.
//!
//! Each invocation opens the workbench, attaches a headless editor, runs one
//! command and exits. Edits go through the same path as typing in the
//! desktop editor: the file contents are placed in the buffer and reported
//! as a user change.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use astrolabe_core::listing::RowAction;
use astrolabe_core::visualization::MemoryPreview;
use astrolabe_core::{
    EditOutcome, EditorSurface, HeadlessEditor, PreviewContent, Workbench, WorkbenchBuilder,
    WorkbenchConfig, WorkbenchError,
};
use thiserror::Error;

use crate::cli::Command;
use crate::renderer::SummaryRenderer;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Workbench(#[from] WorkbenchError),

    #[error("{path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Output(#[from] io::Error),

    #[error("Snippet not found: {0}")]
    NotFound(String),

    #[error("Preview failed: {0}")]
    Preview(String),
}

/// A workbench with a headless editor and preview attached.
pub struct Session {
    pub workbench: Arc<Workbench>,
    pub editor: Arc<HeadlessEditor>,
    pub preview: Arc<MemoryPreview>,
}

impl Session {
    pub fn open(config: &WorkbenchConfig) -> Result<Self, CliError> {
        Self::from_builder(WorkbenchBuilder::from_config(config))
    }

    pub fn from_builder(builder: WorkbenchBuilder) -> Result<Self, CliError> {
        let preview = Arc::new(MemoryPreview::new());
        let workbench = builder
            .renderer(Arc::new(SummaryRenderer))
            .preview(preview.clone())
            .build()?;
        let editor = Arc::new(HeadlessEditor::new());
        workbench.attach_editor(editor.clone())?;
        Ok(Self {
            workbench,
            editor,
            preview,
        })
    }

    fn require(&self, id: &str) -> Result<(), CliError> {
        match self.workbench.snippet(id) {
            Some(_) => Ok(()),
            None => Err(CliError::NotFound(id.to_string())),
        }
    }

    /// Put `path`'s contents in the buffer as if the user had typed them.
    fn type_file(&self, path: &Path) -> Result<EditOutcome, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        self.editor.type_text(&text);
        Ok(self.workbench.on_editor_changed()?)
    }

    pub fn execute(&self, command: Command, out: &mut impl Write) -> Result<(), CliError> {
        let wb = &self.workbench;
        match command {
            Command::List { query } => {
                let view = wb.view(query.as_deref().unwrap_or(""));
                for row in &view.rows {
                    let note = if row.has_comment {
                        format!(" {}", RowAction::Comment.glyph())
                    } else {
                        String::new()
                    };
                    writeln!(out, "{}  {}{}", row.label(), row.id, note)?;
                }
                log::debug!("Listed {} snippets", view.rows.len());
            }

            Command::Show { id, saved } => {
                self.require(&id)?;
                wb.select(&id, saved.then_some(false))?;
                writeln!(out, "{}", self.editor.get_value())?;
                if let Some(comment) = wb.snippet(&id).and_then(|s| s.comment) {
                    writeln!(out, "{} {}", RowAction::Comment.glyph(), comment)?;
                }
            }

            Command::New => {
                let session = wb.create()?;
                writeln!(out, "{}", session.current_id.unwrap_or_default())?;
            }

            Command::Rename { id, name } => {
                wb.rename(&id, &name)?;
            }

            Command::Delete { id } => {
                wb.delete(&id)?;
            }

            Command::Duplicate { id } => {
                writeln!(out, "{}", wb.duplicate(&id)?)?;
            }

            Command::Comment { id, text } => {
                wb.set_comment(&id, &text)?;
            }

            Command::Draft { id, file } => {
                self.require(&id)?;
                wb.select(&id, Some(true))?;
                self.type_file(&file)?;
                let session = wb.save_draft()?;
                let stored = wb.snippet(&id).is_some_and(|s| s.has_draft());
                if stored {
                    writeln!(out, "Draft saved for {id}")?;
                } else if session.has_unsaved_changes {
                    writeln!(out, "Draft not saved for {id}: invalid JSON")?;
                } else {
                    writeln!(out, "No changes from the saved version of {id}")?;
                }
            }

            Command::Save { id, file } => {
                self.require(&id)?;
                wb.select(&id, Some(true))?;
                self.type_file(&file)?;
                wb.commit()?;
                writeln!(out, "Saved {id}")?;
            }

            Command::Switch { id } => {
                self.require(&id)?;
                wb.select(&id, None)?;
                let session = wb.toggle_version()?;
                let shown = if session.is_draft_version { "draft" } else { "saved" };
                let label = wb.view("").version_switch.label;
                writeln!(out, "Showing {shown} version of {id} ({label} to switch back)")?;
                writeln!(out, "{}", self.editor.get_value())?;
            }

            Command::Preview { id } => {
                self.require(&id)?;
                wb.select(&id, None)?;
                match self.preview.content() {
                    PreviewContent::Chart(summary) => writeln!(out, "{summary}")?,
                    PreviewContent::Error(message) => return Err(CliError::Preview(message)),
                    PreviewContent::Empty => writeln!(out, "(empty)")?,
                }
            }

            Command::Export { file } => {
                wb.export_to(&file)?;
                writeln!(out, "Exported {} snippets to {}", wb.snippets().len(), file.display())?;
            }

            Command::Import { file } => {
                wb.import_from(&file)?;
                writeln!(out, "Imported {} snippets", wb.snippets().len())?;
            }

            Command::Layout { handle, dx } => {
                if let (Some(handle), Some(dx)) = (handle, dx) {
                    wb.resize_panels(handle, dx);
                    wb.save_layout()?;
                }
                let layout = wb.layout();
                writeln!(
                    out,
                    "list {:.0}%  editor {:.0}%  preview {:.0}%",
                    layout.snippet_width * 100.0,
                    layout.editor_width * 100.0,
                    layout.preview_width * 100.0
                )?;
            }
        }
        Ok(())
    }
}
