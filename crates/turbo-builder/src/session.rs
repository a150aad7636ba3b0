//! One editing session.
//!
//! Wraps the store with logging, metrics, notices and the optional backend.
//! Backend failures never touch the tree: they are logged, counted and
//! reported as an error notice.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use turbo_backend::{BackendClient, Function, Transport};
use turbo_observability::{EditorMetrics, SessionId, SessionLogger};

use crate::config::BuilderConfig;
use crate::editor::{self, EditorPanel, PanelTarget};
use crate::error::BuilderError;
use crate::ids::{PageId, RowId, WidgetId};
use crate::list_editor::ListEdit;
use crate::model::Page;
use crate::notice::{Notice, Notices};
use crate::persistence::{
    BackendPageRepository, ImageUploader, PageDocument, PageRepository,
};
use crate::render::{self, Breakpoint, RenderOptions};
use crate::schema::{widget_field, InputType};
use crate::store::{Action, BuilderStore, Outcome};

/// Editing session: store plus its ambient services.
pub struct BuilderSession {
    store: BuilderStore,
    config: BuilderConfig,
    logger: SessionLogger,
    metrics: EditorMetrics,
    notices: Notices,
    client: Option<BackendClient>,
    repository: Option<Box<dyn PageRepository>>,
    images: Option<ImageUploader>,
}

impl BuilderSession {
    /// Start a session on `page`.
    pub fn new(page: Page, config: BuilderConfig) -> Self {
        let session_id = SessionId::generate();
        let logger = config
            .logger(session_id.clone())
            .with_page(page.id.to_string());
        let store = BuilderStore::new(page)
            .with_history_limit(config.editor.history_limit)
            .with_breakpoint(config.editor.default_breakpoint);
        let mut metrics = EditorMetrics::new(&session_id);
        metrics.observe_history_depth(store.history_depth());

        logger
            .info_builder("session started")
            .field("page_id", store.page().id.to_string())
            .field_i64("rows", store.page().rows.len() as i64)
            .emit();

        Self {
            store,
            config,
            logger,
            metrics,
            notices: Notices::default(),
            client: None,
            repository: None,
            images: None,
        }
    }

    /// Start a session on a blank page.
    pub fn blank(config: BuilderConfig) -> Self {
        Self::new(Page::blank(), config)
    }

    /// Replace the logger (keeps the page tag).
    pub fn with_logger(mut self, logger: SessionLogger) -> Self {
        self.logger = logger.with_page(self.store.page().id.to_string());
        self
    }

    /// Persist pages through `repository`.
    pub fn with_repository(mut self, repository: Box<dyn PageRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Upload images through `images`.
    pub fn with_images(mut self, images: ImageUploader) -> Self {
        self.images = Some(images);
        self
    }

    /// Wire the configured backend over `transport`: page storage, image
    /// uploads and serverless functions.
    pub fn connect(mut self, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        let backend = self
            .config
            .backend
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no [backend] section in config"))?;
        let client = backend.client(transport)?;
        self.repository = Some(Box::new(BackendPageRepository::from_config(
            client.clone(),
            &backend,
        )));
        self.images = Some(ImageUploader::from_config(client.clone(), &backend));
        self.client = Some(client);
        self.logger
            .info_builder("backend connected")
            .field("base_url", backend.base_url.as_str())
            .emit();
        Ok(self)
    }

    pub fn store(&self) -> &BuilderStore {
        &self.store
    }

    pub fn page(&self) -> &Page {
        self.store.page()
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn logger(&self) -> &SessionLogger {
        &self.logger
    }

    pub fn metrics(&self) -> &EditorMetrics {
        &self.metrics
    }

    /// Pending notices, without removing them.
    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    /// Take every pending notice.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Dispatch an action, logging and counting it.
    pub fn apply(&mut self, action: Action) -> Outcome {
        let name = action.name();
        let outcome = self.store.dispatch(action);
        self.record(name, outcome);
        outcome
    }

    /// Add a row with the configured default preset.
    pub fn add_row(&mut self, after_index: Option<usize>) -> Outcome {
        let preset = self.config.editor.default_row_preset.clone();
        self.apply(Action::AddRow {
            preset,
            after_index,
        })
    }

    fn record(&mut self, name: &'static str, outcome: Outcome) {
        let applied = outcome.is_applied();
        self.metrics.record_action(name, applied);
        match (name, applied) {
            ("undo", true) => self.metrics.record_undo(),
            ("redo", true) => self.metrics.record_redo(),
            _ => {}
        }
        self.metrics.observe_history_depth(self.store.history_depth());

        let builder = if applied {
            self.logger.info_builder("action applied")
        } else {
            self.logger.debug_builder("action unchanged")
        };
        builder
            .field("action", name)
            .field_i64("history_depth", self.store.history_depth() as i64)
            .field_bool("pending_edits", self.store.has_pending_edits())
            .emit();
    }

    fn rejected(&self, operation: &str, error: &BuilderError) {
        self.logger
            .warn_builder("edit rejected")
            .field("operation", operation)
            .field("error", error.to_string())
            .emit();
    }

    /// Validate and set a content field of a widget.
    pub fn set_field(
        &mut self,
        widget_id: &WidgetId,
        name: &str,
        value: &Value,
    ) -> Result<Outcome, BuilderError> {
        match editor::set_widget_field(&mut self.store, widget_id, name, value) {
            Ok(outcome) => {
                self.record("update_widget_data", outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.rejected("set_field", &e);
                Err(e)
            }
        }
    }

    /// Apply a list edit to a list field of a widget.
    pub fn edit_list(
        &mut self,
        widget_id: &WidgetId,
        name: &str,
        edit: &ListEdit,
    ) -> Result<Outcome, BuilderError> {
        match editor::edit_widget_list(&mut self.store, widget_id, name, edit) {
            Ok(outcome) => {
                self.record("update_widget_data", outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.rejected("edit_list", &e);
                Err(e)
            }
        }
    }

    /// Validate and set a style field.
    pub fn set_style(
        &mut self,
        target: &PanelTarget,
        name: &str,
        value: &Value,
    ) -> Result<Outcome, BuilderError> {
        let action = match target {
            PanelTarget::Page => "update_page_style",
            PanelTarget::Row(_) => "update_row_style",
            PanelTarget::Widget(_) => "update_widget_style",
        };
        match editor::set_style_field(&mut self.store, target, name, value) {
            Ok(outcome) => {
                self.record(action, outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.rejected("set_style", &e);
                Err(e)
            }
        }
    }

    /// Change a row's layout.
    pub fn set_row_preset(
        &mut self,
        row_id: &RowId,
        preset: &str,
    ) -> Result<Outcome, BuilderError> {
        match editor::set_row_preset(&mut self.store, row_id, preset) {
            Ok(outcome) => {
                self.record("set_row_preset", outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.rejected("set_row_preset", &e);
                Err(e)
            }
        }
    }

    /// Panel model for the current selection.
    pub fn panel(&self) -> Option<EditorPanel> {
        EditorPanel::build(self.store.page(), self.store.selection())
    }

    /// Panel form markup for the current selection.
    pub fn render_panel(&self) -> Option<String> {
        self.panel().map(|panel| render::render_panel(&panel))
    }

    /// Editor canvas markup.
    pub fn render(&self) -> String {
        render::render_page(self.store.page(), &RenderOptions::editor(&self.store))
    }

    /// Published markup for a breakpoint.
    pub fn render_preview(&self, breakpoint: Breakpoint) -> String {
        render::render_page(self.store.page(), &RenderOptions::preview(breakpoint))
    }

    fn track<T>(
        &mut self,
        operation: &str,
        call: impl FnOnce(&Self) -> Result<T, BuilderError>,
    ) -> Result<T, BuilderError> {
        let started = Instant::now();
        let result = call(self);
        let elapsed = started.elapsed();
        self.metrics.record_backend_call(
            operation,
            elapsed,
            result.is_ok(),
            result.as_ref().err().map(|e| e.to_string()),
        );

        let builder = match &result {
            Ok(_) => self.logger.info_builder("backend call succeeded"),
            Err(e) => self
                .logger
                .error_builder("backend call failed")
                .field("error", e.to_string()),
        };
        builder
            .field("operation", operation)
            .duration_ms("duration_ms", elapsed)
            .emit();
        result
    }

    fn fail<T>(&mut self, title: &str, error: BuilderError) -> Result<T, BuilderError> {
        self.notices.push(Notice::error(title, error.to_string()));
        Err(error)
    }

    /// Save the page. Pending in-place edits are committed first.
    pub fn save(&mut self) -> Result<(), BuilderError> {
        if self.store.has_pending_edits() {
            self.apply(Action::CommitEdits);
        }
        let document = PageDocument::new(self.store.page());
        let result = self.track("save_page", |s| {
            s.repository
                .as_ref()
                .ok_or(BuilderError::BackendUnavailable)?
                .save(&document)
        });
        match result {
            Ok(()) => {
                self.notices.push(Notice::success("Page enregistrée"));
                Ok(())
            }
            Err(e) => self.fail("Erreur lors de l'enregistrement", e),
        }
    }

    /// Load a saved page, replacing the current one and its history.
    ///
    /// Returns `false` when no page has this id.
    pub fn load(&mut self, page_id: &PageId) -> Result<bool, BuilderError> {
        let result = self.track("load_page", |s| {
            s.repository
                .as_ref()
                .ok_or(BuilderError::BackendUnavailable)?
                .load(page_id)
        });
        match result {
            Ok(Some(document)) => {
                self.logger.set_page(document.page.id.to_string());
                self.store.replace_page(document.page);
                self.metrics
                    .observe_history_depth(self.store.history_depth());
                Ok(true)
            }
            Ok(None) => {
                self.notices.push(Notice::info("Page introuvable"));
                Ok(false)
            }
            Err(e) => self.fail("Erreur lors du chargement", e),
        }
    }

    /// Upload an image and point a URL field of `widget_id` at it.
    ///
    /// The tree is only touched once the upload succeeded.
    pub fn upload_image(
        &mut self,
        widget_id: &WidgetId,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BuilderError> {
        let widget = self
            .store
            .page()
            .widget(widget_id)
            .ok_or_else(|| BuilderError::WidgetNotFound(widget_id.to_string()))?;
        match widget_field(&widget.kind, field) {
            Some(spec) if spec.input == InputType::Url => {}
            Some(_) => return Err(BuilderError::invalid(field, "not an image field")),
            None => {
                return Err(BuilderError::UnknownField {
                    kind: widget.kind.to_string(),
                    field: field.to_string(),
                })
            }
        }

        let page_id = self.store.page().id.clone();
        let result = self.track("upload_image", |s| {
            s.images
                .as_ref()
                .ok_or(BuilderError::BackendUnavailable)?
                .upload(&page_id, widget_id, file_name, bytes, content_type)
        });
        let url = match result {
            Ok(url) => url,
            Err(e) => return self.fail("Échec du téléversement", e),
        };

        self.set_field(widget_id, field, &Value::from(url.as_str()))?;
        self.notices.push(Notice::success("Image téléversée"));
        Ok(url)
    }

    /// Invoke a serverless function of the connected backend.
    pub fn call_function(
        &mut self,
        function: Function,
        body: &Value,
    ) -> Result<Value, BuilderError> {
        let result = self.track(function.name(), |s| {
            let client = s.client.as_ref().ok_or(BuilderError::BackendUnavailable)?;
            Ok(client.functions().invoke(function, body)?)
        });
        match result {
            Ok(value) => Ok(value),
            Err(e) => self.fail("Erreur du service", e),
        }
    }
}

impl std::fmt::Debug for BuilderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderSession")
            .field("session_id", self.logger.session_id())
            .field("page_id", &self.store.page().id)
            .field("connected", &self.client.is_some())
            .finish_non_exhaustive()
    }
}
