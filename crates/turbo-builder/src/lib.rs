//! Visual page builder for storefront landing pages.
//!
//! A page is a tree of rows, columns and widgets. This crate provides:
//!
//! - **Model**: the layout tree, its ids and style overrides
//! - **Catalogue**: widget kinds with their defaults, and row presets
//! - **Mutation engine**: pure functions from one page to the next
//! - **Store**: the action reducer with selection and undo/redo history
//! - **Editor**: per-kind field schemas, validation and list editing
//! - **Render**: HTML for the editor canvas, the preview and the panel
//! - **Persistence**: versioned documents saved through the backend
//! - **Session**: the store wired to logging, metrics and notices
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_builder::prelude::*;
//!
//! let mut session = BuilderSession::new(Page::new(PageId::new("summer-sale")), BuilderConfig::default());
//!
//! session.add_row(None);
//! let row = session.page().rows[1].clone();
//! session.apply(Action::AddWidget {
//!     row_id: row.id.clone(),
//!     column_id: row.columns[0].id.clone(),
//!     kind: WidgetKind::Heading,
//!     index: None,
//! });
//! session.apply(Action::Undo);
//!
//! let html = session.render_preview(Breakpoint::Mobile);
//! ```

pub mod catalogue;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod ids;
pub mod list_editor;
pub mod model;
pub mod mutation;
pub mod notice;
pub mod persistence;
pub mod render;
pub mod schema;
pub mod session;
pub mod store;
pub mod style;

pub use catalogue::{find_preset, RowPreset, WidgetKind, ROW_PRESETS};
pub use config::BuilderConfig;
pub use error::BuilderError;
pub use ids::*;
pub use model::{Column, Direction, Page, Row, Widget};
pub use session::BuilderSession;
pub use store::{Action, BuilderStore, Outcome, Selection};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::BuilderError;
    pub use crate::ids::*;

    // Tree
    pub use crate::catalogue::{
        find_preset, RowPreset, WidgetCategory, WidgetKind, PRESET_IDS, ROW_PRESETS,
    };
    pub use crate::model::{Column, Direction, Page, Row, Widget};
    pub use crate::style::{Spacing, StyleOverrides};

    // Editing
    pub use crate::editor::{EditorPanel, FieldGroup, PanelTarget};
    pub use crate::list_editor::ListEdit;
    pub use crate::store::{Action, BuilderStore, Outcome, Selection};

    // Output and services
    pub use crate::config::BuilderConfig;
    pub use crate::notice::{Notice, NoticeLevel};
    pub use crate::persistence::{MemoryPageRepository, PageDocument, PageRepository};
    pub use crate::render::{render_page, Breakpoint, RenderOptions};
    pub use crate::session::BuilderSession;
}
