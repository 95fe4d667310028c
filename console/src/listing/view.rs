//! Rendered app list

use crate::models::AppSummary;

/// Per-row action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Invalidate,
    Delete,
}

/// An action control bound to the exact row name it was rendered for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    kind: ActionKind,
    target: String,
}

impl RowAction {
    pub(crate) fn new(kind: ActionKind, target: &str) -> Self {
        Self {
            kind,
            target: target.to_string(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Name of the app this control acts on
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// One rendered app row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRow {
    pub app: AppSummary,
    pub invalidate: RowAction,
    pub delete: RowAction,
}

impl AppRow {
    pub(crate) fn new(app: AppSummary) -> Self {
        let invalidate = RowAction::new(ActionKind::Invalidate, &app.name);
        let delete = RowAction::new(ActionKind::Delete, &app.name);
        Self {
            app,
            invalidate,
            delete,
        }
    }
}

/// What the app list region currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListView {
    /// A refresh is in flight and nothing newer has landed
    #[default]
    Loading,

    /// The server reported no applications
    Empty,

    /// The list could not be fetched
    Unavailable(String),

    /// One row per app, in server order
    Rows(Vec<AppRow>),
}

impl ListView {
    /// Build the view for a fetched collection
    pub(crate) fn from_apps(apps: Vec<AppSummary>) -> Self {
        if apps.is_empty() {
            ListView::Empty
        } else {
            ListView::Rows(apps.into_iter().map(AppRow::new).collect())
        }
    }

    /// Rendered rows, empty for every placeholder
    pub fn rows(&self) -> &[AppRow] {
        match self {
            ListView::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Whether `name` has a rendered row
    pub fn contains(&self, name: &str) -> bool {
        self.rows().iter().any(|row| row.app.name == name)
    }
}
