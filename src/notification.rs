//! Run diagnostics.
//!
//! Sheets that cannot be listed, drawings that cannot be read and layouts
//! that fail to plot are collected as `Notification` items instead of
//! aborting the run. The summary printed at the end of a batch is built
//! from this collection, so no skipped sheet disappears without a trace.

use std::fmt;

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// No qualifying title block on the layout.
    NoTitleBlock,
    /// The attribute reader failed for a drawing or layout.
    ReaderFailure,
    /// The drawing has no paper-space layouts.
    NoPaperLayouts,
    /// The plot driver did not produce a PDF.
    PlotFailed,
    /// Non-fatal warning (e.g. a PDF that could not be merged).
    Warning,
}

impl NotificationType {
    /// Whether this notification means a sheet is missing from the list.
    pub fn is_skipped_sheet(&self) -> bool {
        matches!(
            self,
            Self::NoTitleBlock | Self::ReaderFailure | Self::NoPaperLayouts
        )
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTitleBlock => write!(f, "NoTitleBlock"),
            Self::ReaderFailure => write!(f, "ReaderFailure"),
            Self::NoPaperLayouts => write!(f, "NoPaperLayouts"),
            Self::PlotFailed => write!(f, "PlotFailed"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// A single notification produced during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The category.
    pub notification_type: NotificationType,
    /// Drawing file name the notification refers to.
    pub drawing: String,
    /// Layout name, when the notification is about one sheet.
    pub layout: Option<String>,
    /// A human-readable description of the issue.
    pub message: String,
}

impl Notification {
    /// Create a new notification.
    pub fn new(
        notification_type: NotificationType,
        drawing: impl Into<String>,
        layout: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            notification_type,
            drawing: drawing.into(),
            layout: layout.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.layout {
            Some(layout) => write!(
                f,
                "[{}] {} / {}: {}",
                self.notification_type, self.drawing, layout, self.message
            ),
            None => write!(
                f,
                "[{}] {}: {}",
                self.notification_type, self.drawing, self.message
            ),
        }
    }
}

/// Collects notifications during a run.
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification.
    pub fn push(&mut self, notification: Notification) {
        self.items.push(notification);
    }

    /// Record a notification from its parts.
    pub fn notify(
        &mut self,
        notification_type: NotificationType,
        drawing: impl Into<String>,
        layout: Option<&str>,
        message: impl Into<String>,
    ) {
        self.push(Notification::new(notification_type, drawing, layout, message));
    }

    /// Append every notification of another collection.
    pub fn extend(&mut self, other: NotificationCollection) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over all notifications.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Get all notifications of a specific type.
    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    /// Notifications that correspond to sheets missing from the list.
    pub fn skipped_sheets(&self) -> impl Iterator<Item = &Notification> {
        self.items
            .iter()
            .filter(|n| n.notification_type.is_skipped_sheet())
    }

    /// Check whether any notification of the given type exists.
    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Multi-line summary for the end of a run.
    pub fn summary(&self) -> String {
        if self.items.is_empty() {
            return "No issues.".to_string();
        }
        let skipped = self.skipped_sheets().count();
        let mut out = format!(
            "{} issue(s), {} sheet(s) skipped:\n",
            self.items.len(),
            skipped
        );
        for n in &self.items {
            out.push_str("  ");
            out.push_str(&n.to_string());
            out.push('\n');
        }
        out
    }
}

impl IntoIterator for NotificationCollection {
    type Item = Notification;
    type IntoIter = std::vec::IntoIter<Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
