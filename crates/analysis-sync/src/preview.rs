//! Search result preview reconciliation
//!
//! Three writers compete for the preview: the initial snapshot, the user
//! editing the preview in place, and slugs generated by the server after a
//! title edit. Once the user has edited the url, server slugs never win.

use std::rc::Rc;

use shared_types::{SnippetField, SnippetFields};
use tracing::debug;

use crate::host::PreviewWidget;

/// What caused a preview save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewChange {
    Edited(SnippetField),
    ServerSlug,
}

/// Persistence hook invoked with the full preview state after every change
pub type SaveHook = Box<dyn Fn(&SnippetFields, PreviewChange)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPathState {
    pub current_value: String,
    pub is_user_edited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugOutcome {
    Applied,
    IgnoredUserEdited,
}

pub struct PreviewReconciler {
    widget: Rc<dyn PreviewWidget>,
    save_hook: SaveHook,
    title: String,
    meta_description: String,
    url: UrlPathState,
    isolated: bool,
}

impl PreviewReconciler {
    /// Seed the widget with the initial fields
    pub fn initialize(
        fields: SnippetFields,
        widget: Rc<dyn PreviewWidget>,
        save_hook: SaveHook,
    ) -> Self {
        widget.set_title(&fields.title);
        widget.set_url(&fields.url_path);
        widget.set_description(&fields.meta_description);
        widget.set_interactive(true);

        Self {
            widget,
            save_hook,
            title: fields.title,
            meta_description: fields.meta_description,
            url: UrlPathState {
                current_value: fields.url_path,
                is_user_edited: false,
            },
            isolated: false,
        }
    }

    pub fn fields(&self) -> SnippetFields {
        SnippetFields {
            title: self.title.clone(),
            url_path: self.url.current_value.clone(),
            meta_description: self.meta_description.clone(),
        }
    }

    pub fn url_path(&self) -> &str {
        &self.url.current_value
    }

    pub fn is_user_edited(&self) -> bool {
        self.url.is_user_edited
    }

    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    /// The user touched the url field. Permanent for the session.
    pub fn on_user_edited_url(&mut self) {
        if !self.url.is_user_edited {
            debug!("Preview url marked as user edited");
        }
        self.url.is_user_edited = true;
    }

    /// The user edited a field of the preview in place
    ///
    /// Returns `false` when the preview is isolated and the edit was ignored.
    pub fn edit_field(&mut self, field: SnippetField, value: &str) -> bool {
        if self.isolated {
            debug!(?field, "Ignoring edit on isolated preview");
            return false;
        }

        match field {
            SnippetField::Title => {
                self.title = value.to_string();
                self.widget.set_title(value);
            }
            SnippetField::UrlPath => {
                self.on_user_edited_url();
                self.url.current_value = value.to_string();
                self.widget.set_url(value);
            }
            SnippetField::MetaDesc => {
                self.meta_description = value.to_string();
                self.widget.set_description(value);
            }
        }
        (self.save_hook)(&self.fields(), PreviewChange::Edited(field));
        true
    }

    /// A slug generated by the server became available
    pub fn on_server_slug_available(&mut self, slug: &str) -> SlugOutcome {
        if self.url.is_user_edited {
            debug!(slug, "Ignoring server slug, url was edited by the user");
            return SlugOutcome::IgnoredUserEdited;
        }

        self.url.current_value = slug.to_string();
        self.widget.set_url(slug);
        (self.save_hook)(&self.fields(), PreviewChange::ServerSlug);
        SlugOutcome::Applied
    }

    /// Disable interactive editing for the rest of the session
    pub fn isolate(&mut self) {
        self.isolated = true;
        self.widget.set_interactive(false);
    }
}
