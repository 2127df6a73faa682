//! Application state and logic
//!
//! `App` holds everything the screen shows. Each user action calls into the
//! controller, then copies the returned snapshot back into `App`; the next
//! draw renders from that explicit state.

use std::time::{Duration, Instant};

use linkbook_core::{KeyValueSlot, LinkListController, LinkRecord, ListSnapshot};

use crate::display::UrlDisplay;

/// How long a status message stays on screen
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Which part of the screen receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The name input field
    Name,
    /// The URL input field
    Url,
    /// The link list
    List,
}

impl Focus {
    /// Move to the next element (wrapping)
    pub fn next(self) -> Self {
        match self {
            Focus::Name => Focus::Url,
            Focus::Url => Focus::List,
            Focus::List => Focus::Name,
        }
    }

    /// Move to the previous element (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Focus::Name => Focus::List,
            Focus::Url => Focus::Name,
            Focus::List => Focus::Url,
        }
    }

    pub fn is_input(self) -> bool {
        matches!(self, Focus::Name | Focus::Url)
    }
}

/// A single-line text field with a cursor (counted in chars)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    /// Insert character at cursor position
    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset();
            self.value.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    /// Take the value, leaving the field empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    fn byte_offset(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Focused element
    pub focus: Focus,
    /// Name field
    pub name_input: TextInput,
    /// URL field
    pub url_input: TextInput,
    /// Links in display order (sorted view)
    pub links: Vec<LinkRecord>,
    /// Currently selected link index
    pub link_index: usize,
    /// Whether the undo button is shown
    pub undo_available: bool,
    /// Name of the link an undo would restore
    pub deleted_name: Option<String>,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
}

impl App {
    /// Load the stored links and build the initial screen state
    pub fn on_startup<S: KeyValueSlot>(links: &mut LinkListController<S>) -> Self {
        let snapshot = links.load();
        let mut app = Self {
            should_quit: false,
            focus: Focus::Name,
            name_input: TextInput::default(),
            url_input: TextInput::default(),
            links: Vec::new(),
            link_index: 0,
            undo_available: false,
            deleted_name: None,
            status_message: None,
            status_message_time: None,
            show_help: false,
        };
        app.apply(snapshot, links);
        app
    }

    /// Save the two input fields as a new link and clear them
    pub fn on_save_pressed<S: KeyValueSlot>(&mut self, links: &mut LinkListController<S>) {
        let name = self.name_input.take();
        let url = self.url_input.take();
        let snapshot = links.add(name.clone(), url);
        self.apply(snapshot, links);
        self.focus = Focus::Name;
        if !self.report_save_error(links) {
            self.set_status(format!("Added '{}'", name));
        }
    }

    /// Delete the link with `id`
    pub fn on_delete_pressed<S: KeyValueSlot>(
        &mut self,
        links: &mut LinkListController<S>,
        id: uuid::Uuid,
    ) {
        let saved_index = self.link_index;
        let snapshot = links.delete(id);
        self.apply(snapshot, links);
        // Keep the cursor near where it was
        if !self.links.is_empty() {
            self.link_index = saved_index.min(self.links.len() - 1);
        }
        if !self.report_save_error(links) {
            if let Some(name) = &self.deleted_name {
                self.set_status(format!("Deleted '{}'. Press u to undo", name));
            }
        }
    }

    /// Delete the selected link
    pub fn delete_selected<S: KeyValueSlot>(&mut self, links: &mut LinkListController<S>) {
        if let Some(id) = self.current_link().map(|l| l.id) {
            self.on_delete_pressed(links, id);
        }
    }

    /// Restore the most recently deleted link
    pub fn on_undo_pressed<S: KeyValueSlot>(&mut self, links: &mut LinkListController<S>) {
        let restored = self.deleted_name.clone();
        let snapshot = links.undo_delete();
        self.apply(snapshot, links);
        if self.report_save_error(links) {
            return;
        }
        match restored {
            Some(name) => self.set_status(format!("Restored '{}'", name)),
            None => self.set_status("Nothing to undo"),
        }
    }

    /// Copy controller state into the screen state
    fn apply<S: KeyValueSlot>(&mut self, snapshot: ListSnapshot, links: &LinkListController<S>) {
        self.links = snapshot.links;
        self.undo_available = snapshot.undo_available;
        self.deleted_name = links.deleted().map(|l| l.name.clone());

        // Clamp link selection to new list bounds
        if self.links.is_empty() {
            self.link_index = 0;
        } else {
            self.link_index = self.link_index.min(self.links.len() - 1);
        }
    }

    /// Show a failed save on the status line; returns whether there was one
    fn report_save_error<S: KeyValueSlot>(&mut self, links: &mut LinkListController<S>) -> bool {
        match links.take_save_error() {
            Some(e) => {
                let message = match e.recovery_suggestion() {
                    Some(hint) => format!("Failed to save: {}. {}", e, hint),
                    None => format!("Failed to save: {}", e),
                };
                self.set_status(message);
                true
            }
            None => false,
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Get the currently selected link
    pub fn current_link(&self) -> Option<&LinkRecord> {
        self.links.get(self.link_index)
    }

    /// The focused input field, if an input is focused
    pub fn active_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            Focus::Name => Some(&mut self.name_input),
            Focus::Url => Some(&mut self.url_input),
            Focus::List => None,
        }
    }

    pub fn move_up(&mut self) {
        self.link_index = self.link_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.link_index < self.links.len().saturating_sub(1) {
            self.link_index += 1;
        }
    }

    pub fn move_to_first(&mut self) {
        self.link_index = 0;
    }

    pub fn move_to_last(&mut self) {
        self.link_index = self.links.len().saturating_sub(1);
    }

    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Open the selected link in the browser, if its URL is valid
    pub fn open_selected(&mut self) {
        let Some(link) = self.current_link() else {
            return;
        };
        let name = link.name.clone();

        match UrlDisplay::classify(&link.url) {
            UrlDisplay::Link { url, .. } => match open::that_detached(url.as_str()) {
                Ok(()) => self.set_status(format!("Opened '{}'", name)),
                Err(e) => self.set_status(format!("Failed to open: {}", e)),
            },
            UrlDisplay::Invalid(raw) => self.set_status(format!("Invalid URL: {}", raw)),
        }
    }
}
