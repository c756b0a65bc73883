// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;

use crate::{EntryId, FormField, FormRecord, HistoryEntry};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    /// Entry being edited in place; `None` means the form is a new ticket.
    pub active_id: Option<EntryId>,
    pub form: FormRecord,
    pub history: Vec<HistoryEntry>,
    pub show_history: bool,
    pub viewing_history: bool,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    UpdateInput { field: FormField, data: String },
    ToggleHistory,
    Save { id: EntryId },
    Clear,
    SaveAndClear { id: EntryId },
    Load(HistoryEntry),
    SetHistory(Vec<HistoryEntry>),
    Delete { id: EntryId },
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    FieldChanged(FormField),
    HistoryVisibilityChanged(bool),
    EntryAppended(EntryId),
    EntryUpdated(EntryId),
    FormCleared,
    EntryLoaded(EntryId),
    HistoryReplaced(usize),
    EntryDeleted(EntryId),
    StatusUpdated(String),
    StatusCleared,
}

impl AppEvent {
    /// True for events after which the stored history is stale.
    pub fn changes_history(&self) -> bool {
        matches!(
            self,
            Self::EntryAppended(_)
                | Self::EntryUpdated(_)
                | Self::HistoryReplaced(_)
                | Self::EntryDeleted(_)
        )
    }
}

impl AppCommand {
    /// Maps a named action and its JSON payload onto a command.
    ///
    /// Returns `None` for unknown names and for payloads that do not fit the
    /// action, which callers treat as a no-op.
    pub fn from_action(name: &str, payload: &Value) -> Option<Self> {
        match name {
            "updateInput" => {
                let field = FormField::parse(payload.get("name")?.as_str()?)?;
                let data = payload.get("data")?.as_str()?.to_owned();
                Some(Self::UpdateInput { field, data })
            }
            "toggleHistory" => Some(Self::ToggleHistory),
            "save" => Some(Self::Save {
                id: payload_id(payload)?,
            }),
            "clear" => Some(Self::Clear),
            "load" => serde_json::from_value(payload.clone()).ok().map(Self::Load),
            "setHistory" => match payload {
                Value::Null => Some(Self::SetHistory(Vec::new())),
                _ => serde_json::from_value(payload.clone())
                    .ok()
                    .map(Self::SetHistory),
            },
            "delete" => Some(Self::Delete {
                id: payload_id(payload)?,
            }),
            _ => None,
        }
    }
}

fn payload_id(payload: &Value) -> Option<EntryId> {
    EntryId::parse(payload.get("id")?.as_str()?)
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::UpdateInput { field, data } => {
                if self.form.set(field, data) {
                    vec![AppEvent::FieldChanged(field)]
                } else {
                    Vec::new()
                }
            }
            AppCommand::ToggleHistory => {
                self.show_history = !self.show_history;
                vec![AppEvent::HistoryVisibilityChanged(self.show_history)]
            }
            AppCommand::Save { id } => self.save(id),
            AppCommand::Clear => {
                self.form = FormRecord::default();
                vec![AppEvent::FormCleared]
            }
            AppCommand::SaveAndClear { id } => {
                let mut events = self.save(id);
                events.extend(self.dispatch(AppCommand::Clear));
                events
            }
            AppCommand::Load(entry) => {
                self.active_id = Some(entry.id);
                self.viewing_history = true;
                self.form = entry.record;
                vec![AppEvent::EntryLoaded(entry.id)]
            }
            AppCommand::SetHistory(entries) => {
                self.history = entries;
                vec![AppEvent::HistoryReplaced(self.history.len())]
            }
            AppCommand::Delete { id } => {
                let before = self.history.len();
                self.history.retain(|entry| entry.id != id);
                if self.history.len() == before {
                    return Vec::new();
                }
                if self.active_id == Some(id) {
                    self.active_id = None;
                    self.viewing_history = false;
                }
                vec![AppEvent::EntryDeleted(id)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Applies a named action. Unknown names leave the state unchanged.
    pub fn dispatch_named(&mut self, name: &str, payload: &Value) -> Vec<AppEvent> {
        match AppCommand::from_action(name, payload) {
            Some(command) => self.dispatch(command),
            None => Vec::new(),
        }
    }

    /// Sets a field by its stored name. Unknown names are ignored.
    pub fn update_input(&mut self, name: &str, data: impl Into<String>) -> Vec<AppEvent> {
        match FormField::parse(name) {
            Some(field) => self.dispatch(AppCommand::UpdateInput {
                field,
                data: data.into(),
            }),
            None => Vec::new(),
        }
    }

    /// Non-mutating form of [`AppState::dispatch`].
    pub fn reduce(&self, command: AppCommand) -> (Self, Vec<AppEvent>) {
        let mut next = self.clone();
        let events = next.dispatch(command);
        (next, events)
    }

    pub fn is_active(&self, id: EntryId) -> bool {
        self.active_id == Some(id)
    }

    fn save(&mut self, id: EntryId) -> Vec<AppEvent> {
        let active = self.active_id.take();
        self.viewing_history = false;

        let target = active.unwrap_or(id);
        if let Some(entry) = self.history.iter_mut().find(|entry| entry.id == target) {
            entry.record = self.form.clone();
            return vec![AppEvent::EntryUpdated(target)];
        }

        if self.form.is_blank() {
            return vec![self.set_status("nothing to save")];
        }

        self.history.push(HistoryEntry::new(id, self.form.clone()));
        vec![AppEvent::EntryAppended(id)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
