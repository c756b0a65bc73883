// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Location {
    #[default]
    #[serde(rename = "On-Site")]
    OnSite,
    #[serde(rename = "Remote")]
    Remote,
}

impl Location {
    pub const ALL: [Self; 2] = [Self::OnSite, Self::Remote];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnSite => "On-Site",
            Self::Remote => "Remote",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "On-Site" => Some(Self::OnSite),
            "Remote" => Some(Self::Remote),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::OnSite => Self::Remote,
            Self::Remote => Self::OnSite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Email,
    Summary,
    PhoneNumber,
    Location,
    ComputerName,
    Notes,
}

impl FormField {
    /// Focus order of the form, top to bottom.
    pub const ALL: [Self; 6] = [
        Self::Email,
        Self::Summary,
        Self::PhoneNumber,
        Self::Location,
        Self::ComputerName,
        Self::Notes,
    ];

    /// Field name as it appears in stored JSON and named actions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Summary => "summary",
            Self::PhoneNumber => "phoneNumber",
            Self::Location => "location",
            Self::ComputerName => "computerName",
            Self::Notes => "notes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "email" => Some(Self::Email),
            "summary" => Some(Self::Summary),
            "phoneNumber" => Some(Self::PhoneNumber),
            "location" => Some(Self::Location),
            "computerName" => Some(Self::ComputerName),
            "notes" => Some(Self::Notes),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Summary => "Summary",
            Self::PhoneNumber => "Phone Number",
            Self::Location => "On-Site/Remote",
            Self::ComputerName => "Computer Name",
            Self::Notes => "Description of Issue/Request",
        }
    }

    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::Notes)
    }
}

/// The single form being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormRecord {
    pub computer_name: String,
    pub email: String,
    pub notes: String,
    pub phone_number: String,
    pub location: Location,
    pub summary: String,
}

impl FormRecord {
    /// Every text field empty; location is ignored since it always has a value.
    pub fn is_blank(&self) -> bool {
        self.computer_name.is_empty()
            && self.email.is_empty()
            && self.notes.is_empty()
            && self.phone_number.is_empty()
            && self.summary.is_empty()
    }

    /// Text value of a field; location renders through its label.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Email => &self.email,
            FormField::Summary => &self.summary,
            FormField::PhoneNumber => &self.phone_number,
            FormField::Location => self.location.as_str(),
            FormField::ComputerName => &self.computer_name,
            FormField::Notes => &self.notes,
        }
    }

    /// Sets a field. Returns false when a location value is not one of the
    /// two known options, leaving the record untouched.
    pub fn set(&mut self, field: FormField, data: String) -> bool {
        match field {
            FormField::Email => self.email = data,
            FormField::Summary => self.summary = data,
            FormField::PhoneNumber => self.phone_number = data,
            FormField::ComputerName => self.computer_name = data,
            FormField::Notes => self.notes = data,
            FormField::Location => match Location::parse(&data) {
                Some(location) => self.location = location,
                None => return false,
            },
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    #[serde(flatten)]
    pub record: FormRecord,
}

impl HistoryEntry {
    pub fn new(id: EntryId, record: FormRecord) -> Self {
        Self { id, record }
    }
}
