// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{FormRecord, HistoryEntry};

const EMPTY_HISTORY_LABEL: &str = "(no email)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyTarget {
    Username,
    Summary,
    ComputerName,
    Information,
}

impl CopyTarget {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Summary => "summary",
            Self::ComputerName => "computer name",
            Self::Information => "information",
        }
    }

    pub fn text(self, record: &FormRecord) -> String {
        match self {
            Self::Username => username(&record.email),
            Self::Summary => copied_summary(record).to_owned(),
            Self::ComputerName => copied_computer_name(record),
            Self::Information => information_block(record),
        }
    }
}

/// Local part of an email address, lower-cased. Without an `@` the whole
/// string is used.
pub fn username(email: &str) -> String {
    let local = email.split_once('@').map_or(email, |(local, _)| local);
    local.to_lowercase()
}

pub fn copied_computer_name(record: &FormRecord) -> String {
    record.computer_name.to_uppercase()
}

pub fn copied_summary(record: &FormRecord) -> &str {
    &record.summary
}

pub fn information_block(record: &FormRecord) -> String {
    let mut block = format!(
        "Username: {}\nEmail: {}\nContact Number: {}\nOn-Site/Remote: {}",
        username(&record.email),
        record.email,
        record.phone_number,
        record.location.as_str(),
    );
    if !record.computer_name.is_empty() {
        block.push_str("\n\nComputer Name: ");
        block.push_str(&copied_computer_name(record));
    }
    if !record.notes.is_empty() {
        block.push_str("\n\nDescription of Issue/Request:\n");
        block.push_str(&record.notes);
    }
    block
}

pub fn history_label(entry: &HistoryEntry) -> String {
    let name = username(&entry.record.email);
    if name.is_empty() {
        EMPTY_HISTORY_LABEL.to_owned()
    } else {
        name
    }
}
