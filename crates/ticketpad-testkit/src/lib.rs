// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use ticketpad_app::{EntryId, FormRecord, HistoryEntry, Location};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const DOMAINS: [&str; 4] = [
    "corp.example",
    "example.com",
    "helpdesk.test",
    "branch-office.example",
];
const SUMMARIES: [&str; 12] = [
    "Printer offline",
    "Password reset",
    "VPN keeps disconnecting",
    "Outlook not syncing",
    "New starter laptop setup",
    "Monitor flickering",
    "Shared drive access",
    "Teams audio dropping",
    "Software install request",
    "Slow boot times",
    "Phone voicemail setup",
    "Locked out of account",
];
const NOTE_OPENERS: [&str; 6] = [
    "User reports",
    "Caller says",
    "Observed",
    "Manager escalated",
    "Recurring issue:",
    "Follow-up:",
];
const NOTE_DETAILS: [&str; 8] = [
    "the issue started after the latest update",
    "it happens every morning around nine",
    "restarting helps for about an hour",
    "two colleagues on the same floor see it too",
    "error code 0x80070005 on screen",
    "no changes made on their side",
    "they need it fixed before the end of the week",
    "a temporary workaround is in place",
];
const MACHINE_PREFIXES: [&str; 4] = ["lt", "ws", "desk", "vm"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of realistic ticket forms and history entries.
#[derive(Debug, Clone)]
pub struct TicketFaker {
    rng: DeterministicRng,
    seed: u64,
    issued: u64,
}

impl TicketFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            issued: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// Ids are derived from the seed and a counter, so runs are repeatable.
    pub fn entry_id(&mut self) -> EntryId {
        self.issued += 1;
        EntryId::from_u128((u128::from(self.seed) << 64) | u128::from(self.issued))
    }

    pub fn form(&mut self) -> FormRecord {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&DOMAINS);
        let computer_name = if self.rng.bool() {
            format!(
                "{}-{:04}",
                self.pick(&MACHINE_PREFIXES),
                self.rng.int_n(10_000)
            )
        } else {
            String::new()
        };
        let notes = if self.rng.bool() {
            format!(
                "{} {}.",
                self.pick(&NOTE_OPENERS),
                self.pick(&NOTE_DETAILS)
            )
        } else {
            String::new()
        };
        let location = if self.rng.bool() {
            Location::Remote
        } else {
            Location::OnSite
        };

        FormRecord {
            computer_name,
            email: format!("{first}.{last}@{domain}"),
            notes,
            phone_number: format!(
                "({:03}) {:03}-{:04}",
                200 + self.rng.int_n(800),
                200 + self.rng.int_n(800),
                self.rng.int_n(10_000),
            ),
            location,
            summary: self.pick(&SUMMARIES).to_owned(),
        }
    }

    pub fn history_entry(&mut self) -> HistoryEntry {
        let id = self.entry_id();
        HistoryEntry::new(id, self.form())
    }

    pub fn history(&mut self, count: usize) -> Vec<HistoryEntry> {
        (0..count).map(|_| self.history_entry()).collect()
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }
}

/// History shown by `ticketpad --demo`.
pub fn demo_history() -> Vec<HistoryEntry> {
    TicketFaker::new(2026).history(8)
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("ticketpad.db");
    Ok((dir, db_path))
}

/// The form from the documented information-block example.
pub fn sample_remote_form() -> FormRecord {
    FormRecord {
        computer_name: String::new(),
        email: "a@b.com".to_owned(),
        notes: String::new(),
        phone_number: "555".to_owned(),
        location: Location::Remote,
        summary: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{TicketFaker, demo_history, temp_db_path};
    use anyhow::Result;
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_yields_same_history() {
        let first = TicketFaker::new(7).history(5);
        let second = TicketFaker::new(7).history(5);
        assert_eq!(first, second);
    }

    #[test]
    fn history_ids_are_unique() {
        let history = TicketFaker::new(3).history(50);
        let ids: BTreeSet<_> = history.iter().map(|entry| entry.id).collect();
        assert_eq!(ids.len(), history.len());
    }

    #[test]
    fn generated_forms_have_contact_details() {
        let mut faker = TicketFaker::new(11);
        for _ in 0..20 {
            let form = faker.form();
            assert!(form.email.contains('@'), "email {}", form.email);
            assert!(!form.phone_number.is_empty());
            assert!(!form.summary.is_empty());
        }
    }

    #[test]
    fn variety_across_seeds() {
        let mut emails = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            emails.insert(TicketFaker::new(seed).form().email);
        }
        assert!(emails.len() >= 10, "got {}", emails.len());
    }

    #[test]
    fn demo_history_is_stable_and_non_empty() {
        assert_eq!(demo_history(), demo_history());
        assert!(!demo_history().is_empty());
    }

    #[test]
    fn temp_db_path_lives_in_temp_dir() -> Result<()> {
        let (dir, path) = temp_db_path()?;
        assert!(path.starts_with(dir.path()));
        assert!(path.ends_with("ticketpad.db"));
        Ok(())
    }

    #[test]
    fn int_n() {
        let mut faker = TicketFaker::new(42);
        for _ in 0..100 {
            assert!(faker.int_n(5) < 5);
        }
    }
}
