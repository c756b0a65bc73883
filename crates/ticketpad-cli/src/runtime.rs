// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::clipboard::Clipboard;
use anyhow::{Context, Result};
use ticketpad_app::HistoryEntry;
use ticketpad_db::Store;

pub struct StoreRuntime<'a> {
    store: &'a Store,
    clipboard: Box<dyn Clipboard + 'a>,
}

impl<'a> StoreRuntime<'a> {
    pub fn new(store: &'a Store, clipboard: Box<dyn Clipboard + 'a>) -> Self {
        Self { store, clipboard }
    }
}

impl ticketpad_tui::AppRuntime for StoreRuntime<'_> {
    fn load_history(&mut self) -> Result<Vec<HistoryEntry>> {
        self.store.load_history()
    }

    fn persist_history(&mut self, history: &[HistoryEntry]) -> Result<()> {
        self.store
            .save_history(history)
            .context("save history; check that [storage].db_path is writable")
    }

    fn copy_text(&mut self, text: &str) -> Result<()> {
        self.clipboard.set(text)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreRuntime;
    use crate::clipboard::Clipboard;
    use anyhow::{Result, bail};
    use std::cell::RefCell;
    use ticketpad_app::{AppCommand, AppState, CopyTarget};
    use ticketpad_db::Store;
    use ticketpad_testkit::{TicketFaker, sample_remote_form};
    use ticketpad_tui::AppRuntime;

    struct RecordingClipboard<'a> {
        writes: &'a RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard<'_> {
        fn set(&mut self, contents: &str) -> Result<()> {
            self.writes.borrow_mut().push(contents.to_owned());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn set(&mut self, _contents: &str) -> Result<()> {
            bail!("clipboard is locked by another process")
        }
    }

    fn bootstrapped_store() -> Result<Store> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        Ok(store)
    }

    #[test]
    fn persist_then_load_returns_same_history() -> Result<()> {
        let store = bootstrapped_store()?;
        let writes = RefCell::new(Vec::new());
        let mut runtime = StoreRuntime::new(
            &store,
            Box::new(RecordingClipboard { writes: &writes }),
        );

        let history = TicketFaker::new(8).history(4);
        runtime.persist_history(&history)?;
        assert_eq!(runtime.load_history()?, history);
        Ok(())
    }

    #[test]
    fn load_on_fresh_store_is_empty() -> Result<()> {
        let store = bootstrapped_store()?;
        let mut runtime = StoreRuntime::new(&store, Box::new(BrokenClipboard));
        assert!(runtime.load_history()?.is_empty());
        Ok(())
    }

    #[test]
    fn copy_text_writes_formatted_text_to_clipboard() -> Result<()> {
        let store = bootstrapped_store()?;
        let writes = RefCell::new(Vec::new());
        let mut runtime = StoreRuntime::new(
            &store,
            Box::new(RecordingClipboard { writes: &writes }),
        );

        let form = sample_remote_form();
        runtime.copy_text(&CopyTarget::Username.text(&form))?;
        runtime.copy_text(&CopyTarget::Information.text(&form))?;

        let writes = writes.borrow();
        assert_eq!(writes[0], "a");
        assert!(writes[1].starts_with("Username: a\nEmail: a@b.com"));
        Ok(())
    }

    #[test]
    fn copy_text_propagates_clipboard_errors() -> Result<()> {
        let store = bootstrapped_store()?;
        let mut runtime = StoreRuntime::new(&store, Box::new(BrokenClipboard));
        let error = runtime
            .copy_text("anything")
            .expect_err("broken clipboard should fail");
        assert!(error.to_string().contains("locked"));
        Ok(())
    }

    #[test]
    fn session_edits_survive_a_new_runtime() -> Result<()> {
        let store = bootstrapped_store()?;
        let mut faker = TicketFaker::new(12);

        let mut state = AppState::default();
        {
            let mut runtime = StoreRuntime::new(&store, Box::new(BrokenClipboard));
            state.dispatch(AppCommand::SetHistory(runtime.load_history()?));
            state.form = faker.form();
            state.dispatch(AppCommand::SaveAndClear {
                id: faker.entry_id(),
            });
            runtime.persist_history(&state.history)?;
        }

        let mut runtime = StoreRuntime::new(&store, Box::new(BrokenClipboard));
        let reloaded = runtime.load_history()?;
        assert_eq!(reloaded, state.history);
        assert_eq!(reloaded.len(), 1);
        Ok(())
    }
}
