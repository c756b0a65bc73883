// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};

pub trait Clipboard {
    fn set(&mut self, contents: &str) -> Result<()>;
}

/// System clipboard, opened on first write so `--check` and headless runs
/// never touch the display server.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }

    fn ensure(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .context("open system clipboard; is a display server running?")?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| anyhow!("system clipboard unavailable"))
    }
}

impl Clipboard for SystemClipboard {
    fn set(&mut self, contents: &str) -> Result<()> {
        let clipboard = self.ensure()?;
        clipboard
            .set_text(contents.to_owned())
            .context("write to system clipboard")
    }
}
