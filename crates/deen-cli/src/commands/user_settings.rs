use std::io::Write;

use anyhow::{Context as _, Result, anyhow};
use deen_core::{setting::Setting, store::DeenStore};

use crate::{
  args::SettingsCommand,
  render::{self, Output},
};

pub async fn run<S: DeenStore>(
  store: &S,
  command: SettingsCommand,
  out: &mut Output<impl Write>,
) -> Result<()> {
  match command {
    SettingsCommand::Get { key: Some(key) } => {
      match store.setting(key).await.context("failed to read setting")? {
        Some(setting) => out.record(&setting, render::setting),
        None => out.line(format!("{key} is not set")),
      }
    }

    SettingsCommand::Get { key: None } => {
      let settings = store.settings().await.context("failed to read settings")?;
      out.list(&settings, render::setting)
    }

    SettingsCommand::Set { key, value } => {
      let setting = Setting::parse(key, &value).map_err(|e| anyhow!(e.message))?;
      store
        .put_setting(setting.clone())
        .await
        .with_context(|| format!("failed to save {key}"))?;
      out.record(&setting, render::setting)
    }
  }
}
