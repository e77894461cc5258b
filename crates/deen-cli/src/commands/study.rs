//! Quran reflections and gratitude notes.

use std::io::Write;

use anyhow::{Context as _, Result, anyhow, bail};
use deen_core::{
  gratitude::{GratitudePatch, NewGratitudeEntry},
  quran::{NewQuranReflection, QuranReflectionPatch, Reflection},
  store::DeenStore,
};

use super::today;
use crate::{
  args::{GratitudeCommand, QuranCommand, Sections},
  render::{self, Output},
};

pub async fn quran<S: DeenStore>(
  store: &S,
  command: QuranCommand,
  out: &mut Output<impl Write>,
) -> Result<()> {
  match command {
    QuranCommand::Add(args) => {
      let input = NewQuranReflection {
        date:       args.date.unwrap_or_else(today),
        surah:      args.surah,
        verse:      args.verse,
        verse_text: args.text,
        reflection: overlay(args.sections, Reflection::default()),
        tags:       args.tags.unwrap_or_default(),
      };
      let reflection = store
        .add_reflection(input)
        .await
        .context("failed to save reflection")?;
      out.record(&reflection, render::reflection)
    }

    QuranCommand::Edit { id, sections, tags } => {
      let existing = store
        .reflection(id)
        .await
        .context("failed to read reflection")?
        .ok_or_else(|| anyhow!("no reflection with id {id}"))?;
      let touches_sections =
        sections.observation.is_some() || sections.application.is_some() || sections.prayer.is_some();
      let patch = QuranReflectionPatch {
        reflection: touches_sections.then(|| overlay(sections, existing.reflection)),
        tags,
      };
      if patch == QuranReflectionPatch::default() {
        bail!("nothing to change; give --observation, --application, --prayer or --tags");
      }
      let reflection = store
        .update_reflection(id, patch)
        .await
        .with_context(|| format!("failed to update reflection {id}"))?;
      out.record(&reflection, render::reflection)
    }

    QuranCommand::List { date } => {
      let reflections = match date {
        Some(date) => store.reflections_on(date).await,
        None => store.reflections().await,
      }
      .context("failed to list reflections")?;
      out.list(&reflections, render::reflection)
    }

    QuranCommand::Delete { id } => {
      if !store.delete_reflection(id).await.context("failed to delete reflection")? {
        bail!("no reflection with id {id}");
      }
      out.line(format!("deleted reflection {id}"))
    }
  }
}

pub async fn gratitude<S: DeenStore>(
  store: &S,
  command: GratitudeCommand,
  out: &mut Output<impl Write>,
) -> Result<()> {
  match command {
    GratitudeCommand::Add { content, category, date } => {
      let input = NewGratitudeEntry { date: date.unwrap_or_else(today), content, category };
      let note = store
        .add_gratitude(input)
        .await
        .context("failed to save gratitude note")?;
      out.record(&note, render::gratitude)
    }

    GratitudeCommand::Edit { id, content, category, clear_category } => {
      let patch = GratitudePatch {
        content,
        category: if clear_category { Some(None) } else { category.map(Some) },
      };
      if patch == GratitudePatch::default() {
        bail!("nothing to change; give --content, --category or --clear-category");
      }
      let note = store
        .update_gratitude(id, patch)
        .await
        .with_context(|| format!("failed to update gratitude note {id}"))?;
      out.record(&note, render::gratitude)
    }

    GratitudeCommand::List { limit } => {
      let notes = store
        .recent_gratitude(limit)
        .await
        .context("failed to list gratitude notes")?;
      out.list(&notes, render::gratitude)
    }

    GratitudeCommand::Delete { id } => {
      if !store.delete_gratitude(id).await.context("failed to delete gratitude note")? {
        bail!("no gratitude note with id {id}");
      }
      out.line(format!("deleted gratitude note {id}"))
    }
  }
}

/// Replace the sections given on the command line, keep the rest.
fn overlay(sections: Sections, mut reflection: Reflection) -> Reflection {
  if let Some(observation) = sections.observation {
    reflection.observation = observation;
  }
  if let Some(application) = sections.application {
    reflection.application = application;
  }
  if let Some(prayer) = sections.prayer {
    reflection.prayer = prayer;
  }
  reflection
}
