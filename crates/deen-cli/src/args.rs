//! Command-line arguments.

use std::{path::PathBuf, str::FromStr};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use deen_core::{
  ibadah::{FastingType, PrayerStatus},
  journal::Mood,
  setting::SettingKey,
  snapshot::{ExportScope, Strategy},
};

// ─── Top level ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "deen",
  version,
  about = "Offline journal, prayer tracker and Quran study log"
)]
pub struct Cli {
  /// Path to a TOML config file (store_path, backup_dir).
  #[arg(short, long, value_name = "FILE", global = true)]
  pub config: Option<PathBuf>,

  /// Database file. Overrides the config file and DEEN_STORE_PATH.
  #[arg(long, value_name = "FILE", global = true)]
  pub store: Option<PathBuf>,

  /// Print records as JSON instead of text.
  #[arg(long, global = true)]
  pub json: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Daily journal entries.
  #[command(subcommand)]
  Journal(JournalCommand),

  /// Prayer and habit tracker.
  #[command(subcommand)]
  Tracker(TrackerCommand),

  /// Quran study reflections.
  #[command(subcommand)]
  Quran(QuranCommand),

  /// Gratitude notes.
  #[command(subcommand)]
  Gratitude(GratitudeCommand),

  /// User preferences.
  #[command(subcommand)]
  Settings(SettingsCommand),

  /// Write a JSON backup of the store.
  Export {
    #[arg(long, default_value_t = ExportScope::Full)]
    scope: ExportScope,

    /// Output file. Defaults to a dated file in the backup directory.
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
  },

  /// Restore a JSON backup into the store.
  Import {
    file: PathBuf,

    /// `overwrite` replaces each collection in the file; `merge` only adds
    /// records whose key is not stored yet.
    #[arg(long)]
    strategy: Strategy,
  },

  /// Check a backup file without touching the store.
  Validate { file: PathBuf },

  /// Erase every record. Needs `--yes --confirm DELETE`.
  Reset {
    #[arg(long)]
    yes: bool,

    #[arg(long, value_name = "WORD")]
    confirm: Option<String>,
  },

  /// Show the schema version and the collections it defines.
  Schema,
}

// ─── Journal ──────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
  /// Print the entry for a date (default today).
  Show { date: Option<NaiveDate> },

  /// Create or edit the entry for a date.
  Write(WriteArgs),

  /// Seal an entry so it can no longer be edited.
  Seal { date: Option<NaiveDate> },

  /// List entries, newest first, or oldest first within a range.
  List {
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
  },

  /// Find entries whose text or tags contain a phrase.
  Search { query: String },
}

#[derive(Args, Debug)]
pub struct WriteArgs {
  #[arg(long)]
  pub date: Option<NaiveDate>,

  /// New entry text. Replaces the previous text.
  pub text: Option<String>,

  /// Read the entry text from stdin.
  #[arg(long, conflicts_with = "text")]
  pub stdin: bool,

  /// Comma-separated tags. Replaces the previous tags.
  #[arg(long, value_delimiter = ',')]
  pub tags: Option<Vec<String>>,

  #[arg(long)]
  pub mood: Option<Mood>,

  /// Identifier of the writing prompt that was answered.
  #[arg(long)]
  pub prompt: Option<String>,
}

// ─── Tracker ──────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum TrackerCommand {
  /// Print the log for a date (default today).
  Show { date: Option<NaiveDate> },

  /// Record prayers and habits. All given fields are saved together.
  Log(LogArgs),

  /// Summarise the Sunday-to-Saturday week containing a date.
  Week { date: Option<NaiveDate> },
}

#[derive(Args, Debug)]
pub struct LogArgs {
  #[arg(long)]
  pub date: Option<NaiveDate>,

  #[arg(long, value_name = "STATUS")]
  pub fajr: Option<Slot>,

  #[arg(long, value_name = "STATUS")]
  pub dhuhr: Option<Slot>,

  #[arg(long, value_name = "STATUS")]
  pub asr: Option<Slot>,

  #[arg(long, value_name = "STATUS")]
  pub maghrib: Option<Slot>,

  #[arg(long, value_name = "STATUS")]
  pub isha: Option<Slot>,

  #[arg(long, value_name = "BOOL")]
  pub qiyam: Option<bool>,

  #[arg(long, value_name = "BOOL")]
  pub duha: Option<bool>,

  /// Quran pages read that day.
  #[arg(long)]
  pub pages: Option<u32>,

  #[arg(long)]
  pub fasting: Option<FastingType>,
}

/// A prayer slot as given on the command line: `missed`, `late`, `on-time`
/// (or `0`, `1`, `2`), or `unset` to clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot(pub Option<PrayerStatus>);

impl FromStr for Slot {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "unset" {
      return Ok(Self(None));
    }
    let status = match s.parse::<u8>() {
      Ok(n) => PrayerStatus::try_from(n).ok(),
      Err(_) => s.parse().ok(),
    };
    status
      .map(|status| Self(Some(status)))
      .ok_or_else(|| format!("expected missed, late, on-time or unset, got {s:?}"))
  }
}

// ─── Quran ────────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum QuranCommand {
  /// Record a reflection on a verse.
  Add(AddReflectionArgs),

  /// Change the sections or tags of a reflection.
  Edit {
    id: i64,

    #[command(flatten)]
    sections: Sections,

    #[arg(long, value_delimiter = ',')]
    tags: Option<Vec<String>>,
  },

  /// List reflections, newest first, or those of one date.
  List {
    #[arg(long)]
    date: Option<NaiveDate>,
  },

  Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct AddReflectionArgs {
  #[arg(long)]
  pub date: Option<NaiveDate>,

  #[arg(long)]
  pub surah: u16,

  #[arg(long)]
  pub verse: u16,

  /// Text of the verse, kept with the reflection.
  #[arg(long, default_value = "")]
  pub text: String,

  #[command(flatten)]
  pub sections: Sections,

  #[arg(long, value_delimiter = ',')]
  pub tags: Option<Vec<String>>,
}

/// The three parts of a reflection. At least one must end up non-blank.
#[derive(Args, Debug, Default)]
pub struct Sections {
  /// What the verse says.
  #[arg(long)]
  pub observation: Option<String>,

  /// How it applies to your life.
  #[arg(long)]
  pub application: Option<String>,

  /// A dua drawn from it.
  #[arg(long)]
  pub prayer: Option<String>,
}

// ─── Gratitude ────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum GratitudeCommand {
  Add {
    content: String,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,
  },

  Edit {
    id: i64,

    #[arg(long)]
    content: Option<String>,

    #[arg(long, conflicts_with = "clear_category")]
    category: Option<String>,

    #[arg(long)]
    clear_category: bool,
  },

  /// Most recent notes first.
  List {
    #[arg(long, default_value_t = 10)]
    limit: usize,
  },

  Delete { id: i64 },
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
  /// Print one setting, or all stored settings.
  Get { key: Option<SettingKey> },

  /// Set `theme`, `soundEnabled`, `dailyReminder` (HH:MM or off) or
  /// `hijriOffset` (-2 to 2).
  Set {
    key: SettingKey,

    #[arg(allow_hyphen_values = true)]
    value: String,
  },
}
