//! Strict decoding of a snapshot document.
//!
//! Pipeline:
//!   raw bytes
//!     └─ parse_object()        → JSON object          (MalformedInput)
//!          └─ check_version()   → formatVersion        (SchemaMismatch)
//!               └─ header fields → exportedAt, names    (InvalidDocument / UnknownCollection)
//!                    └─ decode_collection::<R>() per collection  (Validation)

use std::{collections::BTreeSet, str::FromStr};

use chrono::{DateTime, Utc};
use deen_core::{
  Collection, ValidationError,
  snapshot::{Collections, Document, FORMAT_VERSION},
};
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

use crate::{
  error::{Error, Result},
  rules::{Rules, check, key_of},
};

pub(crate) fn decode(input: &[u8]) -> Result<Document> {
  let mut root = parse_object(input)?;
  check_version(root.get("formatVersion"))?;

  let exported_at = match root.get("exportedAt") {
    Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|e| Error::InvalidDocument {
        field:   "exportedAt",
        message: format!("{s:?} is not an RFC 3339 timestamp: {e}"),
      })?,
    Some(other) => {
      return Err(Error::InvalidDocument {
        field:   "exportedAt",
        message: format!("expected a timestamp string, got {other}"),
      });
    }
    None => {
      return Err(Error::InvalidDocument {
        field:   "exportedAt",
        message: "missing".into(),
      });
    }
  };

  let mut raw = match root.remove("collections") {
    Some(Value::Object(map)) => map,
    Some(other) => {
      return Err(Error::InvalidDocument {
        field:   "collections",
        message: format!("expected an object, got {other}"),
      });
    }
    None => {
      return Err(Error::InvalidDocument {
        field:   "collections",
        message: "missing".into(),
      });
    }
  };

  if let Some(unknown) = raw.keys().find(|k| Collection::from_str(k).is_err()) {
    return Err(Error::UnknownCollection(unknown.clone()));
  }

  let mut collections = Collections::default();
  for collection in Collection::iter() {
    let Some(value) = raw.remove(collection.name()) else {
      continue;
    };
    match collection {
      Collection::Entries => collections.entries = Some(decode_collection(value)?),
      Collection::IbadahLog => collections.ibadah_log = Some(decode_collection(value)?),
      Collection::UserSettings => {
        collections.user_settings = Some(decode_collection(value)?)
      }
      Collection::QuranLogs => collections.quran_logs = Some(decode_collection(value)?),
      Collection::GratitudeLogs => {
        collections.gratitude_logs = Some(decode_collection(value)?)
      }
    }
  }

  Ok(Document::new(exported_at, collections))
}

fn parse_object(input: &[u8]) -> Result<Map<String, Value>> {
  let text = std::str::from_utf8(input)
    .map_err(|e| Error::MalformedInput(format!("not UTF-8: {e}")))?;
  match serde_json::from_str(text) {
    Ok(Value::Object(map)) => Ok(map),
    Ok(other) => Err(Error::MalformedInput(format!(
      "expected a JSON object at the top level, got {}",
      kind_of(&other)
    ))),
    Err(e) => Err(Error::MalformedInput(format!("not JSON: {e}"))),
  }
}

fn check_version(value: Option<&Value>) -> Result<()> {
  let mismatch = |found: String| Error::SchemaMismatch { found, supported: FORMAT_VERSION };
  match value {
    None => Err(mismatch("missing".into())),
    Some(v) => match v.as_u64() {
      Some(n) if (1..=u64::from(FORMAT_VERSION)).contains(&n) => Ok(()),
      _ => Err(mismatch(v.to_string())),
    },
  }
}

/// Decode one collection's array: field rules, typed decode, the kind's own
/// validation, then key uniqueness. Stops at the first bad record.
fn decode_collection<R: Rules>(value: Value) -> Result<Vec<R>, ValidationError> {
  let collection = R::COLLECTION;
  let items = match value {
    Value::Array(items) => items,
    other => {
      return Err(ValidationError::new(
        collection,
        format!("expected an array of records, got {}", kind_of(&other)),
      ));
    }
  };

  let mut seen = BTreeSet::new();
  let mut records = Vec::with_capacity(items.len());

  for (index, item) in items.into_iter().enumerate() {
    let fields = match item {
      Value::Object(fields) => fields,
      other => {
        let message = format!("expected an object, got {}", kind_of(&other));
        return Err(ValidationError::new(collection, message).at(index));
      }
    };
    let key = key_of(&fields, R::KEY_FIELD);
    let fail = |message: String| {
      ValidationError::new(collection, message).at(index).key(key.clone())
    };

    check(&fields, R::FIELDS).map_err(|(field, message)| fail(message).field(field))?;

    let record: R =
      serde_json::from_value(Value::Object(fields)).map_err(|e| fail(e.to_string()))?;

    record
      .validate()
      .map_err(|e| fail(e.message).field(e.field))?;

    if !seen.insert(record.key()) {
      return Err(fail("duplicate key".into()).field(R::KEY_FIELD));
    }
    records.push(record);
  }

  Ok(records)
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
