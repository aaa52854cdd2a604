//! The record store: the in-memory entry list and its JSON backing file.
//!
//! The whole collection is loaded once on open and rewritten in full after
//! every successful `add`. Writes go to `<file>.tmp` first and are renamed
//! over the backing file, so a crash mid-write leaves the previous version
//! intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::error::DiaryError;
use crate::models::{DateSummary, DiaryStats, Entry, NewEntry, TIMESTAMP_FORMAT};
use crate::query;

/// Owner of the diary. [`RecordStore::add`] is the only way in, so every
/// stored entry has passed validation:
///
/// ```compile_fail
/// use food_diary_core::{NewEntry, RecordStore};
///
/// let mut store = RecordStore::open("diary.json");
/// let new = NewEntry::parse("Toast", "120", "breakfast", "").unwrap();
/// store.insert(new).unwrap();
/// ```
pub struct RecordStore {
    path: PathBuf,
    entries: Vec<Entry>,
    clock: Box<dyn Clock>,
}

impl RecordStore {
    /// Open the store backed by `path`, stamping new entries with host time.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_clock(path, SystemClock)
    }

    pub fn open_with_clock(path: impl Into<PathBuf>, clock: impl Clock + 'static) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        tracing::debug!(count = entries.len(), path = %path.display(), "loaded entries");
        Self {
            path,
            entries,
            clock: Box::new(clock),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and append a new entry, then persist the collection.
    ///
    /// Nothing is mutated when validation fails. When the write fails the
    /// append is undone, so memory and disk stay in step.
    pub fn add(
        &mut self,
        food_name: &str,
        calories: &str,
        meal_type: &str,
        notes: &str,
    ) -> Result<Entry, DiaryError> {
        let new = NewEntry::parse(food_name, calories, meal_type, notes)?;
        self.insert(new)
    }

    fn insert(&mut self, new: NewEntry) -> Result<Entry, DiaryError> {
        let now = self.clock.now();
        let entry = Entry {
            id: self.next_id(),
            food_name: new.food_name,
            calories: new.calories,
            meal_type: new.meal_type,
            notes: new.notes,
            date: now.date(),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        };

        self.entries.push(entry.clone());
        if let Err(source) = self.save() {
            self.entries.pop();
            tracing::error!(error = %source, path = %self.path.display(), "failed to save entries");
            return Err(DiaryError::Persistence { source });
        }

        tracing::info!(id = entry.id, food = %entry.food_name, calories = entry.calories, "entry added");
        Ok(entry)
    }

    #[must_use]
    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Today's date according to the store's clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    /// Entries recorded on `date`, or on today when `date` is `None`.
    #[must_use]
    pub fn by_date(&self, date: Option<NaiveDate>) -> Vec<&Entry> {
        let date = date.unwrap_or_else(|| self.today());
        query::entries_on(&self.entries, date)
    }

    #[must_use]
    pub fn stats(&self) -> DiaryStats {
        query::stats(&self.entries)
    }

    #[must_use]
    pub fn date_summary(&self, date: Option<NaiveDate>) -> DateSummary {
        let date = date.unwrap_or_else(|| self.today());
        query::date_summary(&self.entries, date)
    }

    fn next_id(&self) -> u64 {
        self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = sibling_path(&self.path, "tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path).inspect_err(|_| {
            if let Err(e) = fs::remove_file(&tmp) {
                tracing::warn!(error = %e, path = %tmp.display(), "could not remove temp file");
            }
        })
    }
}

/// Read the backing file. A missing file is an empty diary; an unreadable or
/// unparseable one is also treated as empty, after copying it aside to
/// `<file>.corrupt` so the next save cannot destroy it unnoticed.
fn load_entries(path: &Path) -> Vec<Entry> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "could not read data file, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&data) {
        Ok(entries) => entries,
        Err(e) => {
            let backup = sibling_path(path, "corrupt");
            tracing::warn!(
                error = %e,
                path = %path.display(),
                backup = %backup.display(),
                "data file is not a valid entry list, starting empty"
            );
            if let Err(e) = fs::copy(path, &backup) {
                tracing::warn!(error = %e, "could not back up unreadable data file");
            }
            Vec::new()
        }
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
