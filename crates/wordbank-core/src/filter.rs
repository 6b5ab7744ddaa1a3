//! Filtering, sorting and summary counts over the word collection.
//!
//! Everything here is a pure function of `(entries, filters, sort, now)`;
//! entries are borrowed and never modified.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::model::{Entry, PartOfSpeech};

/// How far back the date filter reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateWindow {
    Today,
    Week,
    Month,
    All,
}

impl DateWindow {
    /// Calendar days before today covered by the window, `None` for `All`.
    pub fn days_back(&self) -> Option<u64> {
        match self {
            DateWindow::Today => Some(0),
            DateWindow::Week => Some(7),
            DateWindow::Month => Some(30),
            DateWindow::All => None,
        }
    }

    /// First instant inside the window: local midnight `days_back` calendar
    /// days before `now`'s date.
    pub fn start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let days = self.days_back()?;
        let date = now
            .date_naive()
            .checked_sub_days(Days::new(days))
            .unwrap_or(NaiveDate::MIN);
        Some(local_midnight(&now.timezone(), date))
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindow::Today => write!(f, "today"),
            DateWindow::Week => write!(f, "week"),
            DateWindow::Month => write!(f, "month"),
            DateWindow::All => write!(f, "all"),
        }
    }
}

impl FromStr for DateWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(DateWindow::Today),
            "week" => Ok(DateWindow::Week),
            "month" => Ok(DateWindow::Month),
            "all" => Ok(DateWindow::All),
            other => Err(format!("unknown date window: {other}")),
        }
    }
}

/// Practiced / unpracticed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeStatus {
    #[default]
    All,
    Practiced,
    Unpracticed,
}

impl PracticeStatus {
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            PracticeStatus::All => true,
            PracticeStatus::Practiced => entry.is_practiced(),
            PracticeStatus::Unpracticed => !entry.is_practiced(),
        }
    }
}

impl FromStr for PracticeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(PracticeStatus::All),
            "practiced" => Ok(PracticeStatus::Practiced),
            "unpracticed" => Ok(PracticeStatus::Unpracticed),
            other => Err(format!("unknown practice status: {other}")),
        }
    }
}

/// Sort order of the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Newest => write!(f, "newest"),
            SortKey::Oldest => write!(f, "oldest"),
            SortKey::Alphabetical => write!(f, "alphabetical"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "alphabetical" | "alpha" | "az" => Ok(SortKey::Alphabetical),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Active filter criteria. All criteria must hold for an entry to pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    /// Case-insensitive substring of word or either definition.
    pub search: String,
    /// `None` means all parts of speech.
    pub part_of_speech: Option<PartOfSpeech>,
    /// `None` means all tags.
    pub tag: Option<String>,
    pub date: DateWindow,
    pub status: PracticeStatus,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            search: String::new(),
            part_of_speech: None,
            tag: None,
            date: DateWindow::Week,
            status: PracticeStatus::All,
        }
    }
}

impl Filters {
    /// No criteria at all, including the date window.
    pub fn everything() -> Self {
        Self {
            date: DateWindow::All,
            ..Self::default()
        }
    }
}

/// Summary counts shown alongside the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// All entries, unfiltered.
    pub total: usize,
    /// Added since the start of today.
    pub today: usize,
    /// Added since 7×24h before the start of today.
    pub week: usize,
    /// Entries surviving the active filters.
    pub filtered: usize,
    pub practiced: usize,
    pub unpracticed: usize,
}

/// Derived, read-only view of the collection.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub entries: Vec<&'a Entry>,
    pub stats: CollectionStats,
    pub all_tags: Vec<String>,
}

/// Filter, sort and count in one pass over the collection.
pub fn apply<'a, Tz: TimeZone>(
    entries: &'a [Entry],
    filters: &Filters,
    sort: SortKey,
    now: &DateTime<Tz>,
) -> FilteredView<'a> {
    let mut visible = filter_entries(entries, filters, now);
    sort_entries(&mut visible, sort);

    let mut stats = compute_stats(entries, now);
    stats.filtered = visible.len();

    FilteredView {
        entries: visible,
        stats,
        all_tags: collect_tags(entries),
    }
}

/// Entries matching every active criterion, in input order.
pub fn filter_entries<'a, Tz: TimeZone>(
    entries: &'a [Entry],
    filters: &Filters,
    now: &DateTime<Tz>,
) -> Vec<&'a Entry> {
    let window_start = filters.date.start(now);
    let term = filters.search.to_lowercase();

    entries
        .iter()
        .filter(|e| matches_search(e, &term))
        .filter(|e| filters.part_of_speech.map_or(true, |pos| e.part_of_speech == pos))
        .filter(|e| filters.tag.as_deref().map_or(true, |tag| e.has_tag(tag)))
        .filter(|e| window_start.map_or(true, |start| e.added_date >= start))
        .filter(|e| filters.status.matches(e))
        .collect()
}

fn matches_search(entry: &Entry, lowered_term: &str) -> bool {
    if lowered_term.is_empty() {
        return true;
    }
    entry.word.to_lowercase().contains(lowered_term)
        || entry.definitions.chinese.to_lowercase().contains(lowered_term)
        || entry.definitions.english.to_lowercase().contains(lowered_term)
}

/// Stable sort; equal keys keep their input order.
pub fn sort_entries(entries: &mut [&Entry], key: SortKey) {
    match key {
        SortKey::Newest => entries.sort_by(|a, b| b.added_date.cmp(&a.added_date)),
        SortKey::Oldest => entries.sort_by(|a, b| a.added_date.cmp(&b.added_date)),
        SortKey::Alphabetical => entries.sort_by(|a, b| compare_words(&a.word, &b.word)),
    }
}

/// Dictionary order: accents and case are ignored first ("café" files
/// under "cafe"), then unaccented before accented, then lowercase before
/// uppercase.
pub fn compare_words(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Lowercase base letters: decompose, then drop the combining marks.
fn fold(word: &str) -> String {
    word.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Reference counts over the whole collection, independent of filters.
///
/// `week` steps back a fixed 7×24h from the start of today, whereas the
/// week date filter steps back 7 calendar days. The two differ by an hour
/// when a DST change falls inside the window.
pub fn compute_stats<Tz: TimeZone>(entries: &[Entry], now: &DateTime<Tz>) -> CollectionStats {
    let today_start = local_midnight(&now.timezone(), now.date_naive());
    let week_start = today_start - Duration::days(7);

    let practiced = entries.iter().filter(|e| e.is_practiced()).count();

    CollectionStats {
        total: entries.len(),
        today: entries.iter().filter(|e| e.added_date >= today_start).count(),
        week: entries.iter().filter(|e| e.added_date >= week_start).count(),
        filtered: entries.len(),
        practiced,
        unpracticed: entries.len() - practiced,
    }
}

/// Every tag in the collection, deduplicated, in first-seen order.
pub fn collect_tags(entries: &[Entry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .flat_map(|e| e.tags.iter())
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

/// Midnight of `date` in `tz`, as UTC. If midnight falls in a DST gap the
/// first valid instant after it is used.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
