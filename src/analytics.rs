//! Derived statistics over a trophy dataset
//!
//! Everything here is a pure function of a [`TrophyDataset`]. Trophies without
//! an earned date count toward totals but are left out of anything that needs a
//! point in time (streaks, timelines, milestones).

use chrono::{Datelike, Duration, IsoWeek, NaiveDate, NaiveDateTime, Timelike};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::data::{RarityTier, TrophyDataset, TrophyRecord, TrophyType};

/// Trophies earned per grade; every grade is present
pub fn grade_counts(dataset: &TrophyDataset) -> BTreeMap<TrophyType, usize> {
    let mut counts: BTreeMap<TrophyType, usize> =
        TrophyType::ALL.iter().map(|t| (*t, 0)).collect();
    for record in &dataset.records {
        *counts.entry(record.trophy_type).or_default() += 1;
    }
    counts
}

/// Trophies per rarity tier, rarest first; every tier is present
pub fn rarity_distribution(dataset: &TrophyDataset) -> Vec<(RarityTier, usize)> {
    RarityTier::ALL
        .iter()
        .map(|tier| {
            let n = dataset
                .records
                .iter()
                .filter(|r| r.rarity_tier == Some(*tier))
                .count();
            (*tier, n)
        })
        .collect()
}

/// Per-game aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub game: String,
    /// Trophies earned in this game
    pub trophies: usize,
    /// Whether the platinum was earned
    pub platinum: bool,
    pub first_earned: Option<NaiveDateTime>,
    pub last_earned: Option<NaiveDateTime>,
}

/// Per-game aggregates, most trophies first, ties by title
pub fn game_summaries(dataset: &TrophyDataset) -> Vec<GameSummary> {
    let mut by_game: HashMap<&str, GameSummary> = HashMap::new();
    for record in &dataset.records {
        let entry = by_game
            .entry(record.game.as_str())
            .or_insert_with(|| GameSummary {
                game: record.game.clone(),
                trophies: 0,
                platinum: false,
                first_earned: None,
                last_earned: None,
            });
        entry.trophies += 1;
        entry.platinum |= record.trophy_type == TrophyType::Platinum;
        if let Some(at) = record.earned_at {
            entry.first_earned = Some(entry.first_earned.map_or(at, |f| f.min(at)));
            entry.last_earned = Some(entry.last_earned.map_or(at, |l| l.max(at)));
        }
    }

    let mut games: Vec<GameSummary> = by_game.into_values().collect();
    games.sort_by(|a, b| b.trophies.cmp(&a.trophies).then_with(|| a.game.cmp(&b.game)));
    games
}

/// The `n` games with the most trophies
pub fn top_games(dataset: &TrophyDataset, n: usize) -> Vec<GameSummary> {
    let mut games = game_summaries(dataset);
    games.truncate(n);
    games
}

/// A run of consecutive days with at least one trophy each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Streak {
    /// Length in days, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Longest and current trophy streaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakReport {
    /// Longest streak; the earliest one wins ties
    pub longest: Option<Streak>,
    /// Length of the streak still running as of `today` (0 if broken)
    pub current_days: i64,
}

/// Finds trophy streaks
///
/// The most recent streak counts as current if it ended `today` or the day
/// before.
pub fn streaks(dataset: &TrophyDataset, today: NaiveDate) -> StreakReport {
    let mut runs: Vec<Streak> = Vec::new();
    for day in daily_counts(dataset).into_keys() {
        match runs.last_mut() {
            Some(run) if day - run.end == Duration::days(1) => run.end = day,
            _ => runs.push(Streak {
                start: day,
                end: day,
            }),
        }
    }

    let longest = runs.iter().fold(None::<Streak>, |best, run| match best {
        Some(b) if b.days() >= run.days() => Some(b),
        _ => Some(*run),
    });

    let current_days = runs
        .last()
        .filter(|run| (today - run.end).num_days() <= 1)
        .map_or(0, Streak::days);

    StreakReport {
        longest,
        current_days,
    }
}

/// How long a platinum took, measured from the game's first trophy
#[derive(Debug, Clone, PartialEq)]
pub struct PlatinumTime<'a> {
    pub game: &'a str,
    pub platinum: &'a TrophyRecord,
    pub started: NaiveDateTime,
    pub earned: NaiveDateTime,
}

impl PlatinumTime<'_> {
    pub fn duration(&self) -> Duration {
        self.earned - self.started
    }

    /// Whole days to platinum
    pub fn days(&self) -> i64 {
        self.duration().num_days()
    }
}

/// Dated platinums ranked fastest first
pub fn time_to_platinum(dataset: &TrophyDataset) -> Vec<PlatinumTime<'_>> {
    let mut first_by_game: HashMap<&str, NaiveDateTime> = HashMap::new();
    for (record, at) in dataset.dated() {
        first_by_game
            .entry(record.game.as_str())
            .and_modify(|first| *first = (*first).min(at))
            .or_insert(at);
    }

    let mut times: Vec<PlatinumTime<'_>> = dataset
        .dated()
        .filter(|(r, _)| r.trophy_type == TrophyType::Platinum)
        .filter_map(|(record, earned)| {
            let started = *first_by_game.get(record.game.as_str())?;
            Some(PlatinumTime {
                game: &record.game,
                platinum: record,
                started,
                earned,
            })
        })
        .collect();
    times.sort_by(|a, b| {
        a.duration()
            .cmp(&b.duration())
            .then_with(|| a.game.cmp(b.game))
    });
    times
}

/// A notable trophy
#[derive(Debug, Clone, PartialEq)]
pub struct Milestone<'a> {
    pub label: String,
    pub record: &'a TrophyRecord,
    pub earned_at: NaiveDateTime,
}

/// Trophy counts that earn a milestone on their own
const NAMED_MILESTONES: [(usize, &str); 4] = [
    (69, "69th Trophy"),
    (420, "420th Trophy"),
    (666, "666th Trophy"),
    (1337, "1337th Trophy (Leet!)"),
];

/// Notable trophies in chronological order
///
/// Covers the first trophy, first and latest platinum, fastest platinum, a
/// few named trophy counts, every 1000th trophy and every 10th platinum.
pub fn milestones(dataset: &TrophyDataset) -> Vec<Milestone<'_>> {
    // Upstream lists newest first; reversing keeps same-second trophies in
    // earning order after the stable sort.
    let mut timeline: Vec<(&TrophyRecord, NaiveDateTime)> = dataset.dated().collect();
    timeline.reverse();
    timeline.sort_by_key(|(_, at)| *at);

    let platinums: Vec<(&TrophyRecord, NaiveDateTime)> = timeline
        .iter()
        .copied()
        .filter(|(r, _)| r.trophy_type == TrophyType::Platinum)
        .collect();

    let mut out = Vec::new();
    let Some(&first) = timeline.first() else {
        return out;
    };
    out.push(milestone("First Ever Trophy".to_string(), first));

    if let (Some(&first_plat), Some(&latest_plat)) = (platinums.first(), platinums.last()) {
        out.push(milestone("First Platinum".to_string(), first_plat));
        out.push(milestone("Latest Platinum".to_string(), latest_plat));
    }
    if let Some(fastest) = time_to_platinum(dataset).first() {
        out.push(milestone(
            format!("Fastest Platinum ({})", format_duration(fastest.duration())),
            (fastest.platinum, fastest.earned),
        ));
    }

    for (n, label) in NAMED_MILESTONES {
        if let Some(&entry) = timeline.get(n - 1) {
            out.push(milestone(label.to_string(), entry));
        }
    }
    for n in (1000..=timeline.len()).step_by(1000) {
        out.push(milestone(format!("{n}th Trophy"), timeline[n - 1]));
    }
    for n in (10..=platinums.len()).step_by(10) {
        out.push(milestone(format!("{n}th Platinum"), platinums[n - 1]));
    }

    out.sort_by_key(|m| m.earned_at);
    out
}

fn milestone(label: String, (record, earned_at): (&TrophyRecord, NaiveDateTime)) -> Milestone<'_> {
    Milestone {
        label,
        record,
        earned_at,
    }
}

fn format_duration(d: Duration) -> String {
    let days = d.num_days();
    let hours = d.num_hours() % 24;
    let minutes = d.num_minutes() % 60;
    format!("{days}d {hours}h {minutes}m")
}

/// Trophies earned in one calendar month, by grade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub bronze: usize,
    pub silver: usize,
    pub gold: usize,
    pub platinum: usize,
}

impl MonthlyCount {
    pub fn total(&self) -> usize {
        self.bronze + self.silver + self.gold + self.platinum
    }
}

/// Trophies per month, oldest first; months without trophies are omitted
pub fn monthly_timeline(dataset: &TrophyDataset) -> Vec<MonthlyCount> {
    let mut months: BTreeMap<(i32, u32), MonthlyCount> = BTreeMap::new();
    for (record, at) in dataset.dated() {
        let key = (at.year(), at.month());
        let entry = months.entry(key).or_insert(MonthlyCount {
            year: key.0,
            month: key.1,
            bronze: 0,
            silver: 0,
            gold: 0,
            platinum: 0,
        });
        match record.trophy_type {
            TrophyType::Bronze => entry.bronze += 1,
            TrophyType::Silver => entry.silver += 1,
            TrophyType::Gold => entry.gold += 1,
            TrophyType::Platinum => entry.platinum += 1,
        }
    }
    months.into_values().collect()
}

/// Trophies earned on each day that saw any
pub fn daily_counts(dataset: &TrophyDataset) -> BTreeMap<NaiveDate, usize> {
    let mut days = BTreeMap::new();
    for (_, at) in dataset.dated() {
        *days.entry(at.date()).or_default() += 1;
    }
    days
}

/// Rarity below which a trophy counts for [`rarest_trophies`]
pub const RAREST_BELOW_PERCENT: f64 = 5.0;

/// Cap on [`rarest_trophies`]
pub const RAREST_LIMIT: usize = 100;

/// Trophies under [`RAREST_BELOW_PERCENT`], rarest first, at most [`RAREST_LIMIT`]
///
/// Trophies without a rarity figure are left out.
pub fn rarest_trophies(dataset: &TrophyDataset) -> Vec<&TrophyRecord> {
    let mut rare: Vec<(&TrophyRecord, f64)> = dataset
        .records
        .iter()
        .filter_map(|r| r.rarity_percent.map(|p| (r, p)))
        .filter(|(_, p)| *p < RAREST_BELOW_PERCENT)
        .collect();
    rare.sort_by(|a, b| a.1.total_cmp(&b.1));
    rare.into_iter().take(RAREST_LIMIT).map(|(r, _)| r).collect()
}

/// Trophies in one time slot and how many distinct periods contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivitySlot {
    pub trophies: usize,
    /// Distinct days (hourly slots) or ISO weeks (weekday slots) with activity
    pub active_periods: usize,
}

impl ActivitySlot {
    /// Trophies per active period; 0 for an empty slot
    pub fn average(&self) -> f64 {
        if self.active_periods == 0 {
            0.0
        } else {
            self.trophies as f64 / self.active_periods as f64
        }
    }
}

/// Activity per hour of day, index 0 is midnight
pub fn activity_by_hour(dataset: &TrophyDataset) -> [ActivitySlot; 24] {
    let mut days: [BTreeSet<NaiveDate>; 24] = std::array::from_fn(|_| BTreeSet::new());
    let mut slots = [ActivitySlot::default(); 24];
    for (_, at) in dataset.dated() {
        let hour = at.hour() as usize;
        slots[hour].trophies += 1;
        days[hour].insert(at.date());
    }
    for (slot, seen) in slots.iter_mut().zip(&days) {
        slot.active_periods = seen.len();
    }
    slots
}

/// Activity per weekday, index 0 is Monday
pub fn activity_by_weekday(dataset: &TrophyDataset) -> [ActivitySlot; 7] {
    let mut weeks: [BTreeSet<IsoWeek>; 7] = std::array::from_fn(|_| BTreeSet::new());
    let mut slots = [ActivitySlot::default(); 7];
    for (_, at) in dataset.dated() {
        let day = at.weekday().num_days_from_monday() as usize;
        slots[day].trophies += 1;
        weeks[day].insert(at.iso_week());
    }
    for (slot, seen) in slots.iter_mut().zip(&weeks) {
        slot.active_periods = seen.len();
    }
    slots
}

/// One trophy on the acquisition curve
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionPoint<'a> {
    pub record: &'a TrophyRecord,
    pub earned_at: NaiveDateTime,
    /// Whole days since the first trophy in the same game
    pub days_from_start: i64,
    /// Trophies earned overall up to and including this one
    pub cumulative: usize,
}

/// Dated trophies oldest first, with per-game and overall progress
pub fn acquisition_curve(dataset: &TrophyDataset) -> Vec<AcquisitionPoint<'_>> {
    let mut timeline: Vec<(&TrophyRecord, NaiveDateTime)> = dataset.dated().collect();
    timeline.reverse();
    timeline.sort_by_key(|(_, at)| *at);

    let mut first_by_game: HashMap<&str, NaiveDateTime> = HashMap::new();
    timeline
        .into_iter()
        .enumerate()
        .map(|(i, (record, earned_at))| {
            let start = *first_by_game
                .entry(record.game.as_str())
                .or_insert(earned_at);
            AcquisitionPoint {
                record,
                earned_at,
                days_from_start: (earned_at - start).num_days(),
                cumulative: i + 1,
            }
        })
        .collect()
}

/// Every platinum in dataset order (newest first), dated or not
pub fn platinums(dataset: &TrophyDataset) -> Vec<&TrophyRecord> {
    dataset
        .records
        .iter()
        .filter(|r| r.trophy_type == TrophyType::Platinum)
        .collect()
}

/// Record filter for tabular views and export
///
/// Empty fields do not filter. A date bound excludes undated trophies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrophyFilter {
    /// First day to include
    pub from: Option<NaiveDate>,
    /// Last day to include
    pub to: Option<NaiveDate>,
    /// Grades to keep
    pub grades: Option<BTreeSet<TrophyType>>,
    /// Case-insensitive substring of the game title
    pub game_query: Option<String>,
}

impl TrophyFilter {
    /// Whether a record passes every configured condition
    pub fn matches(&self, record: &TrophyRecord) -> bool {
        if self.from.is_some() || self.to.is_some() {
            let Some(day) = record.earned_at.map(|at| at.date()) else {
                return false;
            };
            if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
                return false;
            }
        }
        if let Some(ref grades) = self.grades {
            if !grades.contains(&record.trophy_type) {
                return false;
            }
        }
        if let Some(ref query) = self.game_query {
            if !record.game.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        true
    }

    /// Matching records, in dataset order
    pub fn apply<'a>(&self, dataset: &'a TrophyDataset) -> Vec<&'a TrophyRecord> {
        dataset.records.iter().filter(|r| self.matches(r)).collect()
    }
}
