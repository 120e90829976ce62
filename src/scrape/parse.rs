//! HTML parsing for profile pages and trophy log pages
//!
//! Parsing is best-effort at row granularity: a trophy row that does not fit
//! the schema becomes a [`RowOutcome::Skipped`] with a reason, and the rest of
//! the page is still used. Page-level structure (the user bar, the log table)
//! is reported back to the caller, which decides whether its absence is an
//! error.

use chrono::{NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html, Selector};

use super::ParseError;
use crate::config::SelectorConfig;
use crate::data::{ProfileSummary, RarityThresholds, TrophyRecord, TrophyTotals, TrophyType};

/// Upstream timestamp layout once ordinal suffixes are removed
const TIMESTAMP_FORMAT: &str = "%d %b %Y %I:%M:%S %p";
const DATE_FORMAT: &str = "%d %b %Y";

/// Selectors compiled from a [`SelectorConfig`]
#[derive(Debug, Clone)]
pub struct Schema {
    config: SelectorConfig,
    user_bar: Selector,
    username: Selector,
    avatar: Selector,
    totals: [Selector; 5],
    stat: Selector,
    stat_label: Selector,
    trophy_table: Selector,
    row: Selector,
    cell: Selector,
    game: Selector,
    icon: Selector,
    title: Selector,
    date: Selector,
    time: Selector,
    rarity: Selector,
    grade: Selector,
}

fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl Schema {
    /// Compiles every selector, failing on the first invalid one
    pub fn compile(config: &SelectorConfig) -> Result<Self, ParseError> {
        Ok(Self {
            user_bar: compile(&config.user_bar)?,
            username: compile(&config.username)?,
            avatar: compile(&config.avatar)?,
            totals: [
                compile(&config.total)?,
                compile(&config.platinum)?,
                compile(&config.gold)?,
                compile(&config.silver)?,
                compile(&config.bronze)?,
            ],
            stat: compile(&config.stat)?,
            stat_label: compile(&config.stat_label)?,
            trophy_table: compile(&config.trophy_table)?,
            row: compile(&config.row)?,
            cell: compile(&config.cell)?,
            game: compile(&config.game)?,
            icon: compile(&config.icon)?,
            title: compile(&config.title)?,
            date: compile(&config.date)?,
            time: compile(&config.time)?,
            rarity: compile(&config.rarity)?,
            grade: compile(&config.grade)?,
            config: config.clone(),
        })
    }

    /// The selector configuration this schema was built from
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }
}

/// Result of parsing one table row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(TrophyRecord),
    Skipped(String),
}

/// Trophies read from one trophy log page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogPage {
    pub records: Vec<TrophyRecord>,
    /// Reasons for rows that were dropped
    pub skipped: Vec<String>,
}

/// Reads the profile header
///
/// Returns `Ok(None)` when the page has no user bar, which is what the upstream
/// serves for unknown profiles.
pub fn parse_profile_summary(
    html: &str,
    schema: &Schema,
) -> Result<Option<ProfileSummary>, ParseError> {
    let document = Html::parse_document(html);
    let Some(user_bar) = document.select(&schema.user_bar).next() else {
        return Ok(None);
    };

    let username = user_bar
        .select(&schema.username)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let avatar_url = user_bar
        .select(&schema.avatar)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    let [total, platinum, gold, silver, bronze] = &schema.totals;
    let count = |selector: &Selector, field: &'static str| -> Result<Option<u32>, ParseError> {
        user_bar
            .select(selector)
            .next()
            .map(|el| parse_count(&element_text(el), field))
            .transpose()
    };

    let totals = TrophyTotals {
        total: count(total, "total trophies")?
            .ok_or(ParseError::MissingField {
                field: "total trophies",
            })?,
        platinum: count(platinum, "platinum trophies")?.unwrap_or(0),
        gold: count(gold, "gold trophies")?.unwrap_or(0),
        silver: count(silver, "silver trophies")?.unwrap_or(0),
        bronze: count(bronze, "bronze trophies")?.unwrap_or(0),
    };

    let mut stats = std::collections::BTreeMap::new();
    for stat in document.select(&schema.stat) {
        let Some(label) = stat.select(&schema.stat_label).next().map(element_text) else {
            continue;
        };
        let value: String = stat
            .children()
            .filter_map(|child| child.value().as_text().map(|t| (&**t).to_string()))
            .collect();
        let value = normalize_ws(&value).replace(',', "");
        if !label.is_empty() {
            stats.insert(label, value);
        }
    }

    Ok(Some(ProfileSummary {
        username,
        avatar_url,
        totals,
        stats,
    }))
}

/// Reads every trophy row from one trophy log page
///
/// Returns `None` when the trophy table is absent.
pub fn parse_log_page(
    html: &str,
    schema: &Schema,
    rarity: &RarityThresholds,
) -> Option<LogPage> {
    let document = Html::parse_document(html);
    let table = document.select(&schema.trophy_table).next()?;

    let mut page = LogPage::default();
    for row in table.select(&schema.row) {
        match parse_row(row, schema, rarity) {
            Some(RowOutcome::Parsed(record)) => page.records.push(record),
            Some(RowOutcome::Skipped(reason)) => page.skipped.push(reason),
            None => {}
        }
    }
    Some(page)
}

/// Classifies one table row
///
/// Rows without any data cell (headers, spacers) yield `None`.
pub fn parse_row(
    row: ElementRef<'_>,
    schema: &Schema,
    rarity: &RarityThresholds,
) -> Option<RowOutcome> {
    let cells: Vec<ElementRef<'_>> = row.select(&schema.cell).collect();
    if cells.is_empty() {
        return None;
    }
    let cfg = &schema.config;
    if cells.len() < cfg.min_cells {
        return Some(RowOutcome::Skipped(format!(
            "row has {} cells, expected at least {}",
            cells.len(),
            cfg.min_cells
        )));
    }

    let cell = |column: usize| cells.get(column).copied();
    let first = |column: usize, selector: &Selector| {
        cell(column).and_then(|c| c.select(selector).next())
    };

    let Some(title_el) = first(cfg.title_column, &schema.title) else {
        return Some(RowOutcome::Skipped("missing trophy title".to_string()));
    };
    let name = element_text(title_el);
    if name.is_empty() {
        return Some(RowOutcome::Skipped("empty trophy title".to_string()));
    }

    let game = first(cfg.game_column, &schema.game)
        .and_then(|el| el.value().attr("title"))
        .map(normalize_ws)
        .unwrap_or_default();
    if game.is_empty() {
        return Some(RowOutcome::Skipped(format!("'{name}' has no game title")));
    }

    let grade_label = first(cfg.grade_column, &schema.grade)
        .and_then(|el| el.value().attr("title"))
        .unwrap_or_default();
    let Some(trophy_type) = TrophyType::from_label(grade_label) else {
        return Some(RowOutcome::Skipped(format!(
            "'{name}' has unknown grade '{grade_label}'"
        )));
    };

    let rarity_text = first(cfg.rarity_column, &schema.rarity)
        .map(element_text)
        .unwrap_or_default();
    let rarity_percent = if is_unrated(&rarity_text) {
        None
    } else {
        let Some(percent) = parse_percent(&rarity_text) else {
            return Some(RowOutcome::Skipped(format!(
                "'{name}' has unreadable rarity '{rarity_text}'"
            )));
        };
        Some(percent)
    };

    let description = cell(cfg.title_column)
        .map(|c| text_outside(c, title_el))
        .unwrap_or_default();

    let icon_url = first(cfg.icon_column, &schema.icon)
        .and_then(|el| el.value().attr("src"))
        .map(str::to_string);

    let date = first(cfg.date_column, &schema.date)
        .map(element_text)
        .unwrap_or_default();
    let time = first(cfg.date_column, &schema.time)
        .map(element_text)
        .unwrap_or_default();

    Some(RowOutcome::Parsed(TrophyRecord {
        name,
        description,
        game,
        trophy_type,
        rarity_percent,
        rarity_tier: rarity_percent.map(|p| rarity.tier_for(p)),
        earned_at: parse_earned_at(&date, &time),
        icon_url,
    }))
}

/// Parses an upstream timestamp such as `24th Jan 2024` + `10:12:33 PM`
///
/// A date without a time is taken as midnight. Anything unreadable is `None`.
pub fn parse_earned_at(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = strip_ordinals(date);
    if date.is_empty() {
        return None;
    }
    let time = normalize_ws(time);
    if time.is_empty() {
        return NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), TIMESTAMP_FORMAT).ok()
}

/// Parses a rarity like `2.54%`; only values in [0, 100] are accepted
pub fn parse_percent(s: &str) -> Option<f64> {
    let value: f64 = s.trim().trim_end_matches('%').trim().parse().ok()?;
    (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(value)
}

/// Whether a rarity cell carries no figure at all
fn is_unrated(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("n/a")
}

/// Parses a count like `1,234`
fn parse_count(s: &str, field: &'static str) -> Result<u32, ParseError> {
    s.replace(',', "")
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidNumber {
            field,
            value: s.to_string(),
        })
}

/// `24th Jan 2024` -> `24 Jan 2024`
fn strip_ordinals(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            for suffix in ["st", "nd", "rd", "th"] {
                if let Some(number) = word.strip_suffix(suffix) {
                    if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                        return number;
                    }
                }
            }
            word
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<Vec<_>>().join(" "))
}

/// Text of `container` excluding anything inside `skip`
fn text_outside(container: ElementRef<'_>, skip: ElementRef<'_>) -> String {
    let pieces: Vec<&str> = container
        .descendants()
        .filter(|node| node.id() != skip.id() && !node.ancestors().any(|a| a.id() == skip.id()))
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect();
    normalize_ws(&pieces.join(" "))
}

/// Collapses runs of whitespace and trims
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
