//! Plain-text rendering of a loaded dataset

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use std::fmt::{self, Write};

use crate::analytics;
use crate::data::{TrophyDataset, TrophyType};
use crate::provider::{DataSource, Loaded};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Weekday names in `activity_by_weekday` order
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Renders the summary report shown by the binary
///
/// `today` anchors the current streak; `top` limits every ranked list.
pub fn render(loaded: &Loaded, top: usize, today: NaiveDate) -> String {
    let mut out = String::new();
    // fmt::Write for String never fails
    if write_report(&mut out, loaded, top, today).is_err() {
        out.clear();
    }
    out
}

/// Writes the report section by section
pub fn write_report<W: Write>(
    out: &mut W,
    loaded: &Loaded,
    top: usize,
    today: NaiveDate,
) -> fmt::Result {
    let dataset = &loaded.dataset;
    let summary = &dataset.summary;

    writeln!(out, "{}", summary.username)?;
    writeln!(out, "{}", provenance(loaded.source, loaded.fetched_at))?;
    writeln!(
        out,
        "Trophies: {} (P {} / G {} / S {} / B {})",
        summary.totals.total,
        summary.totals.platinum,
        summary.totals.gold,
        summary.totals.silver,
        summary.totals.bronze
    )?;
    for (label, value) in &summary.stats {
        writeln!(out, "  {label}: {value}")?;
    }

    writeln!(out, "\nScraped trophies: {}", dataset.len())?;
    if dataset.is_empty() {
        return Ok(());
    }

    write_breakdowns(out, dataset, top)?;
    write_activity(out, dataset, today)?;
    write_platinums(out, dataset, top)?;
    write_milestones(out, dataset)?;
    write_timeline(out, dataset)
}

fn write_breakdowns<W: Write>(out: &mut W, dataset: &TrophyDataset, top: usize) -> fmt::Result {
    let grades = analytics::grade_counts(dataset);
    writeln!(out, "\nBy grade")?;
    for grade in TrophyType::ALL {
        let count = grades.get(&grade).copied().unwrap_or(0);
        writeln!(out, "  {:<10}{count:>6}", grade.label())?;
    }

    writeln!(out, "\nBy rarity")?;
    let distribution = analytics::rarity_distribution(dataset);
    for (tier, count) in &distribution {
        writeln!(out, "  {:<12}{count:>6}", tier.label())?;
    }
    let rated: usize = distribution.iter().map(|(_, n)| n).sum();
    if rated < dataset.len() {
        writeln!(out, "  {:<12}{:>6}", "No data", dataset.len() - rated)?;
    }

    let rarest = analytics::rarest_trophies(dataset);
    if !rarest.is_empty() {
        writeln!(out, "\nRarest trophies")?;
        for record in rarest.iter().take(top) {
            let percent = record.rarity_percent.unwrap_or_default();
            writeln!(out, "  {percent:>6.2}%  {} ({})", record.name, record.game)?;
        }
    }

    let games = analytics::top_games(dataset, top);
    if !games.is_empty() {
        writeln!(out, "\nTop games")?;
        for game in &games {
            writeln!(
                out,
                "  {:<40}{:>5} trophies{}",
                game.game,
                game.trophies,
                if game.platinum { "  [P]" } else { "" }
            )?;
        }
    }
    Ok(())
}

fn write_activity<W: Write>(out: &mut W, dataset: &TrophyDataset, today: NaiveDate) -> fmt::Result {
    let streaks = analytics::streaks(dataset, today);
    let Some(longest) = streaks.longest else {
        return Ok(());
    };
    writeln!(
        out,
        "\nLongest streak: {} days ({} to {})",
        longest.days(),
        longest.start.format(DATE_FORMAT),
        longest.end.format(DATE_FORMAT)
    )?;
    writeln!(out, "Current streak: {} days", streaks.current_days)?;

    let days = analytics::daily_counts(dataset);
    if let Some((day, count)) = days.iter().max_by_key(|(day, count)| (**count, std::cmp::Reverse(**day))) {
        writeln!(out, "Busiest day: {} ({count} trophies)", day.format(DATE_FORMAT))?;
    }

    let hours = analytics::activity_by_hour(dataset);
    if let Some((hour, slot)) = busiest(&hours) {
        writeln!(out, "Busiest hour: {hour:02}:00 ({:.2} per active day)", slot.average())?;
    }
    let weekdays = analytics::activity_by_weekday(dataset);
    if let Some((day, slot)) = busiest(&weekdays) {
        writeln!(out, "Busiest weekday: {} ({:.2} per active week)", WEEKDAYS[day], slot.average())?;
    }
    Ok(())
}

/// Slot with the highest average; the earliest wins ties
fn busiest(slots: &[analytics::ActivitySlot]) -> Option<(usize, analytics::ActivitySlot)> {
    slots
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, slot)| slot.trophies > 0)
        .fold(None, |best, (i, slot)| match best {
            Some((_, b)) if b.average() >= slot.average() => best,
            _ => Some((i, slot)),
        })
}

fn write_platinums<W: Write>(out: &mut W, dataset: &TrophyDataset, top: usize) -> fmt::Result {
    let platinums = analytics::platinums(dataset);
    if platinums.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nPlatinums: {}", platinums.len())?;
    for plat in platinums.iter().take(top) {
        writeln!(
            out,
            "  {:<40}{}",
            plat.game,
            plat.icon_url.as_deref().unwrap_or("")
        )?;
    }

    let times = analytics::time_to_platinum(dataset);
    if !times.is_empty() {
        writeln!(out, "\nFastest platinums")?;
        for plat in times.iter().take(top) {
            writeln!(out, "  {:<40}{:>5} days", plat.game, plat.days())?;
        }
    }

    let curve = analytics::acquisition_curve(dataset);
    if let Some(slowest) = curve.iter().max_by_key(|p| p.days_from_start) {
        if slowest.days_from_start > 0 {
            writeln!(
                out,
                "Longest grind: {} ({}), {} days after starting",
                slowest.record.name, slowest.record.game, slowest.days_from_start
            )?;
        }
    }
    Ok(())
}

fn write_milestones<W: Write>(out: &mut W, dataset: &TrophyDataset) -> fmt::Result {
    let milestones = analytics::milestones(dataset);
    if milestones.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nMilestones")?;
    for m in &milestones {
        writeln!(
            out,
            "  {}  {} - {} ({})",
            m.earned_at.format(DATE_FORMAT),
            m.label,
            m.record.name,
            m.record.game
        )?;
    }
    Ok(())
}

fn write_timeline<W: Write>(out: &mut W, dataset: &TrophyDataset) -> fmt::Result {
    let months = analytics::monthly_timeline(dataset);
    if months.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nMonthly timeline")?;
    writeln!(out, "  {:<9}{:>6}{:>6}{:>6}{:>6}{:>7}", "Month", "P", "G", "S", "B", "Total")?;
    for m in &months {
        writeln!(
            out,
            "  {:04}-{:02}  {:>6}{:>6}{:>6}{:>6}{:>7}",
            m.year,
            m.month,
            m.platinum,
            m.gold,
            m.silver,
            m.bronze,
            m.total()
        )?;
    }
    Ok(())
}

fn provenance(source: DataSource, fetched_at: DateTime<Utc>) -> String {
    let stamp = fetched_at.format("%Y-%m-%d %H:%M UTC");
    match source {
        DataSource::Cache => format!("Cached data from {stamp}"),
        DataSource::Live => format!("Fetched live at {stamp}"),
    }
}
