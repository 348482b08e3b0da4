//! Classification pass and report aggregation over loaded records.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::ReportConfig;
use crate::loader::{LoadedRecords, Record};
use crate::market::{classify_market, MarketCategory};
use crate::teams::{extract_teams, is_unknown_team};

pub const LEADERBOARD_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: Record,
    pub category: MarketCategory,
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankrollPoint {
    pub settled_date: NaiveDateTime,
    pub bankroll: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: MarketCategory,
    pub count: usize,
    pub total_profit_loss: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub team: String,
    pub total_profit_loss: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub net_worth: f64,
    pub largest_gain: Option<f64>,
    pub largest_loss: Option<f64>,
    pub average_daily_profit_loss: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub summary: SummaryMetrics,
    pub bankroll_series: Vec<BankrollPoint>,
    pub categories: Vec<CategorySummary>,
    /// Descending by total profit/loss.
    pub team_ranking: Vec<TeamSummary>,
}

impl Report {
    pub fn top_teams(&self) -> &[TeamSummary] {
        let end = self.team_ranking.len().min(LEADERBOARD_SIZE);
        &self.team_ranking[..end]
    }

    /// Tail of the descending ranking, still in descending order.
    pub fn bottom_teams(&self) -> &[TeamSummary] {
        let start = self.team_ranking.len().saturating_sub(LEADERBOARD_SIZE);
        &self.team_ranking[start..]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Ready(Report),
    /// Every row was dropped for an invalid settlement date (or the file had none).
    NoValidData { rows_read: usize, rows_dropped: usize },
}

pub fn classify_records(records: Vec<Record>) -> Vec<ClassifiedRecord> {
    records
        .into_iter()
        .map(|record| ClassifiedRecord {
            category: classify_market(&record.market_description),
            teams: extract_teams(&record.market_description),
            record,
        })
        .collect()
}

pub fn build_outcome(loaded: LoadedRecords, cfg: &ReportConfig) -> ReportOutcome {
    if loaded.is_empty() {
        return ReportOutcome::NoValidData {
            rows_read: loaded.rows_read,
            rows_dropped: loaded.rows_dropped,
        };
    }

    let rows_read = loaded.rows_read;
    let rows_dropped = loaded.rows_dropped;
    let classified = classify_records(loaded.records);

    ReportOutcome::Ready(Report {
        rows_read,
        rows_dropped,
        summary: summary_metrics(&classified, cfg.initial_bankroll),
        bankroll_series: bankroll_series(&classified, cfg.initial_bankroll),
        categories: category_table(&classified),
        team_ranking: team_ranking(&classified),
    })
}

pub fn summary_metrics(records: &[ClassifiedRecord], initial_bankroll: f64) -> SummaryMetrics {
    let total: f64 = records.iter().map(|r| r.record.profit_loss).sum();

    let largest_gain = records
        .iter()
        .map(|r| r.record.profit_loss)
        .filter(|value| *value > 0.0)
        .max_by(f64::total_cmp);
    let largest_loss = records
        .iter()
        .map(|r| r.record.profit_loss)
        .filter(|value| *value < 0.0)
        .min_by(f64::total_cmp);

    SummaryMetrics {
        net_worth: initial_bankroll + total,
        largest_gain,
        largest_loss,
        average_daily_profit_loss: average_daily_profit_loss(records),
    }
}

/// Mean of the per-calendar-day sums, not of individual records.
pub fn average_daily_profit_loss(records: &[ClassifiedRecord]) -> Option<f64> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in records {
        *per_day.entry(r.record.settled_date.date()).or_default() += r.record.profit_loss;
    }

    if per_day.is_empty() {
        return None;
    }
    Some(per_day.values().sum::<f64>() / per_day.len() as f64)
}

pub fn bankroll_series(records: &[ClassifiedRecord], initial_bankroll: f64) -> Vec<BankrollPoint> {
    let mut running = initial_bankroll;
    records
        .iter()
        .map(|r| {
            running += r.record.profit_loss;
            BankrollPoint {
                settled_date: r.record.settled_date,
                bankroll: running,
            }
        })
        .collect()
}

pub fn category_table(records: &[ClassifiedRecord]) -> Vec<CategorySummary> {
    let mut grouped: BTreeMap<MarketCategory, (usize, f64)> = BTreeMap::new();
    for r in records {
        let entry = grouped.entry(r.category).or_default();
        entry.0 += 1;
        entry.1 += r.record.profit_loss;
    }

    let mut out: Vec<CategorySummary> = grouped
        .into_iter()
        .map(|(category, (count, total_profit_loss))| CategorySummary {
            category,
            count,
            total_profit_loss,
        })
        .collect();
    out.sort_by(|a, b| descending(a.total_profit_loss, b.total_profit_loss));
    out
}

/// Each named team is credited the full profit/loss of every record it
/// appears in. The unknown-team sentinel is left out.
pub fn team_ranking(records: &[ClassifiedRecord]) -> Vec<TeamSummary> {
    let mut grouped: HashMap<&str, f64> = HashMap::new();
    for r in records {
        for team in &r.teams {
            if is_unknown_team(team) {
                continue;
            }
            *grouped.entry(team.as_str()).or_default() += r.record.profit_loss;
        }
    }

    let mut out: Vec<TeamSummary> = grouped
        .into_iter()
        .map(|(team, total_profit_loss)| TeamSummary {
            team: team.to_string(),
            total_profit_loss,
        })
        .collect();
    out.sort_by(|a, b| {
        descending(a.total_profit_loss, b.total_profit_loss).then_with(|| a.team.cmp(&b.team))
    });
    out
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
