//! Plain-text rendering of reconciliation results.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::outcome::Notification;
use crate::reconcile::{Preview, RebalanceReport};

/// `+5.23%` for a fraction of `0.0523`, `n/a` when absent.
pub fn signed_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:+.2}%", v * 100.0),
        _ => "n/a".to_string(),
    }
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_or_none<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let joined = join(items);
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

fn write_preview(body: &mut String, preview: &Preview) {
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "In progress {} (close {}): {}",
        preview.month.label(),
        preview.evaluated_at.format("%Y-%m-%d"),
        preview.selection
    );
    if let Some(leverage) = preview.leverage {
        let _ = writeln!(body, "Leverage: {leverage}");
    }
    let _ = writeln!(body, "New: {}", join_or_none(&preview.delta.buys));
    let _ = writeln!(body, "Out: {}", join_or_none(&preview.delta.sells));
    let _ = writeln!(body, "Same: {}", join_or_none(&preview.delta.holds));
}

/// Render a recorded period for `label` (e.g. "GAA").
///
/// `missing` lists instruments that produced no data and were left out.
pub fn format_report(label: &str, report: &RebalanceReport, missing: &[String]) -> Notification {
    let action = if report.is_rebalance() {
        "Rebalance"
    } else {
        "No Change"
    };
    let headline = format!("{label} {action} ({})", report.period().label());

    let mut body = String::new();
    for (name, set) in [
        ("Buy", &report.diff.buys),
        ("Sell", &report.diff.sells),
        ("Hold", &report.diff.holds),
    ] {
        if !set.is_empty() {
            let _ = writeln!(body, "{name}: {}", join(set));
        }
    }
    let _ = writeln!(body, "Portfolio: {}", report.selection);
    if let Some(leverage) = report.leverage {
        let _ = writeln!(body, "Leverage: {leverage}");
    }

    let _ = writeln!(body);
    let _ = writeln!(body, "Details (close {}):", report.evaluated_at.format("%Y-%m-%d"));
    let symbols: BTreeSet<&str> = report
        .trend
        .keys()
        .chain(report.scores.keys())
        .map(String::as_str)
        .collect();
    for symbol in symbols {
        let marker = if report.selection.contains(symbol) { '*' } else { ' ' };
        let reading = report.trend.get(symbol);
        let close = reading.map_or("n/a".to_string(), |r| format!("{:.2}", r.last_close));
        let sma = reading
            .and_then(|r| r.sma)
            .map_or("n/a".to_string(), |s| format!("{s:.2}"));
        let distance = reading.and_then(|r| r.sma.map(|s| r.last_close / s - 1.0));
        let trend = match reading {
            Some(r) if r.eligible => "above",
            Some(r) if r.sma.is_some() => "below",
            _ => "short",
        };
        let _ = writeln!(
            body,
            "{marker} {symbol:<8} close {close:>10}  sma {sma:>10}  dist {:>8}  mom {:>8}  {trend}",
            signed_pct(distance),
            signed_pct(report.scores.get(symbol).copied()),
        );
    }

    if let Some(preview) = &report.preview {
        write_preview(&mut body, preview);
    }

    if !missing.is_empty() {
        let _ = writeln!(body);
        let _ = writeln!(body, "Ignored (no data): {}", join(missing));
    }

    Notification::new(headline, body.trim_end())
}

/// Render a failed strategy run.
pub fn format_error(strategy: &str, message: &str) -> Notification {
    Notification::new(format!("Error in {strategy}"), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Selection;
    use crate::reconcile::ReconcileState;
    use crate::domain::MonthKey;
    use crate::signal::{Diff, Eligibility, Leverage, TrendReading};
    use chrono::NaiveDate;

    fn report(previous: &[&str], current: &[&str], state: ReconcileState) -> RebalanceReport {
        let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let mut trend = Eligibility::new();
        trend.insert(
            "EEM".into(),
            TrendReading {
                last_date: date,
                last_close: 42.0,
                sma: Some(40.0),
                eligible: true,
            },
        );
        trend.insert(
            "IEF".into(),
            TrendReading {
                last_date: date,
                last_close: 90.0,
                sma: None,
                eligible: false,
            },
        );
        RebalanceReport {
            period_end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            state,
            as_of: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            evaluated_at: date,
            previous: previous.iter().map(|s| s.to_string()).collect(),
            selection: Selection::from_symbols(current),
            diff: Diff::between(previous, current),
            scores: [("EEM".to_string(), 0.0523)].into_iter().collect(),
            trend,
            leverage: Some(Leverage::UNLEVERED),
            preview: None,
        }
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(signed_pct(Some(0.0523)), "+5.23%");
        assert_eq!(signed_pct(Some(-0.1)), "-10.00%");
        assert_eq!(signed_pct(None), "n/a");
        assert_eq!(signed_pct(Some(f64::NAN)), "n/a");
    }

    #[test]
    fn rebalance_headline_and_body() {
        let r = report(&["IEF", "CASH"], &["EEM", "CASH"], ReconcileState::New);
        let n = format_report("GAA", &r, &["BTC-USD".to_string()]);
        assert_eq!(n.headline, "GAA Rebalance (Jun 2024)");
        assert!(n.secondary.is_empty());
        assert!(n.body.contains("Buy: EEM\n"));
        assert!(n.body.contains("Sell: IEF\n"));
        assert!(n.body.contains("Hold: CASH\n"));
        assert!(n.body.contains("Portfolio: EEM, CASH\nLeverage: 1x\n"));
        assert!(n.body.contains("Details (close 2024-06-28):"));
        assert!(n.body.contains("+5.23%"));
        assert!(n.body.ends_with("Ignored (no data): BTC-USD"));
    }

    #[test]
    fn month_in_progress_is_listed_with_its_changes() {
        let mut r = report(&["IEF", "CASH"], &["EEM", "CASH"], ReconcileState::New);
        r.preview = Some(Preview {
            month: MonthKey::new(2024, 7).unwrap(),
            evaluated_at: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            selection: Selection::from_symbols(["FEZ", "CASH"]),
            leverage: Some(Leverage(3)),
            delta: Diff::between(&["EEM", "CASH"], &["FEZ", "CASH"]),
        });
        let n = format_report("GAA", &r, &[]);
        assert!(n.body.ends_with(
            "In progress Jul 2024 (close 2024-07-15): FEZ, CASH\n\
             Leverage: 3x\n\
             New: FEZ\n\
             Out: EEM\n\
             Same: CASH"
        ));
    }

    #[test]
    fn unchanged_selection_is_no_change() {
        let r = report(&["EEM", "CASH"], &["EEM", "CASH"], ReconcileState::New);
        let n = format_report("GAA", &r, &[]);
        assert_eq!(n.headline, "GAA No Change (Jun 2024)");
        assert!(!n.body.contains("Buy:"));
        assert!(!n.body.contains("Ignored"));
    }

    #[test]
    fn first_run_is_a_rebalance_even_in_cash() {
        let r = report(&[], &["CASH", "CASH"], ReconcileState::Uninitialized);
        let n = format_report("GAA", &r, &[]);
        assert!(n.headline.starts_with("GAA Rebalance"));
    }

    #[test]
    fn error_headline() {
        let n = format_error("spy_tips", "network unreachable");
        assert_eq!(n.headline, "Error in spy_tips");
        assert_eq!(n.body, "network unreachable");
    }
}
