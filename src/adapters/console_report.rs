//! Plain-text run summary and strategy comparison table.

use std::fmt::Write;

use crate::domain::backtest::{BacktestResult, Termination};
use crate::domain::comparison::{best_by_final_balance, ComparisonRow};
use crate::domain::metrics::{Metrics, Performance};

fn push_metrics(out: &mut String, m: &Metrics) {
    let avg_rr = m
        .avg_rr
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string());

    let _ = writeln!(out, "Total Trades:     {}", m.total_trades);
    let _ = writeln!(out, "Win Rate:         {:.2}%", m.win_rate);
    let _ = writeln!(out, "Profit Factor:    {}", m.profit_factor);
    let _ = writeln!(out, "Avg R:R:          {}", avg_rr);
    let _ = writeln!(out, "Max Drawdown:     {:.2}%", m.max_drawdown_pct);
    let _ = writeln!(out, "Sharpe Ratio:     {:.2}", m.sharpe_ratio);
}

/// Final balance, total return and trade count, then the performance report.
pub fn format_summary(
    strategy: &str,
    initial_balance: f64,
    result: &BacktestResult,
    performance: &Performance,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Backtest Results: {} ===", strategy);
    let _ = writeln!(out, "Final Balance:    {:.2}", result.final_balance);
    let _ = writeln!(
        out,
        "Total Return:     {:.2}%",
        result.total_return_pct(initial_balance)
    );
    let _ = writeln!(out, "Trades Executed:  {}", result.total_trades());

    if let Termination::DrawdownLimit {
        timestamp,
        drawdown,
        ..
    } = &result.termination
    {
        let _ = writeln!(
            out,
            "Stopped early:    drawdown {:.2}% at {}",
            drawdown * 100.0,
            timestamp
        );
    }
    if let Some(entry) = result.final_position.entry_price() {
        let _ = writeln!(out, "Open position:    long from {:.2}", entry);
    }

    let _ = writeln!(out, "\n=== Performance Report ===");
    match performance {
        Performance::Measured(m) => push_metrics(&mut out, m),
        Performance::NoData => {
            let _ = writeln!(out, "No trades executed; no performance data.");
        }
    }
    out
}

/// One line per strategy, in row order.
pub fn format_comparison(rows: &[ComparisonRow], initial_balance: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<15} {:>12} {:>9} {:>7} {:>8} {:>7} {:>8} {:>7}",
        "strategy", "final", "return%", "trades", "win%", "pf", "maxdd%", "sharpe"
    );

    for row in rows {
        let final_balance = format!("{:.2}", row.result.final_balance);
        let total_return = format!("{:.2}", row.total_return_pct(initial_balance));
        let (win_rate, pf, max_dd, sharpe) = match &row.performance {
            Performance::Measured(m) => (
                format!("{:.2}", m.win_rate),
                m.profit_factor.to_string(),
                format!("{:.2}", m.max_drawdown_pct),
                format!("{:.2}", m.sharpe_ratio),
            ),
            Performance::NoData => ("-".into(), "-".into(), "-".into(), "-".into()),
        };
        let marker = if row.result.stopped_early() { " *" } else { "" };

        let _ = writeln!(
            out,
            "{:<15} {:>12} {:>9} {:>7} {:>8} {:>7} {:>8} {:>7}{}",
            row.strategy,
            final_balance,
            total_return,
            row.result.total_trades(),
            win_rate,
            pf,
            max_dd,
            sharpe,
            marker
        );
    }

    if rows.iter().any(|r| r.result.stopped_early()) {
        let _ = writeln!(out, "* stopped early at the drawdown limit");
    }
    if let Some(best) = best_by_final_balance(rows) {
        let _ = writeln!(out, "Best final balance: {}", best.strategy);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::ProfitFactor;
    use crate::domain::position::Position;
    use chrono::NaiveDate;

    fn result(final_balance: f64, termination: Termination) -> BacktestResult {
        BacktestResult {
            final_balance,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            final_position: Position::Flat,
            termination,
        }
    }

    fn metrics() -> Metrics {
        Metrics {
            total_trades: 4,
            win_rate: 50.0,
            profit_factor: ProfitFactor::Unbounded,
            avg_rr: None,
            max_drawdown_pct: 3.25,
            sharpe_ratio: 1.5,
        }
    }

    #[test]
    fn summary_with_metrics() {
        let text = format_summary(
            "ema_rsi",
            1000.0,
            &result(1100.0, Termination::Completed),
            &Performance::Measured(metrics()),
        );
        assert!(text.contains("=== Backtest Results: ema_rsi ==="));
        assert!(text.contains("Final Balance:    1100.00"));
        assert!(text.contains("Total Return:     10.00%"));
        assert!(text.contains("Profit Factor:    inf"));
        assert!(text.contains("Avg R:R:          n/a"));
        assert!(text.contains("Max Drawdown:     3.25%"));
        assert!(!text.contains("Stopped early"));
    }

    #[test]
    fn summary_without_trades() {
        let text = format_summary(
            "macd",
            1000.0,
            &result(1000.0, Termination::Completed),
            &Performance::NoData,
        );
        assert!(text.contains("Trades Executed:  0"));
        assert!(text.contains("no performance data"));
    }

    #[test]
    fn summary_reports_drawdown_stop_and_open_position() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut r = result(
            850.0,
            Termination::DrawdownLimit {
                bar_index: 7,
                timestamp: ts,
                drawdown: 0.15,
            },
        );
        r.final_position = Position::Long {
            entry_price: 101.5,
            entry_timestamp: ts,
        };
        let text = format_summary("ema_crossover", 1000.0, &r, &Performance::NoData);
        assert!(text.contains("Stopped early:    drawdown 15.00% at 2024-01-15 08:00:00"));
        assert!(text.contains("Open position:    long from 101.50"));
    }

    #[test]
    fn comparison_table() {
        let rows = vec![
            ComparisonRow {
                strategy: "ema_crossover",
                result: result(1050.0, Termination::Completed),
                performance: Performance::Measured(metrics()),
            },
            ComparisonRow {
                strategy: "macd",
                result: result(
                    1000.0,
                    Termination::DrawdownLimit {
                        bar_index: 3,
                        timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                            .unwrap()
                            .and_hms_opt(0, 0, 0)
                            .unwrap(),
                        drawdown: 0.2,
                    },
                ),
                performance: Performance::NoData,
            },
        ];
        let text = format_comparison(&rows, 1000.0);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("strategy"));
        assert!(lines[1].starts_with("ema_crossover"));
        assert!(lines[1].contains("1050.00"));
        assert!(lines[1].contains("inf"));
        assert!(lines[2].starts_with("macd"));
        assert!(lines[2].ends_with(" *"));
        assert_eq!(lines[4], "Best final balance: ema_crossover");
        assert_eq!(lines.len(), 5);
    }
}
