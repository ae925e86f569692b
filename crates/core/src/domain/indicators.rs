//! Pure indicator math over per-symbol close series. No I/O; insufficient
//! history yields `None` rather than an error, and `None` never turns into a
//! numeric fault downstream.
//!
//! Every window function uses the same trailing-inclusive convention: the
//! window at index `i` covers the `window` dates ending at and including `i`,
//! so a value is present exactly when `i >= window - 1`. Day-over-day changes
//! are taken between consecutive dates inside the window.

use crate::domain::series::{PriceSeries, RiskRecord, TechnicalRecord};

pub const SMA_SHORT_WINDOW: usize = 20;
pub const SMA_LONG_WINDOW: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const VOLATILITY_WINDOW: usize = 20;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Trailing arithmetic mean of `window` closes ending at each date.
pub fn moving_average(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..closes.len() {
        out[i] = Some(mean(&closes[i + 1 - window..=i]));
    }
    out
}

/// Relative Strength Index over average gains vs. losses within the trailing
/// `period`-date window. Saturates to 100 when the window has gains but no
/// losses; undefined when the window is flat.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period < 2 {
        return out;
    }
    for i in (period - 1)..closes.len() {
        let window = &closes[i + 1 - period..=i];

        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        for pair in window.windows(2) {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                gain_sum += change;
            } else {
                loss_sum += -change;
            }
        }

        let changes = (period - 1) as f64;
        let avg_gain = gain_sum / changes;
        let avg_loss = loss_sum / changes;

        out[i] = if avg_loss == 0.0 {
            if avg_gain > 0.0 {
                Some(100.0)
            } else {
                None
            }
        } else {
            let rs = avg_gain / avg_loss;
            Some(100.0 - 100.0 / (1.0 + rs))
        };
    }
    out
}

/// Standard deviation of the percentage changes inside the trailing
/// `window`-date window.
pub fn rolling_volatility(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..closes.len() {
        let returns = pct_changes(&closes[i + 1 - window..=i]);
        out[i] = sample_std(&returns);
    }
    out
}

/// Daily-return standard deviation scaled to 252 trading days. Undefined with
/// fewer than two daily returns.
pub fn annual_volatility(closes: &[f64]) -> Option<f64> {
    let returns = pct_changes(closes);
    sample_std(&returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Most negative value of `close / running_max(close) - 1`; never positive,
/// exactly 0 when the series never declines from its running peak.
pub fn max_drawdown(closes: &[f64]) -> Option<f64> {
    if closes.is_empty() {
        return None;
    }
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for &close in closes {
        peak = peak.max(close);
        worst = worst.min(close / peak - 1.0);
    }
    Some(worst)
}

pub fn compute_technical(series: &PriceSeries) -> Vec<TechnicalRecord> {
    let closes = series.closes();
    let sma20 = moving_average(&closes, SMA_SHORT_WINDOW);
    let sma50 = moving_average(&closes, SMA_LONG_WINDOW);
    let rsi14 = rsi(&closes, RSI_PERIOD);
    let volatility20 = rolling_volatility(&closes, VOLATILITY_WINDOW);

    series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| TechnicalRecord {
            symbol: series.symbol.clone(),
            date: p.date,
            close: p.close,
            sma20: sma20[i],
            sma50: sma50[i],
            rsi14: rsi14[i],
            volatility20: volatility20[i],
        })
        .collect()
}

pub fn compute_risk(symbol: &str, closes: &[f64]) -> RiskRecord {
    RiskRecord {
        symbol: symbol.to_string(),
        annual_volatility: annual_volatility(closes),
        max_drawdown: max_drawdown(closes),
    }
}

fn pct_changes(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

// Sample standard deviation (ddof = 1); undefined below two observations.
fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    fn present(values: &[Option<f64>]) -> usize {
        values.iter().filter(|v| v.is_some()).count()
    }

    #[test]
    fn moving_average_known_values() {
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn moving_average_short_series_is_all_missing() {
        let closes: Vec<f64> = (0..19).map(|i| 100.0 + i as f64).collect();
        assert_eq!(present(&moving_average(&closes, 20)), 0);
    }

    #[test]
    fn moving_average_present_count() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let out = moving_average(&closes, 20);
        assert_eq!(present(&out), 25 - 19);
        assert!(out[18].is_none());
        assert!(out[19].is_some());
    }

    #[test]
    fn rolling_volatility_present_count() {
        let closes: Vec<f64> = (0..25)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let out = rolling_volatility(&closes, 20);
        assert_eq!(present(&out), 25 - 19);

        let short: Vec<f64> = closes[..19].to_vec();
        assert_eq!(present(&rolling_volatility(&short, 20)), 0);
    }

    #[test]
    fn rsi_saturates_at_100_without_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&closes, 14);
        assert_eq!(out[13], Some(100.0));
        assert_eq!(out[14], Some(100.0));
    }

    #[test]
    fn rsi_is_zero_without_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64 * 0.5).collect();
        let out = rsi(&closes, 14);
        assert_eq!(out[13], Some(0.0));
    }

    #[test]
    fn rsi_undefined_on_flat_window() {
        let closes = vec![42.0; 20];
        let out = rsi(&closes, 14);
        assert!(out.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_stays_in_bounds() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + ((i * 7) % 11) as f64 - 5.0)
            .collect();
        for value in rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "rsi {value} out of bounds");
        }
    }

    #[test]
    fn rsi_warmup_is_missing() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let out = rsi(&closes, 14);
        for v in &out[..13] {
            assert!(v.is_none());
        }
        assert!(out[13].is_some());
    }

    #[test]
    fn annual_volatility_scales_daily_std() {
        let closes = vec![100.0, 102.0, 101.0, 103.0, 106.0, 104.0];
        let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let daily_std = (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();

        let annual = annual_volatility(&closes).unwrap();
        assert!((annual - daily_std * 252.0_f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn annual_volatility_of_constant_growth_is_zero() {
        // Returns are all exactly 10%.
        let closes = vec![100.0, 110.0, 121.0, 133.1];
        assert!(annual_volatility(&closes).unwrap().abs() < EPS);
    }

    #[test]
    fn annual_volatility_needs_two_returns() {
        assert_eq!(annual_volatility(&[]), None);
        assert_eq!(annual_volatility(&[100.0]), None);
        assert_eq!(annual_volatility(&[100.0, 101.0]), None);
        assert!(annual_volatility(&[100.0, 101.0, 102.0]).is_some());
    }

    #[test]
    fn max_drawdown_zero_for_non_decreasing_series() {
        assert_eq!(max_drawdown(&[10.0, 11.0, 12.0, 13.0]), Some(0.0));
        assert_eq!(max_drawdown(&[10.0, 10.0, 10.0]), Some(0.0));
    }

    #[test]
    fn max_drawdown_finds_worst_decline() {
        let out = max_drawdown(&[10.0, 8.0, 12.0, 6.0]).unwrap();
        assert!((out - (-0.5)).abs() < EPS);
    }

    #[test]
    fn max_drawdown_never_positive() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + ((i * 13) % 17) as f64).collect();
        assert!(max_drawdown(&closes).unwrap() <= 0.0);
        assert_eq!(max_drawdown(&[]), None);
    }

    #[test]
    fn compute_technical_aligns_rows_with_input() {
        use crate::domain::series::{PricePoint, PriceSeries};
        use chrono::NaiveDate;

        let points: Vec<PricePoint> = (0..60)
            .map(|i| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i),
                close: 100.0 + (i as f64 * 0.3).sin() * 4.0,
            })
            .collect();
        let series = PriceSeries::try_new("AAPL".to_string(), points).unwrap();

        let records = compute_technical(&series);
        assert_eq!(records.len(), 60);
        assert!(records[18].sma20.is_none());
        assert!(records[19].sma20.is_some());
        assert!(records[48].sma50.is_none());
        assert!(records[49].sma50.is_some());
        assert!(records[12].rsi14.is_none());
        assert!(records[13].rsi14.is_some());
        assert!(records[19].volatility20.is_some());
        assert_eq!(records[0].close, series.points[0].close);
    }
}
