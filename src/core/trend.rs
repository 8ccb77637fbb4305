use tracing::debug;

use super::calendar::add_months;
use super::error::{Result, invalid, require_finite, require_len};
use super::stats::linear_fit;
use super::types::{SeriesPoint, TrendForecastResult};

const MIN_POINTS: usize = 3;

/// Fits a straight line through the series (x = month index) and extends it
/// `forecast_months` past the last observation.
///
/// Predictions cover the observed months as well as the forecast months and
/// are floored at zero. Prediction `i` is dated `i` calendar months after the
/// first observation.
pub fn trend_forecast(series: &[SeriesPoint], forecast_months: u32) -> Result<TrendForecastResult> {
    require_len("trend forecast", series.len(), MIN_POINTS)?;
    for pair in series.windows(2) {
        if pair[1].date < pair[0].date {
            return Err(invalid(format!(
                "series must be chronological: {} follows {}",
                pair[1].date, pair[0].date
            )));
        }
    }
    for point in series {
        require_finite("series value", point.value)?;
    }
    debug!(
        points = series.len(),
        forecast_months, "fitting trend forecast"
    );

    let values = series.iter().map(|p| p.value).collect::<Vec<_>>();
    let fit = linear_fit(&values).ok_or_else(|| invalid("series too short to fit"))?;

    let start = series[0].date;
    let total = series.len() + forecast_months as usize;
    let last_offset =
        u32::try_from(total - 1).map_err(|_| invalid("forecast horizon too long"))?;
    add_months(start, last_offset)?;
    let mut predictions = Vec::with_capacity(total);
    for i in 0..total {
        let offset = u32::try_from(i).map_err(|_| invalid("forecast horizon too long"))?;
        predictions.push(SeriesPoint {
            date: add_months(start, offset)?,
            value: fit.at(i as f64).max(0.0),
        });
    }

    Ok(TrendForecastResult {
        predictions,
        trend: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        standard_error: fit.standard_error,
    })
}
