use core_types::MonthlyReturn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar year of the performance grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub year: i32,
    /// January through December. A month absent from the input stays `None`.
    pub months: [Option<String>; 12],
    /// The compounded return of the months that are present.
    pub total: String,
}

/// Formats a percentage figure for display, e.g. `"0.98%"`.
pub fn display_pct(value: f64) -> String {
    format!("{value:.2}%")
}

/// Formats a ratio for display. An exact zero, the degenerate-input result, renders as `"0"`.
pub fn display_ratio(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Projects monthly returns into a year × month grid, one row per year in ascending order.
pub fn format_table(monthly: &[MonthlyReturn]) -> Vec<TableRow> {
    let mut years: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
    for m in monthly {
        let slot = (m.period.month() - 1) as usize;
        years.entry(m.period.year()).or_insert([None; 12])[slot] = Some(m.return_pct);
    }

    years
        .into_iter()
        .map(|(year, cells)| {
            let growth: f64 = cells.iter().flatten().map(|pct| 1.0 + pct / 100.0).product();
            TableRow {
                year,
                months: cells.map(|cell| cell.map(display_pct)),
                total: display_pct((growth - 1.0) * 100.0),
            }
        })
        .collect()
}
