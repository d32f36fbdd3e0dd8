/// Earnings period as shown on the dashboard, e.g. `03/2025`.
pub fn format_period(month: i32, year: i32) -> String {
  format!("{month:02}/{year}")
}

/// Cents as a dollar amount, e.g. `-12.05`.
pub fn format_cents(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let cents = cents.unsigned_abs();
  format!("{sign}{}.{:02}", cents / 100, cents % 100)
}
