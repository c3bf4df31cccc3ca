use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
}

/// Extracts a salary range from free text such as `"₹15,000 - ₹20,000"`.
///
/// Digit groups may use any comma placement (`1,50,000` and `150,000` both
/// work). Numbers below 1000 are ignored since they are usually counts,
/// shift hours or similar noise.
pub fn parse_salary_range(text: &str) -> Option<SalaryRange> {
    let re = Regex::new(r"(\d[\d,]*)").ok()?;

    let amounts: Vec<i64> = re
        .captures_iter(text)
        .filter_map(|cap| {
            let digits: String = cap
                .get(1)?
                .as_str()
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<i64>().ok()
        })
        .filter(|amount| *amount >= 1000)
        .collect();

    let min = *amounts.iter().min()?;
    let max = *amounts.iter().max()?;
    Some(SalaryRange { min, max })
}
