//! Number formatting and the narrative lines of the insights tab.

use crate::data::model::ClientSegment;

use super::insights::{Insights, Recommendations};

/// Revenue in millions of euros: `12.35M€`.
pub fn millions(euros: f64) -> String {
    format!("{:.2}M€", euros / 1e6)
}

/// Integer with thousands separators: `1,234,567`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole euros with thousands separators: `32,500 €`.
pub fn euros(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{} €", thousands(value.abs().round() as u64))
}

/// Satisfaction score out of ten, `n/a` when undefined.
pub fn satisfaction(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{s:.1}/10"),
        None => "n/a".to_string(),
    }
}

pub fn percent(p: f64) -> String {
    format!("{p:.1}%")
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("n/a")
}

/// Narrative observations (markdown-style bold markers).
pub fn observation_lines(ins: &Insights) -> Vec<String> {
    let growth = ins
        .revenue_growth
        .map(percent)
        .unwrap_or_else(|| "n/a".to_string());
    let gap = match ins.satisfaction_gap {
        Some(g) if g >= 0.0 => format!(
            "Professional clients are **{}** more satisfied than individual clients.",
            percent(g)
        ),
        Some(g) => format!(
            "Professional clients are **{}** less satisfied than individual clients.",
            percent(-g)
        ),
        None => "Not enough professional and individual clients to compare satisfaction.".to_string(),
    };

    vec![
        format!(
            "Top brands: **{}** lead the market with **{}** of all sales.",
            ins.headline_brands.join(", "),
            percent(ins.headline_share)
        ),
        format!("Trend: average yearly revenue growth of **{growth}**."),
        format!("Satisfaction: {gap}"),
        format!(
            "Fuel: **{}** accounts for **{}** of sales.",
            or_unknown(&ins.dominant_fuel),
            percent(ins.dominant_fuel_share)
        ),
    ]
}

/// Sales optimisation recommendations.
pub fn sales_recommendations(rec: &Recommendations) -> Vec<String> {
    vec![
        format!("Target the **{}** market, the largest by revenue.", or_unknown(&rec.top_country)),
        format!(
            "Expand the offer around **{}**, the model with the highest average price.",
            or_unknown(&rec.priciest_model)
        ),
        format!(
            "Improve margins on **{}** vehicles.",
            or_unknown(&rec.priciest_fuel)
        ),
    ]
}

/// Customer strategy recommendations.
pub fn customer_recommendations(rec: &Recommendations) -> Vec<String> {
    let premium = match rec.premium_client_type.as_deref().and_then(ClientSegment::classify) {
        Some(ClientSegment::Professional) => "professional clients",
        Some(ClientSegment::Individual) => "individual clients",
        None => "n/a",
    };
    vec![
        format!(
            "Loyalty programme for **{}** clients.",
            or_unknown(&rec.main_client_type)
        ),
        format!("Premium packages for **{premium}**."),
        format!(
            "Specific seller training on the **{}** model.",
            or_unknown(&rec.least_satisfying_model)
        ),
    ]
}
