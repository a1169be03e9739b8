//! Prompt construction for both generation passes.
//!
//! The figures land in the prompt as must-include literal lines; the models
//! are told to repeat them, never to compute them. Nothing here invents a
//! number.

pub const PASS1_SYSTEM: &str = "You are a precise revenue-ops analyst.";

pub const PASS2_SYSTEM: &str = "You rewrite sections while preserving facts.";

/// Full-report prompt: context, hard rules, and the exact heading skeleton
/// the section merger keys on.
pub fn pass1_user(agency: &str, niche: &str, bottleneck: &str, monthly: f64, annual: f64) -> String {
    format!(
        r#"Generate a concise Markdown diagnostic report.

Hard rules:
- Keep under ~900–1200 tokens.
- No filler. Bullets > paragraphs.
- MUST include these exact lines somewhere:
  Monthly Leakage: {monthly}
  Annual Leakage: {annual}
  Current Bottleneck: {bottleneck}

Use these headings (exact):
## Executive Summary
## Diagnosis
## Revenue at Risk
## SOLUTION ARCHITECTURE: “FlowStackOS 3-Module System”
## Next Steps

Context:
Company: {agency}
Niche: {niche}"#,
        monthly = money(monthly),
        annual = money(annual),
    )
}

/// Rewrite-only prompt for the polish pass. Sections arrive verbatim from
/// the Pass 1 document.
pub fn pass2_user(exec: &str, solution: &str) -> String {
    format!(
        r#"Rewrite ONLY the two sections below for clarity and persuasion.
Rules:
- Do NOT change any numeric values or money amounts.
- Keep headings exactly as-is.
- Keep it concise.

Sections:
{exec}

{solution}"#
    )
}

/// Render a dollar figure for the must-include lines, or the literal `N/A`
/// when the value is absent or zero.
pub fn money(amount: f64) -> String {
    if amount > 0.0 {
        format!("${}", thousands(amount))
    } else {
        "N/A".to_string()
    }
}

/// Thousands-separated rendering, cents only when they exist.
fn thousands(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if cents > 0 {
        format!("{grouped}.{cents:02}")
    } else {
        grouped
    }
}
