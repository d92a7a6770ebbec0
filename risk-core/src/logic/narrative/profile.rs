//! Student profile and the fixed analysis prompt

use serde::{Deserialize, Serialize};

pub const DEFAULT_THOUSANDS_SEPARATOR: char = '.';

/// Everything the narrative sees about one student, display-formatted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub nisn: String,
    pub name: String,
    pub birth_order: i64,
    pub sibling_count: i64,
    pub parent_occupation: String,
    /// Grouped thousands, e.g. `15.000`
    pub allowance: String,
    pub organization: String,
    pub hobby: String,
    pub attendance: f64,
    pub grade: f64,
    pub violations: i64,
    /// 0-100, absent when the record was never scored
    pub risk_score: Option<f64>,
    pub notes: String,
}

/// `1234567` -> `1.234.567` with `sep = '.'`
pub fn format_grouped(value: i64, sep: char) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

fn display_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Render the single analysis template
pub fn render_prompt(profile: &StudentProfile) -> String {
    let risk = profile
        .risk_score
        .map(display_number)
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "You are an assistant for a school guidance counsellor. Read the student data and give a short digest.\n\
         \n\
         STUDENT DATA:\n\
         - Name: {name}\n\
         - Profile: child {birth_order} of {siblings}, parent occupation: {occupation}, allowance: {allowance}\n\
         - Interests: {organization}, {hobby}\n\
         - Academics: attendance {attendance}%, grade {grade}, violation points {violations}\n\
         - Model risk score: {risk}%\n\
         - Notes: \"{notes}\"\n\
         \n\
         INSTRUCTIONS:\n\
         Answer with exactly 3 bullet points. Focus on how the economic and family background relates to achievement.\n\
         \n\
         OUTPUT:\n\
         * **Root cause:** [main cause in one short sentence]\n\
         * **Potential:** [positives from hobbies or organizations that could help]\n\
         * **Action:** [a specific intervention for the teacher]\n",
        name = profile.name,
        birth_order = profile.birth_order,
        siblings = profile.sibling_count,
        occupation = profile.parent_occupation,
        allowance = profile.allowance,
        organization = profile.organization,
        hobby = profile.hobby,
        attendance = display_number(profile.attendance),
        grade = display_number(profile.grade),
        violations = profile.violations,
        risk = risk,
        notes = profile.notes,
    )
}
