use chrono::NaiveDate;

// Appended to every user prompt; the answers are pasted into pages verbatim.
pub const DONT_TELL_ME: &str = r#"
Important instructions for your response:

1. Do not narrate or describe your actions.
2. Do not restate the instructions you were given.
3. Do not preface your response with phrases like "Here is..." or "Sure!".
4. Do not add any commentary before or after the requested text.
"#;

pub const AUDIENCE: &str = "a professional audience on LinkedIn";

/// Date as it appears in headlines and commit messages.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Date as it appears in generated file names.
pub fn file_date(date: NaiveDate) -> String {
    date.format("%d%m%Y").to_string()
}
