use crate::prompt::common::{AUDIENCE, DONT_TELL_ME};

pub const RANKING_SYSTEM_ROLE: &str =
    "You are an expert at identifying content that drives engagement on LinkedIn.";

/// Ask for the `limit` most engaging titles out of a newline-separated list.
pub fn ranking_prompt(titles: &str, limit: usize) -> String {
    format!(
        r#"Here are some article titles:
{titles}

Please select the {limit} titles that would generate the most engagement with {audience}.

Reply with the selected titles only, one per line, most engaging first, copied exactly as written above. Do not number them and do not add any other text.
{dont_tell_me}"#,
        titles = titles,
        limit = limit,
        audience = AUDIENCE,
        dont_tell_me = DONT_TELL_ME,
    )
}
