use crate::prompt::common::{AUDIENCE, DONT_TELL_ME};

pub const HEADLINE_SYSTEM_ROLE: &str = "You are an expert at writing catchy headlines for professional newsletters, able to capture attention while staying relevant to a professional audience.";

pub const INTRODUCTION_SYSTEM_ROLE: &str = "You are an expert at writing impactful newsletters for a professional audience on LinkedIn. Your mission is to capture attention from the very first words while offering immediate value to readers.";

pub const CONCLUSION_SYSTEM_ROLE: &str = "You are an expert at writing compelling, engaging newsletters for a professional audience on LinkedIn. Your mission is to write conclusions that resonate with readers and encourage them to interact actively.";

pub const SOCIAL_POST_SYSTEM_ROLE: &str = "You are a social media management expert specialised in engaging, strategic LinkedIn posts. Your goal is to promote content effectively while maximising interaction and reach.";

pub fn headline_prompt(titles: &[&str]) -> String {
    format!(
        r#"Write a punchy, engaging headline for a newsletter based on the following articles:
{titles}.

The headline must be concise, captivating and suited to {audience}. Reply with the headline only.
{dont_tell_me}"#,
        titles = titles.join(", "),
        audience = AUDIENCE,
        dont_tell_me = DONT_TELL_ME,
    )
}

/// The introduction is written without the titles so it stays general.
pub fn introduction_prompt() -> String {
    format!(
        r#"Write an engaging, concise introduction for a daily newsletter aimed at {audience}.

The introduction should evoke the general themes of the articles without listing them, and make the reader want to discover the content in detail. Use a professional tone with a touch of enthusiasm.
{dont_tell_me}"#,
        audience = AUDIENCE,
        dont_tell_me = DONT_TELL_ME,
    )
}

pub fn conclusion_prompt() -> String {
    format!(
        r#"Write a lightly fun, concise 70-word conclusion for a LinkedIn newsletter.

The conclusion should encourage readers to comment, share and engage with the content, stressing how their participation enriches the discussion. If you use hashtags, they must be in English and appear on a separate line.
{dont_tell_me}"#,
        dont_tell_me = DONT_TELL_ME,
    )
}

pub fn social_post_prompt(titles: &[&str]) -> String {
    format!(
        r#"Write a short LinkedIn post (150 words maximum) promoting a daily newsletter that contains the following articles:
{titles}.

For each title, choose a relevant emoji placed in front of the title and present the titles as a bulleted list. Add hashtags in English at the end.
{dont_tell_me}"#,
        titles = titles.join(", "),
        dont_tell_me = DONT_TELL_ME,
    )
}
