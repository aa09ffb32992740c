// Declare submodules
mod common;
mod narrative;
mod ranking;

pub use common::*;
pub use narrative::{
    conclusion_prompt, headline_prompt, introduction_prompt, social_post_prompt,
    CONCLUSION_SYSTEM_ROLE, HEADLINE_SYSTEM_ROLE, INTRODUCTION_SYSTEM_ROLE,
    SOCIAL_POST_SYSTEM_ROLE,
};
pub use ranking::{ranking_prompt, RANKING_SYSTEM_ROLE};
