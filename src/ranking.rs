use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::llm::{CompletionRequest, RequestKind, TextGenerator};
use crate::prompt::{ranking_prompt, RANKING_SYSTEM_ROLE};
use crate::TARGET_LLM_REQUEST;

pub const DEFAULT_SELECTION_LIMIT: usize = 15;
pub const DEFAULT_SELECTION_TEMPERATURE: f32 = 0.7;

/// A title as the ranking model wrote it. It usually, but not always, matches
/// a feed entry title verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedTitle {
    /// Position in the model's answer, starting at 1.
    pub rank: usize,
    pub text: String,
}

/// Ask the model to pick the `limit` most engaging titles out of `titles`
/// (one per line). Transport failures are returned as errors; an answer with
/// no usable line yields an empty list.
pub async fn request_ranking<G: TextGenerator>(
    generator: &G,
    model: &str,
    titles: &str,
    limit: usize,
    temperature: f32,
) -> Result<Vec<RankedTitle>> {
    info!(target: TARGET_LLM_REQUEST, "Asking {} to select {} of {} titles", model, limit, titles.lines().count());

    let request = CompletionRequest {
        kind: RequestKind::Ranking,
        model: model.to_string(),
        system: RANKING_SYSTEM_ROLE.to_string(),
        prompt: ranking_prompt(titles, limit),
        temperature,
    };

    let response = generator.generate(&request).await?;
    let ranked = parse_ranked_titles(&response, limit);

    info!(target: TARGET_LLM_REQUEST, "Model selected {} titles", ranked.len());
    Ok(ranked)
}

/// One title per non-blank line. `**` and `"` are removed wherever they
/// appear and the line is trimmed. At most `limit` titles are kept.
pub fn parse_ranked_titles(response: &str, limit: usize) -> Vec<RankedTitle> {
    let titles: Vec<String> = response
        .lines()
        .map(|line| line.trim().replace("**", "").replace('"', ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if titles.len() > limit {
        debug!(target: TARGET_LLM_REQUEST, "Model returned {} titles, keeping the first {}", titles.len(), limit);
    }

    titles
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, text)| RankedTitle { rank: i + 1, text })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(ranked: &[RankedTitle]) -> Vec<&str> {
        ranked.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_parse_strips_markers_quotes_and_blank_lines() {
        let response = "**Title A**\n\"Title B\"\n\n  Title C  ";
        let ranked = parse_ranked_titles(response, 15);
        assert_eq!(texts(&ranked), vec!["Title A", "Title B", "Title C"]);
        assert_eq!(
            ranked.iter().map(|t| t.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_parse_strips_markers_inside_line() {
        let ranked = parse_ranked_titles("The **big** \"quoted\" news", 5);
        assert_eq!(texts(&ranked), vec!["The big quoted news"]);
    }

    #[test]
    fn test_parse_drops_lines_blank_after_stripping() {
        let ranked = parse_ranked_titles("**\n\"\"\n   \nReal title\r\n", 5);
        assert_eq!(texts(&ranked), vec!["Real title"]);
    }

    #[test]
    fn test_parse_respects_limit() {
        let ranked = parse_ranked_titles("one\ntwo\nthree\nfour", 2);
        assert_eq!(texts(&ranked), vec!["one", "two"]);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_ranked_titles("", 10).is_empty());
        assert!(parse_ranked_titles("\n \n\t\n", 10).is_empty());
    }
}
