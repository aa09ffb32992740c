//! HTML pages for a finished newsletter and writing them to disk.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::environment::OutputConfig;
use crate::pipeline::Newsletter;
use crate::prompt::file_date;
use crate::reconcile::SelectedArticle;

const PAGE_STYLE: &str = r#"
    :root {
      --primary: #005C53;
      --accent: #9FC131;
      --text: #042904;
      --background-light: #f4f4f4;
      --background-dark: #e6e6e6;
    }
    body {
      font-family: sans-serif;
      font-size: 14px;
      margin: 0;
      padding: 20px;
      display: flex;
      justify-content: center;
      line-height: 1.6;
      color: var(--text);
      background-color: var(--background-light);
    }
    .container {
      max-width: 1200px;
      width: 100%;
      padding: 20px;
      background-color: white;
      border-radius: 10px;
      box-shadow: 0 0 15px rgba(0, 0, 0, 0.1);
    }
    h1 { color: var(--primary); font-size: 2em; text-align: center; }
    .intro, .conclusion {
      background-color: var(--background-dark);
      padding: 15px;
      border-radius: 8px;
      margin-bottom: 20px;
      text-align: center;
    }
    .articles {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
      gap: 20px;
      margin-bottom: 30px;
      padding: 0;
      list-style: none;
    }
    .article {
      background-color: var(--background-dark);
      padding: 20px;
      border-radius: 10px;
      box-shadow: 0 5px 10px rgba(0, 0, 0, 0.1);
    }
    .article img { width: 100%; border-radius: 6px; margin-bottom: 10px; }
    .article a {
      display: block;
      color: var(--text);
      font-weight: bold;
      font-size: 1.1em;
      text-decoration: none;
    }
    .article a:hover { text-decoration: underline; }
    @media (max-width: 768px) {
      body { padding: 10px; }
      h1 { font-size: 1.5em; }
    }
"#;

const SHARE_STYLE: &str = r#"
    .share { margin-top: 40px; text-align: center; }
    .share textarea {
      width: 100%;
      height: 150px;
      padding: 10px;
      font-size: 16px;
      border-radius: 5px;
      border: 1px solid var(--text);
    }
    .button {
      padding: 10px 20px;
      margin-top: 20px;
      font-size: 16px;
      color: white;
      background-color: var(--primary);
      border: none;
      border-radius: 5px;
      cursor: pointer;
    }
    .button:hover { background-color: var(--accent); }
    .button-container { display: flex; justify-content: space-between; }
"#;

const COPY_SCRIPT: &str = r#"
    function copyText(text) {
      navigator.clipboard.writeText(text);
    }
    function copyTitle() {
      copyText(document.getElementById("titleText").innerText);
    }
    function copyContent() {
      var range = document.createRange();
      range.selectNode(document.getElementById("contentToCopy"));
      window.getSelection().removeAllRanges();
      window.getSelection().addRange(range);
      document.execCommand("copy");
      window.getSelection().removeAllRanges();
    }
    function copyPost() {
      copyText(document.getElementById("socialPost").value);
    }
"#;

/// Paths of the pages written for one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenPages {
    pub newsletter_page: PathBuf,
    pub blog_page: PathBuf,
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape model prose while keeping the `<br>` line breaks it already carries.
pub fn escape_prose(text: &str) -> String {
    text.split("<br>")
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>")
}

/// One `<li class="article">` per article, in the order given.
pub fn render_article_list(articles: &[SelectedArticle]) -> String {
    let mut html = String::new();
    for article in articles {
        let thumbnail = if article.thumbnail_url.is_empty() {
            String::new()
        } else {
            format!(
                r#"<img src="{}" alt="" loading="lazy">"#,
                escape_html(&article.thumbnail_url)
            )
        };
        html.push_str(&format!(
            "<li class=\"article\">{}<a href=\"{}\">{}</a></li>\n",
            thumbnail,
            escape_html(&article.link),
            escape_html(&article.title)
        ));
    }
    html
}

/// The full page for the editor: the newsletter body plus copy buttons and
/// the social post.
pub fn render_newsletter_page(newsletter: &Newsletter) -> String {
    let headline = escape_html(&newsletter.headline);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{headline}</title>
  <style>{style}{share_style}</style>
</head>
<body>
  <div class="container">
    <h1 id="titleText">{headline}</h1>
    <div class="button-container">
      <button class="button" onclick="copyTitle()">Copy title</button>
      <button class="button" onclick="copyContent()">Copy intro, articles and conclusion</button>
    </div>
    <div id="contentToCopy">
      <div class="intro"><p>{introduction}</p></div>
      <ul class="articles">
{articles}      </ul>
      <div class="conclusion"><p>{conclusion}</p></div>
    </div>
    <div class="share">
      <h2>Social post</h2>
      <textarea id="socialPost" readonly>{social_post}</textarea>
      <button class="button" onclick="copyPost()">Copy social post</button>
    </div>
  </div>
  <script>{script}</script>
</body>
</html>
"#,
        headline = headline,
        style = PAGE_STYLE,
        share_style = SHARE_STYLE,
        introduction = escape_prose(&newsletter.introduction),
        articles = render_article_list(&newsletter.articles),
        conclusion = escape_prose(&newsletter.conclusion),
        social_post = escape_html(&newsletter.social_post),
        script = COPY_SCRIPT,
    )
}

/// The public page: same body, no buttons and no social post.
pub fn render_blog_page(newsletter: &Newsletter) -> String {
    let headline = escape_html(&newsletter.headline);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{headline}</title>
  <style>{style}</style>
</head>
<body>
  <div class="container">
    <h1>{headline}</h1>
    <div class="intro"><p>{introduction}</p></div>
    <ul class="articles">
{articles}    </ul>
    <div class="conclusion"><p>{conclusion}</p></div>
  </div>
</body>
</html>
"#,
        headline = headline,
        style = PAGE_STYLE,
        introduction = escape_prose(&newsletter.introduction),
        articles = render_article_list(&newsletter.articles),
        conclusion = escape_prose(&newsletter.conclusion),
    )
}

/// Write both pages as `<dir>/<ddmmYYYY>.html`, replacing any page already
/// written for the same day.
pub async fn write_pages(newsletter: &Newsletter, output: &OutputConfig) -> Result<WrittenPages> {
    let file_name = format!("{}.html", file_date(newsletter.issue_date));

    let newsletter_page = write_page(
        &output.newsletter_dir,
        &file_name,
        &render_newsletter_page(newsletter),
    )
    .await?;
    let blog_page = write_page(&output.blog_dir, &file_name, &render_blog_page(newsletter)).await?;

    Ok(WrittenPages {
        newsletter_page,
        blog_page,
    })
}

async fn write_page(dir: &Path, file_name: &str, html: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, html)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote {}", path.display());
    Ok(path)
}
