//! Reddit text source: public JSON listing endpoints, no API key. Paginates
//! hot/new/rising, then pulls comment trees for the most promising posts
//! (daily-discussion megathreads first, since that's where the ticker
//! chatter lives). Fetch errors degrade to whatever was collected so far.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;

use crate::ingest::types::{SourceType, TextSource, TextUnit};

pub const DEFAULT_SUBREDDIT_URL: &str = "https://www.reddit.com/r/wallstreetbets";
const USER_AGENT: &str = "wsb-sentiment-tracker/1.0";
const REQUEST_DELAY: Duration = Duration::from_millis(1200);
const MAX_COMMENT_DEPTH: usize = 3;

/// Per-listing fetch limits.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub hot: usize,
    pub new: usize,
    pub rising: usize,
    /// Number of posts whose comment trees are pulled.
    pub comment_posts: usize,
    pub comments_per_post: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            hot: 200,
            new: 200,
            rising: 50,
            comment_posts: 50,
            comments_per_post: 50,
        }
    }
}

pub struct RedditSource {
    client: reqwest::Client,
    base: String,
    limits: FetchLimits,
    delay: Duration,
}

impl RedditSource {
    pub fn new(base: impl Into<String>, limits: FetchLimits) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .context("building reddit http client")?;
        Ok(Self {
            client,
            base: base.into(),
            limits,
            delay: REQUEST_DELAY,
        })
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?
            .error_for_status()
            .with_context(|| format!("status for {url}"))?;
        resp.json::<Value>()
            .await
            .with_context(|| format!("decoding {url}"))
    }

    /// Paginate one listing endpoint up to `limit` posts.
    async fn fetch_listing(&self, path: &str, limit: usize) -> Vec<TextUnit> {
        let mut posts: Vec<TextUnit> = Vec::new();
        let mut after: Option<String> = None;

        while posts.len() < limit {
            let batch = (limit - posts.len()).min(100);
            let mut url = format!("{}/{path}.json?limit={batch}&raw_json=1", self.base);
            if let Some(cursor) = &after {
                url.push_str(&format!("&after={cursor}"));
            }

            let body = match self.fetch_json(&url).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = ?e, listing = path, "listing fetch failed");
                    counter!("reddit_fetch_errors_total").increment(1);
                    break;
                }
            };

            let (mut units, next) = parse_listing(&body);
            if units.is_empty() {
                break;
            }
            posts.append(&mut units);

            after = next;
            if after.is_none() {
                break;
            }
            tokio::time::sleep(self.delay).await;
        }

        posts
    }

    async fn fetch_posts(&self) -> Vec<TextUnit> {
        let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
        let mut all = Vec::new();
        for (path, limit) in [
            ("hot", self.limits.hot),
            ("new", self.limits.new),
            ("rising", self.limits.rising),
        ] {
            let posts = self.fetch_listing(path, limit).await;
            tracing::info!(listing = path, fetched = posts.len(), "listing done");
            for p in posts {
                if seen.insert(p.id.clone()) {
                    all.push(p);
                }
            }
        }
        all
    }

    /// Pull comment trees for discussion threads plus the top posts by
    /// upvotes. Megathreads get a larger comment budget.
    async fn fetch_comments(&self, posts: &[TextUnit]) -> Vec<TextUnit> {
        let mut discussion: Vec<&TextUnit> = Vec::new();
        let mut rest: Vec<&TextUnit> = Vec::new();
        for p in posts {
            if is_discussion_thread(&p.title) {
                discussion.push(p);
            } else {
                rest.push(p);
            }
        }
        rest.sort_by_key(|p| std::cmp::Reverse(p.upvotes));

        let extra = self.limits.comment_posts.saturating_sub(discussion.len());
        let targets: Vec<&TextUnit> = discussion
            .into_iter()
            .chain(rest.into_iter().take(extra))
            .collect();

        let mut comments = Vec::new();
        for post in &targets {
            let is_mega = is_discussion_thread(&post.title);
            let limit = if is_mega {
                (self.limits.comments_per_post * 3).min(150)
            } else {
                self.limits.comments_per_post
            };
            let url = format!(
                "{}/comments/{}.json?limit={limit}&sort=new&raw_json=1",
                self.base, post.id
            );
            match self.fetch_json(&url).await {
                Ok(body) => comments.extend(parse_comment_thread(&body, &post.id)),
                Err(e) => {
                    tracing::warn!(error = ?e, post = %post.id, "comment fetch failed");
                    counter!("reddit_fetch_errors_total").increment(1);
                }
            }
            tokio::time::sleep(self.delay).await;
        }

        tracing::info!(comments = comments.len(), posts = targets.len(), "comments done");
        comments
    }
}

#[async_trait]
impl TextSource for RedditSource {
    async fn fetch_latest(&self) -> Result<Vec<TextUnit>> {
        let posts = self.fetch_posts().await;
        let comments = self.fetch_comments(&posts).await;
        let mut all = posts;
        all.extend(comments);
        Ok(all)
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}

/// Parse one listing page into units plus the pagination cursor.
fn parse_listing(body: &Value) -> (Vec<TextUnit>, Option<String>) {
    let mut out = Vec::new();
    let children = body["data"]["children"].as_array();
    let Some(children) = children else {
        return (out, None);
    };

    for child in children {
        if child["kind"].as_str() != Some("t3") {
            continue;
        }
        let post = &child["data"];
        let Some(id) = post["id"].as_str() else {
            continue;
        };
        out.push(TextUnit {
            id: id.to_string(),
            title: post["title"].as_str().unwrap_or_default().to_string(),
            body: post["selftext"].as_str().unwrap_or_default().to_string(),
            author: post["author"].as_str().unwrap_or("[deleted]").to_string(),
            upvotes: post["score"].as_i64().unwrap_or(0),
            created_at: post["created_utc"].as_f64().unwrap_or(0.0) as i64,
            source_type: SourceType::Post,
        });
    }

    let after = body["data"]["after"].as_str().map(str::to_string);
    (out, after)
}

/// Parse a `/comments/{id}.json` response (a two-element array: the post
/// listing, then the comment listing) into flattened comment units.
fn parse_comment_thread(body: &Value, post_id: &str) -> Vec<TextUnit> {
    let mut out = Vec::new();
    let Some(listing) = body.get(1) else {
        return out;
    };
    if let Some(children) = listing["data"]["children"].as_array() {
        walk_comments(children, post_id, 0, &mut out);
    }
    out
}

fn walk_comments(children: &[Value], post_id: &str, depth: usize, out: &mut Vec<TextUnit>) {
    for child in children {
        if child["kind"].as_str() != Some("t1") {
            continue;
        }
        let c = &child["data"];
        let text = c["body"].as_str().unwrap_or_default();
        if !text.is_empty() && text != "[deleted]" && text != "[removed]" {
            let id = c["id"].as_str().unwrap_or_default();
            out.push(TextUnit {
                id: format!("{post_id}_{id}"),
                title: text.chars().take(500).collect(),
                body: String::new(),
                author: c["author"].as_str().unwrap_or("[deleted]").to_string(),
                upvotes: c["score"].as_i64().unwrap_or(0),
                created_at: c["created_utc"].as_f64().unwrap_or(0.0) as i64,
                source_type: SourceType::Comment,
            });
        }
        // Replies are an object when present, an empty string when not
        if depth < MAX_COMMENT_DEPTH {
            if let Some(replies) = c["replies"]["data"]["children"].as_array() {
                walk_comments(replies, post_id, depth + 1, out);
            }
        }
    }
}

/// Daily/weekly discussion and earnings megathreads carry the densest
/// ticker chatter.
fn is_discussion_thread(title: &str) -> bool {
    let t = title.to_lowercase();
    [
        "daily discussion",
        "weekend discussion",
        "what are your moves",
        "earnings thread",
        "daily thread",
        "weekly discussion",
        "megathread",
        "moves tomorrow",
    ]
    .iter()
    .any(|k| t.contains(k))
}
