use std::{collections::HashSet, fmt::Display};

use itertools::Itertools;
use rand::{Rng, thread_rng};
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::Serialize;
use thiserror::Error;

pub const GITHUB_API: &str = "https://api.github.com";
pub const OWNER: &str = "usn757";
pub const REPO: &str = "number_generator";
pub const ISSUE_TITLE: &str = "이번 주 번호 추천";

pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 45;
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("token is not a valid header value: {0}")]
    InvalidToken(#[from] InvalidHeaderValue),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

type Result<T> = std::result::Result<T, SubmitError>;

/// Six distinct numbers in `MIN_NUMBER..=MAX_NUMBER`, kept in the order they
/// were first drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSet {
    values: Vec<u8>,
}

impl NumberSet {
    /// Draw until `PICK_COUNT` distinct values are collected. Duplicates are
    /// rejected; there is no cap on the number of draws.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        log::debug!("drawing {PICK_COUNT} numbers from {MIN_NUMBER}..={MAX_NUMBER}");
        let mut seen = HashSet::with_capacity(PICK_COUNT);
        let mut values = Vec::with_capacity(PICK_COUNT);
        while values.len() < PICK_COUNT {
            let n = rng.gen_range(MIN_NUMBER..=MAX_NUMBER);
            if seen.insert(n) {
                values.push(n);
            }
        }
        NumberSet { values }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }
}

impl Display for NumberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.values.iter().join(", "))
    }
}

pub fn generate_numbers() -> NumberSet {
    NumberSet::draw(&mut thread_rng())
}

#[derive(Debug, Serialize)]
pub struct IssuePayload {
    pub title: String,
    pub body: String,
}

impl IssuePayload {
    pub fn for_numbers(numbers: &NumberSet) -> Self {
        IssuePayload {
            title: ISSUE_TITLE.to_string(),
            body: format!("이번 주 추천 번호는 {numbers} 입니다."),
        }
    }
}

/// What the issue tracker said about the request. A rejection is a normal
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Rejected { status: u16, reason: String },
}

impl Outcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Outcome::Created)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Created => write!(f, "성공"),
            Outcome::Rejected { status, reason } if reason.is_empty() => {
                write!(f, "실패: {status}")
            }
            Outcome::Rejected { status, reason } => write!(f, "실패: {status} {reason}"),
        }
    }
}

pub fn issues_url(api_base: &str) -> String {
    format!(
        "{}/repos/{}/{}/issues",
        api_base.trim_end_matches('/'),
        OWNER,
        REPO
    )
}

pub fn make_client(token: &str) -> Result<Client> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    headers.insert(AUTHORIZATION, value);
    let client = Client::builder()
        .user_agent("number-generator")
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Post a single issue carrying `numbers`. Exactly one request is sent.
pub async fn submit_issue(client: &Client, api_base: &str, numbers: &NumberSet) -> Result<Outcome> {
    let url = issues_url(api_base);
    log::debug!("posting numbers {numbers} to {url}");
    let resp = client
        .post(&url)
        .json(&IssuePayload::for_numbers(numbers))
        .send()
        .await?;

    let status = resp.status();
    let outcome = if status.is_success() {
        Outcome::Created
    } else {
        Outcome::Rejected {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    };
    match outcome {
        Outcome::Created => log::info!("{outcome}"),
        Outcome::Rejected { .. } => log::warn!("{outcome}"),
    }
    Ok(outcome)
}

pub async fn run(token: &str) -> Result<Outcome> {
    let client = make_client(token)?;
    let numbers = generate_numbers();
    submit_issue(&client, GITHUB_API, &numbers).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn parse(s: &str) -> Vec<u8> {
        s.split(", ").map(|tok| tok.parse().unwrap()).collect()
    }

    #[test]
    fn draws_are_always_six_distinct_in_range() {
        for _ in 0..10_000 {
            let numbers = generate_numbers();
            let parsed = parse(&numbers.to_string());
            assert_eq!(parsed.len(), PICK_COUNT);
            assert_eq!(parsed.iter().collect::<HashSet<_>>().len(), PICK_COUNT);
            assert!(parsed.iter().all(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n)));
        }
    }

    #[test]
    fn same_seed_gives_same_draw() {
        let a = NumberSet::draw(&mut StdRng::seed_from_u64(7));
        let b = NumberSet::draw(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn display_keeps_draw_order() {
        let numbers = NumberSet { values: vec![42, 3, 17, 1, 45, 9] };
        assert_eq!(numbers.to_string(), "42, 3, 17, 1, 45, 9");
        assert_eq!(parse(&numbers.to_string()), numbers.values());
    }

    #[test]
    fn payload_embeds_numbers() {
        let numbers = NumberSet { values: vec![5, 10, 15, 20, 25, 30] };
        let json = serde_json::to_value(IssuePayload::for_numbers(&numbers)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "이번 주 번호 추천",
                "body": "이번 주 추천 번호는 5, 10, 15, 20, 25, 30 입니다.",
            })
        );
    }

    #[test]
    fn url_is_fixed() {
        assert_eq!(
            issues_url(GITHUB_API),
            "https://api.github.com/repos/usn757/number_generator/issues"
        );
        assert_eq!(
            issues_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/repos/usn757/number_generator/issues"
        );
    }

    #[test]
    fn outcome_text() {
        assert_eq!(Outcome::Created.to_string(), "성공");
        let rejected = Outcome::Rejected { status: 401, reason: "Unauthorized".into() };
        assert_eq!(rejected.to_string(), "실패: 401 Unauthorized");
        assert!(!rejected.is_created());
    }

    #[test]
    fn empty_token_still_builds_a_client() {
        assert!(make_client("").is_ok());
    }

    #[test]
    fn token_with_newline_is_rejected() {
        assert!(matches!(make_client("abc\ndef"), Err(SubmitError::InvalidToken(_))));
    }
}
