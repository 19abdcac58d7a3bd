use anyhow::Context as _;
use chrono::NaiveDate;
use gloo::net::http::Request;
use unveil_core::{GuessVerdict, ImagePayload, PixelBuffer, PuzzleInfo, SolutionPayload, day_key};

pub(crate) const DEFAULT_API_BASE: &str = "/api/";

/// HTTP client for the daily puzzle API. Every endpoint is keyed by the
/// local date.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PuzzleApi {
    base: String,
    date: String,
}

impl PuzzleApi {
    pub(crate) fn new(base: &str, date: NaiveDate) -> Self {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base,
            date: day_key(date),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}?date={}", self.base, endpoint, self.date)
    }

    fn guess_url(&self, guess: &str) -> String {
        let guess = String::from(js_sys::encode_uri_component(guess));
        format!("{}&guess={}", self.url("word_info"), guess)
    }

    pub(crate) async fn fetch_info(&self) -> anyhow::Result<PuzzleInfo> {
        let response = Request::get(&self.url("word_info"))
            .send()
            .await
            .context("word_info request")?;
        anyhow::ensure!(response.ok(), "word_info answered {}", response.status());
        Ok(PuzzleInfo::from_json(&response.text().await?)?)
    }

    pub(crate) async fn fetch_image(&self) -> anyhow::Result<PixelBuffer> {
        let response = Request::get(&self.url("image"))
            .send()
            .await
            .context("image request")?;
        anyhow::ensure!(response.ok(), "image answered {}", response.status());
        let payload = ImagePayload::from_json(&response.text().await?)?;
        Ok(payload.decode()?)
    }

    pub(crate) async fn submit_guess(&self, guess: &str) -> anyhow::Result<GuessVerdict> {
        let response = Request::put(&self.guess_url(guess))
            .send()
            .await
            .context("guess request")?;
        let status = response.status();
        GuessVerdict::from_status(status).with_context(|| {
            format!("guess rejected with status {}", status)
        })
    }

    pub(crate) async fn fetch_solution(&self) -> anyhow::Result<String> {
        let response = Request::get(&self.url("solution"))
            .send()
            .await
            .context("solution request")?;
        anyhow::ensure!(response.ok(), "solution answered {}", response.status());
        let payload: SolutionPayload = serde_json::from_str(&response.text().await?)?;
        Ok(payload.solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_keyed_by_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        let api = PuzzleApi::new("https://puzzle.test/api", date);

        assert_eq!(api.url("image"), "https://puzzle.test/api/image?date=2024-02-05");
        assert_eq!(PuzzleApi::new(DEFAULT_API_BASE, date).url("word_info"), "/api/word_info?date=2024-02-05");
    }
}
