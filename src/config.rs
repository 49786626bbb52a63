use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::models::Platform;

pub const DEFAULT_CONTRIBUTIONS_API_URL: &str = "https://github-contributions.vercel.app/api/v1";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_LEETCODE_API_URLS: [&str; 3] = [
    "https://leetcode-api-faisalshohag.vercel.app",
    "https://leetcode-stats-api.herokuapp.com",
    "https://leetcodestats.cyclic.app",
];
pub const DEFAULT_GFG_API_URLS: [&str; 1] = ["https://geeks-for-geeks-api.vercel.app"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub contributions_api_url: String,
    pub github_api_url: String,
    /// Tried in order; the first that answers wins.
    pub leetcode_api_urls: Vec<String>,
    pub gfg_api_urls: Vec<String>,
    pub github_username: String,
    pub github_repo: String,
    pub leetcode_username: String,
    pub gfg_username: String,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            contributions_api_url: DEFAULT_CONTRIBUTIONS_API_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            leetcode_api_urls: DEFAULT_LEETCODE_API_URLS.map(String::from).to_vec(),
            gfg_api_urls: DEFAULT_GFG_API_URLS.map(String::from).to_vec(),
            github_username: "Arbazkhanark".to_string(),
            github_repo: "Namaste-DSA".to_string(),
            leetcode_username: "arbazkhanark23".to_string(),
            gfg_username: "arbaazkhanark23".to_string(),
            fetch_timeout: Duration::from_secs(10),
            user_agent: "Next.js-GitHub-Portfolio".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: try_load("HOST", defaults.host),
            port: try_load("PORT", defaults.port),
            contributions_api_url: try_load("CONTRIBUTIONS_API_URL", defaults.contributions_api_url),
            github_api_url: try_load("GITHUB_API_URL", defaults.github_api_url),
            leetcode_api_urls: load_list("LEETCODE_API_URLS", defaults.leetcode_api_urls),
            gfg_api_urls: load_list("GFG_API_URLS", defaults.gfg_api_urls),
            github_username: try_load("GITHUB_USERNAME", defaults.github_username),
            github_repo: try_load("GITHUB_REPO", defaults.github_repo),
            leetcode_username: try_load("LEETCODE_USERNAME", defaults.leetcode_username),
            gfg_username: try_load("GFG_USERNAME", defaults.gfg_username),
            fetch_timeout: Duration::from_secs(try_load(
                "FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )),
            user_agent: try_load("USER_AGENT", defaults.user_agent),
        }
    }

    pub fn default_username(&self, platform: Platform) -> &str {
        match platform {
            Platform::GitHub => &self.github_username,
            Platform::LeetCode => &self.leetcode_username,
            Platform::GeeksForGeeks => &self.gfg_username,
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn load_list(key: &str, default: Vec<String>) -> Vec<String> {
    let Ok(raw) = env::var(key) else {
        return default;
    };

    let values = parse_list(&raw);
    if values.is_empty() {
        warn!("{key} is empty, using defaults");
        return default;
    }
    values
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .collect()
}
