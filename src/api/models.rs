use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub username: Option<String>,
}

impl SearchRequest {
    /// The trimmed username, or `None` when it is missing or blank.
    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}
