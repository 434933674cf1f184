/// Languages feed texts are available in.
#[derive(Debug, Clone)]
pub struct Localization {
    supported: Vec<String>,
    default: String,
}

impl Localization {
    /// `default` is always treated as supported.
    pub fn new<I, S>(supported: I, default: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default = default.trim().to_lowercase();
        let mut supported: Vec<String> = supported
            .into_iter()
            .map(|code| code.into().trim().to_lowercase())
            .filter(|code| !code.is_empty())
            .collect();

        if !supported.contains(&default) {
            supported.push(default.clone());
        }

        Self { supported, default }
    }

    pub fn default_code(&self) -> &str {
        &self.default
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.iter().any(|c| c == code)
    }

    /// Picks the user's language if supported, then the organization's, then the default.
    pub fn resolve<'a>(&'a self, user: Option<&'a str>, organization: Option<&'a str>) -> &'a str {
        [user, organization]
            .into_iter()
            .flatten()
            .find(|code| self.is_supported(code))
            .unwrap_or(self.default.as_str())
    }
}

impl Default for Localization {
    fn default() -> Self {
        Self::new(["en", "de"], "en")
    }
}
