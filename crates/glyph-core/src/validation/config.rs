use crate::{Error, Result};

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Image MIME types accepted by default. `image/jpg` is a common alias of
/// `image/jpeg` sent by some clients.
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/tiff",
    "image/webp",
];

/// Language codes accepted by default.
pub const DEFAULT_SUPPORTED_LANGUAGES: &[&str] = &[
    "auto", "en", "es", "fr", "de", "it", "pt", "ru", "zh", "ja", "ko",
];

/// Limits applied to every upload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "config does nothing unless you use it"]
pub struct ValidationConfig {
    max_upload_size: usize,
    allowed_mime_types: Vec<String>,
    supported_languages: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            allowed_mime_types: normalize_list(DEFAULT_ALLOWED_MIME_TYPES.iter().copied()),
            supported_languages: normalize_list(DEFAULT_SUPPORTED_LANGUAGES.iter().copied()),
        }
    }
}

impl ValidationConfig {
    /// Returns the maximum upload size in bytes.
    #[must_use]
    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// Returns the allowed MIME types, lowercased.
    #[must_use]
    pub fn allowed_mime_types(&self) -> &[String] {
        &self.allowed_mime_types
    }

    /// Returns the supported language codes, lowercased.
    #[must_use]
    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Sets the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, max_upload_size: usize) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    /// Replaces the MIME type allow-list.
    pub fn with_allowed_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_mime_types = normalize_list(mime_types);
        self
    }

    /// Replaces the supported language list.
    pub fn with_supported_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.supported_languages = normalize_list(languages);
        self
    }

    /// Checks that the limits are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_size == 0 {
            return Err(Error::config("Maximum upload size must be greater than zero"));
        }

        if self.allowed_mime_types.is_empty() {
            return Err(Error::config("At least one MIME type must be allowed"));
        }

        if let Some(invalid) = self
            .allowed_mime_types
            .iter()
            .find(|m| m.parse::<mime::Mime>().is_err())
        {
            return Err(Error::config(format!("Invalid MIME type '{invalid}'")));
        }

        if self.supported_languages.is_empty() {
            return Err(Error::config("At least one language must be supported"));
        }

        Ok(())
    }
}

fn normalize_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized = Vec::new();
    for item in items {
        let item = item.as_ref().trim().to_ascii_lowercase();
        if !item.is_empty() && !normalized.contains(&item) {
            normalized.push(item);
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ValidationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_upload_size(), 10_485_760);
        assert_eq!(config.allowed_mime_types().len(), 7);
        assert!(config.supported_languages().contains(&"auto".to_owned()));
    }

    #[test]
    fn lists_are_normalized() {
        let config = ValidationConfig::default()
            .with_allowed_mime_types([" Image/PNG ", "image/png", ""])
            .with_supported_languages(["EN", "auto"]);

        assert_eq!(config.allowed_mime_types(), ["image/png"]);
        assert_eq!(config.supported_languages(), ["en", "auto"]);
    }

    #[test]
    fn rejects_unusable_limits() {
        let config = ValidationConfig::default().with_max_upload_size(0);
        assert!(config.validate().is_err());

        let config = ValidationConfig::default().with_allowed_mime_types(Vec::<String>::new());
        assert!(config.validate().is_err());

        let config = ValidationConfig::default().with_allowed_mime_types(["not a mime"]);
        assert!(config.validate().is_err());

        let config = ValidationConfig::default().with_supported_languages([""]);
        assert!(config.validate().is_err());
    }
}
