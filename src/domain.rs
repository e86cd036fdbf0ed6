use serde::Deserialize;

use crate::error::SyncError;

/// One catalog entry describing a downloadable dataset.
///
/// Decoded straight from the catalog JSON. Every field the filter or the
/// processor touches can be absent upstream, so decoding must never fail on
/// a missing field.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub distribution: Vec<Distribution>,
}

/// The catalog has served `theme` both as a bare string and as a list of
/// category strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Theme {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Distribution {
    #[serde(rename = "downloadURL", default)]
    pub download_url: Option<String>,
}

impl Theme {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Theme::One(value) => value.contains(category),
            Theme::Many(values) => values.iter().any(|value| value.contains(category)),
        }
    }
}

impl DatasetDescriptor {
    /// Download location: the first distribution's URL, when present.
    pub fn download_url(&self) -> Option<&str> {
        self.distribution
            .first()
            .and_then(|dist| dist.download_url.as_deref())
    }

    /// A descriptor without a theme never matches.
    pub fn matches_theme(&self, category: &str) -> bool {
        self.theme
            .as_ref()
            .is_some_and(|theme| theme.matches(category))
    }

    /// Modification stamp as recorded in the snapshot. Opaque, compared only
    /// for equality; a descriptor without one compares as the empty string.
    pub fn modified_stamp(&self) -> String {
        self.modified.clone().unwrap_or_default()
    }
}

/// Output filename for a dataset: the last path segment of its download URL,
/// query string and fragment excluded.
pub fn file_name_from_url(url: &str) -> Result<String, SyncError> {
    let parsed =
        reqwest::Url::parse(url).map_err(|_| SyncError::InvalidDownloadUrl(url.to_string()))?;
    parsed
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .ok_or_else(|| SyncError::InvalidDownloadUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn theme_matching() {
        let general = Theme::One("Hospitals - General".to_string());
        assert!(general.matches("Hospitals"));

        let nursing = Theme::One("Nursing Homes".to_string());
        assert!(!nursing.matches("Hospitals"));

        let list = Theme::Many(vec!["Dialysis".to_string(), "Hospitals".to_string()]);
        assert!(list.matches("Hospitals"));
    }

    #[test]
    fn descriptor_without_theme_never_matches() {
        let descriptor: DatasetDescriptor =
            serde_json::from_str(r#"{ "title": "Untagged dataset" }"#).unwrap();
        assert!(!descriptor.matches_theme("Hospitals"));
        assert!(descriptor.download_url().is_none());
        assert_eq!(descriptor.modified_stamp(), "");
    }

    #[test]
    fn descriptor_decodes_catalog_shape() {
        let descriptor: DatasetDescriptor = serde_json::from_str(
            r#"{
                "title": "Hospital General Information",
                "theme": ["Hospitals"],
                "modified": "2021-07-21",
                "distribution": [
                    { "downloadURL": "https://data.cms.gov/sites/default/files/xubh-q36u.csv" }
                ]
            }"#,
        )
        .unwrap();
        assert!(descriptor.matches_theme("Hospitals"));
        assert_eq!(descriptor.modified_stamp(), "2021-07-21");
        assert_eq!(
            descriptor.download_url(),
            Some("https://data.cms.gov/sites/default/files/xubh-q36u.csv")
        );
    }

    #[test]
    fn file_name_from_last_path_segment() {
        let name =
            file_name_from_url("https://data.cms.gov/sites/default/files/xubh-q36u.csv").unwrap();
        assert_eq!(name, "xubh-q36u.csv");

        let with_query =
            file_name_from_url("https://example.com/files/a.csv?version=2&raw=true").unwrap();
        assert_eq!(with_query, "a.csv");
    }

    #[test]
    fn file_name_rejects_unusable_urls() {
        assert_matches!(
            file_name_from_url("not a url"),
            Err(SyncError::InvalidDownloadUrl(_))
        );
        assert_matches!(
            file_name_from_url("https://example.com/"),
            Err(SyncError::InvalidDownloadUrl(_))
        );
    }
}
