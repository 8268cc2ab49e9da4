//! Build metadata file.

use serde::de::Error as _;
use serde::Deserialize;

/// Values read from the build metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetadata {
    /// Version string stamped into every page
    pub version: String,
}

#[derive(Deserialize)]
struct RawMetadata {
    #[serde(rename = "buildVersion")]
    build_version: Option<String>,
    version: Option<String>,
}

impl BuildMetadata {
    /// Parse a JSON metadata object.
    ///
    /// `buildVersion` wins over `version`, so a `package.json` carrying both
    /// works as well as a dedicated file. Other keys are ignored.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawMetadata = serde_json::from_str(json)?;

        raw.build_version
            .or(raw.version)
            .map(|version| Self { version })
            .ok_or_else(|| serde_json::Error::missing_field("buildVersion"))
    }
}
