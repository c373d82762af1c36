use crate::election::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

/// The description of the contest, as written in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

impl FileSource {
    pub fn check_provider(&self) -> ElectionResult<()> {
        match self.provider.as_str() {
            "schulze" | "text" => Ok(()),
            x => {
                whatever!("unknown provider for {}: {}", self.file_path, x)
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionRules {
    #[serde(rename = "fullRanking")]
    pub full_ranking: Option<bool>,
    #[serde(rename = "printMatrices")]
    pub print_matrices: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "cvrFileSources", default)]
    pub cvr_file_sources: Vec<FileSource>,
    pub candidates: Option<Vec<ElectionCandidate>>,
    #[serde(rename = "candidatesFile")]
    pub candidates_file: Option<String>,
    #[serde(default)]
    pub rules: ElectionRules,
}

impl ElectionConfig {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            contest: self.output_settings.contest_name.clone(),
            date: self.output_settings.contest_date.clone(),
            jurisdiction: self.output_settings.contest_jurisdiction.clone(),
            office: self.output_settings.contest_office.clone(),
        }
    }
}

pub fn read_config(path: &Path) -> ElectionResult<ElectionConfig> {
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: p.clone() })?;
    let config: ElectionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: p })?;
    Ok(config)
}

pub fn read_summary(path: &Path) -> ElectionResult<JSValue> {
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: p.clone() })?;
    let js: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: p })?;
    Ok(js)
}
