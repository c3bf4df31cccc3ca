use std::fmt;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identifier of a job within the feed.
///
/// The remote API sends ids as JSON numbers on some records and strings on
/// others; both normalize to the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        let id = match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        };
        if id.trim().is_empty() {
            return Err(de::Error::custom("job id must not be empty"));
        }
        Ok(Self(id))
    }
}

/// The members of one JSON object, handed out by name.
///
/// A member that does not decode as the requested type stays behind and ends
/// up in the record's `extra` map, so an off-type value never costs the whole
/// record and is still written back as it came in.
#[derive(Deserialize)]
#[serde(transparent)]
struct Fields(Map<String, Value>);

impl Fields {
    fn take<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = T::deserialize(self.0.get(key)?).ok()?;
        self.0.remove(key);
        Some(value)
    }

    fn into_rest(self) -> Map<String, Value> {
        self.0
    }
}

/// Headline attributes shown on cards and in the detail view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrimaryDetails {
    #[serde(rename = "Place", skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(rename = "Salary", skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(rename = "Job_Type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(rename = "Experience", skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(rename = "Fees_Charged", skip_serializing_if = "Option::is_none")]
    pub fees_charged: Option<String>,
    #[serde(rename = "Qualification", skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for PrimaryDetails {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Fields::deserialize(deserializer)?;
        Ok(Self {
            place: fields.take("Place"),
            salary: fields.take("Salary"),
            job_type: fields.take("Job_Type"),
            experience: fields.take("Experience"),
            fees_charged: fields.take("Fees_Charged"),
            qualification: fields.take("Qualification"),
            extra: fields.into_rest(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobTag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for JobTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Fields::deserialize(deserializer)?;
        Ok(Self {
            value: fields.take("value"),
            bg_color: fields.take("bg_color"),
            text_color: fields.take("text_color"),
            extra: fields.into_rest(),
        })
    }
}

/// How the employer wants to be reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactPreference {
    /// `1` means "chat on WhatsApp".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_call_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_call_end_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for ContactPreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Fields::deserialize(deserializer)?;
        Ok(Self {
            preference: fields.take("preference"),
            whatsapp_link: fields.take("whatsapp_link"),
            preferred_call_start_time: fields.take("preferred_call_start_time"),
            preferred_call_end_time: fields.take("preferred_call_end_time"),
            extra: fields.into_rest(),
        })
    }
}

/// A job record as returned by the feed.
///
/// Only a handful of fields are read directly; everything else is kept in
/// `extra` and written back unchanged. Only `id` is required: a known field
/// holding a value of another type is kept in `extra` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_details: Option<PrimaryDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub job_tags: Vec<JobTag>,
    /// JSON-encoded object with `block1`, `block2`, ... description blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_preference: Option<ContactPreference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Job {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Fields::deserialize(deserializer)?;
        let id = match fields.0.get("id") {
            Some(raw) => JobId::deserialize(raw).map_err(<D::Error as de::Error>::custom)?,
            None => return Err(de::Error::missing_field("id")),
        };
        fields.0.remove("id");

        Ok(Self {
            id,
            title: fields.take("title"),
            company_name: fields.take("company_name"),
            primary_details: fields.take("primary_details"),
            custom_link: fields.take("custom_link"),
            job_tags: fields.take("job_tags").unwrap_or_default(),
            content: fields.take("content"),
            job_type: fields.take("job_type"),
            salary_min: fields.take("salary_min"),
            salary_max: fields.take("salary_max"),
            contact_preference: fields.take("contact_preference"),
            extra: fields.into_rest(),
        })
    }
}

/// WhatsApp contact details, only offered when the employer asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsAppContact {
    pub link: String,
    pub call_start: Option<String>,
    pub call_end: Option<String>,
}

impl Job {
    /// Minimal job, mostly useful for tests and fixtures.
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            company_name: None,
            primary_details: None,
            custom_link: None,
            job_tags: Vec::new(),
            content: None,
            job_type: None,
            salary_min: None,
            salary_max: None,
            contact_preference: None,
            extra: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn place(&self) -> Option<&str> {
        self.primary_details.as_ref()?.place.as_deref()
    }

    pub fn salary_text(&self) -> Option<&str> {
        self.primary_details.as_ref()?.salary.as_deref()
    }

    /// Decodes the description blocks stored in `content`, ordered by block
    /// number. Missing or undecodable content yields no blocks.
    pub fn description_blocks(&self) -> Vec<String> {
        let Some(raw) = self.content.as_deref() else {
            return Vec::new();
        };
        let Ok(Value::Object(blocks)) = serde_json::from_str::<Value>(raw) else {
            return Vec::new();
        };

        let mut numbered: Vec<(u32, String)> = blocks
            .into_iter()
            .filter_map(|(key, value)| {
                let n = key.strip_prefix("block")?.parse::<u32>().ok()?;
                match value {
                    Value::String(text) if !text.trim().is_empty() => Some((n, text)),
                    _ => None,
                }
            })
            .collect();
        numbered.sort_by_key(|(n, _)| *n);
        numbered.into_iter().map(|(_, text)| text).collect()
    }

    pub fn whatsapp_contact(&self) -> Option<WhatsAppContact> {
        let pref = self.contact_preference.as_ref()?;
        if pref.preference != Some(1) {
            return None;
        }
        Some(WhatsAppContact {
            link: pref.whatsapp_link.clone()?,
            call_start: pref.preferred_call_start_time.clone(),
            call_end: pref.preferred_call_end_time.clone(),
        })
    }
}

/// One page of the remote feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub page: u32,
    pub jobs: Vec<Job>,
}

impl FeedPage {
    pub fn new(page: u32, jobs: Vec<Job>) -> Self {
        Self { page, jobs }
    }
}

/// List entry with the display fallbacks already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCard {
    pub id: JobId,
    pub title: String,
    pub place: String,
    pub salary: String,
    pub contact: String,
}

impl From<&Job> for JobCard {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            title: non_blank(job.title.as_deref()).unwrap_or("No Title Available").to_string(),
            place: non_blank(job.place()).unwrap_or("Location not provided").to_string(),
            salary: non_blank(job.salary_text()).unwrap_or("Salary not specified").to_string(),
            contact: non_blank(job.custom_link.as_deref())
                .unwrap_or("No contact available")
                .to_string(),
        }
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
