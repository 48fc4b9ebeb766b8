use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_TITLE_CHARS: usize = 50;
pub const USER_IMAGE_ID_PREFIX: &str = "user-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub is_voice_memo: bool,
    #[serde(
        default,
        deserialize_with = "lenient_icon",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<MemoIcon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Icons saved by a newer build are dropped instead of failing the record.
pub(crate) fn lenient_icon<'de, D>(deserializer: D) -> Result<Option<MemoIcon>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.and_then(|name| {
        name.parse::<MemoIcon>()
            .map_err(|err| log::debug!("dropping {err}"))
            .ok()
    }))
}

/// Everything a caller supplies when creating a memo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoDraft {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub image_urls: Vec<String>,
    pub is_voice_memo: bool,
    pub icon: Option<MemoIcon>,
    pub cover_image_url: Option<String>,
}

impl MemoDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_icon(mut self, icon: MemoIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoIcon {
    #[serde(rename = "smile")]
    Smile,
    #[serde(rename = "briefcase")]
    Briefcase,
    #[serde(rename = "shopping-cart")]
    ShoppingCart,
    #[serde(rename = "lightbulb")]
    Lightbulb,
    #[serde(rename = "book")]
    Book,
    #[serde(rename = "coffee")]
    Coffee,
    #[serde(rename = "gamepad-2")]
    Gamepad,
    #[serde(rename = "music")]
    Music,
}

impl MemoIcon {
    pub const ALL: [MemoIcon; 8] = [
        MemoIcon::Smile,
        MemoIcon::Briefcase,
        MemoIcon::ShoppingCart,
        MemoIcon::Lightbulb,
        MemoIcon::Book,
        MemoIcon::Coffee,
        MemoIcon::Gamepad,
        MemoIcon::Music,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MemoIcon::Smile => "smile",
            MemoIcon::Briefcase => "briefcase",
            MemoIcon::ShoppingCart => "shopping-cart",
            MemoIcon::Lightbulb => "lightbulb",
            MemoIcon::Book => "book",
            MemoIcon::Coffee => "coffee",
            MemoIcon::Gamepad => "gamepad-2",
            MemoIcon::Music => "music",
        }
    }
}

impl fmt::Display for MemoIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown icon '{0}'")]
pub struct UnknownIcon(pub String);

impl FromStr for MemoIcon {
    type Err = UnknownIcon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemoIcon::ALL
            .into_iter()
            .find(|icon| icon.name() == s)
            .ok_or_else(|| UnknownIcon(s.to_string()))
    }
}

/// Which memos the category sidebar currently selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Uncategorized,
    Label(String),
}

impl CategoryFilter {
    pub fn label(label: impl Into<String>) -> Self {
        CategoryFilter::Label(label.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePlaceholder {
    pub id: String,
    pub description: String,
    pub image_url: String,
    pub image_hint: String,
}

impl ImagePlaceholder {
    pub fn is_user_uploaded(&self) -> bool {
        self.id.starts_with(USER_IMAGE_ID_PREFIX)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ko,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ko" => Ok(Language::Ko),
            "en" => Ok(Language::En),
            other => Err(format!("unsupported language code '{other}'")),
        }
    }
}
