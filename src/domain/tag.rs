//! Name/value tags attached to uploads and name record updates.

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "PermaDeploy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn content_type(value: impl Into<String>) -> Self {
        Self::new("Content-Type", value)
    }

    pub fn app_name() -> Self {
        Self::new("App-Name", APP_NAME)
    }
}

/// Look up a tag value by name
#[cfg(test)]
pub fn find<'a>(tags: &'a [Tag], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.name == name)
        .map(|tag| tag.value.as_str())
}
