use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::names::PropertyName;

/// A decoded property value.
///
/// One variant per shape the server can send us; the mapper matches on the
/// variant it expects for a given property name.
#[derive(Debug, PartialEq, Clone)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Geo(GeoLocation),
    ImageDimension(ImageDimension),
    Sharees(Vec<Sharee>),
    Tags(Vec<String>),
    ResourceType(ResourceKind),
    MountType(MountType),
    Lock(LockMetadata),
}
impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            Self::Integer(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct ImageDimension {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ResourceKind {
    #[default]
    File,
    Collection,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum MountType {
    #[default]
    Internal,
    External,
    Group,
}
impl MountType {
    pub fn from_text(txt: &str) -> Self {
        match txt {
            "external" => Self::External,
            "group" => Self::Group,
            _ => Self::Internal,
        }
    }
}

/// Share type as numbered by the OCS sharing API
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ShareType {
    #[default]
    User,
    Group,
    PublicLink,
    Email,
    Federated,
    Circle,
    Room,
    Unknown(i32),
}
impl From<i32> for ShareType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::User,
            1 => Self::Group,
            3 => Self::PublicLink,
            4 => Self::Email,
            6 => Self::Federated,
            7 => Self::Circle,
            10 => Self::Room,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Sharee {
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub share_type: ShareType,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum LockType {
    #[default]
    Manual,
    Collaborative,
    Token,
}
impl From<i64> for LockType {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::Collaborative,
            2 => Self::Token,
            _ => Self::Manual,
        }
    }
}

/// What we know about a lock held on a resource
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct LockMetadata {
    pub locked: bool,
    pub lock_type: LockType,
    pub owner: Option<String>,
    pub owner_display_name: Option<String>,
    pub owner_editor: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// seconds, 0 when the lock never expires
    pub timeout: i64,
    pub token: Option<String>,
}

/// One `<response>` of a multistatus once its properties went through the
/// registry. Lives only for the duration of a parse.
#[derive(Debug, PartialEq, Clone)]
pub struct DecodedResource {
    pub href: String,
    pub status: http::StatusCode,
    pub properties: BTreeMap<PropertyName, PropertyValue>,
}
impl DecodedResource {
    pub fn new(href: impl Into<String>, status: http::StatusCode) -> Self {
        Self {
            href: href.into(),
            status,
            properties: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &PropertyName) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self.get(&super::names::RESOURCE_TYPE),
            Some(PropertyValue::ResourceType(ResourceKind::Collection))
        )
    }
}

/// Relationship between a `<response>` href and the requested resource
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HrefRelation {
    /// the requested resource itself
    SelfRef,
    /// a direct child of the requested resource
    Member,
    /// anything else, never folded into results
    Other,
}
