//! Named sets of properties requested by PROPFIND operations.

use super::names::{self, PropertyName};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PropertySet {
    pub name: &'static str,
    pub properties: &'static [PropertyName],
}
impl PropertySet {
    pub fn contains(&self, name: &PropertyName) -> bool {
        self.properties.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyName> {
        self.properties.iter()
    }
}

/// Used for folder listings, everything the server may know about a file
pub const ALL_PROPERTIES: PropertySet = PropertySet {
    name: "all",
    properties: &[
        names::DISPLAY_NAME,
        names::CONTENT_TYPE,
        names::RESOURCE_TYPE,
        names::CONTENT_LENGTH,
        names::LAST_MODIFIED,
        names::CREATION_DATE,
        names::ETAG,
        names::PERMISSIONS,
        names::REMOTE_ID,
        names::LOCAL_ID,
        names::SIZE,
        names::FAVORITE,
        names::IS_ENCRYPTED,
        names::MOUNT_TYPE,
        names::OWNER_ID,
        names::OWNER_DISPLAY_NAME,
        names::UNREAD_COMMENTS,
        names::HAS_PREVIEW,
        names::NOTE,
        names::SHAREES,
        names::RICH_WORKSPACE,
        names::CREATION_TIME,
        names::UPLOAD_TIME,
        names::LOCK,
        names::LOCK_OWNER_TYPE,
        names::LOCK_OWNER,
        names::LOCK_OWNER_DISPLAY_NAME,
        names::LOCK_OWNER_EDITOR,
        names::LOCK_TIME,
        names::LOCK_TIMEOUT,
        names::LOCK_TOKEN,
        names::LOCK_DISCOVERY,
        names::SYSTEM_TAGS,
        names::HIDDEN,
        names::METADATA_SIZE,
        names::METADATA_GPS,
        names::METADATA_PHOTOS_SIZE,
        names::METADATA_PHOTOS_GPS,
        names::METADATA_LIVE_PHOTO,
    ],
};

/// Single file lookups and search results
pub const FILE_PROPERTIES: PropertySet = PropertySet {
    name: "file",
    properties: &[
        names::DISPLAY_NAME,
        names::CONTENT_TYPE,
        names::RESOURCE_TYPE,
        names::CONTENT_LENGTH,
        names::LAST_MODIFIED,
        names::CREATION_DATE,
        names::ETAG,
        names::PERMISSIONS,
        names::REMOTE_ID,
        names::LOCAL_ID,
        names::SIZE,
        names::FAVORITE,
        names::IS_ENCRYPTED,
        names::MOUNT_TYPE,
        names::OWNER_ID,
        names::OWNER_DISPLAY_NAME,
        names::HAS_PREVIEW,
        names::CREATION_TIME,
        names::UPLOAD_TIME,
        names::LOCK,
        names::LOCK_OWNER_TYPE,
        names::LOCK_OWNER,
        names::LOCK_OWNER_DISPLAY_NAME,
        names::LOCK_OWNER_EDITOR,
        names::LOCK_TIME,
        names::LOCK_TIMEOUT,
        names::LOCK_TOKEN,
        names::LOCK_DISCOVERY,
        names::HIDDEN,
    ],
};

/// Cheapest listing, enough to count children and detect changes
pub const CHILDREN_COUNT: PropertySet = PropertySet {
    name: "children-count",
    properties: &[names::RESOURCE_TYPE, names::ETAG],
};
