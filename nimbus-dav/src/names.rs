//! Every WebDAV property this client knows about.
//!
//! Local names and namespace URIs are a contract with the server and must
//! not change.

use super::xml::{DAV_URN, NC_URN, OC_URN};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum Namespace {
    Dav,
    OwnCloud,
    Nextcloud,
}
impl Namespace {
    pub fn urn(&self) -> &'static [u8] {
        match self {
            Self::Dav => DAV_URN,
            Self::OwnCloud => OC_URN,
            Self::Nextcloud => NC_URN,
        }
    }

    /// Prefix used when we write request bodies
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Dav => "d",
            Self::OwnCloud => "oc",
            Self::Nextcloud => "nc",
        }
    }

    pub fn from_urn(urn: &[u8]) -> Option<Self> {
        match urn {
            DAV_URN => Some(Self::Dav),
            OC_URN => Some(Self::OwnCloud),
            NC_URN => Some(Self::Nextcloud),
            _ => None,
        }
    }

    pub const ALL: [Namespace; 3] = [Self::Dav, Self::OwnCloud, Self::Nextcloud];
}

/// A namespace qualified property name, eg. `{http://owncloud.org/ns}fileid`
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct PropertyName {
    pub ns: Namespace,
    pub local: &'static str,
}
impl PropertyName {
    pub const fn new(ns: Namespace, local: &'static str) -> Self {
        Self { ns, local }
    }
}
impl std::fmt::Display for PropertyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}{}",
            String::from_utf8_lossy(self.ns.urn()),
            self.local
        )
    }
}

const fn dav(local: &'static str) -> PropertyName {
    PropertyName::new(Namespace::Dav, local)
}
const fn oc(local: &'static str) -> PropertyName {
    PropertyName::new(Namespace::OwnCloud, local)
}
const fn nc(local: &'static str) -> PropertyName {
    PropertyName::new(Namespace::Nextcloud, local)
}

// RFC 4918
pub const CREATION_DATE: PropertyName = dav("creationdate");
pub const DISPLAY_NAME: PropertyName = dav("displayname");
pub const CONTENT_LENGTH: PropertyName = dav("getcontentlength");
pub const CONTENT_TYPE: PropertyName = dav("getcontenttype");
pub const ETAG: PropertyName = dav("getetag");
pub const LAST_MODIFIED: PropertyName = dav("getlastmodified");
pub const RESOURCE_TYPE: PropertyName = dav("resourcetype");
pub const LOCK_DISCOVERY: PropertyName = dav("lockdiscovery");

// ownCloud core
pub const REMOTE_ID: PropertyName = oc("id");
pub const LOCAL_ID: PropertyName = oc("fileid");
pub const PERMISSIONS: PropertyName = oc("permissions");
pub const SIZE: PropertyName = oc("size");
pub const FAVORITE: PropertyName = oc("favorite");
pub const OWNER_ID: PropertyName = oc("owner-id");
pub const OWNER_DISPLAY_NAME: PropertyName = oc("owner-display-name");
pub const UNREAD_COMMENTS: PropertyName = oc("comments-unread");

// Nextcloud extensions
pub const CREATION_TIME: PropertyName = nc("creation_time");
pub const UPLOAD_TIME: PropertyName = nc("upload_time");
pub const HAS_PREVIEW: PropertyName = nc("has-preview");
pub const HIDDEN: PropertyName = nc("hidden");
pub const IS_ENCRYPTED: PropertyName = nc("is-encrypted");
pub const MOUNT_TYPE: PropertyName = nc("mount-type");
pub const RICH_WORKSPACE: PropertyName = nc("rich-workspace");
pub const NOTE: PropertyName = nc("note");
pub const SHAREES: PropertyName = nc("sharees");
pub const SYSTEM_TAGS: PropertyName = nc("system-tags");
pub const LOCK: PropertyName = nc("lock");
pub const LOCK_OWNER: PropertyName = nc("lock-owner");
pub const LOCK_OWNER_DISPLAY_NAME: PropertyName = nc("lock-owner-displayname");
pub const LOCK_OWNER_EDITOR: PropertyName = nc("lock-owner-editor");
pub const LOCK_OWNER_TYPE: PropertyName = nc("lock-owner-type");
pub const LOCK_TIME: PropertyName = nc("lock-time");
pub const LOCK_TIMEOUT: PropertyName = nc("lock-timeout");
pub const LOCK_TOKEN: PropertyName = nc("lock-token");
pub const METADATA_GPS: PropertyName = nc("file-metadata-gps");
pub const METADATA_PHOTOS_GPS: PropertyName = nc("metadata-photos-gps");
pub const METADATA_SIZE: PropertyName = nc("file-metadata-size");
pub const METADATA_PHOTOS_SIZE: PropertyName = nc("metadata-photos-size");
pub const METADATA_LIVE_PHOTO: PropertyName = nc("metadata-files-live-photo");

// Children of composite properties, matched by local name
pub const SHAREE: &str = "sharee";
pub const SHAREE_ID: &str = "id";
pub const SHAREE_DISPLAY_NAME: &str = "display-name";
pub const SHAREE_TYPE: &str = "type";
pub const SYSTEM_TAG: &str = "system-tag";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
