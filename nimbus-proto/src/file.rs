use chrono::{DateTime, Utc};

use nimbus_dav::classify::{clean_path, normalize};
use nimbus_dav::names;
use nimbus_dav::types::{
    DecodedResource, GeoLocation, ImageDimension, LockMetadata, LockType, MountType,
    PropertyValue, Sharee,
};

/// Mime type given to collections
pub const DIR: &str = "DIR";

/// A file or folder on the server, as seen by the last PROPFIND
#[derive(Debug, PartialEq, Clone)]
pub struct RemoteFile {
    /// Path relative to the user's files, always starting with `/`;
    /// folders keep the trailing `/` the server gave them
    pub remote_path: String,
    pub name: String,
    pub mime_type: String,
    pub length: i64,
    pub size: i64,
    pub etag: String,
    pub remote_id: String,
    pub local_id: i64,
    pub permissions: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub uploaded: Option<DateTime<Utc>>,
    pub owner_id: String,
    pub owner_display_name: String,
    pub favorite: bool,
    pub encrypted: bool,
    pub mount_type: MountType,
    pub rich_workspace: String,
    pub note: String,
    pub sharees: Vec<Sharee>,
    pub tags: Vec<String>,
    pub lock: LockMetadata,
    pub unread_comments: i32,
    pub has_preview: bool,
    pub hidden: bool,
    pub geo_location: Option<GeoLocation>,
    pub image_dimension: Option<ImageDimension>,
    pub live_photo: Option<String>,
}
impl Default for RemoteFile {
    fn default() -> Self {
        Self {
            remote_path: "/".into(),
            name: String::new(),
            mime_type: String::new(),
            length: 0,
            size: 0,
            etag: String::new(),
            remote_id: String::new(),
            local_id: -1,
            permissions: String::new(),
            created: None,
            modified: None,
            uploaded: None,
            owner_id: String::new(),
            owner_display_name: String::new(),
            favorite: false,
            encrypted: false,
            mount_type: MountType::Internal,
            rich_workspace: String::new(),
            note: String::new(),
            sharees: Vec::new(),
            tags: Vec::new(),
            lock: LockMetadata::default(),
            unread_comments: 0,
            has_preview: false,
            hidden: false,
            geo_location: None,
            image_dimension: None,
            live_photo: None,
        }
    }
}

impl RemoteFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == DIR
    }

    /// Fold a decoded resource into a file, `dav_root` being the path of
    /// the user's files collection.
    pub fn from_resource(res: &DecodedResource, dav_root: &str) -> Self {
        let remote_path = relative_path(&res.href, dav_root);
        let get = move |n| res.get(&n);
        let text = move |n| get(n).and_then(PropertyValue::as_str).map(str::to_string);
        let long = move |n| get(n).and_then(PropertyValue::as_i64);
        let flag = move |n| get(n).and_then(PropertyValue::as_bool).unwrap_or(false);
        let time = move |n| get(n).and_then(PropertyValue::as_timestamp);

        let mut file = RemoteFile {
            name: text(names::DISPLAY_NAME)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| last_segment(&remote_path)),
            mime_type: match res.is_collection() {
                true => DIR.into(),
                false => text(names::CONTENT_TYPE).unwrap_or_default(),
            },
            length: long(names::CONTENT_LENGTH).unwrap_or(0),
            size: long(names::SIZE).unwrap_or(0),
            etag: text(names::ETAG).unwrap_or_default(),
            remote_id: text(names::REMOTE_ID).unwrap_or_default(),
            local_id: long(names::LOCAL_ID).unwrap_or(-1),
            permissions: text(names::PERMISSIONS).unwrap_or_default(),
            created: time(names::CREATION_TIME).or_else(|| time(names::CREATION_DATE)),
            modified: time(names::LAST_MODIFIED),
            uploaded: time(names::UPLOAD_TIME),
            owner_id: text(names::OWNER_ID).unwrap_or_default(),
            owner_display_name: text(names::OWNER_DISPLAY_NAME).unwrap_or_default(),
            favorite: flag(names::FAVORITE),
            encrypted: flag(names::IS_ENCRYPTED),
            rich_workspace: text(names::RICH_WORKSPACE).unwrap_or_default(),
            note: text(names::NOTE).unwrap_or_default(),
            unread_comments: long(names::UNREAD_COMMENTS)
                .and_then(|v| i32::try_from(v).ok())
                .unwrap_or(0),
            has_preview: flag(names::HAS_PREVIEW),
            hidden: flag(names::HIDDEN),
            live_photo: text(names::METADATA_LIVE_PHOTO).filter(|s| !s.is_empty()),
            remote_path,
            ..Default::default()
        };

        if let Some(PropertyValue::MountType(m)) = get(names::MOUNT_TYPE) {
            file.mount_type = *m;
        }
        if let Some(PropertyValue::Sharees(list)) = get(names::SHAREES) {
            file.sharees = list.clone();
        }
        if let Some(PropertyValue::Tags(list)) = get(names::SYSTEM_TAGS) {
            file.tags = list.clone();
        }
        file.geo_location = [names::METADATA_PHOTOS_GPS, names::METADATA_GPS]
            .into_iter()
            .find_map(|n| match get(n) {
                Some(PropertyValue::Geo(g)) => Some(*g),
                _ => None,
            });
        file.image_dimension = [names::METADATA_PHOTOS_SIZE, names::METADATA_SIZE]
            .into_iter()
            .find_map(|n| match get(n) {
                Some(PropertyValue::ImageDimension(d)) => Some(*d),
                _ => None,
            });

        // standard lockdiscovery, overridden by the Nextcloud lock properties
        file.lock = match get(names::LOCK_DISCOVERY) {
            Some(PropertyValue::Lock(l)) => l.clone(),
            _ => LockMetadata::default(),
        };
        if get(names::LOCK).is_some() {
            file.lock = LockMetadata {
                locked: flag(names::LOCK),
                lock_type: LockType::from(long(names::LOCK_OWNER_TYPE).unwrap_or(0)),
                owner: text(names::LOCK_OWNER),
                owner_display_name: text(names::LOCK_OWNER_DISPLAY_NAME),
                owner_editor: text(names::LOCK_OWNER_EDITOR),
                timestamp: time(names::LOCK_TIME),
                timeout: long(names::LOCK_TIMEOUT).unwrap_or(0),
                token: text(names::LOCK_TOKEN),
            };
        }

        file
    }
}

/// href without the dav root, percent-decoded, single separators
pub fn relative_path(href: &str, dav_root: &str) -> String {
    let path = clean_path(href);
    let root = normalize(dav_root);
    let rest = match root.as_str() {
        "/" => path.as_str(),
        root => match path.strip_prefix(root) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path.as_str(),
        },
    };
    match rest.starts_with('/') {
        true => rest.to_string(),
        false => format!("/{}", rest),
    }
}

fn last_segment(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}
