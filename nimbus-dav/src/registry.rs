use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;

use super::decoder::{self, Decoder};
use super::error::DecodeError;
use super::names::{self, Namespace, PropertyName};
use super::types::PropertyValue;
use super::xml::Element;

struct Entry {
    decode: Decoder,
    fallback: Option<PropertyValue>,
}

/// Maps property names to their decoder.
///
/// Built once, then only read: share it behind an `Arc` between as many
/// concurrent operations as needed.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<Namespace, HashMap<&'static str, Entry>>,
}

lazy_static! {
    static ref SHARED: Arc<Registry> = Arc::new(Registry::standard());
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry with every known property
    pub fn shared() -> Arc<Registry> {
        SHARED.clone()
    }

    /// Register (or replace) the decoder of a property
    pub fn register(&mut self, name: PropertyName, decode: Decoder) -> &mut Self {
        self.insert(name, decode, None)
    }

    /// Same as `register`, with the value `decode_or_default` falls back to
    pub fn register_with_default(
        &mut self,
        name: PropertyName,
        decode: Decoder,
        fallback: PropertyValue,
    ) -> &mut Self {
        self.insert(name, decode, Some(fallback))
    }

    fn insert(
        &mut self,
        name: PropertyName,
        decode: Decoder,
        fallback: Option<PropertyValue>,
    ) -> &mut Self {
        self.entries
            .entry(name.ns)
            .or_default()
            .insert(name.local, Entry { decode, fallback });
        self
    }

    /// Resolve an element name as found on the wire
    pub fn lookup(&self, ns: &[u8], local: &str) -> Option<PropertyName> {
        let ns = Namespace::from_urn(ns)?;
        let (local, _) = self.entries.get(&ns)?.get_key_value(local)?;
        Some(PropertyName::new(ns, *local))
    }

    pub fn contains(&self, name: &PropertyName) -> bool {
        self.entry(name).is_some()
    }

    fn entry(&self, name: &PropertyName) -> Option<&Entry> {
        self.entries.get(&name.ns)?.get(name.local)
    }

    pub fn decode(&self, name: &PropertyName, el: &Element) -> Result<PropertyValue, DecodeError> {
        match self.entry(name) {
            Some(entry) => (entry.decode)(el),
            None => Err(DecodeError::Unknown(name.to_string())),
        }
    }

    /// Decode, or use the registered fallback when the content is malformed
    pub fn decode_or_default(&self, name: &PropertyName, el: &Element) -> Option<PropertyValue> {
        let entry = self.entry(name)?;
        match (entry.decode)(el) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!(property=%name, err=%e, "falling back to default value");
                entry.fallback.clone()
            }
        }
    }

    /// Every property the client knows how to read
    pub fn standard() -> Self {
        use PropertyValue::{Boolean, Long, String as Text};

        let mut reg = Self::new();
        reg
            // RFC 4918
            .register(names::CREATION_DATE, decoder::iso_date)
            .register_with_default(names::DISPLAY_NAME, decoder::string, Text(String::new()))
            .register_with_default(names::CONTENT_LENGTH, decoder::long, Long(0))
            .register_with_default(names::CONTENT_TYPE, decoder::string, Text(String::new()))
            .register_with_default(names::ETAG, decoder::etag, Text(String::new()))
            .register(names::LAST_MODIFIED, decoder::http_date)
            .register(names::RESOURCE_TYPE, decoder::resource_type)
            .register(names::LOCK_DISCOVERY, decoder::lock_discovery)
            // ownCloud
            .register_with_default(names::REMOTE_ID, decoder::string, Text(String::new()))
            .register_with_default(names::LOCAL_ID, decoder::long, Long(-1))
            .register_with_default(names::PERMISSIONS, decoder::string, Text(String::new()))
            .register_with_default(names::SIZE, decoder::long, Long(0))
            .register_with_default(names::FAVORITE, decoder::flag, Boolean(false))
            .register_with_default(names::OWNER_ID, decoder::string, Text(String::new()))
            .register_with_default(
                names::OWNER_DISPLAY_NAME,
                decoder::string,
                Text(String::new()),
            )
            .register_with_default(names::UNREAD_COMMENTS, decoder::integer, PropertyValue::Integer(0))
            // Nextcloud
            .register(names::CREATION_TIME, decoder::unix_time)
            .register(names::UPLOAD_TIME, decoder::unix_time)
            .register_with_default(names::HAS_PREVIEW, decoder::boolean, Boolean(false))
            .register_with_default(names::HIDDEN, decoder::flag, Boolean(false))
            .register_with_default(names::IS_ENCRYPTED, decoder::flag, Boolean(false))
            .register(names::MOUNT_TYPE, decoder::mount_type)
            .register_with_default(names::RICH_WORKSPACE, decoder::string, Text(String::new()))
            .register_with_default(names::NOTE, decoder::string, Text(String::new()))
            .register(names::SHAREES, decoder::sharees)
            .register(names::SYSTEM_TAGS, decoder::tags)
            .register_with_default(names::LOCK, decoder::flag, Boolean(false))
            .register(names::LOCK_OWNER, decoder::string)
            .register(names::LOCK_OWNER_DISPLAY_NAME, decoder::string)
            .register(names::LOCK_OWNER_EDITOR, decoder::string)
            .register_with_default(names::LOCK_OWNER_TYPE, decoder::long, Long(0))
            .register(names::LOCK_TIME, decoder::unix_time)
            .register_with_default(names::LOCK_TIMEOUT, decoder::long, Long(0))
            .register(names::LOCK_TOKEN, decoder::string)
            .register(names::METADATA_GPS, decoder::geo_location)
            .register(names::METADATA_PHOTOS_GPS, decoder::geo_location)
            .register(names::METADATA_SIZE, decoder::image_dimension)
            .register(names::METADATA_PHOTOS_SIZE, decoder::image_dimension)
            .register(names::METADATA_LIVE_PHOTO, decoder::string);
        reg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::xml::{NC_URN, OC_URN};

    #[test]
    fn every_catalog_property_is_registered() {
        let reg = Registry::standard();
        for name in catalog::ALL_PROPERTIES.iter() {
            assert!(reg.contains(name), "{} has no decoder", name);
        }
    }

    #[test]
    fn lookup_wire_names() {
        let reg = Registry::standard();
        assert_eq!(reg.lookup(OC_URN, "favorite"), Some(names::FAVORITE));
        assert_eq!(reg.lookup(NC_URN, "favorite"), None);
        assert_eq!(reg.lookup(b"urn:unknown", "favorite"), None);
    }

    #[test]
    fn decoding_is_deterministic() {
        let reg = Registry::standard();
        let el = Element::new(Some(OC_URN), "size").with_text("1024");
        let first = reg.decode(&names::SIZE, &el);
        let second = reg.decode(&names::SIZE, &el);
        assert_eq!(first, Ok(PropertyValue::Long(1024)));
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_content_uses_fallback() {
        let reg = Registry::standard();
        let el = Element::new(Some(OC_URN), "fileid").with_text("not-a-number");
        assert!(reg.decode(&names::LOCAL_ID, &el).is_err());
        assert_eq!(
            reg.decode_or_default(&names::LOCAL_ID, &el),
            Some(PropertyValue::Long(-1))
        );
        // no documented fallback for dates
        let el = Element::new(Some(NC_URN), "upload_time").with_text("yesterday");
        assert_eq!(reg.decode_or_default(&names::UPLOAD_TIME, &el), None);
    }

    #[test]
    fn unknown_property() {
        let reg = Registry::new();
        let el = Element::new(Some(OC_URN), "size").with_text("1");
        assert_eq!(
            reg.decode(&names::SIZE, &el),
            Err(DecodeError::Unknown("{http://owncloud.org/ns}size".into()))
        );
    }

    #[test]
    fn custom_registration() {
        fn shouting(el: &Element) -> Result<PropertyValue, DecodeError> {
            Ok(PropertyValue::String(el.text().to_uppercase()))
        }
        let mut reg = Registry::standard();
        reg.register(names::NOTE, shouting);
        let el = Element::new(Some(NC_URN), "note").with_text("hello");
        assert_eq!(
            reg.decode(&names::NOTE, &el),
            Ok(PropertyValue::String("HELLO".into()))
        );
    }
}
