//! Property decoders.
//!
//! Each decoder turns the captured content of one property element into a
//! [`PropertyValue`]. They never look at anything but their argument.

use chrono::{DateTime, Utc};

use super::error::DecodeError;
use super::names;
use super::types::*;
use super::xml::{Element, DAV_URN};

pub type Decoder = fn(&Element) -> Result<PropertyValue, DecodeError>;

// ---- scalars ----

pub fn string(el: &Element) -> Result<PropertyValue, DecodeError> {
    Ok(PropertyValue::String(el.text().to_string()))
}

/// Nextcloud flags are `1` when set, anything else (`0`, empty) is unset
pub fn flag(el: &Element) -> Result<PropertyValue, DecodeError> {
    Ok(PropertyValue::Boolean(el.text() == "1"))
}

/// `nc:has-preview` is sent as `true`/`false`
pub fn boolean(el: &Element) -> Result<PropertyValue, DecodeError> {
    let txt = el.text();
    Ok(PropertyValue::Boolean(
        txt.eq_ignore_ascii_case("true") || txt == "1",
    ))
}

pub fn long(el: &Element) -> Result<PropertyValue, DecodeError> {
    let txt = non_empty(el)?;
    Ok(PropertyValue::Long(txt.parse::<i64>()?))
}

pub fn integer(el: &Element) -> Result<PropertyValue, DecodeError> {
    let txt = non_empty(el)?;
    Ok(PropertyValue::Integer(txt.parse::<i32>()?))
}

/// Strips the quotes and the weak marker: `W/"abc"` -> `abc`
pub fn etag(el: &Element) -> Result<PropertyValue, DecodeError> {
    let txt = el.text();
    let txt = txt.strip_prefix("W/").unwrap_or(txt);
    let txt = txt
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(txt);
    Ok(PropertyValue::String(txt.to_string()))
}

/// `DAV:getlastmodified`, RFC 1123 dates
pub fn http_date(el: &Element) -> Result<PropertyValue, DecodeError> {
    let txt = non_empty(el)?;
    let date = DateTime::parse_from_rfc2822(txt)?;
    Ok(PropertyValue::Timestamp(date.with_timezone(&Utc)))
}

/// `DAV:creationdate`, RFC 3339 dates
pub fn iso_date(el: &Element) -> Result<PropertyValue, DecodeError> {
    let txt = non_empty(el)?;
    let date = DateTime::parse_from_rfc3339(txt)?;
    Ok(PropertyValue::Timestamp(date.with_timezone(&Utc)))
}

/// Seconds since epoch, the server sends `0` when it does not know
pub fn unix_time(el: &Element) -> Result<PropertyValue, DecodeError> {
    let secs = non_empty(el)?.parse::<i64>()?;
    if secs <= 0 {
        return Err(DecodeError::Timestamp(secs));
    }
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(PropertyValue::Timestamp)
        .ok_or(DecodeError::Timestamp(secs))
}

pub fn mount_type(el: &Element) -> Result<PropertyValue, DecodeError> {
    Ok(PropertyValue::MountType(MountType::from_text(el.text())))
}

pub fn resource_type(el: &Element) -> Result<PropertyValue, DecodeError> {
    let kind = match el.children.iter().any(|c| c.is(DAV_URN, "collection")) {
        true => ResourceKind::Collection,
        false => ResourceKind::File,
    };
    Ok(PropertyValue::ResourceType(kind))
}

// ---- composites ----

pub fn sharees(el: &Element) -> Result<PropertyValue, DecodeError> {
    let list = el
        .children_named(names::SHAREE)
        .map(|sharee| {
            let mut acc = Sharee::default();
            for field in sharee.children.iter() {
                match field.name.as_str() {
                    names::SHAREE_ID => acc.user_id = Some(field.text().to_string()),
                    names::SHAREE_DISPLAY_NAME => {
                        acc.display_name = Some(field.text().to_string())
                    }
                    names::SHAREE_TYPE => {
                        acc.share_type = field.text().parse::<i32>().unwrap_or(0).into()
                    }
                    _ => (),
                }
            }
            acc
        })
        .collect();
    Ok(PropertyValue::Sharees(list))
}

pub fn tags(el: &Element) -> Result<PropertyValue, DecodeError> {
    let list = el
        .children_named(names::SYSTEM_TAG)
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    Ok(PropertyValue::Tags(list))
}

pub fn geo_location(el: &Element) -> Result<PropertyValue, DecodeError> {
    let (lat, lon) = (el.child(names::LATITUDE), el.child(names::LONGITUDE));
    if lat.is_none() && lon.is_none() {
        return Err(DecodeError::MissingChild(names::LATITUDE));
    }
    Ok(PropertyValue::Geo(GeoLocation {
        latitude: float_or_zero(lat)?,
        longitude: float_or_zero(lon)?,
    }))
}

pub fn image_dimension(el: &Element) -> Result<PropertyValue, DecodeError> {
    let (width, height) = (el.child(names::WIDTH), el.child(names::HEIGHT));
    if width.is_none() && height.is_none() {
        return Err(DecodeError::MissingChild(names::WIDTH));
    }
    Ok(PropertyValue::ImageDimension(ImageDimension {
        width: float_or_zero(width)? as f32,
        height: float_or_zero(height)? as f32,
    }))
}

/// `DAV:lockdiscovery`, only the first active lock is kept
pub fn lock_discovery(el: &Element) -> Result<PropertyValue, DecodeError> {
    let Some(active) = el.child("activelock") else {
        return Ok(PropertyValue::Lock(LockMetadata::default()));
    };

    let owner = active.child("owner").and_then(|o| {
        let txt = o.child("href").map(Element::text).unwrap_or(o.text());
        (!txt.is_empty()).then(|| txt.to_string())
    });
    let token = active
        .child("locktoken")
        .and_then(|t| t.child("href"))
        .map(|h| h.text().to_string());
    let timeout = match active.child("timeout").map(Element::text) {
        Some(t) => match t.strip_prefix("Second-") {
            Some(secs) => secs.parse::<i64>()?,
            None => 0,
        },
        None => 0,
    };

    Ok(PropertyValue::Lock(LockMetadata {
        locked: true,
        owner,
        token,
        timeout,
        ..Default::default()
    }))
}

// ---- helpers ----

fn non_empty(el: &Element) -> Result<&str, DecodeError> {
    match el.text() {
        "" => Err(DecodeError::Empty),
        txt => Ok(txt),
    }
}

fn float_or_zero(el: Option<&Element>) -> Result<f64, DecodeError> {
    match el.map(Element::text) {
        None | Some("") => Ok(0.0),
        Some(txt) => Ok(txt.parse::<f64>()?),
    }
}
