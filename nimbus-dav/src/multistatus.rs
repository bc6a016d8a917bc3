use quick_xml::reader::NsReader;

use super::catalog::PropertySet;
use super::classify::{classify, is_within, normalize};
use super::error::ParsingError;
use super::registry::Registry;
use super::response::{Multistatus, Response};
use super::types::{DecodedResource, HrefRelation};
use super::xml::{Element, Reader};

/// A multistatus folded around the requested resource
#[derive(Debug, PartialEq, Clone, Default)]
pub struct MultiStatus {
    pub root: Option<DecodedResource>,
    /// direct children, in document order
    pub members: Vec<DecodedResource>,
}

/// Parse a `207 Multi-Status` body returned for a PROPFIND on `requested`.
///
/// Only the properties of `properties` are decoded, and only from the
/// `propstat` blocks that succeeded. A property that fails to decode falls
/// back to its registered default or is left out. Any structural problem
/// in the document fails the whole parse.
pub async fn parse(
    document: &[u8],
    requested: &str,
    properties: &PropertySet,
    registry: &Registry,
    dav_root: Option<&str>,
) -> Result<MultiStatus, ParsingError> {
    let mut acc = MultiStatus::default();
    for response in successful(document).await? {
        match classify(requested, &response.href.0, dav_root) {
            HrefRelation::SelfRef => {
                if acc.root.is_some() {
                    tracing::warn!(href=%response.href.0, "resource listed twice, keeping the last one");
                }
                acc.root = Some(decode(response, properties, registry));
            }
            HrefRelation::Member => acc.members.push(decode(response, properties, registry)),
            HrefRelation::Other => {
                tracing::debug!(href=%response.href.0, requested=%requested, "dropping unrelated response");
            }
        }
    }

    tracing::trace!(members = acc.members.len(), root = acc.root.is_some(), "multistatus parsed");
    Ok(acc)
}

/// Parse a multistatus that has no requested resource, like the answer to
/// a SEARCH.
///
/// Every successful response below `dav_root` is kept, in document order.
pub async fn parse_flat(
    document: &[u8],
    properties: &PropertySet,
    registry: &Registry,
    dav_root: Option<&str>,
) -> Result<Vec<DecodedResource>, ParsingError> {
    let root = dav_root.map(normalize);
    let mut acc = Vec::new();
    for response in successful(document).await? {
        if let Some(root) = &root {
            if !is_within(root, &normalize(&response.href.0)) {
                tracing::debug!(href=%response.href.0, root=%root, "href outside of the dav root");
                continue;
            }
        }
        acc.push(decode(response, properties, registry));
    }

    tracing::trace!(results = acc.len(), "flat multistatus parsed");
    Ok(acc)
}

/// Responses of the document, one per href, without the failed ones
async fn successful(document: &[u8]) -> Result<Vec<Response>, ParsingError> {
    let mut rdr = Reader::new(NsReader::from_reader(document)).await?;
    let doc = rdr.find::<Multistatus>().await?;

    Ok(doc
        .responses
        .into_iter()
        .flat_map(Response::split)
        .filter(|response| {
            let status = response.outcome();
            if !status.is_success() {
                tracing::debug!(href=%response.href.0, status=%status, "skipping failed response");
            }
            status.is_success()
        })
        .collect())
}

fn decode(response: Response, properties: &PropertySet, registry: &Registry) -> DecodedResource {
    let status = response.outcome();
    let mut res = DecodedResource::new(response.href.0, status);

    let found = response
        .propstat
        .into_iter()
        .filter(|ps| ps.status.0.is_success())
        .flat_map(|ps| ps.prop.0.into_iter());

    for el in found {
        let Some(name) = lookup(registry, &el) else {
            continue;
        };
        if !properties.contains(&name) {
            continue;
        }
        if let Some(value) = registry.decode_or_default(&name, &el) {
            res.properties.insert(name, value);
        }
    }
    res
}

fn lookup(registry: &Registry, el: &Element) -> Option<super::names::PropertyName> {
    let ns = el.ns.as_deref()?;
    registry.lookup(ns.as_bytes(), &el.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ALL_PROPERTIES, CHILDREN_COUNT};
    use crate::names;
    use crate::types::{MountType, PropertyValue};

    const ROOT: &str = "/remote.php/dav/files/user";
    const HEAD: &str = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:s="http://sabredav.org/ns" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">"#;
    const TAIL: &str = "</d:multistatus>";

    fn response(href: &str, props: &str) -> String {
        format!(
            r#"<d:response><d:href>{href}</d:href><d:propstat><d:prop>{props}</d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#
        )
    }

    fn document(responses: &[String]) -> Vec<u8> {
        let mut doc = String::from(HEAD);
        for r in responses {
            doc.push_str(r);
        }
        doc.push_str(TAIL);
        doc.into_bytes()
    }

    async fn parse_all(doc: &[u8], requested: &str) -> MultiStatus {
        parse(doc, requested, &ALL_PROPERTIES, &Registry::standard(), Some(ROOT))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn root_only() {
        let doc = document(&[response(
            "/remote.php/dav/files/user/testFolder/",
            "<d:resourcetype><d:collection/></d:resourcetype>",
        )]);
        let got = parse_all(&doc, "/remote.php/dav/files/user/testFolder/").await;
        let root = got.root.unwrap();
        assert_eq!(root.href, "/remote.php/dav/files/user/testFolder/");
        assert!(root.is_collection());
        assert!(got.members.is_empty());
    }

    #[tokio::test]
    async fn members_keep_document_order() {
        let mut responses = vec![response("/remote.php/dav/files/user/testFolder/", "")];
        for name in ["zeta", "alpha", "mid"] {
            responses.push(response(
                &format!("/remote.php/dav/files/user/testFolder/{name}"),
                "",
            ));
        }
        let got = parse_all(&document(&responses), "/remote.php/dav/files/user/testFolder").await;
        assert!(got.root.is_some());
        let hrefs: Vec<_> = got.members.iter().map(|m| m.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec![
                "/remote.php/dav/files/user/testFolder/zeta",
                "/remote.php/dav/files/user/testFolder/alpha",
                "/remote.php/dav/files/user/testFolder/mid",
            ]
        );
    }

    #[tokio::test]
    async fn unrelated_responses_are_dropped() {
        let doc = document(&[
            response("/remote.php/dav/files/user/testFolder/", ""),
            response("/remote.php/dav/files/user/testFolder/a/deep", ""),
            response("/remote.php/dav/files/user/", ""),
            response("/remote.php/dav/files/other/testFolder/x", ""),
            response("/remote.php/dav/files/user/testFolder/kept", ""),
        ]);
        let got = parse_all(&doc, "/remote.php/dav/files/user/testFolder/").await;
        assert_eq!(got.members.len(), 1);
        assert_eq!(got.members[0].href, "/remote.php/dav/files/user/testFolder/kept");
    }

    #[tokio::test]
    async fn malformed_size_does_not_abort() {
        let doc = document(&[response(
            "/remote.php/dav/files/user/f.txt",
            r#"<oc:size>lots</oc:size><oc:fileid>not a number</oc:fileid><d:getetag>"e1"</d:getetag><oc:permissions>RGDNVW</oc:permissions>"#,
        )]);
        let got = parse_all(&doc, "/remote.php/dav/files/user/f.txt").await;
        let root = got.root.unwrap();
        assert_eq!(root.get(&names::SIZE), Some(&PropertyValue::Long(0)));
        assert_eq!(root.get(&names::LOCAL_ID), Some(&PropertyValue::Long(-1)));
        assert_eq!(root.get(&names::ETAG), Some(&PropertyValue::String("e1".into())));
        assert_eq!(
            root.get(&names::PERMISSIONS),
            Some(&PropertyValue::String("RGDNVW".into()))
        );
    }

    #[tokio::test]
    async fn favorite_flag() {
        let doc = document(&[
            response("/remote.php/dav/files/user/", ""),
            response("/remote.php/dav/files/user/a", "<oc:favorite>1</oc:favorite>"),
            response("/remote.php/dav/files/user/b", "<oc:favorite>0</oc:favorite>"),
            response("/remote.php/dav/files/user/c", ""),
        ]);
        let got = parse_all(&doc, "/remote.php/dav/files/user/").await;
        let favs: Vec<_> = got
            .members
            .iter()
            .map(|m| m.get(&names::FAVORITE).and_then(PropertyValue::as_bool))
            .collect();
        assert_eq!(favs, vec![Some(true), Some(false), None]);
    }

    #[tokio::test]
    async fn mount_types() {
        let doc = document(&[
            response("/remote.php/dav/files/user/", ""),
            response("/remote.php/dav/files/user/a", "<nc:mount-type>external</nc:mount-type>"),
            response("/remote.php/dav/files/user/b", "<nc:mount-type>group</nc:mount-type>"),
            response("/remote.php/dav/files/user/c", "<nc:mount-type>shared</nc:mount-type>"),
            response("/remote.php/dav/files/user/d", "<nc:mount-type/>"),
        ]);
        let got = parse_all(&doc, "/remote.php/dav/files/user/").await;
        let mounts: Vec<_> = got
            .members
            .iter()
            .map(|m| m.get(&names::MOUNT_TYPE).cloned())
            .collect();
        assert_eq!(
            mounts,
            vec![
                Some(PropertyValue::MountType(MountType::External)),
                Some(PropertyValue::MountType(MountType::Group)),
                Some(PropertyValue::MountType(MountType::Internal)),
                Some(PropertyValue::MountType(MountType::Internal)),
            ]
        );
    }

    #[tokio::test]
    async fn not_found_propstat_is_ignored() {
        let doc = br#"<d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
  <d:response>
    <d:href>/remote.php/dav/files/user/f</d:href>
    <d:propstat>
      <d:prop><oc:size>12</oc:size></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
    <d:propstat>
      <d:prop><oc:favorite>1</oc:favorite><oc:owner-id/></d:prop>
      <d:status>HTTP/1.1 404 Not Found</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;
        let got = parse_all(doc, "/remote.php/dav/files/user/f").await;
        let root = got.root.unwrap();
        assert_eq!(root.get(&names::SIZE), Some(&PropertyValue::Long(12)));
        assert_eq!(root.get(&names::FAVORITE), None);
        assert_eq!(root.get(&names::OWNER_ID), None);
    }

    #[tokio::test]
    async fn failed_member_is_dropped() {
        let doc = br#"<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/remote.php/dav/files/user/</d:href>
    <d:propstat><d:prop/><d:status>HTTP/1.1 200 OK</d:status></d:propstat>
  </d:response>
  <d:response>
    <d:href>/remote.php/dav/files/user/locked</d:href>
    <d:status>HTTP/1.1 423 Locked</d:status>
  </d:response>
</d:multistatus>"#;
        let got = parse_all(doc, "/remote.php/dav/files/user/").await;
        assert!(got.root.is_some());
        assert!(got.members.is_empty());
    }

    #[tokio::test]
    async fn root_with_only_missing_properties() {
        let doc = br#"<d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
  <d:response>
    <d:href>/remote.php/dav/files/user/f</d:href>
    <d:propstat>
      <d:prop><oc:favorite/></d:prop>
      <d:status>HTTP/1.1 404 Not Found</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;
        let got = parse_all(doc, "/remote.php/dav/files/user/f").await;
        let root = got.root.unwrap();
        assert_eq!(root.status, http::StatusCode::OK);
        assert!(root.properties.is_empty());
    }

    #[tokio::test]
    async fn every_href_of_a_status_response() {
        let doc = br#"<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/remote.php/dav/files/user/d/</d:href>
    <d:propstat><d:prop/><d:status>HTTP/1.1 200 OK</d:status></d:propstat>
  </d:response>
  <d:response>
    <d:href>/remote.php/dav/files/user/d/x</d:href>
    <d:href>/remote.php/dav/files/user/d/y</d:href>
    <d:status>HTTP/1.1 200 OK</d:status>
  </d:response>
</d:multistatus>"#;
        let got = parse_all(doc, "/remote.php/dav/files/user/d/").await;
        let hrefs: Vec<_> = got.members.iter().map(|m| m.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec!["/remote.php/dav/files/user/d/x", "/remote.php/dav/files/user/d/y"]
        );
    }

    #[tokio::test]
    async fn flat_results() {
        let doc = br#"<d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
  <d:response>
    <d:href>/remote.php/dav/files/user/testFolder/</d:href>
    <d:propstat>
      <d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
  <d:response>
    <d:href>/remote.php/dav/files/user/deep/down/test.md</d:href>
    <d:propstat>
      <d:prop><oc:favorite>1</oc:favorite></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
  <d:response>
    <d:href>/remote.php/dav/files/other/test.md</d:href>
    <d:propstat><d:prop/><d:status>HTTP/1.1 200 OK</d:status></d:propstat>
  </d:response>
  <d:response>
    <d:href>/remote.php/dav/files/user/gone.md</d:href>
    <d:status>HTTP/1.1 404 Not Found</d:status>
  </d:response>
</d:multistatus>"#;
        let got = parse_flat(doc, &ALL_PROPERTIES, &Registry::standard(), Some(ROOT))
            .await
            .unwrap();
        let hrefs: Vec<_> = got.iter().map(|m| m.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec![
                "/remote.php/dav/files/user/testFolder/",
                "/remote.php/dav/files/user/deep/down/test.md",
            ]
        );
        assert!(got[0].is_collection());
        assert_eq!(got[1].get(&names::FAVORITE), Some(&PropertyValue::Boolean(true)));
    }

    #[tokio::test]
    async fn flat_results_without_root() {
        let doc = document(&[
            response("/a", ""),
            response("https://cloud.example.com/remote.php/dav/files/user/b", ""),
        ]);
        let got = parse_flat(&doc, &ALL_PROPERTIES, &Registry::standard(), None)
            .await
            .unwrap();
        assert_eq!(got.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_self_last_wins() {
        let doc = document(&[
            response("/remote.php/dav/files/user/d/", "<d:getetag>\"first\"</d:getetag>"),
            response("/remote.php/dav/files/user/d", "<d:getetag>\"second\"</d:getetag>"),
        ]);
        let got = parse_all(&doc, "/remote.php/dav/files/user/d/").await;
        assert_eq!(
            got.root.unwrap().get(&names::ETAG),
            Some(&PropertyValue::String("second".into()))
        );
    }

    #[tokio::test]
    async fn only_requested_properties() {
        let doc = document(&[response(
            "/remote.php/dav/files/user/f",
            r#"<d:getetag>"x"</d:getetag><oc:size>3</oc:size><oc:unknown>?</oc:unknown>"#,
        )]);
        let got = parse(
            &doc,
            "/remote.php/dav/files/user/f",
            &CHILDREN_COUNT,
            &Registry::standard(),
            Some(ROOT),
        )
        .await
        .unwrap();
        let root = got.root.unwrap();
        assert_eq!(root.properties.len(), 1);
        assert!(root.get(&names::ETAG).is_some());
    }

    #[tokio::test]
    async fn malformed_document() {
        let reg = Registry::standard();
        for doc in [
            &b"<d:multistatus xmlns:d=\"DAV:\"><d:response>"[..],
            &b"not xml at all"[..],
            &b"<d:multistatus xmlns:d=\"DAV:\"><d:response><d:status>HTTP/1.1 200 OK</d:status></d:response></d:multistatus>"[..],
        ] {
            let got = parse(doc, "/", &ALL_PROPERTIES, &reg, None).await;
            assert!(got.is_err(), "{:?}", String::from_utf8_lossy(doc));
        }
    }

    #[tokio::test]
    async fn parsing_is_deterministic() {
        let doc = document(&[
            response("/remote.php/dav/files/user/", "<oc:size>1</oc:size>"),
            response(
                "/remote.php/dav/files/user/x",
                "<nc:system-tags><nc:system-tag>a</nc:system-tag></nc:system-tags>",
            ),
        ]);
        let first = parse_all(&doc, "/remote.php/dav/files/user/").await;
        let second = parse_all(&doc, "/remote.php/dav/files/user/").await;
        assert_eq!(first, second);
    }
}
