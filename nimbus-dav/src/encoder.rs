use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Error as QError;

use super::catalog::PropertySet;
use super::names::{self, Namespace, PropertyName};
use super::xml::{IWrite, QWrite, Writer};

/// `<d:propfind>` body listing the properties we want back
#[derive(Debug, PartialEq, Clone)]
pub struct PropFind {
    pub properties: Vec<PropertyName>,
}
impl From<&PropertySet> for PropFind {
    fn from(set: &PropertySet) -> Self {
        Self {
            properties: set.iter().copied().collect(),
        }
    }
}

/// `<d:propertyupdate>` body, as sent with PROPPATCH
#[derive(Debug, PartialEq, Clone, Default)]
pub struct PropertyUpdate {
    pub set: Vec<(PropertyName, String)>,
    pub remove: Vec<PropertyName>,
}

/// What a SEARCH should match
#[derive(Debug, PartialEq, Clone)]
pub enum SearchFilter {
    /// Display name containing the text, case insensitive on the server
    NameContains(String),
    Favorites,
}

/// `<d:searchrequest>` body, as the Nextcloud basic search expects it
#[derive(Debug, PartialEq, Clone)]
pub struct SearchRequest {
    pub properties: Vec<PropertyName>,
    /// eg. `/files/alice/Photos`, relative to the dav endpoint
    pub scope: String,
    pub filter: SearchFilter,
    pub limit: Option<u32>,
}

impl QWrite for PropFind {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        let start = xml.create_dav_element("propfind");
        let end = start.to_end();

        xml.q.write_event_async(Event::Start(start.clone())).await?;
        write_names(xml, &self.properties).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWrite for PropertyUpdate {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        let start = xml.create_dav_element("propertyupdate");
        let end = start.to_end();

        xml.q.write_event_async(Event::Start(start.clone())).await?;
        if !self.set.is_empty() {
            let set = xml.create_dav_element("set");
            let set_end = set.to_end();
            let prop = xml.create_dav_element("prop");
            let prop_end = prop.to_end();

            xml.q.write_event_async(Event::Start(set.clone())).await?;
            xml.q.write_event_async(Event::Start(prop.clone())).await?;
            for (name, value) in self.set.iter() {
                let elem = xml.create_ns_element(name.ns.prefix(), name.local);
                let elem_end = elem.to_end();
                xml.q.write_event_async(Event::Start(elem.clone())).await?;
                xml.q
                    .write_event_async(Event::Text(BytesText::new(value)))
                    .await?;
                xml.q.write_event_async(Event::End(elem_end)).await?;
            }
            xml.q.write_event_async(Event::End(prop_end)).await?;
            xml.q.write_event_async(Event::End(set_end)).await?;
        }
        if !self.remove.is_empty() {
            let remove = xml.create_dav_element("remove");
            let remove_end = remove.to_end();
            xml.q.write_event_async(Event::Start(remove.clone())).await?;
            write_names(xml, &self.remove).await?;
            xml.q.write_event_async(Event::End(remove_end)).await?;
        }
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWrite for SearchRequest {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        let start = xml.create_dav_element("searchrequest");
        let end = start.to_end();
        let basic = xml.create_dav_element("basicsearch");
        let basic_end = basic.to_end();

        xml.q.write_event_async(Event::Start(start.clone())).await?;
        xml.q.write_event_async(Event::Start(basic.clone())).await?;

        // select
        let select = xml.create_dav_element("select");
        let select_end = select.to_end();
        xml.q.write_event_async(Event::Start(select.clone())).await?;
        write_names(xml, &self.properties).await?;
        xml.q.write_event_async(Event::End(select_end)).await?;

        // from
        let from = xml.create_dav_element("from");
        let from_end = from.to_end();
        let scope = xml.create_dav_element("scope");
        let scope_end = scope.to_end();
        xml.q.write_event_async(Event::Start(from.clone())).await?;
        xml.q.write_event_async(Event::Start(scope.clone())).await?;
        write_text(xml, "href", &self.scope).await?;
        write_text(xml, "depth", "infinity").await?;
        xml.q.write_event_async(Event::End(scope_end)).await?;
        xml.q.write_event_async(Event::End(from_end)).await?;

        // where
        let cond = xml.create_dav_element("where");
        let cond_end = cond.to_end();
        xml.q.write_event_async(Event::Start(cond.clone())).await?;
        let (op, name, literal) = match &self.filter {
            SearchFilter::NameContains(txt) => ("like", names::DISPLAY_NAME, format!("%{}%", txt)),
            SearchFilter::Favorites => ("eq", names::FAVORITE, "1".to_string()),
        };
        let op = xml.create_dav_element(op);
        let op_end = op.to_end();
        xml.q.write_event_async(Event::Start(op.clone())).await?;
        write_names(xml, &[name]).await?;
        write_text(xml, "literal", &literal).await?;
        xml.q.write_event_async(Event::End(op_end)).await?;
        xml.q.write_event_async(Event::End(cond_end)).await?;

        let orderby = xml.create_dav_element("orderby");
        xml.q.write_event_async(Event::Empty(orderby)).await?;

        if let Some(n) = self.limit {
            let limit = xml.create_dav_element("limit");
            let limit_end = limit.to_end();
            xml.q.write_event_async(Event::Start(limit.clone())).await?;
            write_text(xml, "nresults", &n.to_string()).await?;
            xml.q.write_event_async(Event::End(limit_end)).await?;
        }

        xml.q.write_event_async(Event::End(basic_end)).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

async fn write_text(xml: &mut Writer<impl IWrite>, name: &str, text: &str) -> Result<(), QError> {
    let start = xml.create_dav_element(name);
    let end = start.to_end();
    xml.q.write_event_async(Event::Start(start.clone())).await?;
    xml.q
        .write_event_async(Event::Text(BytesText::new(text)))
        .await?;
    xml.q.write_event_async(Event::End(end)).await
}

async fn write_names(xml: &mut Writer<impl IWrite>, names: &[PropertyName]) -> Result<(), QError> {
    let start = xml.create_dav_element("prop");
    let end = start.to_end();

    xml.q.write_event_async(Event::Start(start.clone())).await?;
    for name in names {
        let elem = xml.create_ns_element(name.ns.prefix(), name.local);
        xml.q.write_event_async(Event::Empty(elem)).await?;
    }
    xml.q.write_event_async(Event::End(end)).await
}

/// Namespace declarations put on the root element of every body
pub fn namespaces() -> Vec<(String, String)> {
    Namespace::ALL
        .iter()
        .map(|ns| {
            (
                format!("xmlns:{}", ns.prefix()),
                String::from_utf8_lossy(ns.urn()).into_owned(),
            )
        })
        .collect()
}

/// Serialize a request body, XML declaration included
pub async fn to_bytes(elem: &impl QWrite) -> Result<Vec<u8>, QError> {
    let mut q = quick_xml::writer::Writer::new(Vec::new());
    q.write_event_async(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .await?;
    let mut writer = Writer {
        q,
        ns_to_apply: namespaces(),
    };
    elem.qwrite(&mut writer).await?;
    Ok(writer.q.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn serialize(elem: &impl QWrite) -> String {
        let mut buffer = Vec::new();
        let mut tokio_buffer = tokio::io::BufWriter::new(&mut buffer);
        let q = quick_xml::writer::Writer::new_with_indent(&mut tokio_buffer, b' ', 4);
        let mut writer = Writer {
            q,
            ns_to_apply: namespaces(),
        };

        elem.qwrite(&mut writer).await.expect("xml serialization");
        tokio_buffer.flush().await.expect("tokio buffer flush");
        let got = std::str::from_utf8(buffer.as_slice()).unwrap();

        return got.into();
    }

    #[tokio::test]
    async fn propfind_body() {
        let got = serialize(&PropFind {
            properties: vec![names::DISPLAY_NAME, names::FAVORITE, names::MOUNT_TYPE],
        })
        .await;

        let expected = r#"<d:propfind xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">
    <d:prop>
        <d:displayname/>
        <oc:favorite/>
        <nc:mount-type/>
    </d:prop>
</d:propfind>"#;

        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
    }

    #[tokio::test]
    async fn set_favorite() {
        let got = serialize(&PropertyUpdate {
            set: vec![(names::FAVORITE, "1".into())],
            remove: vec![],
        })
        .await;

        let expected = r#"<d:propertyupdate xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">
    <d:set>
        <d:prop>
            <oc:favorite>1</oc:favorite>
        </d:prop>
    </d:set>
</d:propertyupdate>"#;

        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
    }

    #[tokio::test]
    async fn remove_favorite() {
        let got = serialize(&PropertyUpdate {
            set: vec![],
            remove: vec![names::FAVORITE],
        })
        .await;

        let expected = r#"<d:propertyupdate xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">
    <d:remove>
        <d:prop>
            <oc:favorite/>
        </d:prop>
    </d:remove>
</d:propertyupdate>"#;

        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
    }

    #[tokio::test]
    async fn search_by_name() {
        let got = serialize(&SearchRequest {
            properties: vec![names::DISPLAY_NAME, names::FAVORITE],
            scope: "/files/alice".into(),
            filter: SearchFilter::NameContains("test".into()),
            limit: Some(50),
        })
        .await;

        let expected = r#"<d:searchrequest xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">
    <d:basicsearch>
        <d:select>
            <d:prop>
                <d:displayname/>
                <oc:favorite/>
            </d:prop>
        </d:select>
        <d:from>
            <d:scope>
                <d:href>/files/alice</d:href>
                <d:depth>infinity</d:depth>
            </d:scope>
        </d:from>
        <d:where>
            <d:like>
                <d:prop>
                    <d:displayname/>
                </d:prop>
                <d:literal>%test%</d:literal>
            </d:like>
        </d:where>
        <d:orderby/>
        <d:limit>
            <d:nresults>50</d:nresults>
        </d:limit>
    </d:basicsearch>
</d:searchrequest>"#;

        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
    }

    #[tokio::test]
    async fn search_favorites() {
        let body = to_bytes(&SearchRequest {
            properties: vec![names::ETAG],
            scope: "/files/alice/".into(),
            filter: SearchFilter::Favorites,
            limit: None,
        })
        .await
        .unwrap();
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains(
            "<d:where><d:eq><d:prop><oc:favorite/></d:prop><d:literal>1</d:literal></d:eq></d:where>"
        ));
        assert!(!body.contains("<d:limit>"));
    }

    #[tokio::test]
    async fn body_starts_with_declaration() {
        let body = to_bytes(&PropFind::from(&crate::catalog::CHILDREN_COUNT))
            .await
            .unwrap();
        let body = String::from_utf8(body).unwrap();
        assert!(body.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(body.ends_with("<d:prop><d:resourcetype/><d:getetag/></d:prop></d:propfind>"));
    }
}
