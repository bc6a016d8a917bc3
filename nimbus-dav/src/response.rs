//! Structure of a `207 Multi-Status` body, before any property is decoded.

use quick_xml::events::Event;

use super::error::ParsingError;
use super::xml::{Element, IRead, QRead, Reader, DAV_URN};

#[derive(Debug, PartialEq, Clone)]
pub struct Multistatus {
    pub responses: Vec<Response>,
    pub responsedescription: Option<ResponseDescription>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Response {
    pub href: Href,
    /// Other resources sharing the status of a status-only response
    pub more_hrefs: Vec<Href>,
    /// Set when the server reports the whole resource at once, eg. a 404
    pub status: Option<Status>,
    pub propstat: Vec<PropStat>,
}
impl Response {
    /// Overall outcome for this resource.
    ///
    /// Only a response-level status can fail a resource. A failed propstat
    /// just lists properties the server does not have.
    pub fn outcome(&self) -> http::StatusCode {
        match &self.status {
            Some(Status(code)) => *code,
            None => http::StatusCode::OK,
        }
    }

    /// One response per href, in document order
    pub fn split(self) -> Vec<Response> {
        let Response {
            href,
            more_hrefs,
            status,
            propstat,
        } = self;

        let mut acc = Vec::with_capacity(1 + more_hrefs.len());
        for other in more_hrefs.iter() {
            acc.push(Response {
                href: other.clone(),
                more_hrefs: vec![],
                status: status.clone(),
                propstat: propstat.clone(),
            });
        }
        acc.insert(
            0,
            Response {
                href,
                more_hrefs: vec![],
                status,
                propstat,
            },
        );
        acc
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct PropStat {
    pub prop: Prop,
    pub status: Status,
}

/// Children of a `<d:prop>`, captured as is
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Prop(pub Vec<Element>);

#[derive(Debug, PartialEq, Clone)]
pub struct Status(pub http::StatusCode);

#[derive(Debug, PartialEq, Clone)]
pub struct Href(pub String);

#[derive(Debug, PartialEq, Clone)]
pub struct ResponseDescription(pub String);

// ---- ROOT ----

impl QRead<Multistatus> for Multistatus {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(DAV_URN, "multistatus").await?;
        let mut responses = Vec::new();
        let mut responsedescription = None;

        loop {
            let mut dirty = false;
            xml.maybe_push(&mut responses, &mut dirty).await?;
            xml.maybe_read(&mut responsedescription, &mut dirty).await?;
            if !dirty {
                match xml.peek() {
                    Event::End(_) => break,
                    _ => xml.skip().await?,
                };
            }
        }

        xml.close().await?;
        Ok(Multistatus {
            responses,
            responsedescription,
        })
    }
}

// ---- INNER XML ----

impl QRead<Response> for Response {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(DAV_URN, "response").await?;
        let mut status = None;
        let mut href = Vec::new();
        let mut propstat = Vec::new();

        loop {
            let mut dirty = false;
            xml.maybe_read::<Status>(&mut status, &mut dirty).await?;
            xml.maybe_push::<Href>(&mut href, &mut dirty).await?;
            xml.maybe_push::<PropStat>(&mut propstat, &mut dirty)
                .await?;

            if !dirty {
                match xml.peek() {
                    Event::End(_) => break,
                    _ => xml.skip().await?,
                };
            }
        }

        xml.close().await?;
        let mut href = href.into_iter();
        match (status, propstat.is_empty(), href.next()) {
            (status @ Some(_), true, Some(first)) => Ok(Response {
                href: first,
                more_hrefs: href.collect(),
                status,
                propstat,
            }),
            (None, false, Some(first)) => {
                for extra in href {
                    tracing::warn!(href=%first.0, extra=%extra.0, "ignoring extra href of a propstat response");
                }
                Ok(Response {
                    href: first,
                    more_hrefs: vec![],
                    status: None,
                    propstat,
                })
            }
            (Some(_), false, _) => Err(ParsingError::InvalidValue),
            _ => Err(ParsingError::MissingChild),
        }
    }
}

impl QRead<PropStat> for PropStat {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(DAV_URN, "propstat").await?;
        let (mut m_prop, mut m_status) = (None, None);

        loop {
            let mut dirty = false;
            xml.maybe_read::<Prop>(&mut m_prop, &mut dirty).await?;
            xml.maybe_read::<Status>(&mut m_status, &mut dirty).await?;

            if !dirty {
                match xml.peek() {
                    Event::End(_) => break,
                    _ => xml.skip().await?,
                };
            }
        }

        xml.close().await?;
        match (m_prop, m_status) {
            (Some(prop), Some(status)) => Ok(PropStat { prop, status }),
            _ => Err(ParsingError::MissingChild),
        }
    }
}

impl QRead<Prop> for Prop {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(DAV_URN, "prop").await?;
        let acc = xml.collect::<Element>().await?;
        xml.close().await?;
        Ok(Prop(acc))
    }
}

impl QRead<Element> for Element {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.element().await
    }
}

impl QRead<Status> for Status {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(DAV_URN, "status").await?;
        let fullcode = xml.tag_string().await?;
        let txtcode = fullcode
            .trim()
            .splitn(3, ' ')
            .nth(1)
            .ok_or(ParsingError::InvalidValue)?;
        let code = http::status::StatusCode::from_bytes(txtcode.as_bytes())
            .or(Err(ParsingError::InvalidValue))?;
        xml.close().await?;
        Ok(Status(code))
    }
}

impl QRead<ResponseDescription> for ResponseDescription {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(DAV_URN, "responsedescription").await?;
        let cnt = xml.tag_string().await?;
        xml.close().await?;
        Ok(ResponseDescription(cnt))
    }
}

impl QRead<Href> for Href {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(DAV_URN, "href").await?;
        let url = xml.tag_string().await?;
        xml.close().await?;
        Ok(Href(url.trim().to_string()))
    }
}
