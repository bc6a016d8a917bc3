use std::future::Future;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use tokio::io::{AsyncBufRead, AsyncWrite};

use super::error::ParsingError;

// Constants
pub const DAV_URN: &[u8] = b"DAV:";
pub const OC_URN: &[u8] = b"http://owncloud.org/ns";
pub const NC_URN: &[u8] = b"http://nextcloud.org/ns";

// Async traits
pub trait IWrite: AsyncWrite + Unpin + Send {}
impl<T: AsyncWrite + Unpin + Send> IWrite for T {}
pub trait IRead: AsyncBufRead + Unpin {}
impl<T: AsyncBufRead + Unpin> IRead for T {}

// Serialization/Deserialization traits
pub trait QWrite {
    fn qwrite(
        &self,
        xml: &mut Writer<impl IWrite>,
    ) -> impl Future<Output = Result<(), quick_xml::Error>> + Send;
}
pub trait QRead<T> {
    fn qread(xml: &mut Reader<impl IRead>) -> impl Future<Output = Result<T, ParsingError>>;
}

// The representation of an XML node in Rust
pub trait Node<T>: QRead<T> + std::fmt::Debug + PartialEq + Clone {}
impl<T: QRead<T> + std::fmt::Debug + PartialEq + Clone> Node<T> for T {}

// ---------------

/// An XML element captured as an owned tree.
///
/// Property values are handed to decoders in this form so that decoding
/// does not depend on the position of the streaming reader.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Element {
    /// Resolved namespace URI, `None` when the element is unqualified
    pub ns: Option<String>,
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}
impl Element {
    pub fn new(ns: Option<&[u8]>, name: &str) -> Self {
        Self {
            ns: ns.map(|n| String::from_utf8_lossy(n).into_owned()),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn is(&self, ns: &[u8], name: &str) -> bool {
        self.name == name && self.ns.as_deref().map(str::as_bytes) == Some(ns)
    }

    /// Text content without the surrounding whitespace
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// First child with the given local name, whatever its namespace
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Transform a Rust object into an XML stream of characters
pub struct Writer<T: IWrite> {
    pub q: quick_xml::writer::Writer<T>,
    pub ns_to_apply: Vec<(String, String)>,
}
impl<T: IWrite> Writer<T> {
    pub fn create_dav_element(&mut self, name: &str) -> BytesStart<'static> {
        self.create_ns_element("d", name)
    }

    pub fn create_ns_element(&mut self, ns: &str, name: &str) -> BytesStart<'static> {
        let mut start = BytesStart::new(format!("{}:{}", ns, name));
        if !self.ns_to_apply.is_empty() {
            start.extend_attributes(
                self.ns_to_apply
                    .iter()
                    .map(|(k, n)| (k.as_str(), n.as_str())),
            );
            self.ns_to_apply.clear()
        }
        start
    }
}

/// Transform an XML stream of characters into a Rust object
pub struct Reader<T: IRead> {
    pub rdr: NsReader<T>,
    cur: Event<'static>,
    parents: Vec<Event<'static>>,
    buf: Vec<u8>,
}
impl<T: IRead> Reader<T> {
    pub async fn new(mut rdr: NsReader<T>) -> Result<Self, ParsingError> {
        let mut buf: Vec<u8> = vec![];
        let cur = rdr.read_event_into_async(&mut buf).await?.into_owned();
        let parents = vec![];
        buf.clear();
        Ok(Self {
            cur,
            parents,
            rdr,
            buf,
        })
    }

    /// read one more tag
    /// do not expose it publicly
    async fn next(&mut self) -> Result<Event<'static>, ParsingError> {
        let evt = self
            .rdr
            .read_event_into_async(&mut self.buf)
            .await?
            .into_owned();
        self.buf.clear();
        Ok(std::mem::replace(&mut self.cur, evt))
    }

    /// skip a node at current level
    pub async fn skip(&mut self) -> Result<Event<'static>, ParsingError> {
        match &self.cur {
            Event::Start(b) => {
                let _span = self
                    .rdr
                    .read_to_end_into_async(b.to_end().name(), &mut self.buf)
                    .await?;
                self.next().await
            }
            Event::End(_) => Err(ParsingError::WrongToken),
            Event::Eof => Err(ParsingError::Eof),
            _ => self.next().await,
        }
    }

    /// check if this is the desired tag
    fn is_tag(&self, ns: &[u8], key: &str) -> bool {
        let qname = match self.peek() {
            Event::Start(bs) | Event::Empty(bs) => bs.name(),
            Event::End(be) => be.name(),
            _ => return false,
        };

        let (extr_ns, local) = self.rdr.resolve_element(qname);

        if local.into_inner() != key.as_bytes() {
            return false;
        }

        match extr_ns {
            ResolveResult::Bound(v) => v.into_inner() == ns,
            _ => false,
        }
    }

    fn capture(&self, bs: &BytesStart<'_>) -> Element {
        let (ns, local) = self.rdr.resolve_element(bs.name());
        let ns = match ns {
            ResolveResult::Bound(v) => Some(v.into_inner()),
            _ => None,
        };
        Element::new(ns, &String::from_utf8_lossy(local.into_inner()))
    }

    pub fn parent_has_child(&self) -> bool {
        matches!(self.parents.last(), Some(Event::Start(_)) | None)
    }

    fn ensure_parent_has_child(&self) -> Result<(), ParsingError> {
        match self.parent_has_child() {
            true => Ok(()),
            false => Err(ParsingError::Recoverable),
        }
    }

    pub fn peek(&self) -> &Event<'static> {
        &self.cur
    }

    pub async fn tag_string(&mut self) -> Result<String, ParsingError> {
        self.ensure_parent_has_child()?;

        let mut acc = String::new();
        loop {
            match self.peek() {
                Event::CData(unescaped) => {
                    acc.push_str(std::str::from_utf8(unescaped.as_ref())?);
                    self.next().await?
                }
                Event::Text(escaped) => {
                    acc.push_str(escaped.unescape()?.as_ref());
                    self.next().await?
                }
                Event::End(_) | Event::Start(_) | Event::Empty(_) => return Ok(acc),
                Event::Eof => return Err(ParsingError::Eof),
                _ => self.next().await?,
            };
        }
    }

    /// Capture the element under the cursor, with its whole subtree,
    /// and move the cursor right after it.
    ///
    /// Returns `Recoverable` if the cursor is not on an opening tag.
    pub async fn element(&mut self) -> Result<Element, ParsingError> {
        self.ensure_parent_has_child()?;

        let mut stack: Vec<Element> = Vec::new();
        loop {
            match self.peek() {
                Event::Start(bs) => {
                    let elem = self.capture(bs);
                    self.next().await?;
                    stack.push(elem);
                }
                Event::Empty(bs) => {
                    let elem = self.capture(bs);
                    self.next().await?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(elem),
                        None => return Ok(elem),
                    }
                }
                Event::End(_) if stack.is_empty() => return Err(ParsingError::Recoverable),
                Event::End(_) => {
                    let done = stack.pop().ok_or(ParsingError::WrongToken)?;
                    self.next().await?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(done),
                        None => return Ok(done),
                    }
                }
                Event::Text(escaped) if !stack.is_empty() => {
                    let txt = escaped.unescape()?.into_owned();
                    if let Some(cur) = stack.last_mut() {
                        cur.text.push_str(&txt);
                    }
                    self.next().await?;
                }
                Event::CData(unescaped) if !stack.is_empty() => {
                    let txt = std::str::from_utf8(unescaped.as_ref())?.to_owned();
                    if let Some(cur) = stack.last_mut() {
                        cur.text.push_str(&txt);
                    }
                    self.next().await?;
                }
                Event::Eof => return Err(ParsingError::Eof),
                _ if stack.is_empty() => return Err(ParsingError::Recoverable),
                _ => {
                    self.next().await?;
                }
            }
        }
    }

    pub async fn maybe_read<N: Node<N>>(
        &mut self,
        t: &mut Option<N>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        if !self.parent_has_child() {
            return Ok(());
        }

        match N::qread(self).await {
            Ok(v) => {
                *t = Some(v);
                *dirty = true;
                Ok(())
            }
            Err(ParsingError::Recoverable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn maybe_push<N: Node<N>>(
        &mut self,
        t: &mut Vec<N>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        if !self.parent_has_child() {
            return Ok(());
        }

        match N::qread(self).await {
            Ok(v) => {
                t.push(v);
                *dirty = true;
                Ok(())
            }
            Err(ParsingError::Recoverable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn find<N: Node<N>>(&mut self) -> Result<N, ParsingError> {
        self.ensure_parent_has_child()?;

        loop {
            // Try parse
            match N::qread(self).await {
                Err(ParsingError::Recoverable) => (),
                otherwise => return otherwise,
            }

            // If recovered, skip the element
            self.skip().await?;
        }
    }

    pub async fn collect<N: Node<N>>(&mut self) -> Result<Vec<N>, ParsingError> {
        let mut acc = Vec::new();
        if !self.parent_has_child() {
            return Ok(acc);
        }

        loop {
            match N::qread(self).await {
                Err(ParsingError::Recoverable) => match self.peek() {
                    Event::End(_) => return Ok(acc),
                    _ => {
                        self.skip().await?;
                    }
                },
                Ok(v) => acc.push(v),
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn open(&mut self, ns: &[u8], key: &str) -> Result<Event<'static>, ParsingError> {
        let evt = match self.peek() {
            Event::Empty(_) if self.is_tag(ns, key) => self.cur.clone(),
            Event::Start(_) if self.is_tag(ns, key) => self.next().await?,
            _ => return Err(ParsingError::Recoverable),
        };

        self.parents.push(evt.clone());
        Ok(evt)
    }

    // find stop tag
    pub async fn close(&mut self) -> Result<Event<'static>, ParsingError> {
        // Handle the empty case
        if !self.parent_has_child() {
            self.parents.pop();
            return self.next().await;
        }

        // Handle the start/end case
        loop {
            match self.peek() {
                Event::End(_) => {
                    self.parents.pop();
                    return self.next().await;
                }
                _ => self.skip().await?,
            };
        }
    }
}
