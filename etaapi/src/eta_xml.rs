use std::collections::HashMap;
use std::str::FromStr;

use chrono::Local;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::error::{EtaError, Result};
use crate::nodes::{EtaNode, Reading, Variable, VariableList, VariableType};

lazy_static! {
    /// I/O interface points. Their uris end in `0/0/10` plus three more chars.
    static ref IO_VARIABLE_RE: Regex = Regex::new(r".*0/0/10...$").unwrap();
    static ref TIMESLOT_RE: Regex = Regex::new(r"\d{2}:\d{2} - \d{2}:\d{2} \d{1,3}").unwrap();
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// generic element tree

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Element {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn from_start(start: &BytesStart) -> Result<Self> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = HashMap::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, value);
        }
        Ok(Element {
            tag,
            attributes,
            ..Default::default()
        })
    }

    pub fn first_child(&self) -> Result<&Element> {
        self.children.first().ok_or_else(|| {
            EtaError::ParserError(format!("element <{}> has no child element", self.tag))
        })
    }

    pub fn attr(&self, name: &str) -> Result<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| {
                EtaError::ParserError(format!(
                    "element <{}> is missing attribute `{}`",
                    self.tag, name
                ))
            })
    }

    pub fn parse_attr<T: FromStr>(&self, name: &str) -> Result<T> {
        let raw = self.attr(name)?;
        raw.trim().parse::<T>().map_err(|_| {
            EtaError::ParserError(format!(
                "attribute `{}` of <{}> is not a number: {:?}",
                name, self.tag, raw
            ))
        })
    }
}

/// Reads a whole document into an [`Element`] tree and returns its root.
pub(crate) fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Element::from_start(&e)?),
            Event::Empty(e) => {
                let element = Element::from_start(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(multiple_roots()),
                }
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    EtaError::XmlParseError("unbalanced closing tag".to_string())
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(multiple_roots()),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(EtaError::XmlParseError(
            "document ended before all elements were closed".to_string(),
        ));
    }
    root.ok_or_else(|| EtaError::XmlParseError("document has no root element".to_string()))
}

fn multiple_roots() -> EtaError {
    EtaError::XmlParseError("document has more than one root element".to_string())
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// response of /user/api

#[derive(Debug, PartialEq)]
pub(crate) struct ApiVersion {
    pub tag: String,
    pub version: String,
}

pub(crate) fn parse_api_version(xml: &str) -> Result<ApiVersion> {
    let root = parse_document(xml)?;
    let api = root.first_child()?;
    Ok(ApiVersion {
        tag: api.tag.clone(),
        version: api.attr("version")?.to_string(),
    })
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// response of /user/menu

pub(crate) fn is_io_variable(uri: &str) -> bool {
    IO_VARIABLE_RE.is_match(uri)
}

/// Parses the menu document into one [`VariableList`] per top level node (the
/// tabs of the ETAtouch display).
pub(crate) fn parse_menu(
    xml: &str,
    hide_io_variables: bool,
) -> Result<IndexMap<String, VariableList>> {
    let root = parse_document(xml)?;
    let menu = root.first_child()?;

    let mut nodes = IndexMap::new();
    for node in &menu.children {
        let name = node.attr("name")?;
        let uri = node.attr("uri")?;
        let elements = parse_object_list(node, hide_io_variables)?;
        nodes.insert(name.to_string(), VariableList::new(name, uri, elements));
    }
    Ok(nodes)
}

/// An element with more than one child element becomes a [`VariableList`],
/// everything else a [`Variable`].
fn parse_object_list(
    root: &Element,
    hide_io_variables: bool,
) -> Result<IndexMap<String, EtaNode>> {
    let mut elements = IndexMap::new();

    for object in &root.children {
        let name = object.attr("name")?;
        let uri = object.attr("uri")?;

        if hide_io_variables && is_io_variable(uri) {
            debug!("Skip {} ({}) since on blacklist", name, uri);
            continue;
        }

        let node: EtaNode = if object.children.len() > 1 {
            VariableList::new(name, uri, parse_object_list(object, hide_io_variables)?).into()
        } else {
            Variable::new(name, uri).into()
        };
        elements.insert(name.to_string(), node);
    }

    Ok(elements)
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// response of /user/var/<uri>

pub(crate) fn classify(adv_text_offset: i64, unit: &str, str_value: &str) -> VariableType {
    if adv_text_offset > 0 && unit.is_empty() {
        VariableType::Text
    } else if TIMESLOT_RE.is_match(str_value) {
        VariableType::Timeslot
    } else {
        VariableType::Default
    }
}

/// Accepts integers and finite decimals within the `i64` range, truncating
/// the fraction.
fn parse_raw_value(raw: &str) -> Result<i64> {
    let not_a_number =
        || EtaError::ParserError(format!("variable value is not a number: {:?}", raw));
    let parsed = raw.parse::<f64>().map_err(|_| not_a_number())?;
    let truncated = parsed.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(not_a_number());
    }
    Ok(truncated as i64)
}

/// Parses a single variable value. The raw value may carry a decimal point,
/// it is parsed as float and truncated.
pub(crate) fn parse_variable(xml: &str) -> Result<Reading> {
    let root = parse_document(xml)?;
    let value = root.first_child()?;

    let adv_text_offset: i64 = value.parse_attr("advTextOffset")?;
    let unit = value.attr("unit")?.to_string();
    let str_value = value.attr("strValue")?.to_string();
    let scale_factor: i64 = value.parse_attr("scaleFactor")?;
    let dec_places: i64 = value.parse_attr("decPlaces")?;
    let value = parse_raw_value(value.text.trim())?;

    let variable_type = classify(adv_text_offset, &unit, &str_value);

    Ok(Reading {
        value,
        str_value,
        unit,
        scale_factor,
        dec_places,
        adv_text_offset,
        variable_type,
        last_updated: Local::now(),
    })
}
