//! v2 legacy XML endpoint
//!
//! Older tooling posts to `/v2/{pbx_name}` a form field `request` holding
//! `<command pbxName=".." cmdType=".." cmd=".."><field fid="..">text</field>*</command>`
//! and expects the response in the same dialect: a `<command>` element
//! wrapping `<error>`, numbered `<screen>` pages or numbered
//! `<ossi_object>` field lists. The path segment is matched against the
//! configured PBX identity like v3; the `pbxName` attribute in the body is
//! only echoed back.

use axum::extract::{Form, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::{error::Error, fmt};

use super::{AppState, run_pbx_command};
use crate::pbx::PbxResponse;
use crate::{log_debug, log_error};

/// A parsed v2 command request.
#[derive(Debug)]
pub(crate) struct V2Command {
    pub(crate) pbx_name: String,
    pub(crate) termtype: String,
    pub(crate) command: String,
    pub(crate) fields: IndexMap<String, String>,
}

#[derive(Debug)]
pub(crate) enum XmlError {
    Malformed(String),
    MissingAttribute(&'static str),
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlError::Malformed(msg) => write!(f, "Malformed XML: {}", msg),
            XmlError::MissingAttribute(name) => write!(f, "Missing attribute: {}", name),
        }
    }
}

impl Error for XmlError {}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        XmlError::Malformed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XmlError::Malformed(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for XmlError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        XmlError::Malformed(err.to_string())
    }
}

impl From<std::io::Error> for XmlError {
    fn from(err: std::io::Error) -> Self {
        XmlError::Malformed(err.to_string())
    }
}

pub async fn legacy_xml_post(
    State(state): State<AppState>,
    Path(pbx_name): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, (StatusCode, String)> {
    if pbx_name != state.pbx_name {
        log_error!("connected to the wrong PBX: {} != {}", pbx_name, state.pbx_name);
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Wrong PBX".to_string()));
    }

    let bad_request = || (StatusCode::BAD_REQUEST, "Bad request".to_string());

    let raw = form.get("request").ok_or_else(bad_request)?;
    log_debug!("{}", raw);
    let request = parse_command_xml(raw).map_err(|err| {
        log_debug!("bad v2 request: {}", err);
        bad_request()
    })?;

    let response = run_pbx_command(
        &state,
        request.termtype.clone(),
        request.command.clone(),
        Some(request.fields.clone()),
        false,
    )
    .await
    .map_err(|status| (status, "PBX command failed".to_string()))?;

    let xml = render_command_xml(&request, &response).map_err(|err| {
        log_debug!("v2 render failed: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Response rendering failed".to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "text/xml")], xml).into_response())
}

/// Pull the command attributes and fields out of the request document.
/// Field elements without text mean "clear this field", which the OSSI wire
/// writes as a single space.
pub(crate) fn parse_command_xml(xml: &str) -> Result<V2Command, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pbx_name: Option<String> = None;
    let mut termtype: Option<String> = None;
    let mut command: Option<String> = None;
    let mut fields: IndexMap<String, String> = IndexMap::new();
    let mut current_fid: Option<String> = None;
    let mut current_value: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => match element.name().as_ref() {
                b"command" => {
                    pbx_name = attribute_value(&element, "pbxName")?;
                    termtype = attribute_value(&element, "cmdType")?;
                    command = attribute_value(&element, "cmd")?;
                }
                b"field" => {
                    current_fid = Some(attribute_value(&element, "fid")?.ok_or(XmlError::MissingAttribute("fid"))?);
                    current_value = None;
                }
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"command" => {
                    pbx_name = attribute_value(&element, "pbxName")?;
                    termtype = attribute_value(&element, "cmdType")?;
                    command = attribute_value(&element, "cmd")?;
                }
                b"field" => {
                    let fid = attribute_value(&element, "fid")?.ok_or(XmlError::MissingAttribute("fid"))?;
                    fields.insert(fid, " ".to_string());
                }
                _ => {}
            },
            Event::Text(text) => {
                if current_fid.is_some() {
                    let raw = String::from_utf8_lossy(text.as_ref()).into_owned();
                    current_value = Some(quick_xml::escape::unescape(&raw)?.into_owned());
                }
            }
            Event::End(element) => {
                if element.name().as_ref() == b"field"
                    && let Some(fid) = current_fid.take()
                {
                    fields.insert(fid, current_value.take().unwrap_or_else(|| " ".to_string()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(V2Command {
        pbx_name: pbx_name.ok_or(XmlError::MissingAttribute("pbxName"))?,
        termtype: termtype.ok_or(XmlError::MissingAttribute("cmdType"))?,
        command: command.ok_or(XmlError::MissingAttribute("cmd"))?,
        fields,
    })
}

fn attribute_value(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, XmlError> {
    match element.try_get_attribute(name)? {
        Some(attribute) => {
            let raw = String::from_utf8_lossy(&attribute.value).into_owned();
            Ok(Some(quick_xml::escape::unescape(&raw)?.into_owned()))
        }
        None => Ok(None),
    }
}

/// Convert a command response to the legacy v2 layout. An error suppresses
/// screens and objects; an OSSI response with no objects still gets an empty
/// `<ossi_object/>` so old clients see the element they look for.
pub(crate) fn render_command_xml(request: &V2Command, response: &PbxResponse) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("command");
    root.push_attribute(("cmd", request.command.as_str()));
    root.push_attribute(("cmdType", request.termtype.as_str()));
    root.push_attribute(("pbxName", request.pbx_name.as_str()));
    writer.write_event(Event::Start(root))?;

    if let Some(error) = response.error() {
        write_text_element(&mut writer, "error", &format!("ERROR: {}", error))?;
    } else {
        match response {
            PbxResponse::Vt220(vt220) => {
                for (page, screen) in vt220.screens.iter().enumerate() {
                    let mut element = BytesStart::new("screen");
                    element.push_attribute(("page", (page + 1).to_string().as_str()));
                    writer.write_event(Event::Start(element))?;
                    writer.write_event(Event::Text(BytesText::new(screen)))?;
                    writer.write_event(Event::End(BytesEnd::new("screen")))?;
                }
            }
            PbxResponse::Ossi(ossi) => {
                if ossi.ossi_objects.is_empty() {
                    writer.write_event(Event::Empty(BytesStart::new("ossi_object")))?;
                }
                for (index, object) in ossi.ossi_objects.iter().enumerate() {
                    let mut element = BytesStart::new("ossi_object");
                    element.push_attribute(("i", (index + 1).to_string().as_str()));
                    writer.write_event(Event::Start(element))?;
                    for (fid, value) in object {
                        let mut field = BytesStart::new("field");
                        field.push_attribute(("fid", fid.as_str()));
                        writer.write_event(Event::Start(field))?;
                        writer.write_event(Event::Text(BytesText::new(value)))?;
                        writer.write_event(Event::End(BytesEnd::new("field")))?;
                    }
                    writer.write_event(Event::End(BytesEnd::new("ossi_object")))?;
                }
            }
            // error() is always set on a rejected command
            PbxResponse::Rejected { .. } => {}
        }
    }

    writer.write_event(Event::End(BytesEnd::new("command")))?;
    String::from_utf8(writer.into_inner()).map_err(|err| XmlError::Malformed(err.to_string()))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), XmlError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
#[path = "../test/http/v2.rs"]
mod tests;
