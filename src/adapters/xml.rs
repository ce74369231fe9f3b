//! Response parsing for the XML service and the NBR storage service.
//!
//! Both services qualify elements with whatever prefixes they like
//! (`serv:`, `ep:`, `soapenv:`, `ns1:` ...), so elements are matched on their
//! local names and the path of open elements.

use crate::domain::model::{EmbeddedFileInfo, ListingPage, Recording};
use crate::utils::error::{Result, WtError};
use quick_xml::events::Event;
use quick_xml::Reader;

/// "No records found", reported as a failure by the XML service.
pub const NO_RECORDS_EXCEPTION: &str = "000015";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketEnvelope {
    pub ticket: String,
    pub fault: Option<SoapFault>,
}

/// Walks the document, handing the path of open elements to `on_node`: once
/// with `None` when an element opens, then with `Some(text)` for every text or
/// CDATA node inside it. Paths hold local names only.
fn walk<F>(xml: &str, mut on_node: F) -> Result<()>
where
    F: FnMut(&[String], Option<&str>) -> Result<()>,
{
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                on_node(&path, None)?;
            }
            Event::Empty(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                on_node(&path, None)?;
                path.pop();
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(quick_xml::Error::from)?;
                on_node(&path, Some(&text))?;
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                on_node(&path, Some(&text))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(())
}

fn ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

fn parse_number<T: std::str::FromStr + Default>(field: &str, text: &str) -> Result<T> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed
        .parse()
        .map_err(|_| WtError::ResponseFormatError {
            message: format!("{} is not a number: {:?}", field, trimmed),
        })
}

fn set_recording_field(recording: &mut Recording, field: &str, text: &str) -> Result<()> {
    match field {
        "recordingID" => recording.recording_id = text.to_string(),
        "hostWebExID" => recording.host_webex_id = text.to_string(),
        "name" => recording.name = text.to_string(),
        "createTime" => recording.create_time = text.to_string(),
        "timeZoneID" => recording.time_zone_id = text.to_string(),
        "size" => recording.size = parse_number("size", text)?,
        "streamURL" => recording.stream_url = text.to_string(),
        "fileURL" => recording.file_url = text.to_string(),
        "recordingType" => recording.recording_type = parse_number("recordingType", text)?,
        "duration" => recording.duration = parse_number("duration", text)?,
        "format" => recording.format = text.to_string(),
        "serviceType" => recording.service_type = text.to_string(),
        "confID" => recording.conf_id = text.to_string(),
        "password" => recording.password = text.to_string(),
        "passwordReq" => recording.password_req = text.to_string(),
        _ => {}
    }
    Ok(())
}

/// Parses a `LstRecording` reply without judging its result code.
pub fn parse_listing(xml: &str) -> Result<ListingPage> {
    let mut page = ListingPage::default();
    let mut saw_message = false;

    walk(xml, |path, node| {
        let Some(text) = node else {
            if path.len() == 1 && path[0] == "message" {
                saw_message = true;
            } else if ends_with(path, &["bodyContent", "recording"]) {
                page.recordings.push(Recording::default());
            }
            return Ok(());
        };

        if ends_with(path, &["header", "response", "result"]) {
            page.header.result = text.to_string();
        } else if ends_with(path, &["header", "response", "gsbStatus"]) {
            page.header.gsb_status = text.to_string();
        } else if ends_with(path, &["header", "response", "reason"]) {
            page.header.reason = text.to_string();
        } else if ends_with(path, &["header", "response", "exceptionID"]) {
            page.header.exception_id = text.to_string();
        } else if ends_with(path, &["bodyContent", "matchingRecords", "total"]) {
            page.matching.total = parse_number("total", text)?;
        } else if ends_with(path, &["bodyContent", "matchingRecords", "returned"]) {
            page.matching.returned = parse_number("returned", text)?;
        } else if ends_with(path, &["bodyContent", "matchingRecords", "startFrom"]) {
            page.matching.start_from = parse_number("startFrom", text)?;
        } else if let Some((field, parent)) = path.split_last() {
            if ends_with(parent, &["bodyContent", "recording"]) {
                if let Some(recording) = page.recordings.last_mut() {
                    set_recording_field(recording, field, text)?;
                }
            }
        }
        Ok(())
    })?;

    if !saw_message {
        return Err(WtError::ResponseFormatError {
            message: "response is not an XML service message".to_string(),
        });
    }

    Ok(page)
}

/// Applies the service's result code: anything but `SUCCESS` fails, except
/// "no records found" which is an empty page.
pub fn check_listing(page: ListingPage) -> Result<ListingPage> {
    if page.header.result == "SUCCESS" {
        return Ok(page);
    }
    if page.header.exception_id == NO_RECORDS_EXCEPTION {
        return Ok(ListingPage {
            recordings: Vec::new(),
            ..page
        });
    }
    Err(WtError::ServiceError {
        result: page.header.result,
        reason: page.header.reason,
        exception_id: page.header.exception_id,
    })
}

/// Parses the `getMeetingTicket` SOAP reply.
pub fn parse_ticket_envelope(xml: &str) -> Result<TicketEnvelope> {
    let mut envelope = TicketEnvelope::default();
    let mut fault = SoapFault::default();
    let mut saw_fault = false;
    let mut saw_envelope = false;

    walk(xml, |path, node| {
        match node {
            None if path.len() == 1 && path[0] == "Envelope" => saw_envelope = true,
            None if ends_with(path, &["Body", "Fault"]) => saw_fault = true,
            None => {}
            Some(text) => {
                if ends_with(path, &["Body", "getMeetingTicketResponse", "getMeetingTicketReturn"]) {
                    envelope.ticket.push_str(text);
                } else if ends_with(path, &["Body", "Fault", "faultcode"]) {
                    fault.code.push_str(text);
                } else if ends_with(path, &["Body", "Fault", "faultstring"]) {
                    fault.message.push_str(text);
                }
            }
        }
        Ok(())
    })?;

    if !saw_envelope {
        return Err(WtError::ResponseFormatError {
            message: "ticket response is not a SOAP envelope".to_string(),
        });
    }
    if saw_fault {
        envelope.fault = Some(fault);
    }
    Ok(envelope)
}

/// Turns a ticket reply into the ticket itself. Replies beginning with `AS`
/// are error codes from the storage service, not tickets.
pub fn ticket_from_envelope(envelope: TicketEnvelope) -> Result<String> {
    let ticket = envelope.ticket.trim().to_string();
    if ticket.is_empty() {
        return match envelope.fault {
            Some(fault) if !fault.code.is_empty() => Err(WtError::SoapFault {
                code: fault.code,
                message: fault.message,
            }),
            _ => Err(WtError::ResponseFormatError {
                message: "ticket response carried no ticket".to_string(),
            }),
        };
    }
    if ticket.starts_with("AS") {
        return Err(WtError::TicketRejected { code: ticket });
    }
    Ok(ticket)
}

/// Finds a SOAP fault anywhere under `Body`, if the document has one.
pub fn parse_fault(xml: &str) -> Result<Option<SoapFault>> {
    let mut fault = SoapFault::default();
    let mut saw_fault = false;

    walk(xml, |path, node| {
        match node {
            None if ends_with(path, &["Body", "Fault"]) => saw_fault = true,
            None => {}
            Some(text) => {
                if ends_with(path, &["Fault", "faultcode"]) {
                    fault.code.push_str(text);
                } else if ends_with(path, &["Fault", "faultstring"]) {
                    fault.message.push_str(text);
                }
            }
        }
        Ok(())
    })?;

    Ok(saw_fault.then_some(fault))
}

/// Second part of a download reply: the file name on the first line, the
/// declared size on the second when it is numeric.
pub fn parse_file_info(text: &str) -> Result<EmbeddedFileInfo> {
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));
    let name = lines.next().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(WtError::ResponseFormatError {
            message: "download reply did not name the recording file".to_string(),
        });
    }

    let rest: Vec<String> = lines.map(str::to_string).collect();
    let declared_size = rest.first().and_then(|l| l.trim().parse::<u64>().ok());
    let extra = if declared_size.is_some() {
        rest.into_iter().skip(1).collect()
    } else {
        rest
    };

    Ok(EmbeddedFileInfo {
        name,
        declared_size,
        extra,
    })
}
