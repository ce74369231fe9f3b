//! Request bodies for the XML service and the NBR storage service.
//!
//! The vendor endpoints accept a fixed envelope shape, so the documents are
//! assembled from templates with every interpolated value escaped.

use crate::adapters::webex::Credentials;
use crate::core::window::format_wire_time;
use crate::domain::model::ListRequest;
use quick_xml::escape::escape;

pub const ACCEPT: &str = "application/soap+xml, application/dime, multipart/related, text/*";
pub const SOAP_ACTION: &str = "''";
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
pub const TEXT_XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// `LstRecording` request for one window / page.
pub fn list_recordings_body(credentials: &Credentials, site_id: &str, request: &ListRequest) -> String {
    let host_filter = request
        .host_webex_id
        .as_deref()
        .map(|id| format!("<hostWebExID>{}</hostWebExID>", escape(id)))
        .unwrap_or_default();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<serv:message xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:serv="http://www.webex.com/schemas/2002/06/service">"#,
            "<header><securityContext>",
            "<webExID>{user}</webExID><password>{password}</password><siteID>{site}</siteID>",
            "</securityContext></header>",
            r#"<body><bodyContent xsi:type="java:com.webex.service.binding.ep.LstRecording">"#,
            "<createTimeScope><createTimeStart>{from}</createTimeStart><createTimeEnd>{to}</createTimeEnd></createTimeScope>",
            "<listControl><startFrom>{start_from}</startFrom><maximumNum>{maximum}</maximumNum></listControl>",
            "{host_filter}",
            "</bodyContent></body></serv:message>"
        ),
        user = escape(credentials.username.as_str()),
        password = escape(credentials.password.as_str()),
        site = escape(site_id),
        from = format_wire_time(&request.window.start),
        to = format_wire_time(&request.window.end),
        start_from = request.start_from,
        maximum = request.maximum_num,
        host_filter = host_filter,
    )
}

/// `downloadNBRStorageFile` SOAP call.
pub fn download_body(site_id: &str, recording_id: &str, ticket: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<soapenv:Body>",
            r#"<ns1:downloadNBRStorageFile soapenv:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/" xmlns:ns1="NBRStorageService">"#,
            r#"<siteId xsi:type="xsd:long">{site}</siteId>"#,
            r#"<recordId xsi:type="xsd:long">{record}</recordId>"#,
            r#"<ticket xsi:type="xsd:string">{ticket}</ticket>"#,
            "</ns1:downloadNBRStorageFile></soapenv:Body></soapenv:Envelope>"
        ),
        site = escape(site_id),
        record = escape(recording_id),
        ticket = escape(ticket),
    )
}
