// Adapters layer: the vendor's XML/SOAP services behind the domain ports.

pub mod soap;
pub mod webex;
pub mod xml;

pub use webex::{Credentials, Endpoints, HttpOptions, WebexClient};
