//! # Reply parsing
//!
//! The WE310 replies are loosely formatted text: lines terminated by CR and/or LF, fields
//! delimited by commas and status lines prefixed by a command specific tag, e.g. `+WNI:0`.
//! Instead of a full grammar, narrowly scoped extraction functions are used:
//!
//! * [find_line_containing] returns the first field containing a keyword
//! * [extract_keyword_value] returns the first token following a keyword
//!
//! ````
//! use we310_at::responses::{extract_keyword_value, find_line_containing};
//!
//! let reply = "AT+WNI=0\r\n+WNI:0\r\n\r\nOK\r\n";
//! let line = find_line_containing(reply, "+WNI:").unwrap();
//! assert_eq!("+WNI:0", line);
//! assert_eq!(Some("0"), extract_keyword_value(line, "+WNI"));
//! ````
use atat::atat_derive::AtatResp;
use atat::heapless_bytes::Bytes;
use core::str::FromStr;
use core::net::IpAddr;
use heapless::String;

/// Commands which gets just responded by OK
#[derive(Clone, AtatResp)]
pub struct NoResponse;

/// Status line tag of the WNI command
pub(crate) const STATION_MODE_TAG: &str = "+WNI:";

/// Keyword preceding the interface handle
pub(crate) const STATION_MODE_KEYWORD: &str = "+WNI";

/// Status line tag of the SC command
pub(crate) const SOCKET_TAG: &str = "+SC:";

/// Keyword preceding the connection identifier
pub(crate) const SOCKET_KEYWORD: &str = "+SC";

/// Status tag of the NDNSCRURL command
pub(crate) const RESOLVE_TAG: &str = "+NDNSCRURL";

/// Marker of an interface whose link is up in WNIFCFG replies
pub(crate) const LINK_UP_MARKER: &str = "UP";

/// Max. length of a handle in bytes
pub const HANDLE_LENGTH: usize = 8;

/// Short token returned by the modem identifying an interface or connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handle(String<HANDLE_LENGTH>);

impl Handle {
    /// Returns None if the token is empty or longer than [HANDLE_LENGTH]
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() {
            return None;
        }

        let mut string = String::new();
        string.push_str(token).ok()?;
        Some(Self(string))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Unquoted command argument
    pub(crate) fn to_argument(&self) -> Bytes<HANDLE_LENGTH> {
        Bytes::from_slice(self.0.as_bytes()).unwrap_or_else(|_| Bytes::new())
    }
}

impl core::fmt::Display for Handle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the first token following the first occurrence of `keyword`.
///
/// Leading whitespace and exactly one separator (`:`, `=` or `,`) between keyword and value are
/// skipped, the token ends at the next whitespace. Returns None if the keyword does not occur or
/// no token follows.
pub fn extract_keyword_value<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    if keyword.is_empty() {
        return None;
    }

    let (_, remainder) = text.split_once(keyword)?;
    let remainder = remainder.trim_start();
    let remainder = remainder.strip_prefix(is_separator).unwrap_or(remainder);

    remainder.split_whitespace().next()
}

/// Returns the first trimmed field containing `keyword`. Fields are delimited by CR, LF and comma.
pub fn find_line_containing<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    if keyword.is_empty() {
        return None;
    }

    fields(text).find(|field| field.contains(keyword))
}

/// Returns true if any line contains the given marker
pub fn contains_line_with(text: &str, marker: &str) -> bool {
    !marker.is_empty() && text.split(is_line_terminator).any(|line| line.contains(marker))
}

/// Extracts the resolved address of a NDNSCRURL reply, e.g. `+NDNSCRURL:,api.thingspeak.com:192.0.2.10`.
///
/// The address is taken from the first non-empty value after the status tag, either inline after
/// the tag or in the following field. The value is either the bare address or `<host>:<address>`.
pub fn parse_resolved_address(text: &str, host: &str) -> Option<IpAddr> {
    let mut fields = fields(text).skip_while(|field| !field.starts_with(RESOLVE_TAG));

    let tag = fields.next()?;
    let inline = tag[RESOLVE_TAG.len()..].trim_start_matches(':').trim();
    let field = if inline.is_empty() { fields.next()? } else { inline };

    if let Ok(address) = IpAddr::from_str(field) {
        return Some(address);
    }

    let address = match field.strip_prefix(host).and_then(|rest| rest.strip_prefix(':')) {
        Some(address) => address,
        None => field.split_once(':')?.1,
    };

    IpAddr::from_str(address.trim()).ok()
}

/// Returns the first line which is neither empty, a command echo nor a final result code
pub fn first_information_line(text: &str) -> Option<&str> {
    text.split(is_line_terminator)
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_echo(line) && !is_result_code(line))
}

/// Returns true if the reply contains the final result code `OK`
pub fn is_ok(text: &str) -> bool {
    text.split(is_line_terminator).any(|line| line.trim() == "OK")
}

/// Non-empty trimmed fields, delimited by CR, LF and comma
fn fields(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| is_line_terminator(c) || c == ',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
}

fn is_line_terminator(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn is_separator(c: char) -> bool {
    c == ':' || c == '=' || c == ','
}

fn is_echo(line: &str) -> bool {
    line.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("AT"))
}

fn is_result_code(line: &str) -> bool {
    line == "OK" || line == "ERROR" || line.starts_with("ERROR:")
}
