// ── Endpoint – `user@ipv4:port` ───────────────────────────────────────────────

use crate::sftp::error::{ResultCode, SftpError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

/// Remote endpoint triple. An empty `user` marks an endpoint that failed to
/// parse and must not be connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub user: String,
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            user: String::new(),
            host: Ipv4Addr::UNSPECIFIED,
            port: 0,
        }
    }
}

impl Endpoint {
    pub fn new(user: impl Into<String>, host: Ipv4Addr, port: u16) -> Self {
        Self {
            user: user.into(),
            host,
            port,
        }
    }

    /// Lenient parse: a malformed string yields the invalid (empty-user) endpoint.
    pub fn parse(s: &str) -> Endpoint {
        s.parse().unwrap_or_default()
    }

    pub fn is_valid(&self) -> bool {
        !self.user.is_empty()
    }

    /// Host address in network byte order, as handed to a `sockaddr_in`.
    pub fn host_network_order(&self) -> u32 {
        u32::from_ne_bytes(self.host.octets())
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = SftpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| {
            SftpError::new(
                ResultCode::InvalidEndpoint,
                format!("invalid endpoint '{}': {}", s, why),
            )
        };

        let at = match s.find('@') {
            Some(0) => return Err(invalid("empty user")),
            Some(i) => i,
            None => return Err(invalid("missing '@'")),
        };
        // The first ':' in the whole string separates host from port, so it
        // must come after the '@'.
        let colon = s.find(':').ok_or_else(|| invalid("missing ':'"))?;
        if colon < at {
            return Err(invalid("':' before '@'"));
        }
        let rest = &s[at + 1..];
        let colon = colon - at - 1;

        let user = &s[..at];
        let host = rest[..colon]
            .parse::<Ipv4Addr>()
            .map_err(|_| invalid("host must be a dotted-decimal IPv4 address"))?;
        let port = rest[colon + 1..]
            .parse::<u16>()
            .map_err(|_| invalid("port must be 0-65535"))?;

        Ok(Endpoint::new(user, host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}
