use crate::instrument::{InstrumentError, InstrumentResult, ScpiTransport};
use log::debug;
use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SCPI_PORT: u16 = 5025;

/// Raw-socket resource address, e.g. `TCPIP0::192.168.1.91::5025::SOCKET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAddress {
    pub host: String,
    pub port: u16,
}

impl FromStr for ResourceAddress {
    type Err = InstrumentError;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let unsupported = || InstrumentError::UnsupportedAddress(address.to_string());
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(unsupported());
        }

        if trimmed.to_ascii_uppercase().starts_with("TCPIP") {
            let (_, resource) = trimmed.split_once("::").ok_or_else(unsupported)?;
            let (host, rest) = split_host(resource, "::").ok_or_else(unsupported)?;
            let (port, class) = rest.split_once("::").ok_or_else(unsupported)?;
            if host.is_empty() || !class.eq_ignore_ascii_case("SOCKET") {
                return Err(unsupported());
            }
            return Ok(Self {
                host: host.to_string(),
                port: port.parse::<u16>().map_err(|_| unsupported())?,
            });
        }

        if trimmed.starts_with('[') {
            let (host, rest) = split_host(trimmed, ":").ok_or_else(unsupported)?;
            let port = if rest.is_empty() {
                DEFAULT_SCPI_PORT
            } else {
                rest.parse::<u16>().map_err(|_| unsupported())?
            };
            return Ok(Self {
                host: host.to_string(),
                port,
            });
        }

        // Unbracketed IPv6 literal: no port can be given.
        if trimmed.matches(':').count() > 1 {
            return Ok(Self {
                host: trimmed.to_string(),
                port: DEFAULT_SCPI_PORT,
            });
        }

        match trimmed.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => Ok(Self {
                host: host.to_string(),
                port: port.parse::<u16>().map_err(|_| unsupported())?,
            }),
            Some(_) => Err(unsupported()),
            None => Ok(Self {
                host: trimmed.to_string(),
                port: DEFAULT_SCPI_PORT,
            }),
        }
    }
}

/// Splits `host<separator>rest`, where a `[...]` host may itself contain colons.
/// A bracketed host with nothing after it yields an empty `rest`.
fn split_host<'a>(input: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    if let Some(bracketed) = input.strip_prefix('[') {
        let (host, rest) = bracketed.split_once(']')?;
        if rest.is_empty() {
            return Some((host, rest));
        }
        return rest.strip_prefix(separator).map(|rest| (host, rest));
    }
    input.split_once(separator)
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "TCPIP0::[{}]::{}::SOCKET", self.host, self.port)
        } else {
            write!(f, "TCPIP0::{}::{}::SOCKET", self.host, self.port)
        }
    }
}

/// Newline-terminated SCPI over a raw TCP socket.
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TcpTransport {
    /// Connects to the instrument. Without a timeout every read blocks until
    /// the instrument answers.
    pub fn connect(address: &ResourceAddress, timeout: Option<Duration>) -> InstrumentResult<Self> {
        let stream = TcpStream::connect((address.host.as_str(), address.port))?;
        stream.set_read_timeout(timeout)?;
        stream.set_nodelay(true)?;
        let writer = stream.try_clone()?;
        debug!("connected to {}", address);
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
        })
    }
}

impl ScpiTransport for TcpTransport {
    fn write(&mut self, command: &str) -> InstrumentResult<()> {
        debug!("-> {}", command);
        self.writer.write_all(command.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> InstrumentResult<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(InstrumentError::Disconnected);
        }
        let reply = line.trim_end_matches(['\r', '\n']).to_string();
        debug!("<- {} bytes", reply.len());
        Ok(reply)
    }
}
