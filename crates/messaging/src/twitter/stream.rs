//! Line-delimited reader for the filtered stream.

use dipzy_core::{ApiError, Result};
use log::debug;
use reqwest::Response;
use serde_json::Value;

use super::PROVIDER_ID;

/// Live filtered stream connection.
///
/// Twitter sends one JSON payload per line and blank keep-alive lines every
/// few seconds; [`next_payload`](Self::next_payload) skips the latter.
pub struct TweetStream {
    response: Response,
    buffer: Vec<u8>,
    finished: bool,
}

impl TweetStream {
    pub(crate) fn new(response: Response) -> Self {
        Self {
            response,
            buffer: Vec::new(),
            finished: false,
        }
    }

    /// Next payload, or `None` once the server closes the connection.
    pub async fn next_payload(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(line) = take_line(&mut self.buffer, self.finished) {
                match parse_line(&line)? {
                    Some(value) => return Ok(Some(value)),
                    None => {
                        debug!("{} stream keep-alive", PROVIDER_ID);
                        continue;
                    }
                }
            }
            if self.finished {
                return Ok(None);
            }

            match self.response.chunk().await {
                Ok(Some(chunk)) => self.buffer.extend_from_slice(&chunk),
                Ok(None) => self.finished = true,
                Err(e) => {
                    return Err(ApiError::Network {
                        provider: PROVIDER_ID.to_string(),
                        message: e.to_string(),
                    })
                }
            }
        }
    }
}

/// Split the first complete line off `buffer`. At end of stream the
/// remainder counts as a line.
fn take_line(buffer: &mut Vec<u8>, at_end: bool) -> Option<Vec<u8>> {
    match buffer.iter().position(|&b| b == b'\n') {
        Some(pos) => {
            let mut line: Vec<u8> = buffer.drain(..=pos).collect();
            line.pop();
            Some(line)
        }
        None if at_end && !buffer.is_empty() => Some(std::mem::take(buffer)),
        None => None,
    }
}

/// `None` for keep-alive lines.
fn parse_line(line: &[u8]) -> Result<Option<Value>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| ApiError::Decode {
            provider: PROVIDER_ID.to_string(),
            message: e.to_string(),
        })
}
