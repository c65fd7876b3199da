//! Line-oriented message feed.

use async_trait::async_trait;
use sniper_protocols::{InboundMessage, MessageFeed};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

/// Yields each non-blank line of a reader as a message.
pub struct LineFeed<R> {
    lines: Lines<R>,
    source: String,
}

impl<R: AsyncBufRead + Unpin + Send> LineFeed<R> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            source: source.into(),
        }
    }
}

impl LineFeed<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> MessageFeed for LineFeed<R> {
    async fn next_message(&mut self) -> Option<InboundMessage> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let text = line.trim();
                    if text.is_empty() {
                        continue;
                    }
                    return Some(InboundMessage::new(text).with_source(self.source.clone()));
                }
                Ok(None) => return None,
                Err(e) => {
                    warn!(source = %self.source, error = %e, "Feed read failed");
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_skips_blank_lines() {
        let input: &[u8] = b"first\n\n   \nsecond call\n";
        let mut feed = LineFeed::new(input, "test");

        let first = feed.next_message().await.unwrap();
        assert_eq!(first.text, "first");
        assert_eq!(first.source.as_deref(), Some("test"));
        assert_eq!(feed.next_message().await.unwrap().text, "second call");
        assert!(feed.next_message().await.is_none());
    }
}
