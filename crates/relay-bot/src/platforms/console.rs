//! Console platform
//!
//! Writes replies and inline answers to a terminal (or any writer), which
//! lets the relay run once from the command line without Telegram.

use async_trait::async_trait;
use relay_core::{DeliveryError, DeliveryPort, InlineResult, Reply, ReplyTarget};
use std::io::{self, Write};
use std::sync::Mutex;

pub struct ConsolePort<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
}

impl ConsolePort<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsolePort<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_block(&self, block: &str) -> Result<(), DeliveryError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| DeliveryError::failed("console writer poisoned"))?;
        writeln!(out, "{block}")
            .and_then(|()| out.flush())
            .map_err(|e| DeliveryError::failed(e.to_string()))
    }
}

#[async_trait]
impl<W: Write + Send> DeliveryPort for ConsolePort<W> {
    async fn send_reply(&self, _target: ReplyTarget, reply: &Reply) -> Result<(), DeliveryError> {
        self.write_block(&format!("{}\n", reply.text))
    }

    async fn answer_inline(
        &self,
        _query_id: &str,
        results: &[InlineResult],
    ) -> Result<(), DeliveryError> {
        let block = results
            .iter()
            .map(|result| {
                format!(
                    "[{}] {} - {}\n    {}",
                    result.id, result.title, result.description, result.rendered_message
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.write_block(&block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ReplyTarget {
        ReplyTarget {
            chat_id: 0,
            message_id: None,
        }
    }

    #[tokio::test]
    async fn test_reply_written_with_blank_line() {
        let port = ConsolePort::new(Vec::new());
        port.send_reply(target(), &Reply::html("<b>hi</b>"))
            .await
            .unwrap();
        port.send_reply(target(), &Reply::plain("there"))
            .await
            .unwrap();

        let out = String::from_utf8(port.into_inner()).unwrap();
        assert_eq!(out, "<b>hi</b>\n\nthere\n\n");
    }

    #[tokio::test]
    async fn test_inline_answer_lists_results_in_order() {
        let port = ConsolePort::new(Vec::new());
        let results = vec![
            InlineResult {
                id: 0,
                title: "A".to_string(),
                description: "X".to_string(),
                rendered_message: "rj is listening to A by X".to_string(),
            },
            InlineResult {
                id: 1,
                title: "B".to_string(),
                description: "Y".to_string(),
                rendered_message: "rj is listening to B by Y".to_string(),
            },
        ];
        port.answer_inline("q", &results).await.unwrap();

        let out = String::from_utf8(port.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[0] A - X");
        assert_eq!(lines[2], "[1] B - Y");
    }
}
