//! Streaming extraction of the network name from a lookup page
//!
//! The portal renders its answer as a key/value table. The scanner runs the
//! html5ever tokenizer over the body as it arrives and watches for a cell
//! whose text is exactly `Network`; the text of the next eligible cell is
//! the answer. No tree is built, so memory use does not grow with the page.
//!
//! Eligibility is deliberately coarse: a `<td>` start tag makes text
//! significant and *any* end tag clears it again, not only `</td>`. Pages
//! such as `<td><b>Carrier</b>Network</td>` therefore never arm the scanner.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use tracing::trace;

/// Label text that precedes the answer cell
pub const NETWORK_LABEL: &str = "Network";

/// Where the extractor is in the label/value sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    /// Looking for the label cell
    #[default]
    SeekingLabel,
    /// Label seen; the next eligible text is the network name
    AwaitingValue,
}

/// Token sink holding the extraction state for one response
#[derive(Debug, Default)]
struct Extractor {
    /// Inside a table cell, no end tag seen since
    in_cell: bool,
    phase: Phase,
    /// Character data of the current eligible text run
    text: String,
    /// Current run grew past the label length while seeking it
    oversized: bool,
    answer: Option<String>,
}

impl Extractor {
    /// Collect character data that may matter to the state machine
    ///
    /// Eligibility only changes on tags, so text outside a cell is dropped
    /// on arrival. While seeking the label, at most its length is kept.
    fn push_text(&mut self, chars: &str) {
        if !self.in_cell || self.oversized {
            return;
        }
        if self.phase == Phase::SeekingLabel && self.text.len() + chars.len() > NETWORK_LABEL.len()
        {
            self.oversized = true;
            self.text.clear();
            return;
        }
        self.text.push_str(chars);
    }

    /// Complete the current text run and apply it to the state machine
    fn flush_text(&mut self) {
        let oversized = std::mem::take(&mut self.oversized);
        if self.text.is_empty() || oversized {
            return;
        }
        let text = std::mem::take(&mut self.text);

        match self.phase {
            Phase::AwaitingValue => {
                trace!(network = %text, "Found network cell");
                self.answer = Some(text);
            }
            Phase::SeekingLabel if text == NETWORK_LABEL => {
                trace!("Found network label");
                self.phase = Phase::AwaitingValue;
            }
            Phase::SeekingLabel => {}
        }
    }

    fn on_tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        match tag.kind {
            TagKind::StartTag => {
                // <td/> does not open a cell
                if !tag.self_closing && &*tag.name == "td" {
                    self.in_cell = true;
                }
                raw_content(&tag.name)
            }
            TagKind::EndTag => {
                self.in_cell = false;
                TokenSinkResult::Continue
            }
        }
    }
}

/// Tokenizer state for elements whose content is not markup
fn raw_content(name: &str) -> TokenSinkResult<()> {
    match name {
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

impl TokenSink for Extractor {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        if self.answer.is_some() {
            return TokenSinkResult::Continue;
        }

        match token {
            Token::CharacterTokens(chars) => {
                self.push_text(&chars);
                TokenSinkResult::Continue
            }
            Token::NullCharacterToken => {
                self.push_text("\u{FFFD}");
                TokenSinkResult::Continue
            }
            // Recoverable markup errors do not split a text run
            Token::ParseError(_) => TokenSinkResult::Continue,
            Token::TagToken(tag) => {
                self.flush_text();
                self.on_tag(&tag)
            }
            Token::CommentToken(_) | Token::DoctypeToken(_) | Token::EOFToken => {
                self.flush_text();
                TokenSinkResult::Continue
            }
        }
    }
}

/// Incremental scanner over one response body
///
/// Feed body chunks in order with [`feed`](Self::feed); it returns the
/// network name as soon as the answer cell has been read. If the body ends
/// first, [`finish`](Self::finish) flushes any trailing text and reports
/// whether the answer turned up at the very end.
pub struct NetworkScanner {
    tokenizer: Tokenizer<Extractor>,
    input: BufferQueue,
    /// Trailing bytes of an incomplete UTF-8 sequence
    partial: Vec<u8>,
}

impl NetworkScanner {
    /// Create a scanner for a fresh response
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(Extractor::default(), TokenizerOpts::default()),
            input: BufferQueue::default(),
            partial: Vec::new(),
        }
    }

    #[cfg(test)]
    fn phase(&self) -> Phase {
        self.tokenizer.sink.phase
    }

    /// Scan the next chunk of the body
    pub fn feed(&mut self, chunk: &[u8]) -> Option<String> {
        if self.tokenizer.sink.answer.is_some() {
            return self.tokenizer.sink.answer.clone();
        }

        let mut bytes = std::mem::take(&mut self.partial);
        bytes.extend_from_slice(chunk);

        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    // valid_up_to marks a char boundary
                    self.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            self.push_str("\u{FFFD}");
                            rest = &tail[len..];
                        }
                        None => {
                            self.partial = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        let _ = self.tokenizer.feed(&mut self.input);
        self.tokenizer.sink.answer.clone()
    }

    /// Signal the end of the body
    pub fn finish(mut self) -> Option<String> {
        if let Some(answer) = self.tokenizer.sink.answer.take() {
            return Some(answer);
        }
        if !self.partial.is_empty() {
            let tail = String::from_utf8_lossy(&self.partial).into_owned();
            self.push_str(&tail);
            let _ = self.tokenizer.feed(&mut self.input);
        }
        self.tokenizer.end();
        self.tokenizer.sink.answer.take()
    }

    fn push_str(&mut self, text: &str) {
        if !text.is_empty() {
            self.input.push_back(StrTendril::from_slice(text));
        }
    }
}

impl Default for NetworkScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan a complete document held in memory
#[cfg(test)]
pub(crate) fn scan_document(html: &str) -> Option<String> {
    let mut scanner = NetworkScanner::new();
    scanner
        .feed(html.as_bytes())
        .or_else(|| scanner.finish())
}
