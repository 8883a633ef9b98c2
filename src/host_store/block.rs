//! Scanner for `host NAME { ... }` blocks in ISC-DHCP configuration text.
//!
//! The scanner walks the text looking for the `host` keyword and then tries to complete a block
//! from there: at least one whitespace character, a name, optional whitespace, `{`, a body that
//! contains no `}`, and the closing `}`. Candidates that don't complete are skipped and the scan
//! resumes one byte further along, so the first block found is always the leftmost one.
//!
//! Everything outside the returned spans is opaque to the scanner. Nested braces are not
//! understood: the body ends at the first `}`.
use crate::host_store::HostRecord;
use std::ops::Range;

const KEYWORD: &str = "host";

const HARDWARE_ETHERNET: &str = "hardware ethernet";
const OPTION_ROUTERS: &str = "option routers";
const OPTION_SUBNET_MASK: &str = "option subnet-mask";
const FIXED_ADDRESS: &str = "fixed-address";
const OPTION_DOMAIN_NAME_SERVERS: &str = "option domain-name-servers";

/// A host block located in configuration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HostBlock<'a> {
    /// Byte range from the `host` keyword through the closing `}`.
    pub span: Range<usize>,
    pub name: &'a str,
    /// Text between the braces.
    pub body: &'a str,
}

impl HostBlock<'_> {
    /// Extract the record described by this block. Fields missing from the body are empty; when
    /// a field appears more than once the first occurrence wins.
    pub fn record(&self) -> HostRecord {
        HostRecord {
            name: self.name.to_string(),
            hardware_ethernet: field(self.body, HARDWARE_ETHERNET).to_string(),
            option_routers: field(self.body, OPTION_ROUTERS).to_string(),
            option_subnet_mask: field(self.body, OPTION_SUBNET_MASK).to_string(),
            fixed_address: field(self.body, FIXED_ADDRESS).to_string(),
            option_domain_name_servers: field(self.body, OPTION_DOMAIN_NAME_SERVERS).to_string(),
        }
    }
}

/// Every non-overlapping host block in `text`, in file order.
pub(crate) fn blocks(text: &str) -> Vec<HostBlock<'_>> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(start) = next_keyword(text, from) {
        match block_at(text, start) {
            Some(block) => {
                from = block.span.end;
                found.push(block);
            }
            None => from = start + 1,
        }
    }
    found
}

/// The first block named exactly `name` that has a non-empty body.
pub(crate) fn find_named<'a>(text: &'a str, name: &str) -> Option<HostBlock<'a>> {
    let mut from = 0;
    while let Some(start) = next_keyword(text, from) {
        if let Some(named) = named_block_at(text, start, name, 1) {
            return Some(HostBlock {
                span: start..named.end,
                name: &text[named.name],
                body: &text[named.body],
            });
        }
        from = start + 1;
    }
    None
}

/// Byte range of the first block named exactly `name`, widened over the whitespace on either
/// side of it. The block body may be empty.
pub(crate) fn find_named_padded(text: &str, name: &str) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(start) = next_keyword(text, from) {
        if let Some(NamedMatch { end, .. }) = named_block_at(text, start, name, 0) {
            let lead = bytes[..start]
                .iter()
                .rev()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            return Some(start - lead..skip_space(bytes, end));
        }
        from = start + 1;
    }
    None
}

fn next_keyword(text: &str, from: usize) -> Option<usize> {
    text.get(from..)?.find(KEYWORD).map(|offset| from + offset)
}

fn skip_space(bytes: &[u8], mut at: usize) -> usize {
    while bytes.get(at).is_some_and(u8::is_ascii_whitespace) {
        at += 1;
    }
    at
}

/// Completes `{ body }` at `open`. Returns the body range and the offset just past `}`.
fn close_block(bytes: &[u8], open: usize, min_body: usize) -> Option<(Range<usize>, usize)> {
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let body_start = open + 1;
    let close = body_start + bytes[body_start..].iter().position(|&b| b == b'}')?;
    (close - body_start >= min_body).then_some((body_start..close, close + 1))
}

fn block_at(text: &str, start: usize) -> Option<HostBlock<'_>> {
    let bytes = text.as_bytes();
    let after_keyword = start + KEYWORD.len();
    let name_start = skip_space(bytes, after_keyword);
    if name_start == after_keyword {
        return None;
    }
    let name_end = bytes[name_start..]
        .iter()
        .position(u8::is_ascii_whitespace)
        .map_or(bytes.len(), |len| name_start + len);
    if name_end == name_start {
        return None;
    }

    // Prefer the longest name. A shorter one only works when a `{` is glued to it.
    let longest = std::iter::once((name_end, skip_space(bytes, name_end)));
    let shorter = (name_start + 1..name_end)
        .rev()
        .filter(|&end| bytes[end] == b'{')
        .map(|end| (end, end));
    longest.chain(shorter).find_map(|(end, open)| {
        close_block(bytes, open, 1).map(|(body, block_end)| HostBlock {
            span: start..block_end,
            name: &text[name_start..end],
            body: &text[body],
        })
    })
}

struct NamedMatch {
    name: Range<usize>,
    body: Range<usize>,
    end: usize,
}

/// Matches `host`, whitespace, the literal `name`, optional whitespace and a block at `start`.
fn named_block_at(text: &str, start: usize, name: &str, min_body: usize) -> Option<NamedMatch> {
    let bytes = text.as_bytes();
    let after_keyword = start + KEYWORD.len();
    let space_end = skip_space(bytes, after_keyword);
    // The separating whitespace may give bytes back to a name that itself starts with whitespace.
    (after_keyword + 1..=space_end)
        .rev()
        .filter(|&at| text[at..].starts_with(name))
        .find_map(|at| {
            let name_end = at + name.len();
            close_block(bytes, skip_space(bytes, name_end), min_body).map(|(body, end)| {
                NamedMatch {
                    name: at..name_end,
                    body,
                    end,
                }
            })
        })
}

/// Value of the first `LABEL<whitespace>VALUE;` in `body`, trimmed, or `""` when absent.
fn field<'a>(body: &'a str, label: &str) -> &'a str {
    let mut from = 0;
    while let Some(offset) = body[from..].find(label) {
        let at = from + offset;
        let rest = &body[at + label.len()..];
        if let Some(raw) = rest.split_once(';').map(|(raw, _)| raw) {
            // Whitespace must separate label and value, and something must follow it.
            if raw.len() >= 2 && raw.as_bytes()[0].is_ascii_whitespace() {
                return raw.trim();
            }
        }
        from = at + 1;
    }
    ""
}
