//! `INTERFACESv4="..."` / `INTERFACESv6="..."` shell assignments.
use crate::interface_store::{InterfaceFamily, InterfaceSet};

/// Raw value of the first `KEY="..."` assignment for `family` anywhere in `content`, or `""`.
pub(crate) fn value(content: &str, family: InterfaceFamily) -> &str {
    let opening = format!("{}=\"", family.key());
    content
        .find(&opening)
        .and_then(|at| content[at + opening.len()..].split_once('"'))
        .map_or("", |(value, _)| value)
}

/// Rewrite `content` line by line, replacing each line that starts with an `INTERFACES` key
/// with a fresh assignment from `set`. Other lines keep their content and order.
pub(crate) fn rewrite(content: &str, set: &InterfaceSet) -> String {
    let lines: Vec<String> = content
        .lines()
        .map(|line| {
            InterfaceFamily::ALL
                .into_iter()
                .find(|family| line.starts_with(&format!("{}=", family.key())))
                .map_or_else(|| line.to_string(), |family| assignment(family, set))
        })
        .collect();

    let mut rewritten = lines.join("\n");
    if !lines.is_empty() && !rewritten.ends_with('\n') {
        rewritten.push('\n');
    }
    rewritten
}

fn assignment(family: InterfaceFamily, set: &InterfaceSet) -> String {
    format!("{}=\"{}\"", family.key(), set.get(family))
}
