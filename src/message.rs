use crate::config::ArchiveRules;
use crate::filter::Fields;
use crate::mbox::RawMessage;
use mail_parser::MessageParser;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// The named fields of a message, keyed by lower-case name
///
/// Every header is available under its lower-cased name, with folded lines
/// joined. On top of the headers:
///
/// - `subject` holds the decoded subject
/// - `body` holds the first text part, decoded
/// - `envelope` holds the sender from the archive's separator line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    fields: BTreeMap<String, String>,
}

impl Message {
    pub fn from_raw(raw: &RawMessage, rules: &ArchiveRules) -> Self {
        let content = if rules.unescape_from {
            raw.unescaped_content()
        } else {
            Cow::Borrowed(raw.content())
        };

        let mut fields = BTreeMap::new();
        fields.insert("envelope".to_string(), raw.envelope_sender());

        if let Some(parsed) = MessageParser::default().parse(content.as_ref()) {
            for header in parsed.headers() {
                let name = header.name().to_lowercase();
                if fields.contains_key(&name) {
                    continue;
                }
                let start = header.offset_start as usize;
                let end = header.offset_end as usize;
                let value = content.get(start..end).unwrap_or_default();
                fields.insert(name, unfold(value));
            }

            if let Some(subject) = parsed.subject() {
                fields.insert("subject".to_string(), subject.to_string());
            }
            let body = parsed
                .body_text(0)
                .map(|body| body.into_owned())
                .unwrap_or_default();
            fields.insert("body".to_string(), body);
        }

        Message { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Message {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Message {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
        }
    }
}

impl Fields for Message {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(Cow::Borrowed)
    }
}

/// Join folded header lines into a single trimmed value
fn unfold(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
