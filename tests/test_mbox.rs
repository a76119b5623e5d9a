use mailfilter::config::ArchiveRules;
use mailfilter::filter::CompiledFilter;
use mailfilter::mbox::MboxReader;
use mailfilter::message::Message;
use std::io::Cursor;

const ARCHIVE: &str = concat!(
    "From alice@example.org Fri Jun 05 23:22:35 2020\n",
    "From: Alice <alice@example.org>\n",
    "To: bob@example.org,\n",
    "  carol@example.org\n",
    "Subject: =?UTF-8?Q?Caf=C3=A9_menu?=\n",
    "Date: Fri, 05 Jun 2020 23:22:35 +0000\n",
    "X-Mailer: TestMailer 1.0\n",
    "\n",
    "Soup of the day.\n",
    ">From the kitchen with love\n",
    "\n",
    "From bob@example.org Sat Jun 06 10:00:00 2020\n",
    "From: Bob <bob@example.org>\n",
    "To: alice@example.org\n",
    "Subject: Re: Cafe menu\n",
    "MIME-Version: 1.0\n",
    "Content-Type: multipart/alternative; boundary=\"sep\"\n",
    "\n",
    "--sep\n",
    "Content-Type: text/plain; charset=utf-8\n",
    "\n",
    "Thank you for the tax form\n",
    "--sep\n",
    "Content-Type: text/html; charset=utf-8\n",
    "\n",
    "<p>Thank you for the tax form</p>\n",
    "--sep--\n",
);

fn messages(rules: &ArchiveRules) -> Vec<Message> {
    MboxReader::new(Cursor::new(ARCHIVE.as_bytes()))
        .map(|raw| Message::from_raw(&raw.expect("readable archive"), rules))
        .collect()
}

#[test]
fn test_headers_are_available_by_lowercase_name() {
    let messages = messages(&ArchiveRules::default());
    assert_eq!(messages.len(), 2);

    let first = &messages[0];
    assert_eq!(first.get("from"), Some("Alice <alice@example.org>"));
    assert_eq!(first.get("x-mailer"), Some("TestMailer 1.0"));
    assert_eq!(first.get("date"), Some("Fri, 05 Jun 2020 23:22:35 +0000"));
    assert_eq!(first.get("envelope"), Some("alice@example.org"));
}

#[test]
fn test_folded_headers_are_joined() {
    let messages = messages(&ArchiveRules::default());
    assert_eq!(
        messages[0].get("to"),
        Some("bob@example.org, carol@example.org")
    );
}

#[test]
fn test_encoded_subject_is_decoded() {
    let messages = messages(&ArchiveRules::default());
    assert_eq!(messages[0].get("subject"), Some("Café menu"));
}

#[test]
fn test_body_is_first_text_part() {
    let messages = messages(&ArchiveRules::default());
    let body = messages[1].get("body").expect("body field");
    assert!(body.contains("Thank you for the tax form"));
    assert!(!body.contains("<p>"));
}

#[test]
fn test_quoted_separator_unescaping_follows_config() {
    let unescaped = messages(&ArchiveRules::default());
    assert!(
        unescaped[0]
            .get("body")
            .expect("body field")
            .contains("\nFrom the kitchen")
    );

    let verbatim = messages(&ArchiveRules {
        unescape_from: false,
    });
    assert!(
        verbatim[0]
            .get("body")
            .expect("body field")
            .contains(">From the kitchen")
    );
}

#[test]
fn test_filters_against_parsed_messages() {
    let messages = messages(&ArchiveRules::default());
    let filter = CompiledFilter::compile("subject!~/re:/i and body=~/soup/i").expect("valid");
    let verdicts: Vec<bool> = messages.iter().map(|m| filter.matches(m)).collect();
    assert_eq!(verdicts, vec![true, false]);

    let filter = CompiledFilter::compile("to=~/carol/ or x-mailer^~Test").expect("valid");
    assert!(filter.matches(&messages[0]));
    assert!(!filter.matches(&messages[1]));
}
