//! Raw MIME builder for messages with attachments.
//!
//! Produces a `multipart/mixed` document: one `text/html` part followed by
//! one base64 `application/octet-stream` part per attachment. All lines end
//! in CRLF.

use std::path::Path;

use base64::Engine;
use mailbridge_aws::SimpleEmail;

use crate::error::{MailError, MailResult};
use crate::request::Attachment;

/// Base64 line length for attachment bodies.
const LINE_WIDTH: usize = 76;

/// A fresh boundary token: `boundary` followed by 32 random hex digits.
pub fn new_boundary() -> String {
    format!("boundary{}", uuid::Uuid::new_v4().simple())
}

/// Build the raw message with a freshly generated boundary.
pub fn build_raw_message(email: &SimpleEmail, attachments: &[Attachment]) -> MailResult<String> {
    build_raw_message_with_boundary(email, attachments, &new_boundary())
}

/// Build the raw message around `boundary`.
///
/// Attachments with an empty path are skipped. The first unreadable path
/// aborts the build with a `FileReadError`.
pub fn build_raw_message_with_boundary(
    email: &SimpleEmail,
    attachments: &[Attachment],
    boundary: &str,
) -> MailResult<String> {
    let mut out = String::with_capacity(email.html_body.len() + 1024);

    // ── Headers ────────────────────────────────────────────
    write_header(&mut out, "From", &email.source);
    write_header(&mut out, "To", &email.destination.to_addresses.join(", "));
    if let Some(ref cc) = email.destination.cc_addresses {
        write_header(&mut out, "Cc", &cc.join(", "));
    }
    if let Some(ref bcc) = email.destination.bcc_addresses {
        write_header(&mut out, "Bcc", &bcc.join(", "));
    }
    if let Some(ref reply_to) = email.reply_to_addresses {
        write_header(&mut out, "Reply-To", &reply_to.join(", "));
    }
    write_header(&mut out, "Subject", &encode_subject(&email.subject));
    write_header(&mut out, "MIME-Version", "1.0");
    write_header(
        &mut out,
        "Content-Type",
        &format!("multipart/mixed; boundary=\"{}\"", boundary),
    );
    out.push_str("\r\n");

    // ── HTML body ──────────────────────────────────────────
    write_boundary(&mut out, boundary);
    write_header(&mut out, "Content-Type", "text/html; charset=UTF-8");
    out.push_str("\r\n");
    out.push_str(&email.html_body);
    out.push_str("\r\n\r\n");

    // ── Attachments ────────────────────────────────────────
    for att in attachments.iter().filter(|a| !a.path.is_empty()) {
        let data = read_attachment(&att.path)?;
        write_boundary(&mut out, boundary);
        write_header(&mut out, "Content-Type", "application/octet-stream");
        write_header(&mut out, "Content-Transfer-Encoding", "base64");
        write_header(
            &mut out,
            "Content-Disposition",
            &format!("attachment; filename=\"{}\"", quote_filename(&att.name)),
        );
        out.push_str("\r\n");
        out.push_str(&wrap_base64(&data));
        out.push_str("\r\n");
    }

    out.push_str(&format!("--{}--\r\n", boundary));
    Ok(out)
}

fn read_attachment(path: &str) -> MailResult<Vec<u8>> {
    let path = Path::new(path);
    std::fs::read(path).map_err(|e| {
        log::warn!("cannot read attachment {}: {}", path.display(), e);
        MailError::file_read(path, &e)
    })
}

// ── Encoding helpers ────────────────────────────────────────────────

fn write_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str("\r\n");
}

fn write_boundary(out: &mut String, boundary: &str) {
    out.push_str("--");
    out.push_str(boundary);
    out.push_str("\r\n");
}

/// Body of a quoted-string: CR and LF are dropped so a name can never end
/// the header line. Backslash and double quote are backslash-escaped.
fn quote_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '\r' | '\n' => {}
            '\\' | '"' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// RFC 2047 encoded word, always base64, whatever the subject contains.
pub fn encode_subject(subject: &str) -> String {
    format!(
        "=?UTF-8?B?{}?=",
        base64::engine::general_purpose::STANDARD.encode(subject.as_bytes())
    )
}

/// Base64 in lines of at most 76 characters, each followed by CRLF.
/// Empty input yields a single empty line.
pub fn wrap_base64(data: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(data);
    if b64.is_empty() {
        return "\r\n".to_string();
    }
    let mut out = String::with_capacity(b64.len() + b64.len() / LINE_WIDTH * 2 + 2);
    // base64 output is ASCII, so byte chunks are char boundaries
    for chunk in b64.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push_str("\r\n");
    }
    out
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mailbridge_aws::Destination;
    use std::io::Write;

    const B: &str = "boundaryTEST";

    fn sample() -> SimpleEmail {
        SimpleEmail {
            source: "a@x.com".to_string(),
            destination: Destination {
                to_addresses: vec!["b@x.com".to_string(), "c@x.com".to_string()],
                cc_addresses: None,
                bcc_addresses: None,
            },
            reply_to_addresses: None,
            subject: "Hi".to_string(),
            html_body: "<b>hi</b>".to_string(),
        }
    }

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f
    }

    fn decode_subject(header_value: &str) -> String {
        let inner = header_value
            .strip_prefix("=?UTF-8?B?")
            .and_then(|s| s.strip_suffix("?="))
            .unwrap();
        let bytes = base64::engine::general_purpose::STANDARD.decode(inner).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn exact_layout_with_one_attachment() {
        let f = temp_file(b"hello");
        let path = f.path().to_str().unwrap().to_string();
        let raw = build_raw_message_with_boundary(
            &sample(),
            &[Attachment::new("f.txt", &path)],
            B,
        )
        .unwrap();

        let expected = concat!(
            "From: a@x.com\r\n",
            "To: b@x.com, c@x.com\r\n",
            "Subject: =?UTF-8?B?SGk=?=\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/mixed; boundary=\"boundaryTEST\"\r\n",
            "\r\n",
            "--boundaryTEST\r\n",
            "Content-Type: text/html; charset=UTF-8\r\n",
            "\r\n",
            "<b>hi</b>\r\n",
            "\r\n",
            "--boundaryTEST\r\n",
            "Content-Type: application/octet-stream\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "Content-Disposition: attachment; filename=\"f.txt\"\r\n",
            "\r\n",
            "aGVsbG8=\r\n",
            "\r\n",
            "--boundaryTEST--\r\n",
        );
        assert_eq!(raw, expected);
    }

    #[test]
    fn optional_headers_in_order() {
        let mut email = sample();
        email.destination.cc_addresses = Some(vec!["d@x.com".into()]);
        email.destination.bcc_addresses = Some(vec!["e@x.com".into(), "f@x.com".into()]);
        email.reply_to_addresses = Some(vec!["r@x.com".into()]);
        let raw = build_raw_message_with_boundary(&email, &[], B).unwrap();

        let headers: Vec<&str> = raw.split("\r\n").take(6).collect();
        assert_eq!(
            headers,
            vec![
                "From: a@x.com",
                "To: b@x.com, c@x.com",
                "Cc: d@x.com",
                "Bcc: e@x.com, f@x.com",
                "Reply-To: r@x.com",
                "Subject: =?UTF-8?B?SGk=?=",
            ]
        );
    }

    #[test]
    fn counts_parts_and_boundaries() {
        let files: Vec<_> = (0..3).map(|i| temp_file(format!("file {}", i).as_bytes())).collect();
        let attachments: Vec<Attachment> = files
            .iter()
            .enumerate()
            .map(|(i, f)| Attachment::new(&format!("f{}.bin", i), f.path().to_str().unwrap()))
            .collect();
        let raw = build_raw_message(&sample(), &attachments).unwrap();

        let boundary = raw
            .split("boundary=\"")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .unwrap()
            .to_string();
        assert_eq!(raw.matches("Content-Disposition: attachment").count(), 3);
        assert_eq!(raw.matches(&format!("--{}", boundary)).count(), 3 + 2);
        assert!(raw.ends_with(&format!("--{}--\r\n", boundary)));
    }

    #[test]
    fn empty_path_is_skipped() {
        let f = temp_file(b"x");
        let attachments = vec![
            Attachment::new("ghost.txt", ""),
            Attachment::new("real.txt", f.path().to_str().unwrap()),
        ];
        let raw = build_raw_message_with_boundary(&sample(), &attachments, B).unwrap();
        assert!(!raw.contains("ghost.txt"));
        assert!(raw.contains("filename=\"real.txt\""));
        assert_eq!(raw.matches("Content-Disposition: attachment").count(), 1);
    }

    #[test]
    fn filename_cannot_break_out_of_its_header() {
        let f = temp_file(b"x");
        let raw = build_raw_message_with_boundary(
            &sample(),
            &[Attachment::new(
                "a\"b\r\nBcc: evil@x.com\\.txt",
                f.path().to_str().unwrap(),
            )],
            B,
        )
        .unwrap();
        assert!(raw.contains(
            "Content-Disposition: attachment; filename=\"a\\\"bBcc: evil@x.com\\\\.txt\"\r\n"
        ));
        assert!(!raw.contains("\r\nBcc:"));
    }

    #[test]
    fn quote_filename_leaves_plain_names_alone() {
        assert_eq!(quote_filename("report 2024.pdf"), "report 2024.pdf");
        assert_eq!(quote_filename("naïve.txt"), "naïve.txt");
    }

    #[test]
    fn unreadable_path_is_file_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        let err = build_raw_message_with_boundary(
            &sample(),
            &[Attachment::new("missing.pdf", missing.to_str().unwrap())],
            B,
        )
        .unwrap_err();
        assert_eq!(err.kind, crate::error::MailErrorKind::FileReadError);
        assert!(err.message.contains("missing.pdf"));
    }

    #[test]
    fn subject_decodes_back() {
        for subject in ["Hi", "Привет, мир", "Order #42: \"ready\" ✓", ""] {
            let encoded = encode_subject(subject);
            assert!(encoded.starts_with("=?UTF-8?B?"));
            assert_eq!(decode_subject(&encoded), subject);
        }
    }

    #[test]
    fn base64_lines_are_wrapped_at_76() {
        let data = vec![0xABu8; 200];
        let wrapped = wrap_base64(&data);
        let lines: Vec<&str> = wrapped.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[..3].iter().all(|l| l.len() == 76));
        assert_eq!(lines[3].len(), 268 - 3 * 76);
        let joined: String = lines.concat();
        assert_eq!(
            base64::engine::general_purpose::STANDARD.decode(joined).unwrap(),
            data
        );
    }

    #[test]
    fn empty_file_gives_blank_payload() {
        assert_eq!(wrap_base64(b""), "\r\n");
    }

    #[test]
    fn boundaries_are_unique() {
        let a = new_boundary();
        let b = new_boundary();
        assert_ne!(a, b);
        assert!(a.starts_with("boundary"));
        assert_eq!(a.len(), "boundary".len() + 32);
    }
}
