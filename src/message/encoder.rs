//! `multipart/related` rendering of a [`MailRequest`]
//!
//! Every line is handed to the writer as soon as it is formatted, so the
//! message is never assembled in memory as a whole. The writer is expected
//! to take care of SMTP transparency. The closing delimiter,
//! [`Boundary::closing`], is written when the session finishes.

use std::{
    fmt,
    io::{self, Write},
};

use base64::{engine::general_purpose::STANDARD, Engine};

use super::MailRequest;

/// Raw bytes encoded on each base64 line, giving 76 columns
const BASE64_LINE_INPUT: usize = 57;

/// The token delimiting every part of the multipart body
///
/// The token is not checked against the content of the parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary(&'static str);

impl Boundary {
    /// The boundary used by every session
    pub const FRONTIER: Boundary = Boundary("frontier");

    /// Bare token, as announced in `Content-Type`
    pub fn token(&self) -> &'static str {
        self.0
    }

    /// Line opening a part
    pub fn delimiter(&self) -> String {
        format!("--{}\r\n", self.0)
    }

    /// Line closing the multipart body
    pub fn closing(&self) -> String {
        format!("--{}--\r\n", self.0)
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Boundary::FRONTIER
    }
}

/// Writes the MIME body of a request, one part at a time
#[derive(Debug, Clone, Copy)]
pub struct MessageEncoder<'a> {
    request: &'a MailRequest,
    boundary: Boundary,
}

impl<'a> MessageEncoder<'a> {
    /// Creates an encoder for `request`
    pub fn new(request: &'a MailRequest, boundary: Boundary) -> Self {
        Self { request, boundary }
    }

    /// Top level headers followed by the HTML part
    pub fn write_message<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let request = self.request;

        write_line(out, format_args!("MIME-Version: 1.0"))?;
        write_line(out, format_args!("FROM: {}", request.from().display_name()))?;
        write_line(out, format_args!("TO: {}", request.to().display_name()))?;
        write_line(out, format_args!("SUBJECT: {}", request.subject()))?;
        write_line(
            out,
            format_args!(
                "Content-Type: multipart/related; boundary={}",
                self.boundary.token()
            ),
        )?;

        out.write_all(self.boundary.delimiter().as_bytes())?;
        write_line(out, format_args!("Content-Type: text/html;charset=\"utf-8\""))?;
        write_line(out, format_args!(""))?;
        write_line(out, format_args!("{}", self.html()))
    }

    /// Attachment part headers followed by `contents` in base64
    pub fn write_attachment<W: Write>(&self, out: &mut W, contents: &[u8]) -> io::Result<()> {
        let attachment = self.request.attachment();

        out.write_all(self.boundary.delimiter().as_bytes())?;
        write_line(
            out,
            format_args!(
                "Content-Type: {}; name={}",
                attachment.mime().essence_str(),
                attachment.filename()
            ),
        )?;
        write_line(
            out,
            format_args!(
                "Content-Disposition: attachment;filename=\"{}\"",
                attachment.filename()
            ),
        )?;
        write_line(out, format_args!("Content-Transfer-Encoding: base64"))?;
        if let Some(id) = attachment.id() {
            write_line(out, format_args!("Content-ID: <{id}>"))?;
        }
        write_line(out, format_args!(""))?;

        for line in base64_lines(contents) {
            write_line(out, format_args!("{line}"))?;
        }
        Ok(())
    }

    /// The HTML document of the first part
    ///
    /// The image block is only present when the attachment has a content id.
    pub fn html(&self) -> String {
        let request = self.request;
        let image = match request.attachment().id() {
            Some(id) => format!("<div><img src=\"cid:{id}\"></div>"),
            None => String::new(),
        };

        format!(
            "<html><body><h1>{}</h1>{}{image}</body></html>",
            request.subject(),
            request.body()
        )
    }
}

/// Encodes `data` as base64, wrapped at 76 columns with CRLF
pub fn encode_base64(data: &[u8]) -> String {
    base64_lines(data).collect::<Vec<_>>().join("\r\n")
}

fn base64_lines(data: &[u8]) -> impl Iterator<Item = String> + '_ {
    data.chunks(BASE64_LINE_INPUT)
        .map(|chunk| STANDARD.encode(chunk))
}

/// Formats a line and hands it to the writer with a single call
fn write_line<W: Write>(out: &mut W, line: fmt::Arguments<'_>) -> io::Result<()> {
    let mut buf = line.to_string();
    buf.push_str("\r\n");
    out.write_all(buf.as_bytes())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::message::{Attachment, Mailbox};

    fn request(attachment: Attachment) -> MailRequest {
        MailRequest::builder()
            .from(Mailbox::new(Some("Alice".into()), "a@x.com".parse().unwrap()))
            .to(Mailbox::new(None, "b@x.com".parse().unwrap()))
            .subject("Hi")
            .body("<p>hello</p>")
            .attachment(attachment)
            .build()
            .unwrap()
    }

    fn decode_base64(lines: &str) -> Vec<u8> {
        STANDARD.decode(lines.replace("\r\n", "")).unwrap()
    }

    #[test]
    fn message_headers_and_html() {
        let request = request(Attachment::new("photo.jpg", "photo.jpg").content_id("img1"));
        let mut out = Vec::new();
        MessageEncoder::new(&request, Boundary::FRONTIER)
            .write_message(&mut out)
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                "MIME-Version: 1.0\r\n",
                "FROM: Alice\r\n",
                "TO: b@x.com\r\n",
                "SUBJECT: Hi\r\n",
                "Content-Type: multipart/related; boundary=frontier\r\n",
                "--frontier\r\n",
                "Content-Type: text/html;charset=\"utf-8\"\r\n",
                "\r\n",
                "<html><body><h1>Hi</h1><p>hello</p>",
                "<div><img src=\"cid:img1\"></div></body></html>\r\n",
            )
        );
    }

    #[test]
    fn html_without_content_id() {
        let request = request(Attachment::new("photo.jpg", "photo.jpg"));
        let html = MessageEncoder::new(&request, Boundary::FRONTIER).html();

        assert_eq!(html, "<html><body><h1>Hi</h1><p>hello</p></body></html>");
        assert!(!html.contains("<img"));
    }

    #[test]
    fn html_with_content_id() {
        let request = request(Attachment::new("photo.jpg", "photo.jpg").content_id("img1"));
        let html = MessageEncoder::new(&request, Boundary::FRONTIER).html();

        assert_eq!(html.matches("<img").count(), 1);
        assert_eq!(html.matches("<img src=\"cid:img1\">").count(), 1);
    }

    #[test]
    fn attachment_part() {
        let request = request(Attachment::new("photo.jpg", "photo.jpg").content_id("img1"));
        let mut out = Vec::new();
        MessageEncoder::new(&request, Boundary::FRONTIER)
            .write_attachment(&mut out, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9])
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                "--frontier\r\n",
                "Content-Type: image/jpeg; name=photo.jpg\r\n",
                "Content-Disposition: attachment;filename=\"photo.jpg\"\r\n",
                "Content-Transfer-Encoding: base64\r\n",
                "Content-ID: <img1>\r\n",
                "\r\n",
                "AAECAwQFBgcICQ==\r\n",
            )
        );
    }

    #[test]
    fn attachment_part_custom_type_without_id() {
        let attachment =
            Attachment::new("cat.png", "cat.png").content_type("image/png".parse().unwrap());
        let request = request(attachment);
        let mut out = Vec::new();
        MessageEncoder::new(&request, Boundary::FRONTIER)
            .write_attachment(&mut out, b"cat")
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Content-Type: image/png; name=cat.png\r\n"));
        assert!(!out.contains("Content-ID"));
    }

    #[test]
    fn boundary_appears_once_per_part() {
        let request = request(Attachment::new("photo.jpg", "photo.jpg").content_id("img1"));
        let encoder = MessageEncoder::new(&request, Boundary::FRONTIER);
        let mut out = Vec::new();
        encoder.write_message(&mut out).unwrap();
        encoder.write_attachment(&mut out, b"some bytes").unwrap();
        out.extend_from_slice(Boundary::FRONTIER.closing().as_bytes());

        let out = String::from_utf8(out).unwrap();
        let html_at = out.find("Content-Type: text/html").unwrap();
        let image_at = out.find("Content-Type: image/jpeg").unwrap();

        assert_eq!(out.matches("--frontier\r\n").count(), 2);
        assert_eq!(out.matches("--frontier--\r\n").count(), 1);
        assert_eq!(out[..html_at].matches("--frontier\r\n").count(), 1);
        assert_eq!(out[html_at..image_at].matches("--frontier\r\n").count(), 1);
        assert!(out.ends_with("--frontier--\r\n"));
    }

    #[test]
    fn attachment_round_trips() {
        let contents: Vec<u8> = (0..=255).cycle().take(1000).collect();
        let request = request(Attachment::new("data.bin", "data.bin"));
        let mut out = Vec::new();
        MessageEncoder::new(&request, Boundary::FRONTIER)
            .write_attachment(&mut out, &contents)
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        let (_, body) = out.split_once("\r\n\r\n").unwrap();
        assert_eq!(decode_base64(body), contents);
    }

    #[test]
    fn base64_encode_bytes() {
        assert_eq!(
            encode_base64(&[0; 80]),
            concat!(
                "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA\r\n",
                "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
            )
        );
    }

    #[test]
    fn base64_encode_bytes_wrapping() {
        assert_eq!(
            encode_base64(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9].repeat(20)),
            concat!(
                "AAECAwQFBgcICQABAgMEBQYHCAkAAQIDBAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAkAAQIDBAUG\r\n",
                "BwgJAAECAwQFBgcICQABAgMEBQYHCAkAAQIDBAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAkAAQID\r\n",
                "BAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAkAAQIDBAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAkA\r\n",
                "AQIDBAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAk="
            )
        );
    }

    #[test]
    fn base64_empty() {
        assert_eq!(encode_base64(&[]), "");
    }
}
