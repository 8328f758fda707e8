use std::{env, time::Duration};

use mailpost::{
    message::{Attachment, Mailbox, MailRequest},
    transport::{ClientId, SmtpTransport},
};

fn main() {
    tracing_subscriber::fmt::init();

    // Usage: send <image> [server] [port]
    let mut args = env::args().skip(1);
    let image = args.next().unwrap_or_else(|| "image.jpg".to_owned());
    let server = args.next().unwrap_or_else(|| "localhost".to_owned());
    let port = args
        .next()
        .and_then(|port| port.parse().ok())
        .unwrap_or(2525);

    let request = MailRequest::builder()
        .from(Mailbox::new(
            Some("NoBody".to_owned()),
            "nobody@domain.tld".parse().unwrap(),
        ))
        .to(Mailbox::new(None, "hei@domain.tld".parse().unwrap()))
        .subject("Happy new year")
        .body("<p>Be happy!</p>")
        .attachment(Attachment::new(&image, "image.jpg").content_id("image1"))
        .build()
        .unwrap();

    let mailer = SmtpTransport::builder(server)
        .port(port)
        .timeout(Some(Duration::from_secs(10)))
        .hello_name(ClientId::Domain("client.domain.tld".to_owned()))
        .build();

    match mailer.send(&request) {
        Ok(response) => println!("Email sent: {}", response.raw().trim_end()),
        Err(e) => panic!("Could not send email: {e:?}"),
    }
}
