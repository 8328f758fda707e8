use std::{
    fs, io,
    path::{Path, PathBuf},
};

use mime::Mime;

/// The single file sent along with the HTML part
///
/// The file is labelled `image/jpeg` unless another content type is given.
/// When a content id is set, the HTML part shows the file inline through
/// `<img src="cid:...">`.
///
/// ```
/// use mailpost::Attachment;
///
/// let attachment = Attachment::new("/tmp/cat.png", "cat.png")
///     .content_type("image/png".parse().unwrap())
///     .content_id("image1");
/// assert_eq!(attachment.id(), Some("image1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
    filename: String,
    content_type: Mime,
    content_id: Option<String>,
}

impl Attachment {
    /// Attach the file at `path`, announced to the recipient as `filename`
    pub fn new<P: Into<PathBuf>, F: Into<String>>(path: P, filename: F) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
            content_type: mime::IMAGE_JPEG,
            content_id: None,
        }
    }

    /// Override the default `image/jpeg` label
    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.content_type = content_type;
        self
    }

    /// For use in inline attachments
    pub fn content_id<S: Into<String>>(mut self, content_id: S) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    /// Location of the file on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name announced in `Content-Type` and `Content-Disposition`
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Content type of the part
    pub fn mime(&self) -> &Mime {
        &self.content_type
    }

    /// Content id referenced by the HTML part, if any
    pub fn id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    /// Reads the whole file
    ///
    /// The error keeps the original kind and names the path.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::Attachment;

    #[test]
    fn defaults_to_jpeg() {
        let attachment = Attachment::new("photo.jpg", "photo.jpg");
        assert_eq!(attachment.mime(), &mime::IMAGE_JPEG);
        assert_eq!(attachment.id(), None);
    }

    #[test]
    fn read_missing_file() {
        let attachment = Attachment::new("/nonexistent/mailpost/photo.jpg", "photo.jpg");
        let err = attachment.read().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("/nonexistent/mailpost/photo.jpg"));
    }

    #[test]
    fn read_file() {
        let path = std::env::temp_dir().join(format!("mailpost-read-{}", std::process::id()));
        std::fs::write(&path, [1, 2, 3]).unwrap();

        let attachment = Attachment::new(&path, "data.bin");
        assert_eq!(attachment.read().unwrap(), vec![1, 2, 3]);

        std::fs::remove_file(path).unwrap();
    }
}
