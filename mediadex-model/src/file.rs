use crate::ids::FileHash;
use crate::mime::Mime;

/// Intrinsic attributes of one file.
///
/// Values never change once built; the `with_*` methods consume the value and
/// hand back an updated copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileMetadata {
    hash: FileHash,
    size: Option<u64>,
    mime: Mime,
    width: Option<u32>,
    height: Option<u32>,
    duration_ms: Option<u64>,
    num_frames: Option<u64>,
    num_words: Option<u64>,
}

impl FileMetadata {
    pub fn new(hash: FileHash, mime: Mime) -> Self {
        Self {
            hash,
            size: None,
            mime,
            width: None,
            height: None,
            duration_ms: None,
            num_frames: None,
            num_words: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_num_frames(mut self, num_frames: u64) -> Self {
        self.num_frames = Some(num_frames);
        self
    }

    pub fn with_num_words(mut self, num_words: u64) -> Self {
        self.num_words = Some(num_words);
        self
    }

    pub fn hash(&self) -> FileHash {
        self.hash
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn mime(&self) -> Mime {
        self.mime
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn resolution(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn num_frames(&self) -> Option<u64> {
        self.num_frames
    }

    pub fn num_words(&self) -> Option<u64> {
        self.num_words
    }

    pub fn num_pixels(&self) -> Option<u64> {
        let (width, height) = self.resolution()?;
        Some(u64::from(width) * u64::from(height))
    }

    /// Width over height. `None` when either side is unknown or zero.
    pub fn ratio(&self) -> Option<f64> {
        match self.resolution()? {
            (0, _) | (_, 0) => None,
            (width, height) => Some(f64::from(width) / f64::from(height)),
        }
    }

    pub fn has_duration(&self) -> bool {
        self.duration_ms.is_some_and(|ms| ms > 0)
    }

    /// Single-frame media that is not a duration-bearing stream.
    pub fn is_static_image(&self) -> bool {
        self.mime.is_image() && !self.has_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_guards_zero_and_missing_dimensions() {
        let hash = FileHash::of_content(b"a");
        let base = FileMetadata::new(hash, Mime::ImagePng);
        assert_eq!(base.ratio(), None);
        assert_eq!(base.clone().with_resolution(0, 10).ratio(), None);
        assert_eq!(base.clone().with_resolution(10, 0).ratio(), None);
        assert_eq!(base.with_resolution(20, 10).ratio(), Some(2.0));
    }

    #[test]
    fn builders_return_updated_copies() {
        let hash = FileHash::of_content(b"b");
        let original = FileMetadata::new(hash, Mime::VideoMp4);
        let sized = original.clone().with_size(1024).with_duration_ms(5_000);
        assert_eq!(original.size(), None);
        assert_eq!(sized.size(), Some(1024));
        assert!(sized.has_duration());
        assert_eq!(sized.hash(), original.hash());
    }
}
