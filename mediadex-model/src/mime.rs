use std::fmt::{self, Display, Formatter};

/// File formats the index distinguishes between.
///
/// Declaration order is the order used when sorting by mime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mime {
    ImageJpeg,
    ImagePng,
    ImageWebp,
    ImageBmp,
    AnimationGif,
    AnimationApng,
    VideoMp4,
    VideoWebm,
    VideoMkv,
    AudioMp3,
    AudioFlac,
    AudioOgg,
    ApplicationPdf,
    ApplicationZip,
    /// Pseudo mime reported by collections.
    ApplicationClientCollection,
    Unknown,
}

impl Mime {
    pub const ALL: [Mime; 16] = [
        Mime::ImageJpeg,
        Mime::ImagePng,
        Mime::ImageWebp,
        Mime::ImageBmp,
        Mime::AnimationGif,
        Mime::AnimationApng,
        Mime::VideoMp4,
        Mime::VideoWebm,
        Mime::VideoMkv,
        Mime::AudioMp3,
        Mime::AudioFlac,
        Mime::AudioOgg,
        Mime::ApplicationPdf,
        Mime::ApplicationZip,
        Mime::ApplicationClientCollection,
        Mime::Unknown,
    ];

    /// The conventional `type/subtype` string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Mime::ImageJpeg => "image/jpeg",
            Mime::ImagePng => "image/png",
            Mime::ImageWebp => "image/webp",
            Mime::ImageBmp => "image/bmp",
            Mime::AnimationGif => "image/gif",
            Mime::AnimationApng => "image/apng",
            Mime::VideoMp4 => "video/mp4",
            Mime::VideoWebm => "video/webm",
            Mime::VideoMkv => "video/x-matroska",
            Mime::AudioMp3 => "audio/mp3",
            Mime::AudioFlac => "audio/flac",
            Mime::AudioOgg => "audio/ogg",
            Mime::ApplicationPdf => "application/pdf",
            Mime::ApplicationZip => "application/zip",
            Mime::ApplicationClientCollection => {
                "application/x-mediadex-collection"
            }
            Mime::Unknown => "application/unknown",
        }
    }

    pub fn from_mime_type(raw: &str) -> Mime {
        let raw = raw.trim().to_ascii_lowercase();
        Mime::ALL
            .iter()
            .copied()
            .find(|mime| mime.mime_type() == raw)
            .unwrap_or(Mime::Unknown)
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            Mime::ImageJpeg | Mime::ImagePng | Mime::ImageWebp | Mime::ImageBmp
        )
    }

    pub fn is_animation(&self) -> bool {
        matches!(self, Mime::AnimationGif | Mime::AnimationApng)
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Mime::VideoMp4 | Mime::VideoWebm | Mime::VideoMkv)
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Mime::AudioMp3 | Mime::AudioFlac | Mime::AudioOgg)
    }

    /// Formats that can make sound when opened.
    pub fn is_noisy(&self) -> bool {
        self.is_video() || self.is_audio()
    }

    pub fn has_thumbnail(&self) -> bool {
        self.is_image()
            || self.is_animation()
            || self.is_video()
            || matches!(self, Mime::ApplicationClientCollection)
    }
}

impl Display for Mime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mime::ImageJpeg => "jpeg",
            Mime::ImagePng => "png",
            Mime::ImageWebp => "webp",
            Mime::ImageBmp => "bitmap",
            Mime::AnimationGif => "animated gif",
            Mime::AnimationApng => "animated png",
            Mime::VideoMp4 => "mp4",
            Mime::VideoWebm => "webm",
            Mime::VideoMkv => "matroska",
            Mime::AudioMp3 => "mp3",
            Mime::AudioFlac => "flac",
            Mime::AudioOgg => "ogg",
            Mime::ApplicationPdf => "pdf",
            Mime::ApplicationZip => "zip",
            Mime::ApplicationClientCollection => "collection",
            Mime::Unknown => "unknown filetype",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_strings_round_trip() {
        for mime in Mime::ALL {
            if mime == Mime::Unknown {
                continue;
            }
            assert_eq!(Mime::from_mime_type(mime.mime_type()), mime);
        }
        assert_eq!(Mime::from_mime_type("text/x-nonsense"), Mime::Unknown);
    }

    #[test]
    fn noisy_covers_audio_and_video() {
        assert!(Mime::VideoWebm.is_noisy());
        assert!(Mime::AudioFlac.is_noisy());
        assert!(!Mime::ImagePng.is_noisy());
        assert!(!Mime::AnimationGif.is_noisy());
    }
}
