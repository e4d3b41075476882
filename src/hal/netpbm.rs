//! Video backend reading binary netpbm streams.
//!
//! A "video file" here is one or more binary PGM (`P5`, grey) or PPM (`P6`,
//! RGB) images written back to back, which is what tools such as
//! `ffmpeg -f image2pipe -vcodec ppm` produce. The file is memory-mapped and
//! frames are copied out one at a time. Only 8-bit images (maxval <= 255)
//! are supported. There is no camera driver, so device targets never open.

use crate::core::Frame;
use crate::hal::{CaptureTarget, VideoBackend, VideoSource};
use anyhow::{anyhow, bail, Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy)]
pub struct NetpbmBackend;

impl NetpbmBackend {
    pub fn new() -> Self {
        Self
    }
}

impl VideoBackend for NetpbmBackend {
    fn open(&mut self, target: &CaptureTarget) -> Result<Box<dyn VideoSource>> {
        match target {
            CaptureTarget::File(path) => Ok(Box::new(NetpbmSource::open(path)?)),
            CaptureTarget::Device(_) => {
                Err(anyhow!("camera devices are not supported by the netpbm backend"))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    width: u32,
    height: u32,
    channels: u8,
    /// Offset of the first pixel byte
    data_offset: usize,
}

impl Header {
    /// Pixel byte count, or `None` when the declared size overflows `usize`.
    fn data_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.channels as usize)
    }
}

pub struct NetpbmSource {
    path: PathBuf,
    map: Mmap,
    pos: usize,
}

impl NetpbmSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot read {}", path.display()))?;
        let len = file.metadata()?.len();
        if len == 0 {
            bail!("{} is empty", path.display());
        }

        // SAFETY: the map is read-only and we never hand out references that
        // outlive a single read call.
        let map = unsafe { Mmap::map(&file)? };

        // Reject files that do not even start with a valid image.
        parse_header(&map, 0).with_context(|| format!("{} is not a netpbm stream", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            map,
            pos: 0,
        })
    }
}

impl VideoSource for NetpbmSource {
    fn read(&mut self, frame: &mut Frame) -> Result<bool> {
        let start = skip_space(&self.map, self.pos);
        if start >= self.map.len() {
            return Ok(false);
        }

        let header = parse_header(&self.map, start)
            .with_context(|| format!("{} at byte {}", self.path.display(), start))?;
        let (data_len, end) = match header
            .data_len()
            .and_then(|n| header.data_offset.checked_add(n).map(|end| (n, end)))
        {
            Some(bounds) => bounds,
            None => bail!(
                "{}: image {}x{} at byte {} is too large",
                self.path.display(),
                header.width,
                header.height,
                start
            ),
        };
        if end > self.map.len() {
            bail!(
                "{}: truncated frame at byte {} ({} of {} bytes)",
                self.path.display(),
                start,
                self.map.len() - header.data_offset,
                data_len
            );
        }

        frame.width = header.width;
        frame.height = header.height;
        frame.channels = header.channels;
        frame.data.clear();
        frame.data.extend_from_slice(&self.map[header.data_offset..end]);
        self.pos = end;
        Ok(true)
    }
}

fn skip_space(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() {
        match buf[pos] {
            b'#' => {
                while pos < buf.len() && buf[pos] != b'\n' {
                    pos += 1;
                }
            }
            b if b.is_ascii_whitespace() => pos += 1,
            _ => break,
        }
    }
    pos
}

fn parse_number(buf: &[u8], pos: &mut usize) -> Result<u32> {
    *pos = skip_space(buf, *pos);
    let start = *pos;
    while *pos < buf.len() && buf[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if start == *pos {
        bail!("expected a number at byte {}", start);
    }
    std::str::from_utf8(&buf[start..*pos])?
        .parse()
        .with_context(|| format!("number out of range at byte {}", start))
}

fn parse_header(buf: &[u8], start: usize) -> Result<Header> {
    let magic = buf.get(start..start + 2).ok_or_else(|| anyhow!("missing magic"))?;
    let channels = match magic {
        b"P5" => 1,
        b"P6" => 3,
        other => bail!("unsupported magic {:?}", String::from_utf8_lossy(other)),
    };

    let mut pos = start + 2;
    let width = parse_number(buf, &mut pos)?;
    let height = parse_number(buf, &mut pos)?;
    let maxval = parse_number(buf, &mut pos)?;
    if width == 0 || height == 0 {
        bail!("zero-sized image {}x{}", width, height);
    }
    if maxval == 0 || maxval > 255 {
        bail!("unsupported maxval {}", maxval);
    }

    // Exactly one whitespace byte separates the header from the pixels.
    match buf.get(pos) {
        Some(b) if b.is_ascii_whitespace() => pos += 1,
        _ => bail!("missing separator after header"),
    }

    Ok(Header {
        width,
        height,
        channels,
        data_offset: pos,
    })
}

/// Encode one frame as binary PGM (1 channel) or PPM (3 channels).
pub fn encode(frame: &Frame) -> Result<Vec<u8>> {
    let magic = match frame.channels {
        1 => "P5",
        3 => "P6",
        n => bail!("cannot encode a {}-channel frame as netpbm", n),
    };
    if frame.is_empty() {
        bail!("cannot encode an empty frame");
    }

    let mut out = format!("{}\n{} {}\n255\n", magic, frame.width, frame.height).into_bytes();
    out.extend_from_slice(&frame.data);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn stream_file(frames: &[Frame]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for frame in frames {
            file.write_all(&encode(frame).unwrap()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_each_frame_then_ends() {
        let grey = Frame::from_data(2, 1, 1, vec![10, 20]).unwrap();
        let rgb = Frame::from_data(1, 1, 3, vec![1, 2, 3]).unwrap();
        let file = stream_file(&[grey.clone(), rgb.clone()]);

        let mut source = NetpbmSource::open(file.path()).unwrap();
        let mut frame = Frame::default();
        assert!(source.read(&mut frame).unwrap());
        assert_eq!(frame, grey);
        assert!(source.read(&mut frame).unwrap());
        assert_eq!(frame, rgb);
        assert!(!source.read(&mut frame).unwrap());
    }

    #[test]
    fn test_header_comments() {
        let buf = b"P5 # grey\n# size next\n3 2\n255\n";
        let header = parse_header(buf, 0).unwrap();
        assert_eq!((header.width, header.height, header.channels), (3, 2, 1));
        assert_eq!(header.data_offset, buf.len());
    }

    #[test]
    fn test_rejects_non_netpbm_and_empty_files() {
        let mut junk = tempfile::NamedTempFile::new().unwrap();
        junk.write_all(b"GIF89a....").unwrap();
        assert!(NetpbmSource::open(junk.path()).is_err());

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(NetpbmSource::open(empty.path()).is_err());

        assert!(NetpbmSource::open(Path::new("/nonexistent/clip.ppm")).is_err());
    }

    #[test]
    fn test_truncated_frame_is_read_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"P5\n4 4\n255\n\x00\x00").unwrap();
        file.flush().unwrap();

        let mut source = NetpbmSource::open(file.path()).unwrap();
        assert!(source.read(&mut Frame::default()).is_err());
    }

    #[test]
    fn test_oversized_header_is_read_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"P6\n4294967295 4294967295\n255\n\x00").unwrap();
        file.flush().unwrap();

        // The header is well formed, so the stream opens; the size is only
        // checked against the file when a frame is read.
        let mut source = NetpbmSource::open(file.path()).unwrap();
        let mut frame = Frame::new(2, 2, 1);
        let err = source.read(&mut frame).unwrap_err();
        assert!(err.to_string().contains("too large"), "{:#}", err);
        assert_eq!(frame, Frame::new(2, 2, 1));
    }

    #[test]
    fn test_devices_never_open() {
        let mut backend = NetpbmBackend::new();
        assert!(backend.open(&CaptureTarget::Device(0)).is_err());
    }

    #[test]
    fn test_encode_rejects_unsupported_channels() {
        assert!(encode(&Frame::new(2, 2, 4)).is_err());
        assert!(encode(&Frame::default()).is_err());
    }
}
