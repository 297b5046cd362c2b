//! 인코딩 변환 모듈
//!
//! 레거시 코드 페이지로 저장된 파일을 디코딩하여 BOM 없는 UTF-8 로 다시 기록합니다.
//! 디코딩은 두 단계로 결정됩니다.
//!
//! 1. 알려진 BOM 테이블 검사 (UTF-32LE / UTF-32BE / UTF-16LE / UTF-16BE / UTF-8)
//! 2. BOM이 없을 때만 호출자가 지정한 인코딩 이름을 사용 (해석 불가 시 에러)

use encoding_rs::Encoding;
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::ops::Deref;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Result, Utf8ifyError};

/// 한 번 읽은 파일 내용
///
/// 대용량 파일은 메모리 매핑, 그 외에는 힙 버퍼로 보관합니다.
pub enum FileBuffer {
    Heap(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for FileBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBuffer::Heap(bytes) => bytes,
            FileBuffer::Mapped(mmap) => mmap,
        }
    }
}

/// 파일 전체를 한 번 읽기
///
/// # Arguments
/// * `path` - 읽을 파일 경로
/// * `mmap_threshold` - 이 크기 이상이면 메모리 매핑 사용
pub fn read_file(path: &Path, mmap_threshold: u64) -> Result<FileBuffer> {
    let read_error = |e: std::io::Error| Utf8ifyError::FileReadError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut file = File::open(path).map_err(read_error)?;
    let size = file.metadata().map_err(read_error)?.len();

    if size > 0 && size >= mmap_threshold {
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| Utf8ifyError::FileReadError {
                file: path.to_path_buf(),
                reason: format!("메모리 매핑 실패: {}", e),
            })?
        };
        return Ok(FileBuffer::Mapped(mmap));
    }

    let mut bytes = Vec::with_capacity(size as usize);
    file.read_to_end(&mut bytes).map_err(read_error)?;
    Ok(FileBuffer::Heap(bytes))
}

/// 인코딩 이름(레이블)을 실제 디코더로 해석
///
/// `replacement` 레이블처럼 내용을 모두 U+FFFD 로 바꾸는 인코딩은 지원하지 않습니다.
///
/// # Examples
/// ```
/// use utf8ify::transcoder::resolve_encoding;
///
/// assert_eq!(resolve_encoding("big5").unwrap().name(), "Big5");
/// assert!(resolve_encoding("no-such-codepage").is_err());
/// ```
pub fn resolve_encoding(name: &str) -> Result<&'static Encoding> {
    Encoding::for_label(name.trim().as_bytes())
        .filter(|encoding| *encoding != encoding_rs::REPLACEMENT)
        .ok_or_else(|| Utf8ifyError::UnsupportedEncoding {
            name: name.to_string(),
        })
}

/// UTF-32 BOM (UTF-16LE BOM `FF FE` 와 앞부분이 겹치므로 먼저 검사)
const UTF32LE_BOM: [u8; 4] = [0xFF, 0xFE, 0x00, 0x00];
const UTF32BE_BOM: [u8; 4] = [0x00, 0x00, 0xFE, 0xFF];

/// 디코딩에 사용할 원본 인코딩
///
/// `encoding_rs` 가 다루지 않는 UTF-32 는 별도로 디코딩합니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceEncoding {
    Utf32Le,
    Utf32Be,
    Web(&'static Encoding),
}

impl SourceEncoding {
    /// 보고용 인코딩 이름
    pub fn name(&self) -> &'static str {
        match self {
            SourceEncoding::Utf32Le => "UTF-32LE",
            SourceEncoding::Utf32Be => "UTF-32BE",
            SourceEncoding::Web(encoding) => encoding.name(),
        }
    }
}

/// 버퍼 앞부분의 BOM 으로 인코딩 판별
///
/// # Returns
/// BOM이 가리키는 인코딩과 BOM 길이
///
/// # Examples
/// ```
/// use utf8ify::transcoder::sniff_bom;
///
/// let (encoding, len) = sniff_bom(&[0xFF, 0xFE, 0x00, 0x00, 0x41, 0, 0, 0]).unwrap();
/// assert_eq!(encoding.name(), "UTF-32LE");
/// assert_eq!(len, 4);
/// assert!(sniff_bom(b"plain").is_none());
/// ```
pub fn sniff_bom(buffer: &[u8]) -> Option<(SourceEncoding, usize)> {
    if buffer.starts_with(&UTF32LE_BOM) {
        return Some((SourceEncoding::Utf32Le, UTF32LE_BOM.len()));
    }
    if buffer.starts_with(&UTF32BE_BOM) {
        return Some((SourceEncoding::Utf32Be, UTF32BE_BOM.len()));
    }

    Encoding::for_bom(buffer).map(|(encoding, len)| (SourceEncoding::Web(encoding), len))
}

/// UTF-32 디코딩
///
/// 유효하지 않은 코드 포인트와 끝에 남은 불완전한 바이트는 U+FFFD 로 대체합니다.
fn decode_utf32(bytes: &[u8], big_endian: bool) -> (String, bool) {
    let chunks = bytes.chunks_exact(4);
    let trailing = !chunks.remainder().is_empty();
    let mut had_errors = trailing;
    let mut text = String::with_capacity(bytes.len() / 4);

    for chunk in chunks {
        let unit = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let value = if big_endian {
            u32::from_be_bytes(unit)
        } else {
            u32::from_le_bytes(unit)
        };
        match char::from_u32(value) {
            Some(c) => text.push(c),
            None => {
                had_errors = true;
                text.push(char::REPLACEMENT_CHARACTER);
            }
        }
    }

    if trailing {
        text.push(char::REPLACEMENT_CHARACTER);
    }

    (text, had_errors)
}

/// 디코딩 결과
#[derive(Debug)]
pub struct Decoded {
    /// 디코딩된 텍스트 (BOM 제외)
    pub text: String,
    /// 실제로 사용된 인코딩
    pub encoding: SourceEncoding,
    /// 잘못된 바이트가 U+FFFD 로 대체되었는지 여부
    pub had_errors: bool,
}

/// 바이트 버퍼를 디코딩
///
/// BOM이 있으면 요청된 인코딩보다 BOM이 우선합니다.
pub fn decode(buffer: &[u8], requested: &str) -> Result<Decoded> {
    let (encoding, bom_len) = match sniff_bom(buffer) {
        Some(found) => found,
        None => (SourceEncoding::Web(resolve_encoding(requested)?), 0),
    };

    let body = &buffer[bom_len..];
    let (text, had_errors) = match encoding {
        SourceEncoding::Utf32Le => decode_utf32(body, false),
        SourceEncoding::Utf32Be => decode_utf32(body, true),
        SourceEncoding::Web(web) => {
            let (text, had_errors) = web.decode_without_bom_handling(body);
            (text.into_owned(), had_errors)
        }
    };

    Ok(Decoded {
        text,
        encoding,
        had_errors,
    })
}

/// 텍스트를 BOM 없는 UTF-8 로 파일에 기록
///
/// 같은 폴더의 임시 파일에 먼저 쓰고 원본 권한을 복사한 뒤 원본 위치로 교체합니다.
///
/// # Returns
/// 기록한 바이트 수
pub fn write_utf8(path: &Path, text: &str) -> Result<u64> {
    let write_error = |e: std::io::Error| Utf8ifyError::FileWriteError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path).map_err(write_error)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(text.as_bytes()).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    fs::set_permissions(tmp.path(), permissions).map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;

    Ok(text.len() as u64)
}
