//! utf8ify - UTF-8 FOLDER CONVERTER
//!
//! 폴더 내 파일들을 BOM 없는 UTF-8 로 제자리 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - ✅ **UTF-8 판별**: BOM 검사 후 바이트 단위 유효성 검사, 이미 UTF-8 이면 건너뜀
//! - 🔄 **레거시 인코딩 변환**: Big5, GBK, EUC-KR, Shift_JIS 등 지정 인코딩에서 변환
//! - 🧭 **BOM 우선**: UTF-16/UTF-32 BOM이 있으면 지정 인코딩 대신 BOM 인코딩 사용
//! - 🛡️ **안전한 쓰기**: 같은 폴더의 임시 파일에 쓴 뒤 원본과 교체
//! - 🚀 **병렬 처리**: Rayon 스레드 풀로 여러 파일 동시 변환
//! - 🔍 **패턴 필터링**: 쉼표로 구분된 glob 패턴의 합집합
//! - 📈 **상세 통계**: 변환/건너뜀/실패 수와 JSON 리포트
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법 (big5 → UTF-8)
//! utf8ify convert ./legacy
//!
//! # 패턴과 인코딩 지정
//! utf8ify convert ./legacy --pattern "*.txt,*.config" --encoding gbk
//! ```

pub mod cli;
pub mod error;
pub mod pattern;
pub mod pipeline;
pub mod render;
pub mod stats;
pub mod transcoder;
pub mod utf8;

// Re-exports for convenient access
pub use cli::{Args, Cli, Command};
pub use error::{Result, Utf8ifyError};
pub use pattern::{collect_files, parse_patterns, PatternMatcher};
pub use pipeline::{
    convert, convert_files, convert_with_options, process_file, CancelToken, ConversionOutcome,
    ConvertOptions, FileReport, Notice, ProgressSink,
};
pub use render::ConsoleRenderer;
pub use stats::{format_bytes, RunSummary, Statistics};
pub use transcoder::SourceEncoding;
pub use utf8::{has_utf8_bom, is_utf8, is_valid_utf8};
