//! 에러 타입 정의 모듈
//!
//! utf8ify에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// utf8ify에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum Utf8ifyError {
    /// 대상 폴더가 존재하지 않음
    #[error("폴더를 찾을 수 없습니다: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// 대상 경로가 폴더가 아님
    #[error("대상 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 파일 패턴이 하나도 없음
    #[error("파일 패턴을 하나 이상 지정해야 합니다")]
    NoPatternsProvided,

    /// 인코딩 이름이 비어 있음
    #[error("유효한 인코딩 이름을 지정해야 합니다")]
    BlankEncodingName,

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 알 수 없는 원본 인코딩
    #[error("지원하지 않는 인코딩입니다: {name}")]
    UnsupportedEncoding { name: String },

    /// 파일 읽기 실패
    #[error("파일을 읽을 수 없습니다 ({file}): {reason}")]
    FileReadError { file: PathBuf, reason: String },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    FileWriteError { file: PathBuf, reason: String },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPoolError { reason: String },
}

/// utf8ify 결과 타입 별칭
pub type Result<T> = std::result::Result<T, Utf8ifyError>;
