//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱, 실행 전 전제 조건 검사를 담당합니다.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::{Result, Utf8ifyError};
use crate::pattern::{parse_patterns, DEFAULT_PATTERN};

/// 기본 원본 인코딩 (번체 중국어 레거시 코드 페이지)
pub const DEFAULT_ENCODING: &str = "big5";

/// utf8ify CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "utf8ify",
    author = "YourName <your@email.com>",
    version,
    about = "UTF-8 FOLDER CONVERTER - 폴더 내 파일들을 UTF-8(BOM 없음)로 일괄 변환하는 CLI 도구",
    long_about = r#"
UTF-8 FOLDER CONVERTER
======================

지정된 폴더에서 패턴과 일치하는 파일을 찾아
BOM 없는 UTF-8 로 제자리 변환합니다.

특징:
  • 이미 UTF-8 인 파일은 건드리지 않음
  • UTF-16 BOM 자동 인식
  • 임시 파일 후 교체 방식의 안전한 쓰기
  • 파일 단위 에러 격리 및 상세 통계

예제:
  utf8ify convert ./src
  utf8ify convert ./src --pattern "*.txt,*.config"
  utf8ify convert ./src --encoding gbk -j 4
  utf8ify convert ./src --check --report summary.json
"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// 하위 명령
#[derive(Subcommand, Debug)]
pub enum Command {
    /// 지정한 폴더의 파일들을 UTF-8 인코딩으로 변환
    Convert(Args),
}

/// `convert` 명령 인자
#[derive(clap::Args, Debug, Clone)]
pub struct Args {
    /// 변환할 파일들이 있는 폴더 경로
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// 파일 패턴 (쉼표로 구분, 예: "*.txt,*.config")
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// BOM이 없는 파일의 원본 인코딩 (예: big5, gbk, euc-kr, shift_jis)
    #[arg(short, long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// 작업 스레드 수 (1이면 순차 처리)
    #[arg(short = 'j', long, default_value_t = 1)]
    pub threads: usize,

    /// 최대 폴더 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 실제 변환 없이 대상 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 파일을 쓰지 않고 변환 필요 여부만 검사
    #[arg(long)]
    pub check: bool,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// 실행 요약 JSON 파일 경로
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Args {
    /// 패턴 목록을 파싱하여 벡터로 반환
    pub fn get_patterns(&self) -> Vec<String> {
        parse_patterns(&self.pattern)
    }

    /// 파일을 건드리기 전에 확인하는 전제 조건 검사
    ///
    /// # Returns
    /// 파싱된 패턴 목록
    pub fn validate(&self) -> Result<Vec<String>> {
        if !self.folder.exists() {
            return Err(Utf8ifyError::DirectoryNotFound {
                path: self.folder.clone(),
            });
        }

        if !self.folder.is_dir() {
            return Err(Utf8ifyError::NotADirectory {
                path: self.folder.clone(),
            });
        }

        let patterns = self.get_patterns();
        if patterns.is_empty() {
            return Err(Utf8ifyError::NoPatternsProvided);
        }

        if self.encoding.trim().is_empty() {
            return Err(Utf8ifyError::BlankEncodingName);
        }

        Ok(patterns)
    }
}
