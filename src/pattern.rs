//! 패턴 매칭 모듈
//!
//! glob 패턴을 사용한 파일 수집을 담당합니다. 패턴은 루트 폴더 기준 상대 경로와
//! 비교되며, 여러 패턴 중 하나라도 일치하면 대상 파일이 됩니다.

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, Utf8ifyError};

/// 패턴을 지정하지 않았을 때의 기본 패턴
pub const DEFAULT_PATTERN: &str = "*.*";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// 쉼표로 구분된 패턴 목록 파싱
///
/// 각 항목의 앞뒤 공백을 제거하고 빈 항목은 버립니다.
///
/// # Examples
/// ```
/// use utf8ify::pattern::parse_patterns;
///
/// assert_eq!(parse_patterns(" *.txt, ,*.config"), vec!["*.txt", "*.config"]);
/// ```
pub fn parse_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 컴파일된 패턴 매처 (여러 패턴의 합집합)
#[derive(Debug)]
pub struct PatternMatcher {
    patterns: Vec<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `patterns` - 글로브 패턴 목록 (비어 있으면 에러)
    ///
    /// # Examples
    /// ```
    /// use utf8ify::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(&["*.txt".to_string(), "*.config".to_string()]).unwrap();
    /// assert!(matcher.matches("readme.TXT"));
    /// assert!(matcher.matches("app.config"));
    /// assert!(!matcher.matches("main.rs"));
    /// ```
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(Utf8ifyError::NoPatternsProvided);
        }

        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|_| Utf8ifyError::InvalidPattern {
                    pattern: p.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// 루트 기준 상대 경로(`/` 구분)가 패턴 중 하나와 일치하는지 확인
    pub fn matches(&self, relative_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(relative_path, MATCH_OPTIONS))
    }

    /// 등록된 패턴 수
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// 상대 경로를 `/` 구분 문자열로 변환
fn to_match_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// 루트 폴더 아래에서 패턴과 일치하는 파일 수집
///
/// # Arguments
/// * `root` - 탐색할 루트 폴더
/// * `matcher` - 패턴 매처
/// * `max_depth` - 최대 탐색 깊이 (None이면 제한 없음)
///
/// # Returns
/// 파일 이름 순으로 정렬된 절대 경로 목록
pub fn collect_files(
    root: &Path,
    matcher: &PatternMatcher,
    max_depth: Option<usize>,
) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Utf8ifyError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(Utf8ifyError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let root = root
        .canonicalize()
        .map_err(|_| Utf8ifyError::DirectoryNotFound {
            path: root.to_path_buf(),
        })?;

    let walker = match max_depth {
        Some(depth) => WalkDir::new(&root).max_depth(depth),
        None => WalkDir::new(&root),
    };

    let files = walker
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("탐색 중 항목을 건너뜁니다: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .strip_prefix(&root)
                .map(|rel| matcher.matches(&to_match_path(rel)))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    Ok(files)
}
