//! 변환 파이프라인 모듈
//!
//! 매칭된 파일마다 다음 단계를 수행합니다.
//!
//! ```text
//! 읽기 → BOM 검사 → UTF-8 유효성 검사 → (이미 UTF-8 이면 건너뜀)
//!      → 디코딩 → UTF-8 기록 → 결과 보고
//! ```
//!
//! 파일 하나에서 발생한 에러는 해당 파일의 실패로만 기록되고 나머지 파일 처리는 계속됩니다.
//! 여러 작업 스레드를 사용할 때도 한 파일의 알림은 한 번에 묶어서 전달되므로
//! 다른 파일의 알림과 섞이지 않습니다.

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Result, Utf8ifyError};
use crate::pattern::{collect_files, PatternMatcher};
use crate::stats::{RunSummary, Statistics};
use crate::transcoder::{decode, read_file, write_utf8};
use crate::utf8::{has_utf8_bom, is_valid_utf8};

/// 진행 상황 알림을 받는 쪽
///
/// 콘솔 렌더러, 로그, 테스트용 기록기 등 어떤 구현이든 될 수 있습니다.
pub trait ProgressSink: Send + Sync {
    /// 전체 진행률 (`current`/`total`)
    fn render_progress(&self, current: usize, total: usize);
    fn render_error(&self, message: &str);
    fn render_success(&self, message: &str);
    /// 파일별 진행률 (0..=100)
    fn render_file_progress(&self, file_name: &str, percent: u8);
}

/// 파일 하나의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// 이미 UTF-8 (파일은 건드리지 않음)
    AlreadyUtf8,
    /// 변환 완료, 실제로 사용된 인코딩 이름
    Converted { encoding_name: String },
    /// 검사 모드에서 변환이 필요하다고 판정됨
    Pending { encoding_name: String },
    Failed { message: String },
}

impl ConversionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ConversionOutcome::Failed { .. })
    }
}

/// 파일 하나를 처리하는 동안 쌓인 알림
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    FileProgress { file_name: String, percent: u8 },
    Success(String),
    Error(String),
}

/// 파일 처리 보고서
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: ConversionOutcome,
    pub notices: Vec<Notice>,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome: ConversionOutcome::AlreadyUtf8,
            notices: Vec::new(),
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    fn file_progress(&mut self, file_name: &str, percent: u8) {
        self.notices.push(Notice::FileProgress {
            file_name: file_name.to_string(),
            percent,
        });
    }

    fn success(&mut self, message: String) {
        self.notices.push(Notice::Success(message));
    }

    fn error(&mut self, message: String) {
        self.notices.push(Notice::Error(message));
    }

    /// 쌓인 알림을 순서대로 전달
    fn replay(&self, sink: &dyn ProgressSink) {
        for notice in &self.notices {
            match notice {
                Notice::FileProgress { file_name, percent } => {
                    sink.render_file_progress(file_name, *percent)
                }
                Notice::Success(message) => sink.render_success(message),
                Notice::Error(message) => sink.render_error(message),
            }
        }
    }
}

/// 파일 사이에서 확인되는 취소 신호
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 변환 옵션
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// 작업 스레드 수 (1이면 입력 순서대로 순차 처리)
    pub threads: usize,
    /// 파일을 쓰지 않고 판정만 수행
    pub check_only: bool,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
    /// 최대 폴더 탐색 깊이
    pub max_depth: Option<usize>,
    pub cancel: CancelToken,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            threads: 1,
            check_only: false,
            mmap_threshold: 10 * 1024 * 1024, // 10MB
            max_depth: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }

    pub fn with_mmap_threshold(mut self, mmap_threshold: u64) -> Self {
        self.mmap_threshold = mmap_threshold;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 단일 파일 처리
///
/// 파일은 한 번만 읽으며, 이미 UTF-8 이라고 판정되면 다시 쓰지 않습니다.
/// 어떤 에러든 `ConversionOutcome::Failed` 로 바뀌어 보고서에 담깁니다.
pub fn process_file(path: &Path, encoding: &str, options: &ConvertOptions) -> FileReport {
    let mut report = FileReport::new(path);

    match process_file_internal(path, encoding, options, &mut report) {
        Ok(outcome) => report.outcome = outcome,
        Err(e) => {
            log::warn!("{:?} 처리 실패: {}", path, e);
            report.error(format!(
                "파일 '{}' 처리 중 오류가 발생했습니다: {}",
                path.display(),
                e
            ));
            report.outcome = ConversionOutcome::Failed {
                message: e.to_string(),
            };
        }
    }

    report
}

/// 내부 파일 처리 로직
fn process_file_internal(
    path: &Path,
    encoding: &str,
    options: &ConvertOptions,
    report: &mut FileReport,
) -> Result<ConversionOutcome> {
    let file_name = display_name(path);

    let buffer = read_file(path, options.mmap_threshold)?;
    report.bytes_read = buffer.len() as u64;

    let already_utf8 = if has_utf8_bom(&buffer) {
        log::debug!("{:?}: UTF-8 BOM 발견", path);
        true
    } else {
        is_valid_utf8(&buffer)
    };

    if already_utf8 {
        log::debug!("{:?}: 이미 UTF-8, 건너뜀", path);
        report.success(format!(
            "파일 '{}' 은(는) 이미 UTF-8 인코딩이므로 변환하지 않습니다",
            file_name
        ));
        report.file_progress(&file_name, 100);
        return Ok(ConversionOutcome::AlreadyUtf8);
    }

    if !options.check_only {
        report.file_progress(&file_name, 0);
    }

    let decoded = decode(&buffer, encoding)?;
    // 메모리 매핑된 원본을 교체하기 전에 해제
    drop(buffer);

    let encoding_name = decoded.encoding.name().to_string();
    if decoded.had_errors {
        log::warn!(
            "{:?}: {} 디코딩 중 잘못된 바이트가 대체 문자로 바뀌었습니다",
            path,
            encoding_name
        );
    }

    if options.check_only {
        report.success(format!(
            "파일 '{}' 은(는) {} 에서 UTF-8 로 변환이 필요합니다",
            file_name, encoding_name
        ));
        return Ok(ConversionOutcome::Pending { encoding_name });
    }

    report.file_progress(&file_name, 50);

    report.bytes_written = write_utf8(path, &decoded.text)?;
    log::info!("{:?}: {} → UTF-8 변환 완료", path, encoding_name);

    report.file_progress(&file_name, 100);
    report.success(format!(
        "파일 '{}' 을(를) {} 에서 UTF-8 인코딩으로 변환했습니다",
        file_name, encoding_name
    ));

    Ok(ConversionOutcome::Converted { encoding_name })
}

/// 루트 폴더에서 패턴에 맞는 파일을 찾아 모두 UTF-8 로 변환
///
/// # Arguments
/// * `root` - 대상 폴더
/// * `patterns` - 글로브 패턴 목록 (합집합)
/// * `encoding` - BOM이 없는 파일에 사용할 원본 인코딩 이름
/// * `sink` - 진행 상황 알림 대상
pub fn convert<S: AsRef<str>>(
    root: &Path,
    patterns: &[S],
    encoding: &str,
    sink: &dyn ProgressSink,
) -> Result<RunSummary> {
    convert_with_options(root, patterns, encoding, sink, &ConvertOptions::new())
}

/// 옵션을 지정하여 [`convert`] 실행
pub fn convert_with_options<S: AsRef<str>>(
    root: &Path,
    patterns: &[S],
    encoding: &str,
    sink: &dyn ProgressSink,
    options: &ConvertOptions,
) -> Result<RunSummary> {
    let matcher = PatternMatcher::new(patterns)?;
    let files = collect_files(root, &matcher, options.max_depth)?;
    convert_files(&files, encoding, sink, options)
}

/// 이미 수집된 파일 목록을 변환
///
/// 목록이 비어 있으면 "파일 없음" 알림만 보내고 정상 종료합니다.
/// 같은 경로가 여러 번 들어 있으면 한 번만 처리합니다.
pub fn convert_files(
    files: &[PathBuf],
    encoding: &str,
    sink: &dyn ProgressSink,
    options: &ConvertOptions,
) -> Result<RunSummary> {
    let mut seen = HashSet::new();
    let files: Vec<&PathBuf> = files.iter().filter(|p| seen.insert(*p)).collect();

    if files.is_empty() {
        sink.render_error("조건에 맞는 파일을 찾을 수 없습니다");
        return Ok(Statistics::new(0).summary(false));
    }

    let total = files.len();
    let stats = Statistics::new(total);
    let completed = AtomicUsize::new(0);
    let emit_lock = Mutex::new(());

    let run_one = |path: &&PathBuf| {
        if options.cancel.is_cancelled() {
            return;
        }
        stats.increment_attempted();
        log::debug!("{:?} 처리 시작", path);

        let report = process_file(path, encoding, options);

        stats.add_bytes_read(report.bytes_read);
        stats.add_bytes_written(report.bytes_written);
        match &report.outcome {
            ConversionOutcome::AlreadyUtf8 => stats.increment_already_utf8(),
            ConversionOutcome::Converted { .. } => stats.increment_converted(),
            ConversionOutcome::Pending { .. } => stats.increment_pending(),
            ConversionOutcome::Failed { .. } => stats.increment_failed(),
        }

        let _guard = emit_lock.lock().unwrap_or_else(|e| e.into_inner());
        report.replay(sink);
        if !report.outcome.is_failed() {
            let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
            sink.render_progress(current, total);
        }
    };

    if options.threads <= 1 {
        files.iter().for_each(run_one);
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
            .map_err(|e| Utf8ifyError::ThreadPoolError {
                reason: e.to_string(),
            })?;
        pool.install(|| files.par_iter().for_each(run_one));
    }

    let summary = stats.summary(stats.is_incomplete());
    if summary.cancelled {
        log::warn!("취소됨: {}/{} 개 파일만 처리했습니다", summary.attempted, total);
    }

    sink.render_success(&format!("완료! 총 {} 개 파일을 처리했습니다", summary.attempted));

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressSink for Recorder {
        fn render_progress(&self, current: usize, total: usize) {
            self.events.lock().unwrap().push(format!("progress {current}/{total}"));
        }

        fn render_error(&self, message: &str) {
            self.events.lock().unwrap().push(format!("error {message}"));
        }

        fn render_success(&self, message: &str) {
            self.events.lock().unwrap().push(format!("success {message}"));
        }

        fn render_file_progress(&self, file_name: &str, percent: u8) {
            self.events.lock().unwrap().push(format!("file {file_name} {percent}"));
        }
    }

    #[test]
    fn test_process_file_already_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ascii.txt");
        fs::write(&path, b"plain ascii").unwrap();

        let report = process_file(&path, "big5", &ConvertOptions::new());

        assert_eq!(report.outcome, ConversionOutcome::AlreadyUtf8);
        assert_eq!(report.bytes_written, 0);
        assert_eq!(
            report.notices.last(),
            Some(&Notice::FileProgress {
                file_name: "ascii.txt".to_string(),
                percent: 100
            })
        );
    }

    #[test]
    fn test_process_file_converted_progress_sequence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big5.txt");
        fs::write(&path, [0xA4, 0xA4, 0xA4, 0xE5]).unwrap();

        let report = process_file(&path, "big5", &ConvertOptions::new());

        assert_eq!(
            report.outcome,
            ConversionOutcome::Converted {
                encoding_name: "Big5".to_string()
            }
        );
        let percents: Vec<u8> = report
            .notices
            .iter()
            .filter_map(|n| match n {
                Notice::FileProgress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![0, 50, 100]);
        assert!(matches!(report.notices.last(), Some(Notice::Success(m)) if m.contains("Big5")));
        assert_eq!(fs::read_to_string(&path).unwrap(), "中文");
    }

    #[test]
    fn test_process_file_unsupported_encoding() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("legacy.txt");
        fs::write(&path, [0xA4, 0xA4]).unwrap();

        let report = process_file(&path, "no-such-codepage", &ConvertOptions::new());

        assert!(report.outcome.is_failed());
        assert!(matches!(report.notices.last(), Some(Notice::Error(m)) if m.contains("legacy.txt")));
        assert_eq!(fs::read(&path).unwrap(), vec![0xA4, 0xA4]);
    }

    #[test]
    fn test_check_only_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big5.txt");
        fs::write(&path, [0xA4, 0xA4]).unwrap();

        let options = ConvertOptions::new().with_check_only(true);
        let report = process_file(&path, "big5", &options);

        assert_eq!(
            report.outcome,
            ConversionOutcome::Pending {
                encoding_name: "Big5".to_string()
            }
        );
        assert_eq!(fs::read(&path).unwrap(), vec![0xA4, 0xA4]);
    }

    #[test]
    fn test_convert_files_empty_list() {
        let recorder = Recorder::default();
        let summary = convert_files(&[], "big5", &recorder, &ConvertOptions::new()).unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(summary.attempted, 0);
        assert_eq!(recorder.events().len(), 1);
        assert!(recorder.events()[0].starts_with("error "));
    }

    #[test]
    fn test_convert_files_deduplicates_paths() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, b"a").unwrap();

        let recorder = Recorder::default();
        let files = vec![path.clone(), path];
        let summary = convert_files(&files, "big5", &recorder, &ConvertOptions::new()).unwrap();

        assert_eq!(summary.total, 1);
        assert_eq!(summary.attempted, 1);
    }

    #[test]
    fn test_cancelled_before_start() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big5.txt");
        fs::write(&path, [0xA4, 0xA4]).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let options = ConvertOptions::new().with_cancel(cancel);

        let recorder = Recorder::default();
        let summary = convert_files(&[path.clone()], "big5", &recorder, &options).unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.attempted, 0);
        assert_eq!(fs::read(&path).unwrap(), vec![0xA4, 0xA4]);
    }

    #[test]
    fn test_overall_progress_is_monotonic_with_pool() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..16)
            .map(|i| {
                let path = temp_dir.path().join(format!("f{i:02}.txt"));
                fs::write(&path, [0xA4, 0xA4]).unwrap();
                path
            })
            .collect();

        let recorder = Recorder::default();
        let options = ConvertOptions::new().with_threads(4);
        let summary = convert_files(&files, "big5", &recorder, &options).unwrap();

        assert_eq!(summary.converted, 16);
        let progress: Vec<String> = recorder
            .events()
            .into_iter()
            .filter(|e| e.starts_with("progress "))
            .collect();
        let expected: Vec<String> = (1..=16).map(|i| format!("progress {i}/16")).collect();
        assert_eq!(progress, expected);
    }
}
